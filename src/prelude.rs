//! Wanderkart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{
        AppliedDiscount, CartAction, CartChange, CartReducer, CartState, CartUndo, HOME_CURRENCY,
        Transition,
    },
    discounts::{DiscountError, DiscountTable},
    items::{BookingDetails, ItemKind, LineItem, LineItemPatch, LineKey},
    notifications::{CartNotification, NoopNotifier, NotificationQueue, Notifier, TracingNotifier},
    persistence::{CartPersistence, CartStorage, FileStorage, MemoryStorage, PersistenceError},
    pricing::CartTotals,
    store::CartStore,
    summary::{CartSummary, SummaryError},
};
