//! Cart store
//!
//! [`CartStore`] owns the live cart for one session. Every operation runs one
//! reducer transition, persists the result if anything changed and, for adds
//! and removals, hands a [`CartNotification`] to the injected notifier.

use rust_decimal::Decimal;
use tracing::debug;

use crate::{
    cart::{CartAction, CartChange, CartReducer, CartState, CartUndo},
    discounts::{DiscountError, DiscountTable},
    items::{LineItem, LineItemPatch},
    notifications::{CartNotification, NoopNotifier, Notifier},
    persistence::{CartPersistence, CartStorage, MemoryStorage},
};

/// The session's cart, wired to its persistence and notification
/// collaborators.
#[derive(Debug)]
pub struct CartStore<S: CartStorage = MemoryStorage, N: Notifier = NoopNotifier> {
    state: CartState,
    reducer: CartReducer,
    persistence: CartPersistence<S>,
    notifier: N,
}

impl CartStore {
    /// An empty cart in the home currency, kept in memory, without
    /// notifications.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(
            CartPersistence::new(MemoryStorage::new()),
            NoopNotifier,
            CartReducer::default(),
        )
    }
}

impl<S: CartStorage, N: Notifier> CartStore<S, N> {
    /// Open the store, seeding it from whatever cart `persistence` holds.
    ///
    /// A missing or unreadable stored cart yields the reducer's empty cart.
    pub fn open(persistence: CartPersistence<S>, notifier: N, reducer: CartReducer) -> Self {
        let state = persistence.restore_or(|| reducer.initial_state());

        Self {
            state,
            reducer,
            persistence,
            notifier,
        }
    }

    /// Current cart snapshot.
    pub fn state(&self) -> &CartState {
        &self.state
    }

    /// The transition function in use.
    pub fn reducer(&self) -> &CartReducer {
        &self.reducer
    }

    /// The notifier.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// The notifier, mutably, e.g. to drain a queue.
    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    /// The persistence binding.
    pub fn persistence(&self) -> &CartPersistence<S> {
        &self.persistence
    }

    /// Run one transition and its side effects.
    pub fn dispatch(&mut self, action: CartAction) -> CartChange {
        let state = std::mem::take(&mut self.state);
        let transition = self.reducer.reduce(state, action);

        self.state = transition.state;

        if transition.change.is_unchanged() {
            return transition.change;
        }

        debug!(
            items = self.state.item_count(),
            grand_total = %self.state.total_price(),
            "cart changed"
        );

        self.persistence.persist(&self.state);

        if let Some(notification) = CartNotification::for_change(&transition.change, &self.state)
        {
            self.notifier.notify(notification);
        }

        transition.change
    }

    /// Add an item, merging into an existing line with the same id and kind.
    pub fn add_item(&mut self, item: LineItem) -> CartChange {
        self.dispatch(CartAction::AddItem(item))
    }

    /// Remove the first line with the given id.
    pub fn remove_item(&mut self, id: impl Into<String>) -> CartChange {
        self.dispatch(CartAction::RemoveItem { id: id.into() })
    }

    /// Set a line's quantity. Values below one are raised to one.
    pub fn update_quantity(&mut self, id: impl Into<String>, quantity: i64) -> CartChange {
        self.dispatch(CartAction::UpdateQuantity {
            id: id.into(),
            quantity,
        })
    }

    /// Merge fields into a line.
    pub fn update_item(&mut self, id: impl Into<String>, patch: LineItemPatch) -> CartChange {
        self.dispatch(CartAction::UpdateItem {
            id: id.into(),
            patch,
        })
    }

    /// Apply an absolute discount, replacing any previous one.
    pub fn apply_discount(&mut self, code: impl Into<String>, amount: Decimal) -> CartChange {
        self.dispatch(CartAction::ApplyDiscount {
            code: code.into(),
            amount,
        })
    }

    /// Look a code up in `table` and apply the amount it takes off the
    /// current subtotal. The amount is fixed from then on.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::UnknownCode`] if the code is not in the table.
    pub fn apply_discount_code(
        &mut self,
        code: &str,
        table: &DiscountTable,
    ) -> Result<Decimal, DiscountError> {
        let amount = table.amount_for(code, self.state.subtotal())?;

        self.apply_discount(code.trim().to_ascii_uppercase(), amount);

        Ok(amount)
    }

    /// Remove the current discount.
    pub fn remove_discount(&mut self) -> CartChange {
        self.dispatch(CartAction::RemoveDiscount)
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) -> CartChange {
        self.dispatch(CartAction::Clear)
    }

    /// Overwrite the cart. The state is taken as given.
    pub fn replace_cart(&mut self, state: CartState) -> CartChange {
        self.dispatch(CartAction::Replace(Box::new(state)))
    }

    /// Reverse an earlier add or removal.
    pub fn undo(&mut self, undo: CartUndo) -> CartChange {
        self.dispatch(CartAction::Undo(undo))
    }

    /// Sum of quantities over all lines.
    pub fn item_count(&self) -> u64 {
        self.state.item_count()
    }

    /// Grand total after tax and discount.
    pub fn total_price(&self) -> Decimal {
        self.state.total_price()
    }

    /// Returns true if any line has the given product id.
    pub fn is_in_cart(&self, id: &str) -> bool {
        self.state.is_in_cart(id)
    }
}
