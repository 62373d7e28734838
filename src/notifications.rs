//! Notifications
//!
//! Adds and removals produce a user-facing notification carrying enough data
//! to render a toast and, optionally, to undo the change. Rendering is left to
//! whatever [`Notifier`] the store is given.

use std::collections::VecDeque;

use tracing::info;

use crate::{
    cart::{CartChange, CartState, CartUndo},
    items::LineItem,
    money::format_amount,
};

/// A message describing a cart change.
#[derive(Debug, Clone, PartialEq)]
pub struct CartNotification {
    /// Short heading
    pub title: String,

    /// Human-readable summary
    pub message: String,

    /// Image of the affected item
    pub image: Option<String>,

    /// Formatted price of the affected line
    pub price_label: String,

    /// Cart item count after the change
    pub item_count: u64,

    /// Inverse operation, for an "undo" button
    pub undo: Option<CartUndo>,
}

impl CartNotification {
    /// Build the notification for a change, if that kind of change is
    /// announced. `state` is the cart after the change.
    pub fn for_change(change: &CartChange, state: &CartState) -> Option<Self> {
        match change {
            CartChange::ItemAdded { key, added, .. } => {
                let line = state.line(key)?;

                Some(Self {
                    title: "Added to cart".to_string(),
                    message: added_message(line, *added),
                    image: line.image.clone(),
                    price_label: format_amount(line.line_total(), &line.currency),
                    item_count: state.item_count(),
                    undo: change.undo(),
                })
            }
            CartChange::ItemRemoved { item, .. } => Some(Self {
                title: "Removed from cart".to_string(),
                message: format!("{} was removed from your cart.", item.title),
                image: item.image.clone(),
                price_label: format_amount(item.line_total(), &item.currency),
                item_count: state.item_count(),
                undo: change.undo(),
            }),
            _ => None,
        }
    }
}

fn added_message(line: &LineItem, added: u32) -> String {
    if added == 1 {
        format!("{} was added to your cart.", line.title)
    } else {
        format!("{added} x {} were added to your cart.", line.title)
    }
}

/// Receives cart notifications.
pub trait Notifier {
    /// Deliver a notification.
    fn notify(&mut self, notification: CartNotification);
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&mut self, _notification: CartNotification) {}
}

/// Emits notifications as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&mut self, notification: CartNotification) {
        info!(
            title = %notification.title,
            price = %notification.price_label,
            item_count = notification.item_count,
            undoable = notification.undo.is_some(),
            "{}",
            notification.message
        );
    }
}

/// Holds notifications until a UI drains them.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    pending: VecDeque<CartNotification>,
}

impl NotificationQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the oldest pending notification.
    pub fn pop(&mut self) -> Option<CartNotification> {
        self.pending.pop_front()
    }

    /// Take every pending notification, oldest first.
    pub fn drain(&mut self) -> Vec<CartNotification> {
        self.pending.drain(..).collect()
    }

    /// Number of pending notifications.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Notifier for NotificationQueue {
    fn notify(&mut self, notification: CartNotification) {
        self.pending.push_back(notification);
    }
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&mut self, notification: CartNotification) {
        (**self).notify(notification);
    }
}

impl<N: Notifier> Notifier for Option<N> {
    fn notify(&mut self, notification: CartNotification) {
        if let Some(notifier) = self {
            notifier.notify(notification);
        }
    }
}
