//! Cart
//!
//! The cart is a plain aggregate moved between snapshots by [`CartReducer`].
//! Each call to [`CartReducer::reduce`] consumes the previous [`CartState`]
//! and an action and yields the next state together with a description of
//! what changed. No action can fail: unknown ids are no-ops and out of range
//! values are clamped.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    items::{LineItem, LineItemPatch, LineKey, clamp_price, clamp_quantity},
    pricing::CartTotals,
};

/// Default currency of an empty cart.
pub const HOME_CURRENCY: &str = "TRY";

/// The full contents of a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    items: Vec<LineItem>,

    currency: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    discount_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    discount_amount: Option<Decimal>,

    #[serde(default)]
    totals: CartTotals,
}

impl CartState {
    /// Create an empty cart in the given currency.
    pub fn empty(currency: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            currency: currency.into(),
            discount_code: None,
            discount_amount: None,
            totals: CartTotals::default(),
        }
    }

    /// Create a cart from its parts, with totals calculated from them.
    ///
    /// Lines are taken as given; no merging or clamping is done.
    pub fn from_parts(
        items: Vec<LineItem>,
        currency: impl Into<String>,
        discount: Option<(String, Decimal)>,
    ) -> Self {
        let (discount_code, discount_amount) = discount.unzip();

        Self {
            items,
            currency: currency.into(),
            discount_code,
            discount_amount,
            totals: CartTotals::default(),
        }
        .recalculated()
    }

    /// Returns this state with its derived totals recalculated from the lines
    /// and discount.
    #[must_use]
    pub fn recalculated(mut self) -> Self {
        self.recalculate();
        self
    }

    fn recalculate(&mut self) {
        self.totals = CartTotals::calculate(
            &self.items,
            self.discount_amount.unwrap_or(Decimal::ZERO),
        );
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Cart-wide currency code.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Currently applied discount code.
    pub fn discount_code(&self) -> Option<&str> {
        self.discount_code.as_deref()
    }

    /// Currently applied discount amount.
    pub fn discount_amount(&self) -> Option<Decimal> {
        self.discount_amount
    }

    /// Derived totals.
    pub fn totals(&self) -> &CartTotals {
        &self.totals
    }

    /// Sum of quantities over all lines.
    pub fn item_count(&self) -> u64 {
        self.totals.total_item_count
    }

    /// Grand total after tax and discount.
    pub fn total_price(&self) -> Decimal {
        self.totals.grand_total
    }

    /// Subtotal before tax and discount.
    pub fn subtotal(&self) -> Decimal {
        self.totals.subtotal
    }

    /// Tax on the subtotal.
    pub fn tax_amount(&self) -> Decimal {
        self.totals.tax_amount
    }

    /// Returns true if any line has the given product id, whatever its kind.
    pub fn is_in_cart(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Look up a line by its identity.
    pub fn line(&self, key: &LineKey) -> Option<&LineItem> {
        self.items.iter().find(|item| item.matches(key))
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    fn position_by_id(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    fn position_by_key(&self, key: &LineKey) -> Option<usize> {
        self.items.iter().position(|item| item.matches(key))
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::empty(HOME_CURRENCY)
    }
}

/// A discount as it was applied to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedDiscount {
    /// Discount code
    pub code: String,

    /// Absolute amount taken off the total
    pub amount: Decimal,
}

/// An inverse operation restoring the cart to how it was before an add or a
/// removal.
#[derive(Debug, Clone, PartialEq)]
pub enum CartUndo {
    /// Remove a line that an add created.
    RemoveLine {
        /// The added line
        key: LineKey,

        /// Cart currency before the add
        currency: String,
    },

    /// Put a line's quantity back to what it was before an add merged into it.
    RestoreQuantity {
        /// The merged line
        key: LineKey,

        /// Quantity before the merge
        quantity: u32,
    },

    /// Put a removed line back where it was.
    Reinsert {
        /// The removed line, with its original quantity
        item: LineItem,

        /// Index the line occupied
        position: usize,

        /// Cart currency before the removal
        currency: String,
    },
}

/// An event moving the cart to its next state.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Add an item, merging into an existing line with the same identity.
    AddItem(LineItem),

    /// Remove the first line with this product id.
    RemoveItem {
        /// Product id
        id: String,
    },

    /// Set the first matching line's quantity, clamped to at least one.
    UpdateQuantity {
        /// Product id
        id: String,

        /// Requested quantity
        quantity: i64,
    },

    /// Merge fields into the first matching line.
    UpdateItem {
        /// Product id
        id: String,

        /// Fields to merge
        patch: LineItemPatch,
    },

    /// Apply an absolute discount, replacing any previous one.
    ApplyDiscount {
        /// Discount code
        code: String,

        /// Amount to take off the total
        amount: Decimal,
    },

    /// Remove the current discount.
    RemoveDiscount,

    /// Reset to an empty cart.
    Clear,

    /// Overwrite the whole cart. Lines are kept as given; totals are
    /// recalculated.
    Replace(Box<CartState>),

    /// Reverse an earlier add or removal.
    Undo(CartUndo),
}

/// What a transition did.
#[derive(Debug, Clone, PartialEq)]
pub enum CartChange {
    /// Nothing matched; the state is as it was.
    Unchanged,

    /// An item was added, either as a new line or merged into an existing one.
    ItemAdded {
        /// Identity of the affected line
        key: LineKey,

        /// Quantity of the line before the add, `None` if the line is new
        previous_quantity: Option<u32>,

        /// Quantity added
        added: u32,

        /// Cart currency before the add
        previous_currency: String,
    },

    /// A line was removed.
    ItemRemoved {
        /// The removed line
        item: LineItem,

        /// Index the line occupied
        position: usize,

        /// Cart currency before the removal
        previous_currency: String,
    },

    /// A line's quantity was set.
    QuantityUpdated {
        /// Identity of the affected line
        key: LineKey,

        /// Quantity before the update
        previous: u32,

        /// Quantity after the update
        current: u32,
    },

    /// Fields were merged into a line.
    ItemUpdated {
        /// Identity of the affected line
        key: LineKey,
    },

    /// A discount was applied.
    DiscountApplied {
        /// The discount now in effect
        discount: AppliedDiscount,

        /// The discount it replaced
        replaced: Option<AppliedDiscount>,
    },

    /// The discount was removed.
    DiscountRemoved(AppliedDiscount),

    /// The cart was emptied.
    Cleared,

    /// The cart was overwritten.
    Replaced,

    /// An undo was applied.
    Undone(CartUndo),
}

impl CartChange {
    /// Returns true if the transition left the state untouched.
    pub fn is_unchanged(&self) -> bool {
        matches!(self, CartChange::Unchanged)
    }

    /// The inverse of this change, for adds and removals.
    pub fn undo(&self) -> Option<CartUndo> {
        match self {
            CartChange::ItemAdded {
                key,
                previous_quantity: None,
                previous_currency,
                ..
            } => Some(CartUndo::RemoveLine {
                key: key.clone(),
                currency: previous_currency.clone(),
            }),
            CartChange::ItemAdded {
                key,
                previous_quantity: Some(quantity),
                ..
            } => Some(CartUndo::RestoreQuantity {
                key: key.clone(),
                quantity: *quantity,
            }),
            CartChange::ItemRemoved {
                item,
                position,
                previous_currency,
            } => Some(CartUndo::Reinsert {
                item: item.clone(),
                position: *position,
                currency: previous_currency.clone(),
            }),
            _ => None,
        }
    }
}

/// Result of a single transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// The next state
    pub state: CartState,

    /// What changed
    pub change: CartChange,
}

impl Transition {
    fn unchanged(state: CartState) -> Self {
        Self {
            state,
            change: CartChange::Unchanged,
        }
    }

    fn changed(mut state: CartState, change: CartChange) -> Self {
        state.recalculate();

        Self { state, change }
    }
}

/// The cart transition function.
#[derive(Debug, Clone)]
pub struct CartReducer {
    home_currency: String,
}

impl CartReducer {
    /// Create a reducer whose empty carts use the given currency.
    pub fn new(home_currency: impl Into<String>) -> Self {
        Self {
            home_currency: home_currency.into(),
        }
    }

    /// Currency of an empty cart.
    pub fn home_currency(&self) -> &str {
        &self.home_currency
    }

    /// A fresh, empty cart.
    pub fn initial_state(&self) -> CartState {
        CartState::empty(self.home_currency.clone())
    }

    /// Apply an action to a state, yielding the next state.
    pub fn reduce(&self, state: CartState, action: CartAction) -> Transition {
        match action {
            CartAction::AddItem(item) => add_item(state, item),
            CartAction::RemoveItem { id } => self.remove_item(state, &id),
            CartAction::UpdateQuantity { id, quantity } => update_quantity(state, &id, quantity),
            CartAction::UpdateItem { id, patch } => update_item(state, &id, &patch),
            CartAction::ApplyDiscount { code, amount } => apply_discount(state, &code, amount),
            CartAction::RemoveDiscount => remove_discount(state),
            CartAction::Clear => Transition {
                state: self.initial_state(),
                change: CartChange::Cleared,
            },
            CartAction::Replace(next) => Transition::changed(*next, CartChange::Replaced),
            CartAction::Undo(cart_undo) => undo(state, cart_undo),
        }
    }

    fn remove_item(&self, mut state: CartState, id: &str) -> Transition {
        let Some(position) = state.position_by_id(id) else {
            debug!(id, "remove ignored; no such item");
            return Transition::unchanged(state);
        };

        let item = state.items.remove(position);
        let previous_currency = state.currency.clone();

        // An empty cart is always in the home currency.
        if state.items.is_empty() {
            state.currency.clone_from(&self.home_currency);
        }

        debug!(key = %item.key(), position, "item removed");

        Transition::changed(
            state,
            CartChange::ItemRemoved {
                item,
                position,
                previous_currency,
            },
        )
    }
}

impl Default for CartReducer {
    fn default() -> Self {
        Self::new(HOME_CURRENCY)
    }
}

fn undo(mut state: CartState, undo: CartUndo) -> Transition {
    match &undo {
        CartUndo::RemoveLine { key, currency } => {
            let Some(position) = state.position_by_key(key) else {
                return Transition::unchanged(state);
            };

            state.items.remove(position);

            if state.items.is_empty() {
                state.currency.clone_from(currency);
            }
        }
        CartUndo::RestoreQuantity { key, quantity } => {
            let Some(line) = state.items.iter_mut().find(|item| item.matches(key)) else {
                return Transition::unchanged(state);
            };

            line.quantity = (*quantity).max(1);
        }
        CartUndo::Reinsert {
            item,
            position,
            currency,
        } => {
            if let Some(line) = state
                .items
                .iter_mut()
                .find(|line| line.matches(&item.key()))
            {
                line.quantity = line.quantity.saturating_add(item.quantity.max(1));
            } else {
                let position = (*position).min(state.items.len());

                if state.items.is_empty() {
                    state.currency.clone_from(currency);
                }

                state.items.insert(position, item.clone());
            }
        }
    }

    debug!(?undo, "undo applied");

    Transition::changed(state, CartChange::Undone(undo))
}

fn add_item(mut state: CartState, mut item: LineItem) -> Transition {
    item.quantity = item.quantity.max(1);
    item.unit_price = clamp_price(item.unit_price);

    let key = item.key();
    let added = item.quantity;
    let previous_currency = state.currency.clone();

    if state.items.is_empty() {
        state.currency.clone_from(&item.currency);
    } else if item.currency != state.currency {
        warn!(
            item_currency = %item.currency,
            cart_currency = %state.currency,
            "adding item priced in a different currency; amounts are not converted"
        );
    }

    let existing = state.items.iter_mut().find(|line| line.matches(&key));

    let previous_quantity = if let Some(line) = existing {
        let previous = line.quantity;
        line.quantity = previous.saturating_add(added);

        Some(previous)
    } else {
        state.items.push(item);

        None
    };

    debug!(%key, added, ?previous_quantity, "item added");

    Transition::changed(
        state,
        CartChange::ItemAdded {
            key,
            previous_quantity,
            added,
            previous_currency,
        },
    )
}

fn update_quantity(mut state: CartState, id: &str, quantity: i64) -> Transition {
    let Some(line) = state.items.iter_mut().find(|item| item.id == id) else {
        debug!(id, "quantity update ignored; no such item");
        return Transition::unchanged(state);
    };

    let previous = line.quantity;
    let current = clamp_quantity(quantity);
    let key = line.key();

    line.quantity = current;

    debug!(%key, previous, current, "quantity updated");

    Transition::changed(
        state,
        CartChange::QuantityUpdated {
            key,
            previous,
            current,
        },
    )
}

fn update_item(mut state: CartState, id: &str, patch: &LineItemPatch) -> Transition {
    let Some(line) = state.items.iter_mut().find(|item| item.id == id) else {
        debug!(id, "item update ignored; no such item");
        return Transition::unchanged(state);
    };

    patch.apply_to(line);

    let key = line.key();

    debug!(%key, "item updated");

    Transition::changed(state, CartChange::ItemUpdated { key })
}

fn apply_discount(mut state: CartState, code: &str, amount: Decimal) -> Transition {
    let code = code.trim();

    if code.is_empty() {
        debug!("discount ignored; empty code");
        return Transition::unchanged(state);
    }

    let discount = AppliedDiscount {
        code: code.to_string(),
        amount: amount.max(Decimal::ZERO),
    };

    let replaced = current_discount(&state);

    state.discount_code = Some(discount.code.clone());
    state.discount_amount = Some(discount.amount);

    debug!(code = %discount.code, amount = %discount.amount, "discount applied");

    Transition::changed(state, CartChange::DiscountApplied { discount, replaced })
}

fn remove_discount(mut state: CartState) -> Transition {
    let Some(removed) = current_discount(&state) else {
        return Transition::unchanged(state);
    };

    state.discount_code = None;
    state.discount_amount = None;

    debug!(code = %removed.code, "discount removed");

    Transition::changed(state, CartChange::DiscountRemoved(removed))
}

fn current_discount(state: &CartState) -> Option<AppliedDiscount> {
    state.discount_code.as_ref().map(|code| AppliedDiscount {
        code: code.clone(),
        amount: state.discount_amount.unwrap_or(Decimal::ZERO),
    })
}
