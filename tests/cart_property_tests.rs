//! Property-based tests for cart transitions
//!
//! Random sequences of cart actions are replayed through the reducer and the
//! derived totals are checked against values recomputed from scratch after
//! every step.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use wanderkart::prelude::*;

// PROPERTY TEST STRATEGIES

/// Strategy to generate product ids from a small pool so that merges happen
fn id_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["h1", "f1", "t1", "x9"]).prop_map(str::to_string)
}

/// Strategy to generate item kinds
fn kind_strategy() -> impl Strategy<Value = ItemKind> {
    prop::sample::select(ItemKind::ALL.to_vec())
}

/// Strategy to generate prices with two decimal places, occasionally negative
fn price_strategy() -> impl Strategy<Value = Decimal> {
    (-1_000i64..=500_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate requested quantities, including invalid ones
fn quantity_strategy() -> impl Strategy<Value = i64> {
    -3i64..=12
}

/// Strategy to generate currencies, the home currency included
fn currency_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["TRY", "EUR", "GBP"])
}

/// Strategy to generate line items in any supported currency
fn item_strategy() -> impl Strategy<Value = LineItem> {
    (
        id_strategy(),
        kind_strategy(),
        price_strategy(),
        quantity_strategy(),
        currency_strategy(),
    )
        .prop_map(|(id, kind, price, quantity, currency)| {
            let title = format!("{kind} {id}");

            LineItem::new(id, kind, title, price, currency).with_quantity(quantity)
        })
}

/// Strategy to generate any cart action other than undo and replace
fn action_strategy() -> impl Strategy<Value = CartAction> {
    prop_oneof![
        4 => item_strategy().prop_map(CartAction::AddItem),
        2 => id_strategy().prop_map(|id| CartAction::RemoveItem { id }),
        2 => (id_strategy(), -5i64..=20)
            .prop_map(|(id, quantity)| CartAction::UpdateQuantity { id, quantity }),
        1 => (id_strategy(), price_strategy()).prop_map(|(id, price)| CartAction::UpdateItem {
            id,
            patch: LineItemPatch {
                unit_price: Some(price),
                ..LineItemPatch::default()
            },
        }),
        2 => (
            prop::sample::select(vec!["WELCOME10", "SUMMER15", ""]),
            (-500i64..=1_000_000).prop_map(|cents| Decimal::new(cents, 2)),
        )
            .prop_map(|(code, amount)| CartAction::ApplyDiscount {
                code: code.to_string(),
                amount,
            }),
        1 => Just(CartAction::RemoveDiscount),
        1 => Just(CartAction::Clear),
    ]
}

fn check_invariants(state: &CartState) -> Result<(), TestCaseError> {
    let expected_subtotal = state
        .items()
        .iter()
        .map(|item| item.unit_price * Decimal::from(item.quantity))
        .sum::<Decimal>();

    let expected_count: u64 = state.items().iter().map(|item| u64::from(item.quantity)).sum();

    prop_assert_eq!(state.subtotal(), expected_subtotal);
    prop_assert_eq!(state.item_count(), expected_count);

    let mut keys = FxHashSet::default();

    for item in state.items() {
        prop_assert!(item.quantity >= 1, "quantity below one: {}", item.quantity);
        prop_assert!(item.unit_price >= Decimal::ZERO);
        prop_assert!(keys.insert(item.key()), "duplicate line {}", item.key());
    }

    prop_assert_eq!(state.tax_amount(), expected_subtotal * Decimal::new(18, 2));

    let discount = state.discount_amount().unwrap_or(Decimal::ZERO);
    let expected_total = (expected_subtotal + state.tax_amount() - discount).max(Decimal::ZERO);

    prop_assert!(discount >= Decimal::ZERO);
    prop_assert_eq!(state.total_price(), expected_total);
    prop_assert_eq!(state.discount_code().is_some(), state.discount_amount().is_some());

    if state.is_empty() {
        prop_assert_eq!(state.currency(), HOME_CURRENCY);
    }

    Ok(())
}

proptest! {
    /// Derived totals always match a from-scratch recomputation
    #[test]
    fn totals_never_drift(actions in prop::collection::vec(action_strategy(), 0..40)) {
        let reducer = CartReducer::default();
        let mut state = reducer.initial_state();

        for action in actions {
            state = reducer.reduce(state, action).state;
            check_invariants(&state)?;
        }
    }

    /// Undoing an add or a removal gives back the exact prior state
    #[test]
    fn undo_reverses_adds_and_removals(
        setup in prop::collection::vec(action_strategy(), 0..20),
        action in prop_oneof![
            item_strategy().prop_map(CartAction::AddItem),
            id_strategy().prop_map(|id| CartAction::RemoveItem { id }),
        ],
    ) {
        let reducer = CartReducer::default();
        let before = setup
            .into_iter()
            .fold(reducer.initial_state(), |state, action| reducer.reduce(state, action).state);

        let transition = reducer.reduce(before.clone(), action);

        if let Some(undo) = transition.change.undo() {
            let undone = reducer.reduce(transition.state, CartAction::Undo(undo));

            prop_assert_eq!(undone.state, before);
        } else {
            prop_assert!(transition.change.is_unchanged());
            prop_assert_eq!(transition.state, before);
        }
    }

    /// Serialising and restoring any reachable state yields an equal state
    #[test]
    fn persisted_state_restores_equal(actions in prop::collection::vec(action_strategy(), 0..30)) {
        let mut store = CartStore::in_memory();

        for action in actions {
            store.dispatch(action);
        }

        let json = serde_json::to_string(store.state())
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        let restored: CartState = serde_json::from_str(&json)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;

        prop_assert_eq!(&restored, store.state());
    }
}
