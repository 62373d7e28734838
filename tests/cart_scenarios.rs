//! Integration tests for the cart store.
//!
//! Walks a shopper through a typical session in Turkish lira:
//!
//! 1. Add a city tour at 150 TRY
//!    - Subtotal 150, tax 27 (18%), total 177
//!
//! 2. Apply WELCOME10 (10% of the subtotal at that moment, 15 TRY)
//!    - Total 150 + 27 - 15 = 162
//!
//! 3. Raise the tour to three tickets
//!    - Subtotal 450, tax 81
//!    - The discount stays at 15, so the total is 450 + 81 - 15 = 516

use rust_decimal::Decimal;
use testresult::TestResult;

use wanderkart::prelude::*;

fn tour() -> LineItem {
    LineItem::new("t1", ItemKind::Tour, "Bosphorus Cruise", Decimal::new(150, 0), "TRY")
}

fn hotel(quantity: i64) -> LineItem {
    LineItem::new("h1", ItemKind::Hotel, "Galata Suites", Decimal::new(100, 0), "TRY")
        .with_quantity(quantity)
}

#[test]
fn tour_session_in_lira() -> TestResult {
    let mut store = CartStore::in_memory();

    store.add_item(tour());

    let totals = *store.state().totals();

    assert_eq!(totals.total_item_count, 1);
    assert_eq!(totals.subtotal, Decimal::new(150, 0));
    assert_eq!(totals.tax_amount, Decimal::new(27, 0));
    assert_eq!(totals.grand_total, Decimal::new(177, 0));

    store.apply_discount("WELCOME10", Decimal::new(15, 0));

    assert_eq!(store.total_price(), Decimal::new(162, 0));

    store.update_quantity("t1", 3);

    assert_eq!(store.state().subtotal(), Decimal::new(450, 0));
    assert_eq!(store.state().tax_amount(), Decimal::new(81, 0));
    assert_eq!(store.total_price(), Decimal::new(516, 0));
    assert_eq!(store.state().discount_amount(), Some(Decimal::new(15, 0)));

    Ok(())
}

#[test]
fn duplicate_add_merges_into_one_line() -> TestResult {
    let mut store = CartStore::in_memory();

    store.add_item(hotel(2));
    store.add_item(hotel(2));

    assert_eq!(store.state().len(), 1);
    assert_eq!(store.state().items().first().ok_or("missing line")?.quantity, 4);
    assert_eq!(store.item_count(), 4);

    Ok(())
}

#[test]
fn quantity_never_drops_below_one() -> TestResult {
    let mut store = CartStore::in_memory();

    store.add_item(hotel(2));
    store.update_quantity("h1", 0);

    assert!(store.is_in_cart("h1"));
    assert_eq!(store.state().items().first().ok_or("missing line")?.quantity, 1);

    store.update_quantity("h1", -5);

    assert_eq!(store.item_count(), 1);

    Ok(())
}

#[test]
fn tax_is_eighteen_percent_whatever_the_discount() {
    let mut store = CartStore::in_memory();

    store.add_item(hotel(10));

    assert_eq!(store.state().tax_amount(), Decimal::new(180, 0));

    store.apply_discount("BIG", Decimal::new(500, 0));

    assert_eq!(store.state().tax_amount(), Decimal::new(180, 0));
}

#[test]
fn oversized_discount_floors_total_at_zero() {
    let mut store = CartStore::in_memory();

    store.add_item(tour());
    store.apply_discount("JACKPOT", Decimal::new(10_000, 0));

    assert_eq!(store.total_price(), Decimal::ZERO);
}

#[test]
fn discounts_replace_rather_than_stack() {
    let mut store = CartStore::in_memory();

    store.add_item(hotel(10));
    store.apply_discount("A", Decimal::new(50, 0));
    store.apply_discount("B", Decimal::new(30, 0));

    assert_eq!(store.state().discount_code(), Some("B"));
    assert_eq!(store.state().discount_amount(), Some(Decimal::new(30, 0)));
    assert_eq!(store.total_price(), Decimal::new(1150, 0));
}

#[test]
fn clear_resets_everything() {
    let mut store = CartStore::in_memory();

    store.add_item(tour());
    store.add_item(hotel(1));
    store.apply_discount("A", Decimal::new(5, 0));
    store.clear_cart();

    assert!(store.state().is_empty());
    assert_eq!(store.state().discount_code(), None);
    assert_eq!(store.total_price(), Decimal::ZERO);
    assert_eq!(store.item_count(), 0);
}

#[test]
fn state_round_trips_through_json() -> TestResult {
    let mut store = CartStore::in_memory();

    store.add_item(tour().with_image("https://img.example/cruise.jpg"));
    store.add_item(hotel(2).with_booking_details(BookingDetails {
        check_in: Some("2026-06-01".to_string()),
        check_out: Some("2026-06-04".to_string()),
        guests: Some(2),
        rooms: Some(1),
        ..BookingDetails::default()
    }));
    store.apply_discount("WELCOME10", Decimal::new(35, 0));

    let json = serde_json::to_string(store.state())?;
    let restored: CartState = serde_json::from_str(&json)?;

    assert_eq!(&restored, store.state());
    assert_eq!(restored.clone().recalculated(), restored);

    Ok(())
}

#[test]
fn removing_unknown_id_changes_nothing() {
    let mut store = CartStore::in_memory();

    store.add_item(tour());

    let before = store.state().clone();
    let change = store.remove_item("nonexistent");

    assert!(change.is_unchanged());
    assert_eq!(store.state(), &before);
}

#[test]
fn file_backed_cart_survives_restart() -> TestResult {
    let dir = tempfile::tempdir()?;

    {
        let mut store = CartStore::open(
            CartPersistence::new(FileStorage::new(dir.path())),
            NoopNotifier,
            CartReducer::default(),
        );

        store.add_item(tour());
        store.apply_discount("WELCOME10", Decimal::new(15, 0));
    }

    let store = CartStore::open(
        CartPersistence::new(FileStorage::new(dir.path())),
        NoopNotifier,
        CartReducer::default(),
    );

    assert!(store.is_in_cart("t1"));
    assert_eq!(store.total_price(), Decimal::new(162, 0));

    Ok(())
}

#[test]
fn corrupt_storage_starts_an_empty_cart() -> TestResult {
    let mut storage = MemoryStorage::new();
    storage.save("wanderkart.cart", "[1, 2,")?;

    let store = CartStore::open(
        CartPersistence::new(storage),
        NoopNotifier,
        CartReducer::new("EUR"),
    );

    assert!(store.state().is_empty());
    assert_eq!(store.state().currency(), "EUR");

    Ok(())
}

#[test]
fn cart_works_without_a_notifier() {
    let mut store = CartStore::open(
        CartPersistence::new(MemoryStorage::new()),
        None::<NotificationQueue>,
        CartReducer::default(),
    );

    store.add_item(tour());
    store.remove_item("t1");

    assert_eq!(store.item_count(), 0);
}

#[test]
fn undo_from_notifications_restores_prior_states() -> TestResult {
    let mut store = CartStore::open(
        CartPersistence::new(MemoryStorage::new()),
        NotificationQueue::new(),
        CartReducer::default(),
    );

    store.add_item(hotel(2));
    let after_first_add = store.state().clone();

    store.add_item(hotel(3));
    store.add_item(tour());
    store.remove_item("h1");

    let mut notifications = store.notifier_mut().drain();

    while let Some(notification) = notifications.pop() {
        if notification.title == "Added to cart" && notifications.is_empty() {
            break;
        }

        store.undo(notification.undo.ok_or("expected undo")?);
    }

    assert_eq!(store.state(), &after_first_add);

    Ok(())
}

#[test]
fn undoing_a_foreign_first_item_restores_a_discounted_empty_cart() -> TestResult {
    let mut store = CartStore::in_memory();

    store.apply_discount("WELCOME10", Decimal::new(10, 0));
    let before = store.state().clone();

    let flight = LineItem::new("f1", ItemKind::Flight, "IST-CDG", Decimal::new(200, 0), "EUR");
    let change = store.add_item(flight);

    assert_eq!(store.state().currency(), "EUR");

    store.undo(change.undo().ok_or("expected undo")?);

    assert_eq!(store.state(), &before);
    assert_eq!(store.state().currency(), "TRY");

    Ok(())
}

#[test]
fn re_adding_after_emptying_undoes_to_a_lira_cart() -> TestResult {
    let mut store = CartStore::in_memory();
    let flight = || LineItem::new("f1", ItemKind::Flight, "IST-CDG", Decimal::new(200, 0), "EUR");

    store.add_item(flight());
    store.remove_item("f1");

    assert_eq!(store.state().currency(), "TRY");

    let before = store.state().clone();
    let change = store.add_item(flight());

    store.undo(change.undo().ok_or("expected undo")?);

    assert_eq!(store.state(), &before);

    Ok(())
}
