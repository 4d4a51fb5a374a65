//! Fulfillment lifecycle scenarios: legal transitions, aggregate status
//! derivation, and vendor ownership checks.

use mekong_core::{FulfillmentStatus, OrderStatus};
use mekong_integration_tests::TestMarket;
use mekong_marketplace::MarketplaceError;
use mekong_marketplace::models::{Caller, Order};

use FulfillmentStatus as F;

/// Seed a two-vendor order and return it.
async fn two_vendor_order(market: &TestMarket) -> Order {
    let (customer, address) = market
        .seed_customer_with_address("Trần Thị Bình", "Hà Nội")
        .await;
    let (_, pho) = market
        .seed_vendor_with_product("Bếp Nhà Bình", "Phở bò", 50_000)
        .await;
    let (_, che) = market
        .seed_vendor_with_product("Chè Cô Ba", "Chè ba màu", 25_000)
        .await;
    market.add_to_cart(customer, pho, 1, &[]).await;
    market.add_to_cart(customer, che, 1, &[]).await;
    market.checkout(customer, address).await
}

async fn order_status(market: &TestMarket, order: &Order) -> OrderStatus {
    market
        .state
        .order_service()
        .get_order(order.id, Caller::Admin)
        .await
        .expect("get order")
        .status
}

#[tokio::test]
async fn test_happy_path_drives_aggregate_status() {
    let market = TestMarket::new();
    let order = two_vendor_order(&market).await;
    let service = market.state.order_service();

    let first = order.units.first().expect("unit A").clone();
    let second = order.units.get(1).expect("unit B").clone();

    // One vendor starts cooking: order is Preparing.
    service
        .update_unit_status(first.id, first.vendor_id, F::Cooking)
        .await
        .expect("to cooking");
    assert_eq!(order_status(&market, &order).await, OrderStatus::Preparing);

    // Food ready: Ready wins over the other unit still pending.
    service
        .update_unit_status(first.id, first.vendor_id, F::Ready)
        .await
        .expect("to ready");
    assert_eq!(order_status(&market, &order).await, OrderStatus::Ready);

    // Picked up: Delivering takes precedence.
    service
        .update_unit_status(first.id, first.vendor_id, F::PickedUp)
        .await
        .expect("to picked up");
    assert_eq!(order_status(&market, &order).await, OrderStatus::Delivering);

    // Delivered while the sibling is still pending: back to Confirmed.
    service
        .update_unit_status(first.id, first.vendor_id, F::Delivered)
        .await
        .expect("to delivered");
    assert_eq!(order_status(&market, &order).await, OrderStatus::Confirmed);

    // Drive the second unit all the way: order completes.
    for status in [F::Cooking, F::Ready, F::PickedUp, F::Delivered] {
        service
            .update_unit_status(second.id, second.vendor_id, status)
            .await
            .expect("advance");
    }
    assert_eq!(order_status(&market, &order).await, OrderStatus::Completed);
}

#[tokio::test]
async fn test_all_units_cancelled_cancels_order() {
    let market = TestMarket::new();
    let order = two_vendor_order(&market).await;
    let service = market.state.order_service();

    for unit in &order.units {
        service
            .update_unit_status(unit.id, unit.vendor_id, F::Cancelled)
            .await
            .expect("cancel");
    }
    assert_eq!(order_status(&market, &order).await, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_partial_cancellation_leaves_order_confirmed() {
    let market = TestMarket::new();
    let order = two_vendor_order(&market).await;
    let service = market.state.order_service();

    let first = order.units.first().expect("unit A");
    service
        .update_unit_status(first.id, first.vendor_id, F::Cancelled)
        .await
        .expect("cancel");
    assert_eq!(order_status(&market, &order).await, OrderStatus::Confirmed);
}

#[tokio::test]
async fn test_foreign_vendor_rejected_and_unit_unchanged() {
    let market = TestMarket::new();
    let order = two_vendor_order(&market).await;
    let service = market.state.order_service();

    let first = order.units.first().expect("unit A");
    let second = order.units.get(1).expect("unit B");

    let result = service
        .update_unit_status(first.id, second.vendor_id, F::Cooking)
        .await;
    assert!(matches!(result, Err(MarketplaceError::Permission(_))));

    let reloaded = service
        .get_order(order.id, Caller::Admin)
        .await
        .expect("get order");
    let unit = reloaded.units.first().expect("unit A");
    assert_eq!(unit.status, F::Pending);
    assert_eq!(reloaded.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_illegal_transitions_rejected() {
    let market = TestMarket::new();
    let order = two_vendor_order(&market).await;
    let service = market.state.order_service();

    let unit = order.units.first().expect("unit A");

    // Skipping ahead is rejected.
    let skip = service
        .update_unit_status(unit.id, unit.vendor_id, F::Delivered)
        .await;
    assert!(matches!(
        skip,
        Err(MarketplaceError::InvalidTransition { from: F::Pending, to: F::Delivered })
    ));

    // Terminal states stay terminal.
    service
        .update_unit_status(unit.id, unit.vendor_id, F::Cancelled)
        .await
        .expect("cancel");
    let revive = service
        .update_unit_status(unit.id, unit.vendor_id, F::Cooking)
        .await;
    assert!(matches!(
        revive,
        Err(MarketplaceError::InvalidTransition { from: F::Cancelled, to: F::Cooking })
    ));
}

#[tokio::test]
async fn test_unknown_unit_is_not_found() {
    let market = TestMarket::new();
    let order = two_vendor_order(&market).await;
    let service = market.state.order_service();

    let vendor_id = order.units.first().expect("unit").vendor_id;
    let result = service
        .update_unit_status(mekong_core::FulfillmentUnitId::new(9_999), vendor_id, F::Cooking)
        .await;
    assert!(matches!(result, Err(MarketplaceError::NotFound(_))));
}
