//! Notification fanout scenarios: topic naming, payload contents, send
//! ordering, and per-recipient failure isolation.

use std::sync::Arc;

use mekong_core::FulfillmentStatus;
use mekong_integration_tests::{RecordingNotifier, TestMarket};
use mekong_marketplace::notify::{customer_topic, vendor_topic};

#[tokio::test]
async fn test_each_vendor_receives_its_unit_announcement() {
    let market = TestMarket::new();
    let (customer, address) = market
        .seed_customer_with_address("Trần Thị Bình", "Hà Nội")
        .await;
    let (vendor_a, pho) = market
        .seed_vendor_with_product("Bếp Nhà Bình", "Phở bò", 50_000)
        .await;
    let (vendor_b, che) = market
        .seed_vendor_with_product("Chè Cô Ba", "Chè ba màu", 25_000)
        .await;

    let mut inbox_a = market.broker.subscribe(&vendor_topic(vendor_a)).await;
    let mut inbox_b = market.broker.subscribe(&vendor_topic(vendor_b)).await;

    market.add_to_cart(customer, pho, 2, &[]).await;
    market.add_to_cart(customer, che, 1, &[]).await;
    let order = market.checkout(customer, address).await;

    let event_a = inbox_a.recv().await.expect("vendor A event");
    assert_eq!(event_a["orderNumber"], order.order_number.as_str());
    assert_eq!(
        event_a["unitNumber"],
        format!("{}-A", order.order_number).as_str()
    );
    assert_eq!(event_a["itemCount"], 1);
    assert_eq!(event_a["customerName"], "Trần Thị Bình");
    assert_eq!(
        event_a["deliveryAddress"],
        "12 Lý Thường Kiệt, Phường Trần Hưng Đạo, Hoàn Kiếm, Hà Nội"
    );
    assert_eq!(event_a["message"], "Bạn có đơn hàng mới!");

    let event_b = inbox_b.recv().await.expect("vendor B event");
    assert_eq!(
        event_b["unitNumber"],
        format!("{}-B", order.order_number).as_str()
    );

    // Each vendor saw exactly one event.
    assert!(inbox_a.try_recv().is_err());
    assert!(inbox_b.try_recv().is_err());
}

#[tokio::test]
async fn test_customer_notified_on_status_change() {
    let market = TestMarket::new();
    let (customer, address) = market
        .seed_customer_with_address("Trần Thị Bình", "Hà Nội")
        .await;
    let (_, pho) = market
        .seed_vendor_with_product("Bếp Nhà Bình", "Phở bò", 50_000)
        .await;

    market.add_to_cart(customer, pho, 1, &[]).await;
    let order = market.checkout(customer, address).await;
    let unit = order.units.first().expect("unit");

    let mut inbox = market.broker.subscribe(&customer_topic(customer)).await;

    market
        .state
        .order_service()
        .update_unit_status(unit.id, unit.vendor_id, FulfillmentStatus::Cooking)
        .await
        .expect("update status");

    let event = inbox.recv().await.expect("customer event");
    assert_eq!(event["orderNumber"], order.order_number.as_str());
    assert_eq!(event["unitNumber"], unit.unit_number.as_str());
    assert_eq!(event["vendorName"], "Bếp Nhà Bình");
    assert_eq!(event["oldStatus"], "PENDING");
    assert_eq!(event["newStatus"], "COOKING");
    assert_eq!(
        event["message"],
        "Bếp đang nấu! Đơn hàng sẽ được giao trong giây lát"
    );
}

#[tokio::test]
async fn test_vendor_fanout_follows_unit_order() {
    let notifier = Arc::new(RecordingNotifier::new());
    let (market, store) = TestMarket::with_notifier(notifier.clone());

    let (customer, address) = market
        .seed_customer_with_address("Trần Thị Bình", "Hà Nội")
        .await;
    let mut vendor_ids = Vec::new();
    for i in 0..3 {
        let vendor = store.seed_vendor(&format!("Quán {i}")).await;
        let product = store
            .seed_product(vendor.id, &format!("Món {i}"), rust_decimal::Decimal::from(10_000), true)
            .await;
        market.add_to_cart(customer, product.id, 1, &[]).await;
        vendor_ids.push(vendor.id);
    }

    market.checkout(customer, address).await;

    let delivered = notifier.delivered().await;
    let topics: Vec<String> = delivered.into_iter().map(|(topic, _)| topic).collect();
    let expected: Vec<String> = vendor_ids.iter().map(|id| vendor_topic(*id)).collect();
    assert_eq!(topics, expected);
}

#[tokio::test]
async fn test_one_failing_vendor_does_not_block_the_rest() {
    let notifier = Arc::new(RecordingNotifier::new());
    let (market, store) = TestMarket::with_notifier(notifier.clone());

    let (customer, address) = market
        .seed_customer_with_address("Trần Thị Bình", "Hà Nội")
        .await;

    let mut vendor_ids = Vec::new();
    for i in 0..3 {
        let vendor = store.seed_vendor(&format!("Quán {i}")).await;
        let product = store
            .seed_product(vendor.id, &format!("Món {i}"), rust_decimal::Decimal::from(10_000), true)
            .await;
        market.add_to_cart(customer, product.id, 1, &[]).await;
        vendor_ids.push(vendor.id);
    }

    // The middle vendor's channel is down.
    let middle = *vendor_ids.get(1).expect("vendor 1");
    notifier.fail_topic(vendor_topic(middle)).await;

    // Order creation still succeeds with that vendor unreachable.
    let order = market.checkout(customer, address).await;
    assert_eq!(order.units.len(), 3);

    let delivered = notifier.delivered().await;
    let topics: Vec<String> = delivered.into_iter().map(|(topic, _)| topic).collect();
    assert_eq!(
        topics,
        vec![
            vendor_topic(*vendor_ids.first().expect("vendor 0")),
            vendor_topic(*vendor_ids.get(2).expect("vendor 2")),
        ]
    );
}

#[tokio::test]
async fn test_unsubscribed_recipient_misses_events() {
    let market = TestMarket::new();
    let (customer, address) = market
        .seed_customer_with_address("Trần Thị Bình", "Hà Nội")
        .await;
    let (vendor, pho) = market
        .seed_vendor_with_product("Bếp Nhà Bình", "Phở bò", 50_000)
        .await;

    market.add_to_cart(customer, pho, 1, &[]).await;
    // Nobody is listening; checkout must still succeed.
    let order = market.checkout(customer, address).await;
    assert_eq!(order.units.len(), 1);

    // Subscribing after the fact yields nothing: at-most-once, no replay.
    let mut inbox = market.broker.subscribe(&vendor_topic(vendor)).await;
    assert!(inbox.try_recv().is_err());
}
