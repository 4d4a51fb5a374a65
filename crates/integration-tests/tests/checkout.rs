//! Checkout scenarios: cart splitting, numbering, pricing snapshots, and
//! the cart-clearing side effect.

use chrono::Utc;
use rust_decimal::Decimal;

use mekong_core::{FulfillmentStatus, OrderStatus, SelectedOption, decode_options};
use mekong_integration_tests::TestMarket;
use mekong_marketplace::MarketplaceError;
use mekong_marketplace::models::Caller;
use mekong_marketplace::services::CreateOrderRequest;

#[tokio::test]
async fn test_checkout_splits_cart_by_vendor_first_seen() {
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
    let (vendor_c, nem) = market
        .seed_vendor_with_product("Quán Nem 36", "Nem rán", 40_000)
        .await;

    // Interleave vendors so stable grouping is visible: A, B, A, C.
    let pho2 = market
        .store
        .seed_product(vendor_a, "Phở gà", Decimal::from(45_000), true)
        .await
        .id;
    market.add_to_cart(customer, pho, 1, &[]).await;
    market.add_to_cart(customer, che, 2, &[]).await;
    market.add_to_cart(customer, pho2, 1, &[]).await;
    market.add_to_cart(customer, nem, 1, &[]).await;

    let order = market.checkout(customer, address).await;

    assert_eq!(order.units.len(), 3);
    assert_eq!(order.status, OrderStatus::Pending);

    let unit_a = order.units.first().expect("unit A");
    assert_eq!(unit_a.vendor_id, vendor_a);
    assert_eq!(unit_a.unit_number, format!("{}-A", order.order_number));
    assert_eq!(unit_a.items.len(), 2);
    assert_eq!(unit_a.subtotal, Decimal::from(95_000));
    assert_eq!(unit_a.status, FulfillmentStatus::Pending);

    let unit_b = order.units.get(1).expect("unit B");
    assert_eq!(unit_b.vendor_id, vendor_b);
    assert_eq!(unit_b.unit_number, format!("{}-B", order.order_number));
    assert_eq!(unit_b.subtotal, Decimal::from(50_000));

    let unit_c = order.units.get(2).expect("unit C");
    assert_eq!(unit_c.vendor_id, vendor_c);
    assert_eq!(unit_c.unit_number, format!("{}-C", order.order_number));

    // Sum of unit subtotals equals the order total before shipping.
    let unit_sum: Decimal = order.units.iter().map(|unit| unit.subtotal).sum();
    assert_eq!(unit_sum, order.total_amount);
    assert_eq!(order.total_amount, Decimal::from(185_000));

    // Cart is drained afterwards.
    let cart = market
        .state
        .cart_service()
        .get_cart(customer)
        .await
        .expect("cart");
    assert!(cart.lines.is_empty());
}

#[tokio::test]
async fn test_order_numbers_are_dated_and_sequential() {
    let market = TestMarket::new();
    let (customer, address) = market
        .seed_customer_with_address("Trần Thị Bình", "Huế")
        .await;
    let (_, product) = market
        .seed_vendor_with_product("Bếp Nhà Bình", "Phở bò", 50_000)
        .await;

    market.add_to_cart(customer, product, 1, &[]).await;
    let first = market.checkout(customer, address).await;

    market.add_to_cart(customer, product, 1, &[]).await;
    let second = market.checkout(customer, address).await;

    let prefix = format!("ORD{}", Utc::now().format("%Y%m%d"));
    assert!(first.order_number.starts_with(&prefix));
    assert!(first.order_number.ends_with("00001"));
    assert!(second.order_number.ends_with("00002"));
    assert_ne!(first.order_number, second.order_number);
}

#[tokio::test]
async fn test_empty_cart_rejected() {
    let market = TestMarket::new();
    let (customer, address) = market
        .seed_customer_with_address("Trần Thị Bình", "Hà Nội")
        .await;

    let result = market
        .state
        .order_service()
        .create_order(
            customer,
            CreateOrderRequest {
                address_id: address,
                payment_method: "COD".to_string(),
                notes: None,
            },
        )
        .await;

    assert!(matches!(result, Err(MarketplaceError::EmptyCart)));
}

#[tokio::test]
async fn test_foreign_address_rejected_without_mutation() {
    let market = TestMarket::new();
    let (customer, _) = market
        .seed_customer_with_address("Trần Thị Bình", "Hà Nội")
        .await;
    let (_, foreign_address) = market
        .seed_customer_with_address("Lê Văn Cường", "Huế")
        .await;
    let (_, product) = market
        .seed_vendor_with_product("Bếp Nhà Bình", "Phở bò", 50_000)
        .await;

    market.add_to_cart(customer, product, 1, &[]).await;

    let result = market
        .state
        .order_service()
        .create_order(
            customer,
            CreateOrderRequest {
                address_id: foreign_address,
                payment_method: "COD".to_string(),
                notes: None,
            },
        )
        .await;
    assert!(matches!(result, Err(MarketplaceError::Permission(_))));

    // Nothing happened: no order, cart untouched.
    let orders = market
        .state
        .order_service()
        .list_orders(Caller::Customer(customer))
        .await
        .expect("list");
    assert!(orders.is_empty());

    let cart = market
        .state
        .cart_service()
        .get_cart(customer)
        .await
        .expect("cart");
    assert_eq!(cart.lines.len(), 1);
}

#[tokio::test]
async fn test_shipping_fee_buckets_applied_at_checkout() {
    let market = TestMarket::new();
    let (customer, hanoi) = market
        .seed_customer_with_address("Trần Thị Bình", "Hà Nội")
        .await;
    let (_, product) = market
        .seed_vendor_with_product("Bếp Nhà Bình", "Phở bò", 50_000)
        .await;

    // Below the free-shipping threshold in a major city: 30 000.
    market.add_to_cart(customer, product, 1, &[]).await;
    let city_order = market.checkout(customer, hanoi).await;
    assert_eq!(city_order.shipping_fee, Decimal::from(30_000));

    // At or above 100 000 the fee drops to zero regardless of city.
    market.add_to_cart(customer, product, 2, &[]).await;
    let free_order = market.checkout(customer, hanoi).await;
    assert_eq!(free_order.total_amount, Decimal::from(100_000));
    assert_eq!(free_order.shipping_fee, Decimal::ZERO);
}

#[tokio::test]
async fn test_options_snapshot_rides_from_cart_to_order() {
    let market = TestMarket::new();
    let (customer, address) = market
        .seed_customer_with_address("Trần Thị Bình", "Hà Nội")
        .await;
    let (_, product) = market
        .seed_vendor_with_product("Bếp Nhà Bình", "Phở bò", 50_000)
        .await;

    let options = vec![
        SelectedOption {
            group: "Size".to_string(),
            option_name: "Lớn".to_string(),
            price_adjustment: Decimal::from(10_000),
        },
        SelectedOption {
            group: "Thêm".to_string(),
            option_name: "Quẩy".to_string(),
            price_adjustment: Decimal::from(5_000),
        },
    ];
    market.add_to_cart(customer, product, 2, &options).await;

    let order = market.checkout(customer, address).await;
    let unit = order.units.first().expect("unit");
    let item = unit.items.first().expect("item");

    // Price snapshot includes the option adjustments.
    assert_eq!(item.price, Decimal::from(65_000));
    assert_eq!(item.quantity, 2);
    assert_eq!(unit.subtotal, Decimal::from(130_000));

    // The stored blob round-trips to the options chosen at add time.
    let stored = decode_options(&item.selected_options_json).expect("decode");
    assert_eq!(stored, options);
}

#[tokio::test]
async fn test_more_than_26_vendors_get_unbounded_suffixes() {
    let market = TestMarket::new();
    let (customer, address) = market
        .seed_customer_with_address("Trần Thị Bình", "Hà Nội")
        .await;

    for i in 0..28 {
        let (_, product) = market
            .seed_vendor_with_product(&format!("Quán {i}"), &format!("Món {i}"), 10_000)
            .await;
        market.add_to_cart(customer, product, 1, &[]).await;
    }

    let order = market.checkout(customer, address).await;
    assert_eq!(order.units.len(), 28);

    let suffix_of = |index: usize| {
        order
            .units
            .get(index)
            .map(|unit| unit.unit_number.rsplit('-').next().unwrap_or_default().to_string())
            .expect("unit")
    };
    assert_eq!(suffix_of(0), "A");
    assert_eq!(suffix_of(25), "Z");
    assert_eq!(suffix_of(26), "AA");
    assert_eq!(suffix_of(27), "AB");

    // Every suffix is unique.
    let mut suffixes: Vec<String> = (0..28).map(suffix_of).collect();
    suffixes.sort();
    suffixes.dedup();
    assert_eq!(suffixes.len(), 28);
}

#[tokio::test]
async fn test_delivery_snapshot_frozen_on_order() {
    let market = TestMarket::new();
    let (customer, address) = market
        .seed_customer_with_address("Trần Thị Bình", "Hà Nội")
        .await;
    let (_, product) = market
        .seed_vendor_with_product("Bếp Nhà Bình", "Phở bò", 50_000)
        .await;

    market.add_to_cart(customer, product, 1, &[]).await;
    let order = market.checkout(customer, address).await;

    assert_eq!(order.delivery.recipient_name, "Trần Thị Bình");
    assert_eq!(
        order.delivery.address,
        "12 Lý Thường Kiệt, Phường Trần Hưng Đạo, Hoàn Kiếm, Hà Nội"
    );
    assert_eq!(order.payment_method, "COD");
}
