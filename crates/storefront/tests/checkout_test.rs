mod common;

use common::{drain, eventually, full_shipping, product, Harness};
use rust_decimal::Decimal;
use xcart::checkout::{AddressSelection, CheckoutError, CheckoutOutcome, CheckoutPhase};
use xcart::error::StorefrontError;
use xcart::model::{
    Address, CurrencyCode, OrderStatus, PaymentStatus, Product, ShippingAddress,
};
use xcart::notify::NoticeLevel;
use xcart::payment::{ProviderStatus, ScriptedBehavior, ScriptedLookup};
use xcart::store::{save_json, CollectionName, CollectionStore, SnapshotKey};

fn manual() -> AddressSelection {
    AddressSelection::Manual(full_shipping())
}

fn messages(notices: &[xcart::notify::Notice]) -> Vec<&str> {
    notices.iter().map(|n| n.message.as_str()).collect()
}

#[tokio::test]
async fn test_order_is_recorded_before_the_widget_reports() {
    let h = Harness::signed_in(ScriptedBehavior::Hold).await;
    h.system.add_to_cart(product("1", 100)).await.unwrap();
    h.system.add_to_cart(product("1", 100)).await.unwrap();

    let ticket = h.system.place_order(manual()).await.unwrap();
    assert_eq!(h.system.checkout.phase(), CheckoutPhase::AwaitingPaymentWidget);

    let order = h.system.order(&ticket.order_id).await.unwrap().unwrap();
    assert_eq!(order.total_amount, Decimal::from(200));
    assert_eq!(order.amount, 20_000);
    assert_eq!(order.item_count(), 2);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].total, Decimal::from(200));
    assert_eq!(order.status, OrderStatus::Processing);
    assert_eq!(order.payment_status, None);
    assert_eq!(order.currency, CurrencyCode::Inr);
    assert_eq!(order.receipt, format!("receipt_{}", ticket.order_id));
    assert_eq!(order.shipping_address, full_shipping());

    let requests = h.gateway.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].amount_minor, 20_000);
    assert_eq!(requests[0].receipt, order.receipt);
    assert_eq!(requests[0].display_name, "XCart");
    assert_eq!(requests[0].prefill.name, "Asha Rao");
    assert_eq!(requests[0].prefill.email, "asha@example.com");
    assert_eq!(requests[0].prefill.contact, "9876543210");

    // Nothing settled yet: the cart is untouched
    assert_eq!(h.system.cart_lines().await.unwrap().len(), 1);

    for callback in h.gateway.take_pending() {
        callback.succeed("pay_held");
    }
    assert!(matches!(ticket.outcome().await, CheckoutOutcome::Confirmed { .. }));
}

#[tokio::test]
async fn test_successful_payment_completes_order_and_clears_cart() {
    let h = Harness::signed_in(ScriptedBehavior::Succeed).await;
    h.system.add_to_cart(product("1", 100)).await.unwrap();
    h.system.add_to_cart(product("2", 50)).await.unwrap();
    let mut notices = h.system.notifier.subscribe();

    let ticket = h.system.place_order(manual()).await.unwrap();
    let order_id = ticket.order_id.clone();
    let CheckoutOutcome::Confirmed { payment_id, .. } = ticket.outcome().await else {
        panic!("payment should have been confirmed");
    };
    assert!(payment_id.starts_with("pay_"));

    let order = h.system.order(&order_id).await.unwrap().unwrap();
    assert_eq!(order.payment_id.as_deref(), Some(payment_id.as_str()));
    assert_eq!(order.payment_status, Some(PaymentStatus::Completed));
    assert_eq!(order.status, OrderStatus::Processing);

    assert!(h.system.cart_lines().await.unwrap().is_empty());
    let remote = h.remote.snapshot(&"user_1".into(), CollectionName::Cart).await.unwrap();
    assert!(remote.documents.is_empty());

    assert_eq!(h.system.checkout.phase(), CheckoutPhase::PaymentSucceeded);
    let notices = drain(&mut notices);
    assert_eq!(messages(&notices), ["Payment successful"]);
    assert_eq!(notices[0].level, NoticeLevel::Success);
}

#[tokio::test]
async fn test_empty_cart_creates_no_order() {
    let h = Harness::signed_in(ScriptedBehavior::Succeed).await;

    let err = h.system.place_order(manual()).await.unwrap_err();
    assert_eq!(err, StorefrontError::Checkout(CheckoutError::EmptyCart));
    assert!(h.system.order_history().await.unwrap().is_empty());
    assert!(h.gateway.requests().is_empty());
    assert_eq!(h.system.checkout.phase(), CheckoutPhase::Idle);
}

#[tokio::test]
async fn test_overflowing_cart_total_is_refused() {
    let h = Harness::signed_in(ScriptedBehavior::Succeed).await;
    let big = Product::new("1", "Gold bar", Decimal::MAX);
    h.system.add_to_cart(big.clone()).await.unwrap();
    h.system.add_to_cart(big).await.unwrap();
    assert_eq!(h.system.cart_totals().await.unwrap().total_price, None);

    let err = h.system.place_order(manual()).await.unwrap_err();
    assert_eq!(err, StorefrontError::Checkout(CheckoutError::AmountOverflow));
    assert!(h.system.order_history().await.unwrap().is_empty());
    assert!(h.gateway.requests().is_empty());
    assert_eq!(h.system.cart_lines().await.unwrap().len(), 1);
    assert_eq!(h.system.checkout.phase(), CheckoutPhase::Idle);
}

#[tokio::test]
async fn test_incomplete_address_stops_before_the_widget() {
    let h = Harness::signed_in(ScriptedBehavior::Succeed).await;
    h.system.add_to_cart(product("1", 100)).await.unwrap();
    let mut notices = h.system.notifier.subscribe();

    let address = ShippingAddress {
        city: " ".to_string(),
        phone: String::new(),
        ..full_shipping()
    };
    let err = h
        .system
        .place_order(AddressSelection::Manual(address))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        StorefrontError::Checkout(CheckoutError::IncompleteAddress {
            missing: vec!["city".to_string(), "phone".to_string()],
        })
    );

    assert!(h.gateway.requests().is_empty());
    assert!(h.system.order_history().await.unwrap().is_empty());
    assert_eq!(h.system.cart_lines().await.unwrap().len(), 1);
    assert_eq!(h.system.checkout.phase(), CheckoutPhase::Idle);
    assert_eq!(messages(&drain(&mut notices)), ["Please fill in all address fields"]);
}

#[tokio::test]
async fn test_unavailable_widget_is_reported() {
    let h = Harness::signed_in(ScriptedBehavior::Unavailable).await;
    h.system.add_to_cart(product("1", 100)).await.unwrap();
    let mut notices = h.system.notifier.subscribe();

    let err = h.system.place_order(manual()).await.unwrap_err();
    assert!(matches!(
        err,
        StorefrontError::Checkout(CheckoutError::PaymentWidgetUnavailable(_))
    ));
    assert!(h.system.order_history().await.unwrap().is_empty());
    assert_eq!(
        messages(&drain(&mut notices)),
        ["Failed to load payment gateway. Please try again."]
    );
}

#[tokio::test]
async fn test_failed_payment_keeps_order_and_cart() {
    let h = Harness::signed_in(ScriptedBehavior::Fail("Card declined".to_string())).await;
    h.system.add_to_cart(product("1", 100)).await.unwrap();
    let mut notices = h.system.notifier.subscribe();

    let ticket = h.system.place_order(manual()).await.unwrap();
    let order_id = ticket.order_id.clone();
    assert_eq!(
        ticket.outcome().await,
        CheckoutOutcome::Failed {
            order_id: order_id.clone(),
            description: "Card declined".to_string(),
        }
    );

    let order = h.system.order(&order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Processing);
    assert_eq!(order.payment_status, None);
    assert_eq!(h.system.cart_lines().await.unwrap().len(), 1);
    assert_eq!(h.system.checkout.phase(), CheckoutPhase::PaymentFailed);

    let notices = drain(&mut notices);
    assert_eq!(messages(&notices), ["Payment failed: Card declined"]);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_dismissed_widget_changes_nothing() {
    let h = Harness::signed_in(ScriptedBehavior::Dismiss).await;
    h.system.add_to_cart(product("1", 100)).await.unwrap();
    let mut notices = h.system.notifier.subscribe();

    let ticket = h.system.place_order(manual()).await.unwrap();
    let order_id = ticket.order_id.clone();
    assert_eq!(ticket.outcome().await, CheckoutOutcome::Dismissed { order_id });

    assert_eq!(h.system.checkout.phase(), CheckoutPhase::PaymentDismissed);
    assert_eq!(h.system.cart_lines().await.unwrap().len(), 1);
    assert!(drain(&mut notices).is_empty());
}

#[tokio::test]
async fn test_dropped_callback_abandons_the_attempt() {
    let h = Harness::signed_in(ScriptedBehavior::Hold).await;
    h.system.add_to_cart(product("1", 100)).await.unwrap();

    let ticket = h.system.place_order(manual()).await.unwrap();
    let order_id = ticket.order_id.clone();
    drop(h.gateway.take_pending());

    assert_eq!(ticket.outcome().await, CheckoutOutcome::Abandoned { order_id });
    assert_eq!(h.system.checkout.phase(), CheckoutPhase::Idle);
}

#[tokio::test]
async fn test_saved_and_default_addresses_are_resolved() {
    let h = Harness::signed_in(ScriptedBehavior::Succeed).await;
    let work_shipping = ShippingAddress {
        street: "1 Residency Road".to_string(),
        ..full_shipping()
    };
    h.system
        .save_address(Address::new("Home", full_shipping()))
        .await
        .unwrap();
    let work = h
        .system
        .save_address(Address::new("Work", work_shipping.clone()))
        .await
        .unwrap();

    h.system.add_to_cart(product("1", 100)).await.unwrap();
    let ticket = h.system.place_order(AddressSelection::Saved(work.id)).await.unwrap();
    let order = h.system.order(&ticket.order_id).await.unwrap().unwrap();
    assert_eq!(order.shipping_address, work_shipping);
    ticket.outcome().await;

    h.system.add_to_cart(product("1", 100)).await.unwrap();
    let ticket = h.system.place_order(AddressSelection::Default).await.unwrap();
    let order = h.system.order(&ticket.order_id).await.unwrap().unwrap();
    assert_eq!(order.shipping_address, full_shipping());
    ticket.outcome().await;

    h.system.add_to_cart(product("1", 100)).await.unwrap();
    let err = h
        .system
        .place_order(AddressSelection::Saved("nope".to_string()))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        StorefrontError::Checkout(CheckoutError::AddressNotFound("nope".to_string()))
    );
}

#[tokio::test]
async fn test_default_falls_back_to_legacy_address() {
    let h = Harness::signed_in(ScriptedBehavior::Succeed).await;
    h.system.add_to_cart(product("1", 100)).await.unwrap();

    let err = h.system.place_order(AddressSelection::Default).await.unwrap_err();
    assert_eq!(
        err,
        StorefrontError::Checkout(CheckoutError::AddressNotFound("default".to_string()))
    );

    let key = SnapshotKey::LegacyAddress.for_user(&"user_1".into());
    save_json(h.local.as_ref(), &key, &full_shipping()).await.unwrap();

    let ticket = h.system.place_order(AddressSelection::Default).await.unwrap();
    let order = h.system.order(&ticket.order_id).await.unwrap().unwrap();
    assert_eq!(order.shipping_address, full_shipping());
}

#[tokio::test]
async fn test_manual_address_is_remembered() {
    let h = Harness::signed_in(ScriptedBehavior::Succeed).await;
    h.system.add_to_cart(product("1", 100)).await.unwrap();
    let ticket = h.system.place_order(manual()).await.unwrap();
    ticket.outcome().await;

    let key = SnapshotKey::LegacyAddress.for_user(&"user_1".into());
    let remembered: Option<ShippingAddress> =
        xcart::store::load_json(h.local.as_ref(), &key).await.unwrap();
    assert_eq!(remembered, Some(full_shipping()));
}

#[tokio::test]
async fn test_reconcile_settles_abandoned_orders() {
    let h = Harness::signed_in(ScriptedBehavior::Hold).await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        h.system.add_to_cart(product("1", 100)).await.unwrap();
        let ticket = h.system.place_order(manual()).await.unwrap();
        ids.push(ticket.order_id.clone());
        drop(h.gateway.take_pending());
        ticket.outcome().await;
    }

    let lookup = ScriptedLookup::new();
    lookup.insert(
        ids[0].clone(),
        ProviderStatus::Captured {
            payment_id: "pay_late".to_string(),
        },
    );
    lookup.insert(
        ids[1].clone(),
        ProviderStatus::Failed {
            reason: "expired".to_string(),
        },
    );

    let report = h.system.reconcile_payments(&lookup).await.unwrap();
    assert_eq!(report.completed, vec![ids[0].clone()]);
    assert_eq!(report.failed, vec![ids[1].clone()]);
    assert_eq!(report.pending, vec![ids[2].clone()]);

    let paid = h.system.order(&ids[0]).await.unwrap().unwrap();
    assert_eq!(paid.payment_id.as_deref(), Some("pay_late"));
    assert_eq!(paid.payment_status, Some(PaymentStatus::Completed));
    let failed = h.system.order(&ids[1]).await.unwrap().unwrap();
    assert_eq!(failed.payment_status, Some(PaymentStatus::Failed));

    // Reconciliation leaves the cart alone
    assert_eq!(h.system.cart_lines().await.unwrap().len(), 1);

    // A second pass only looks at what is still open
    let report = h.system.reconcile_payments(&lookup).await.unwrap();
    assert!(report.completed.is_empty());
    assert_eq!(report.failed, vec![ids[1].clone()]);
    assert_eq!(report.pending, vec![ids[2].clone()]);
}

#[tokio::test]
async fn test_phase_channel_reports_progress() {
    let h = Harness::signed_in(ScriptedBehavior::Hold).await;
    h.system.add_to_cart(product("1", 100)).await.unwrap();
    let phases = h.system.checkout.watch_phase();

    let ticket = h.system.place_order(manual()).await.unwrap();
    assert_eq!(*phases.borrow(), CheckoutPhase::AwaitingPaymentWidget);

    for callback in h.gateway.take_pending() {
        callback.fail("Bank timeout");
    }
    ticket.outcome().await;
    let checkout = h.system.checkout.clone();
    assert!(eventually(|| {
        let checkout = checkout.clone();
        async move { checkout.phase() == CheckoutPhase::PaymentFailed }
    })
    .await);
}
