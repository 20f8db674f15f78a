mod common;

use chrono::Utc;
use common::{full_shipping, init_tracing};
use rust_decimal::Decimal;
use std::sync::Arc;
use xcart::clients::OrderClient;
use xcart::model::{
    CurrencyCode, Order, OrderId, OrderItem, OrderStatus, PaymentStatus, ProductId, UserId,
};
use xcart::order_actor::{self, OrderError};
use xcart::store::{
    load_json, FileSnapshotStore, MemorySnapshotStore, SnapshotKey, SnapshotStore,
};

fn spawn_ledger(store: Arc<dyn SnapshotStore>) -> OrderClient {
    let (actor, client) = order_actor::new(16);
    tokio::spawn(actor.run(store));
    client
}

async fn open_ledger() -> (OrderClient, Arc<MemorySnapshotStore>, UserId) {
    init_tracing();
    let store = Arc::new(MemorySnapshotStore::new());
    let ledger = spawn_ledger(store.clone());
    let owner = UserId::from("user_1");
    ledger.open(owner.clone()).await.unwrap();
    (ledger, store, owner)
}

fn order(id: &str) -> Order {
    let item = OrderItem {
        product_id: ProductId::from("1"),
        name: "Masala Chai".to_string(),
        price: Decimal::from(100),
        quantity: 2,
        total: Decimal::from(200),
    };
    let id = OrderId::from(id);
    Order {
        receipt: id.receipt(),
        id,
        created_at: Utc::now(),
        items: vec![item],
        total_amount: Decimal::from(200),
        amount: 20_000,
        currency: CurrencyCode::Inr,
        shipping_address: full_shipping(),
        status: OrderStatus::Processing,
        payment_id: None,
        payment_status: None,
    }
}

#[tokio::test]
async fn test_append_keeps_order_and_rejects_duplicates() {
    let (ledger, _store, owner) = open_ledger().await;

    ledger.append(owner.clone(), order("order_1")).await.unwrap();
    ledger.append(owner.clone(), order("order_2")).await.unwrap();
    let err = ledger.append(owner.clone(), order("order_1")).await.unwrap_err();
    assert_eq!(err, OrderError::DuplicateOrder("order_1".to_string()));

    let ids: Vec<_> = ledger
        .orders(owner)
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.id.0)
        .collect();
    assert_eq!(ids, ["order_1", "order_2"]);
}

#[tokio::test]
async fn test_update_payment_records_outcome() {
    let (ledger, _store, owner) = open_ledger().await;
    let id = OrderId::from("order_1");
    ledger.append(owner.clone(), order("order_1")).await.unwrap();

    let found = ledger
        .update_payment(
            owner.clone(),
            id.clone(),
            Some("pay_1".to_string()),
            PaymentStatus::Completed,
        )
        .await
        .unwrap();
    assert!(found);

    let paid = ledger.order(owner.clone(), &id).await.unwrap().unwrap();
    assert_eq!(paid.payment_id.as_deref(), Some("pay_1"));
    assert_eq!(paid.payment_status, Some(PaymentStatus::Completed));
    assert_eq!(paid.status, OrderStatus::Processing);
    assert!(!paid.awaiting_payment());

    // A later update without an id keeps the recorded one
    ledger
        .update_payment(owner.clone(), id.clone(), None, PaymentStatus::Failed)
        .await
        .unwrap();
    let updated = ledger.order(owner, &id).await.unwrap().unwrap();
    assert_eq!(updated.payment_id.as_deref(), Some("pay_1"));
    assert_eq!(updated.payment_status, Some(PaymentStatus::Failed));
}

#[tokio::test]
async fn test_update_payment_for_unknown_order_changes_nothing() {
    let (ledger, store, owner) = open_ledger().await;
    ledger.append(owner.clone(), order("order_1")).await.unwrap();
    let key = SnapshotKey::Orders.for_user(&owner);
    let before = store.get(&key).await.unwrap();

    let found = ledger
        .update_payment(
            owner.clone(),
            OrderId::from("order_9"),
            Some("pay_9".to_string()),
            PaymentStatus::Completed,
        )
        .await
        .unwrap();
    assert!(!found);
    assert_eq!(store.get(&key).await.unwrap(), before);
}

#[tokio::test]
async fn test_advance_follows_fulfillment_transitions() {
    let (ledger, _store, owner) = open_ledger().await;
    let id = OrderId::from("order_1");
    ledger.append(owner.clone(), order("order_1")).await.unwrap();

    let err = ledger
        .advance(owner.clone(), id.clone(), OrderStatus::Delivered)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        OrderError::InvalidTransition {
            from: OrderStatus::Processing,
            to: OrderStatus::Delivered,
        }
    );

    let shipped = ledger.advance(owner.clone(), id.clone(), OrderStatus::Shipped).await.unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);
    let delivered = ledger
        .advance(owner.clone(), id.clone(), OrderStatus::Delivered)
        .await
        .unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);
    assert!(ledger.advance(owner.clone(), id, OrderStatus::Cancelled).await.is_err());

    let err = ledger
        .advance(owner, OrderId::from("order_9"), OrderStatus::Shipped)
        .await
        .unwrap_err();
    assert_eq!(err, OrderError::OrderNotFound("order_9".to_string()));
}

#[tokio::test]
async fn test_history_survives_a_restart() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let owner = UserId::from("user_1");

    let ledger = spawn_ledger(Arc::new(FileSnapshotStore::new(dir.path())));
    ledger.open(owner.clone()).await.unwrap();
    ledger.append(owner.clone(), order("order_1")).await.unwrap();
    ledger.close(owner.clone()).await.unwrap();

    let store = Arc::new(FileSnapshotStore::new(dir.path()));
    let stored: Vec<Order> = load_json(store.as_ref(), &SnapshotKey::Orders.for_user(&owner))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.len(), 1);

    let restarted = spawn_ledger(store);
    restarted.open(owner.clone()).await.unwrap();
    let orders = restarted.orders(owner).await.unwrap();
    assert_eq!(orders, stored);
}

#[tokio::test]
async fn test_corrupt_history_survives_the_next_append() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let owner = UserId::from("user_1");
    let store = Arc::new(FileSnapshotStore::new(dir.path()));
    let key = SnapshotKey::Orders.for_user(&owner);
    let raw = r#"[{"id":"order_1","status":"completed"}]"#;
    store.set(&key, raw.to_string()).await.unwrap();

    let ledger = spawn_ledger(store.clone());
    ledger.open(owner.clone()).await.unwrap();
    assert!(ledger.orders(owner.clone()).await.unwrap().is_empty());

    ledger.append(owner.clone(), order("order_2")).await.unwrap();
    let backup = store.get(&format!("{key}.corrupt")).await.unwrap();
    assert_eq!(backup.as_deref(), Some(raw));

    let stored: Vec<Order> = load_json(store.as_ref(), &key).await.unwrap().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, OrderId::from("order_2"));
}

#[tokio::test]
async fn test_failed_write_leaves_ledger_unchanged() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let owner = UserId::from("user_1");
    let ledger = spawn_ledger(Arc::new(FileSnapshotStore::new(dir.path())));
    ledger.open(owner.clone()).await.unwrap();

    // A plain file where the user's directory should go
    std::fs::write(dir.path().join("user_1"), "in the way").unwrap();

    let err = ledger.append(owner.clone(), order("order_1")).await.unwrap_err();
    assert!(matches!(err, OrderError::Persistence(_)));
    assert!(ledger.orders(owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reload_picks_up_external_writes() {
    let (ledger, store, owner) = open_ledger().await;
    let other = spawn_ledger(store.clone());
    other.open(owner.clone()).await.unwrap();
    other.append(owner.clone(), order("order_1")).await.unwrap();

    assert!(ledger.orders(owner.clone()).await.unwrap().is_empty());
    let reloaded = ledger.reload(owner).await.unwrap();
    assert_eq!(reloaded.orders.len(), 1);
}

#[tokio::test]
async fn test_ledger_must_be_open() {
    init_tracing();
    let ledger = spawn_ledger(Arc::new(MemorySnapshotStore::new()));
    let err = ledger.orders(UserId::from("ghost")).await.unwrap_err();
    assert_eq!(err, OrderError::NotOpen("ghost".to_string()));
}
