#![allow(dead_code)]

use rust_decimal::Decimal;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use xcart::config::StorefrontConfig;
use xcart::lifecycle::StorefrontSystem;
use xcart::model::{Identity, Product, ShippingAddress};
use xcart::notify::Notice;
use xcart::payment::{ScriptedBehavior, ScriptedGateway};
use xcart::store::{MemoryCollectionStore, MemorySnapshotStore};
use tokio::sync::broadcast;

/// Logs go to the test harness's captured output. Set `RUST_LOG=debug` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn product(id: &str, price: i64) -> Product {
    Product::new(id, format!("Product {id}"), Decimal::from(price))
}

pub fn full_shipping() -> ShippingAddress {
    ShippingAddress {
        full_name: "Asha Rao".to_string(),
        street: "12 MG Road".to_string(),
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        zip_code: "560001".to_string(),
        phone: "9876543210".to_string(),
    }
}

pub fn shopper() -> Identity {
    Identity::new("user_1")
        .with_display_name("Asha")
        .with_email("asha@example.com")
}

/// A full storefront over in-memory stores and a scripted widget.
pub struct Harness {
    pub system: StorefrontSystem,
    pub remote: Arc<MemoryCollectionStore>,
    pub local: Arc<MemorySnapshotStore>,
    pub gateway: Arc<ScriptedGateway>,
}

impl Harness {
    pub fn start(behavior: ScriptedBehavior) -> Self {
        init_tracing();
        let remote = Arc::new(MemoryCollectionStore::new());
        let local = Arc::new(MemorySnapshotStore::new());
        let gateway = Arc::new(ScriptedGateway::new(behavior));
        let system = StorefrontSystem::new(
            StorefrontConfig::default(),
            remote.clone(),
            local.clone(),
            gateway.clone(),
        );
        Self {
            system,
            remote,
            local,
            gateway,
        }
    }

    pub async fn signed_in(behavior: ScriptedBehavior) -> Self {
        let harness = Self::start(behavior);
        harness
            .system
            .sign_in(shopper())
            .await
            .expect("sign in failed");
        harness
    }
}

/// Every notice already published on `feed`.
pub fn drain(feed: &mut broadcast::Receiver<Notice>) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Ok(notice) = feed.try_recv() {
        notices.push(notice);
    }
    notices
}

/// Polls `check` until it holds, for up to a second.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
