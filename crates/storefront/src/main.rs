//! Demo: one shopper fills a cart, saves an address and pays through a scripted widget.
//!
//! ```bash
//! RUST_LOG=info cargo run --bin xcart-demo
//! XCART_DATA_DIR=/tmp/xcart RUST_LOG=debug cargo run --bin xcart-demo
//! ```

use actor_framework::tracing::setup_tracing;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, Instrument};
use xcart::checkout::{AddressSelection, CheckoutOutcome};
use xcart::config::StorefrontConfig;
use xcart::lifecycle::StorefrontSystem;
use xcart::model::{Address, Identity, Product, ShippingAddress};
use xcart::payment::{ScriptedBehavior, ScriptedGateway};
use xcart::store::{FileSnapshotStore, MemoryCollectionStore, MemorySnapshotStore, SnapshotStore};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = StorefrontConfig::from_env().map_err(|e| e.to_string())?;
    let local: Arc<dyn SnapshotStore> = match &config.data_dir {
        Some(dir) => Arc::new(FileSnapshotStore::new(dir)),
        None => Arc::new(MemorySnapshotStore::new()),
    };
    let remote = Arc::new(MemoryCollectionStore::new());
    let gateway = Arc::new(ScriptedGateway::new(ScriptedBehavior::Succeed));

    info!(?config, "Starting storefront demo");
    let system = StorefrontSystem::new(config, remote, local, gateway);

    let mut notices = system.notifier.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(notice) = notices.recv().await {
            info!(level = ?notice.level, message = %notice.message, "Notice");
        }
    });

    let shopper = Identity::new("user_demo")
        .with_display_name("Asha")
        .with_email("asha@example.com");
    system
        .sign_in(shopper)
        .await
        .map_err(|e| e.to_string())?;

    let tea = Product::new("1", "Assam Tea", Decimal::new(100, 0)).with_category("Beverages");
    let mug = Product::new("2", "Stoneware Mug", Decimal::new(34950, 2)).with_category("Kitchen");

    async {
        system.add_to_cart(tea.clone()).await?;
        system.add_to_cart(tea.clone()).await?;
        system.add_to_cart(mug.clone()).await?;
        system.toggle_favorite(mug.clone()).await?;
        let totals = system.cart_totals().await?;
        info!(total = ?totals.total_price, items = totals.total_items, "Cart ready");
        Ok::<_, xcart::error::StorefrontError>(())
    }
    .instrument(tracing::info_span!("shopping"))
    .await
    .map_err(|e| e.to_string())?;

    let home = Address::new(
        "Home",
        ShippingAddress {
            full_name: "Asha Rao".to_string(),
            street: "12 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            zip_code: "560001".to_string(),
            phone: "9876543210".to_string(),
        },
    );
    system.save_address(home).await.map_err(|e| e.to_string())?;

    let ticket = system
        .place_order(AddressSelection::Default)
        .await
        .map_err(|e| e.to_string())?;
    info!(order_id = %ticket.order_id, "Order recorded, waiting for payment");

    match ticket.outcome().await {
        CheckoutOutcome::Confirmed {
            order_id,
            payment_id,
        } => info!(%order_id, %payment_id, "Order confirmed"),
        other => info!(?other, "Order not confirmed"),
    }

    for order in system.order_history().await.map_err(|e| e.to_string())? {
        info!(
            order_id = %order.id,
            status = %order.status,
            payment = ?order.payment_status,
            total = %order.total_amount,
            "Order"
        );
    }
    let remaining = system.cart_lines().await.map_err(|e| e.to_string())?;
    info!(lines = remaining.len(), "Cart after checkout");

    system.shutdown().await;
    printer.abort();
    Ok(())
}
