use crate::checkout::{Checkout, CheckoutSettings};
use crate::clients::{AddressClient, CartClient, FavoritesClient, OrderClient};
use crate::config::StorefrontConfig;
use crate::error::StorefrontError;
use crate::model::{Identity, UserId};
use crate::notify::Notifier;
use crate::payment::PaymentGateway;
use crate::store::{CollectionName, CollectionStore, SnapshotStore};
use crate::{address_actor, cart_actor, favorites_actor, order_actor};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// The signed-in shopper and the tasks feeding their remote collections into the actors.
struct Session {
    identity: Identity,
    listeners: Vec<JoinHandle<()>>,
}

/// The complete storefront: aggregate actors, checkout and the current session.
pub struct StorefrontSystem {
    pub cart: CartClient,
    pub favorites: FavoritesClient,
    pub addresses: AddressClient,
    pub orders: OrderClient,
    pub checkout: Checkout,
    pub notifier: Notifier,
    remote: Arc<dyn CollectionStore>,
    session: Mutex<Option<Session>>,
    handles: Vec<JoinHandle<()>>,
}

impl StorefrontSystem {
    /// Creates and starts every actor. Must be called inside a Tokio runtime.
    pub fn new(
        config: StorefrontConfig,
        remote: Arc<dyn CollectionStore>,
        local: Arc<dyn SnapshotStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let buffer = config.channel_buffer;

        // 1. Create actors (no dependencies yet)
        let (cart_actor, cart) = cart_actor::new(buffer);
        let (favorites_actor, favorites) = favorites_actor::new(buffer);
        let (address_actor, addresses) = address_actor::new(buffer);
        let (order_actor, orders) = order_actor::new(buffer);

        // 2. Start actors with their stores injected
        let handles = vec![
            tokio::spawn(cart_actor.run(remote.clone())),
            tokio::spawn(favorites_actor.run(remote.clone())),
            tokio::spawn(address_actor.run(local.clone())),
            tokio::spawn(order_actor.run(local.clone())),
        ];

        let notifier = Notifier::new();
        let checkout = Checkout::new(
            cart.clone(),
            addresses.clone(),
            orders.clone(),
            local,
            gateway,
            notifier.clone(),
            CheckoutSettings {
                currency: config.currency,
                merchant_name: config.merchant_name,
            },
        );

        info!(buffer, currency = %config.currency, "Storefront started");
        Self {
            cart,
            favorites,
            addresses,
            orders,
            checkout,
            notifier,
            remote,
            session: Mutex::new(None),
            handles,
        }
    }

    pub async fn current_identity(&self) -> Option<Identity> {
        self.session.lock().await.as_ref().map(|s| s.identity.clone())
    }

    /// Opens the shopper's aggregates and starts following their remote collections.
    ///
    /// Signing in as someone else signs the current shopper out first. If any aggregate
    /// fails to open, the ones already opened are closed again.
    #[instrument(skip(self, identity), fields(user = %identity.uid))]
    pub async fn sign_in(&self, identity: Identity) -> Result<(), StorefrontError> {
        let mut session = self.session.lock().await;
        if let Some(current) = session.as_ref() {
            if current.identity.uid == identity.uid {
                debug!("Already signed in");
                return Ok(());
            }
        }
        if let Some(previous) = session.take() {
            self.teardown(previous).await;
        }

        let uid = identity.uid.clone();
        // Subscribe before loading so no write between the two is missed
        let mut cart_watch = self
            .remote
            .subscribe(&uid, CollectionName::Cart)
            .await
            .map_err(StorefrontError::StoreUnavailable)?;
        let mut favorites_watch = self
            .remote
            .subscribe(&uid, CollectionName::Favorites)
            .await
            .map_err(StorefrontError::StoreUnavailable)?;
        cart_watch.current();
        favorites_watch.current();

        if let Err(e) = self.open_all(&uid).await {
            warn!(error = %e, "Sign-in failed, closing what was opened");
            self.close_all(&uid).await;
            return Err(e);
        }

        let cart = self.cart.clone();
        let cart_owner = uid.clone();
        let cart_listener = tokio::spawn(async move {
            while let Some(snapshot) = cart_watch.changed().await {
                match cart.apply_snapshot(cart_owner.clone(), snapshot).await {
                    Ok(_) => {}
                    Err(crate::cart_actor::CartError::NotOpen(_)) => break,
                    Err(e) => warn!(user = %cart_owner, error = %e, "Cart snapshot not applied"),
                }
            }
            debug!(user = %cart_owner, "Cart listener stopped");
        });

        let favorites = self.favorites.clone();
        let favorites_owner = uid.clone();
        let favorites_listener = tokio::spawn(async move {
            while let Some(snapshot) = favorites_watch.changed().await {
                match favorites.apply_snapshot(favorites_owner.clone(), snapshot).await {
                    Ok(_) => {}
                    Err(crate::favorites_actor::FavoritesError::NotOpen(_)) => break,
                    Err(e) => {
                        warn!(user = %favorites_owner, error = %e, "Favorites snapshot not applied")
                    }
                }
            }
            debug!(user = %favorites_owner, "Favorites listener stopped");
        });

        info!("Signed in");
        *session = Some(Session {
            identity,
            listeners: vec![cart_listener, favorites_listener],
        });
        Ok(())
    }

    /// Cancels the remote subscriptions and closes the shopper's aggregates.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) {
        let previous = self.session.lock().await.take();
        match previous {
            Some(session) => {
                let uid = session.identity.uid.clone();
                self.teardown(session).await;
                info!(user = %uid, "Signed out");
            }
            None => debug!("Nobody signed in"),
        }
    }

    async fn open_all(&self, uid: &UserId) -> Result<(), StorefrontError> {
        self.cart.open(uid.clone()).await?;
        self.favorites.open(uid.clone()).await?;
        self.addresses.open(uid.clone()).await?;
        self.orders.open(uid.clone()).await?;
        Ok(())
    }

    async fn close_all(&self, uid: &UserId) {
        // NotOpen just means that aggregate never got opened
        if let Err(e) = self.cart.close(uid.clone()).await {
            debug!(error = %e, "Cart close");
        }
        if let Err(e) = self.favorites.close(uid.clone()).await {
            debug!(error = %e, "Favorites close");
        }
        if let Err(e) = self.addresses.close(uid.clone()).await {
            debug!(error = %e, "Address book close");
        }
        if let Err(e) = self.orders.close(uid.clone()).await {
            debug!(error = %e, "Order ledger close");
        }
    }

    async fn teardown(&self, session: Session) {
        for listener in &session.listeners {
            listener.abort();
        }
        for listener in session.listeners {
            // Cancelled is the expected result
            let _ = listener.await;
        }
        self.close_all(&session.identity.uid).await;
    }

    /// Signs out, drops every client and waits for the actors to stop.
    ///
    /// A payment widget still holding a checkout callback keeps its checkout (and with it the
    /// actors) alive until it reports or drops the callback.
    pub async fn shutdown(self) {
        self.sign_out().await;

        let StorefrontSystem {
            cart,
            favorites,
            addresses,
            orders,
            checkout,
            handles,
            ..
        } = self;
        drop(cart);
        drop(favorites);
        drop(addresses);
        drop(orders);
        drop(checkout);

        for handle in handles {
            let _ = handle.await;
        }
        info!("Storefront stopped");
    }
}
