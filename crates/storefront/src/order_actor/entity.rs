//! [`ActorEntity`] implementation for [`OrderLedger`].

use super::actions::{OrderAction, OrderActionResult, OrderLedgerReload};
use super::error::OrderError;
use crate::model::{Order, OrderLedger, OrderLedgerCreate, UserId};
use crate::store::{
    load_json, quarantine, save_json, SnapshotError, SnapshotKey, SnapshotStore,
};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

impl OrderLedger {
    async fn load(owner: &UserId, store: &dyn SnapshotStore) -> Result<Vec<Order>, OrderError> {
        let key = SnapshotKey::Orders.for_user(owner);
        match load_json::<Vec<Order>>(store, &key).await {
            Ok(orders) => Ok(orders.unwrap_or_default()),
            Err(SnapshotError::Corrupt { key, source }) => {
                let backup = quarantine(store, &key)
                    .await
                    .map_err(|e| OrderError::Persistence(e.to_string()))?;
                error!(
                    %key,
                    %backup,
                    error = %source,
                    "Stored order history is corrupt, moved aside, starting empty"
                );
                Ok(Vec::new())
            }
            Err(e) => Err(OrderError::Persistence(e.to_string())),
        }
    }

    async fn persist(&self, store: &dyn SnapshotStore) -> Result<(), OrderError> {
        let key = SnapshotKey::Orders.for_user(&self.owner);
        save_json(store, &key, &self.orders)
            .await
            .map_err(|e| OrderError::Persistence(e.to_string()))
    }
}

#[async_trait]
impl ActorEntity for OrderLedger {
    type Id = UserId;
    type Create = OrderLedgerCreate;
    type Update = OrderLedgerReload;
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Context = Arc<dyn SnapshotStore>;
    type Error = OrderError;

    fn from_create_params(owner: UserId, _params: OrderLedgerCreate) -> Result<Self, Self::Error> {
        Ok(OrderLedger::new(owner))
    }

    async fn on_create(&mut self, store: &Self::Context) -> Result<(), Self::Error> {
        self.orders = Self::load(&self.owner, store.as_ref()).await?;
        Ok(())
    }

    async fn on_update(
        &mut self,
        _reload: OrderLedgerReload,
        store: &Self::Context,
    ) -> Result<(), Self::Error> {
        self.orders = Self::load(&self.owner, store.as_ref()).await?;
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        store: &Self::Context,
    ) -> Result<OrderActionResult, Self::Error> {
        let mut next = self.clone();
        let result = match action {
            OrderAction::Append(order) => {
                if next.get(&order.id).is_some() {
                    return Err(OrderError::DuplicateOrder(order.id.to_string()));
                }
                let id = order.id.clone();
                next.orders.push(order);
                info!(owner = %self.owner, order_id = %id, "Order recorded");
                OrderActionResult::Append(id)
            }
            OrderAction::UpdatePayment {
                order_id,
                payment_id,
                status,
            } => {
                let Some(order) = next.get_mut(&order_id) else {
                    warn!(
                        owner = %self.owner,
                        %order_id,
                        "Payment update for unknown order ignored"
                    );
                    return Ok(OrderActionResult::UpdatePayment(false));
                };
                if payment_id.is_some() {
                    order.payment_id = payment_id;
                }
                order.payment_status = Some(status);
                OrderActionResult::UpdatePayment(true)
            }
            OrderAction::Advance { order_id, status } => {
                let Some(order) = next.get_mut(&order_id) else {
                    return Err(OrderError::OrderNotFound(order_id.to_string()));
                };
                if !order.status.can_transition_to(status) {
                    return Err(OrderError::InvalidTransition {
                        from: order.status,
                        to: status,
                    });
                }
                order.status = status;
                OrderActionResult::Advance(order.clone())
            }
        };

        next.persist(store.as_ref()).await?;
        *self = next;
        Ok(result)
    }
}
