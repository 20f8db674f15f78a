use crate::model::{
    Order, OrderId, OrderLedger, OrderLedgerCreate, OrderStatus, PaymentStatus, UserId,
};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError, OrderLedgerReload};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// Client for interacting with the OrderLedger actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<OrderLedger>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<OrderLedger>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<OrderLedger> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<OrderLedger> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.into_entity_error::<OrderError>() {
            Ok(e) => e,
            Err(FrameworkError::NotFound(id)) => OrderError::NotOpen(id),
            Err(e) => OrderError::ActorCommunicationError(e.to_string()),
        }
    }
}

fn unexpected(result: OrderActionResult) -> OrderError {
    OrderError::ActorCommunicationError(format!("Unexpected action result: {result:?}"))
}

impl OrderClient {
    #[instrument(skip(self))]
    pub async fn open(&self, owner: UserId) -> Result<(), OrderError> {
        debug!("Sending request");
        self.inner
            .create(owner, OrderLedgerCreate)
            .await
            .map(|_| ())
            .map_err(Self::map_error)
    }

    pub async fn close(&self, owner: UserId) -> Result<(), OrderError> {
        self.delete(owner).await
    }

    #[instrument(skip(self))]
    pub async fn reload(&self, owner: UserId) -> Result<OrderLedger, OrderError> {
        debug!("Sending request");
        self.inner
            .update(owner, OrderLedgerReload)
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn append(&self, owner: UserId, order: Order) -> Result<OrderId, OrderError> {
        info!(total = %order.total_amount, items = order.items.len(), "Sending append to actor");
        match self
            .inner
            .perform_action(owner, OrderAction::Append(order))
            .await
            .map_err(Self::map_error)?
        {
            OrderActionResult::Append(id) => Ok(id),
            other => Err(unexpected(other)),
        }
    }

    /// Records a payment outcome. Returns false (and changes nothing) for an unknown order id.
    #[instrument(skip(self))]
    pub async fn update_payment(
        &self,
        owner: UserId,
        order_id: OrderId,
        payment_id: Option<String>,
        status: PaymentStatus,
    ) -> Result<bool, OrderError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(
                owner,
                OrderAction::UpdatePayment {
                    order_id,
                    payment_id,
                    status,
                },
            )
            .await
            .map_err(Self::map_error)?
        {
            OrderActionResult::UpdatePayment(found) => Ok(found),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn advance(
        &self,
        owner: UserId,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(owner, OrderAction::Advance { order_id, status })
            .await
            .map_err(Self::map_error)?
        {
            OrderActionResult::Advance(order) => Ok(order),
            other => Err(unexpected(other)),
        }
    }

    pub async fn ledger(&self, owner: UserId) -> Result<OrderLedger, OrderError> {
        let key = owner.to_string();
        self.get(owner).await?.ok_or(OrderError::NotOpen(key))
    }

    /// Every order of the shopper, oldest first.
    pub async fn orders(&self, owner: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(self.ledger(owner).await?.orders)
    }

    pub async fn order(
        &self,
        owner: UserId,
        order_id: &OrderId,
    ) -> Result<Option<Order>, OrderError> {
        Ok(self.ledger(owner).await?.get(order_id).cloned())
    }
}
