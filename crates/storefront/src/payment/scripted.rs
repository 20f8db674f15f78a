//! Deterministic gateway and lookup for the demo binary and tests.

use super::{
    PaymentCallback, PaymentError, PaymentGateway, PaymentLookup, PaymentRequest, ProviderStatus,
};
use crate::model::OrderId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;
use uuid::Uuid;

/// How the next opened widget behaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedBehavior {
    /// Succeeds immediately with a generated `pay_…` id.
    Succeed,
    Fail(String),
    Dismiss,
    /// The script fails to load.
    Unavailable,
    /// Keeps the callback pending until [`ScriptedGateway::take_pending`].
    Hold,
}

/// A [`PaymentGateway`] that answers from a fixed behavior and records every request.
pub struct ScriptedGateway {
    behavior: Mutex<ScriptedBehavior>,
    requests: Mutex<Vec<PaymentRequest>>,
    pending: Mutex<Vec<PaymentCallback>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedGateway {
    pub fn new(behavior: ScriptedBehavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            requests: Mutex::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn set_behavior(&self, behavior: ScriptedBehavior) {
        *lock(&self.behavior) = behavior;
    }

    /// Every request the widget was opened with, oldest first.
    pub fn requests(&self) -> Vec<PaymentRequest> {
        lock(&self.requests).clone()
    }

    /// Callbacks held back by [`ScriptedBehavior::Hold`], oldest first.
    pub fn take_pending(&self) -> Vec<PaymentCallback> {
        std::mem::take(&mut *lock(&self.pending))
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn load(&self) -> Result<(), PaymentError> {
        match *lock(&self.behavior) {
            ScriptedBehavior::Unavailable => Err(PaymentError::Unavailable(
                "checkout script failed to load".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn open(&self, request: PaymentRequest, callback: PaymentCallback) -> Result<(), PaymentError> {
        let behavior = lock(&self.behavior).clone();
        info!(
            receipt = %request.receipt,
            amount = request.amount_minor,
            currency = %request.currency,
            ?behavior,
            "Widget opened"
        );
        lock(&self.requests).push(request);

        match behavior {
            ScriptedBehavior::Succeed => {
                callback.succeed(format!("pay_{}", Uuid::new_v4().simple()));
            }
            ScriptedBehavior::Fail(description) => callback.fail(description),
            ScriptedBehavior::Dismiss => callback.dismiss(),
            ScriptedBehavior::Hold => lock(&self.pending).push(callback),
            ScriptedBehavior::Unavailable => {
                return Err(PaymentError::Unavailable("widget refused to open".to_string()));
            }
        }
        Ok(())
    }
}

/// A [`PaymentLookup`] over a fixed table. Unknown orders are `Pending`.
#[derive(Default)]
pub struct ScriptedLookup {
    statuses: Mutex<HashMap<OrderId, ProviderStatus>>,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, order_id: OrderId, status: ProviderStatus) {
        lock(&self.statuses).insert(order_id, status);
    }
}

#[async_trait]
impl PaymentLookup for ScriptedLookup {
    async fn status(&self, order_id: &OrderId) -> Result<ProviderStatus, PaymentError> {
        Ok(lock(&self.statuses)
            .get(order_id)
            .cloned()
            .unwrap_or(ProviderStatus::Pending))
    }
}
