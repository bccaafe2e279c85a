use crate::domain::config::LedgerConfig;
use crate::domain::payment::{OrderId, Payment, PaymentUpdate};
use crate::domain::ports::{LedgerCommit, LedgerStore};
use crate::domain::transfer::TransferIntent;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct LedgerState {
    config: Option<LedgerConfig>,
    payments: BTreeMap<OrderId, Payment>,
    updates: HashMap<OrderId, PaymentUpdate>,
    transfers: Vec<TransferIntent>,
}

/// A thread-safe in-memory ledger store.
///
/// All state sits behind a single `RwLock`, so a commit is applied under one
/// write guard and readers never observe half of it.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryLedgerStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn load_config(&self) -> Result<Option<LedgerConfig>> {
        Ok(self.state.read().await.config.clone())
    }

    async fn get_payment(&self, order_id: OrderId) -> Result<Option<Payment>> {
        Ok(self.state.read().await.payments.get(&order_id).cloned())
    }

    async fn get_update(&self, order_id: OrderId) -> Result<Option<PaymentUpdate>> {
        Ok(self.state.read().await.updates.get(&order_id).cloned())
    }

    async fn all_payments(&self) -> Result<Vec<Payment>> {
        Ok(self.state.read().await.payments.values().cloned().collect())
    }

    async fn transfers(&self) -> Result<Vec<TransferIntent>> {
        Ok(self.state.read().await.transfers.clone())
    }

    async fn commit(&self, commit: LedgerCommit) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(config) = commit.config {
            state.config = Some(config);
        }
        if let Some(payment) = commit.payment {
            state.payments.insert(payment.order_id, payment);
        }
        if let Some((order_id, update)) = commit.update {
            state.updates.insert(order_id, update);
        }
        state.transfers.extend(commit.transfers);
        Ok(())
    }
}
