use super::config::LedgerConfig;
use super::payment::{OrderId, Payment, PaymentUpdate};
use super::transfer::TransferIntent;
use crate::error::Result;
use async_trait::async_trait;

/// Every write produced by one successful ledger operation.
///
/// Stores apply a commit as a unit: either all of it becomes visible or
/// none of it does.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerCommit {
    pub config: Option<LedgerConfig>,
    pub payment: Option<Payment>,
    pub update: Option<(OrderId, PaymentUpdate)>,
    pub transfers: Vec<TransferIntent>,
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn load_config(&self) -> Result<Option<LedgerConfig>>;
    async fn get_payment(&self, order_id: OrderId) -> Result<Option<Payment>>;
    async fn get_update(&self, order_id: OrderId) -> Result<Option<PaymentUpdate>>;
    /// All payments ordered by order id.
    async fn all_payments(&self) -> Result<Vec<Payment>>;
    /// The transfer-intent log in append order.
    async fn transfers(&self) -> Result<Vec<TransferIntent>>;
    async fn commit(&self, commit: LedgerCommit) -> Result<()>;
}

pub type LedgerStoreBox = Box<dyn LedgerStore>;
