use super::principal::Principal;
use serde::{Deserialize, Serialize};

/// A recorded instruction to move funds through the escrow account.
///
/// The ledger only records intents; the escrow custodian consumes them and
/// performs the actual movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferIntent {
    pub amount: u64,
    pub from: Principal,
    pub to: Principal,
}

impl TransferIntent {
    pub fn new(amount: u64, from: &Principal, to: &Principal) -> Self {
        Self {
            amount,
            from: from.clone(),
            to: to.clone(),
        }
    }
}
