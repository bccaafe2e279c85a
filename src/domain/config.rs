use super::principal::Principal;
use crate::error::{PaymentError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MAX_FEE_RATE: i64 = 10;

pub const DEFAULT_FEE_RATE: u64 = 1;
pub const DEFAULT_MAX_PAYMENTS: u64 = 10_000;
pub const DEFAULT_CREATION_FEE: u64 = 500;

/// Ledger-wide configuration and the payment counter.
///
/// One instance per ledger, injected at startup and persisted alongside the
/// payments so a restart resumes with the same counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub contract_owner: Principal,
    #[serde(default)]
    pub escrow_account: Option<Principal>,
    #[serde(default = "default_fee_rate")]
    pub payment_fee_rate: u64,
    #[serde(default = "default_max_payments")]
    pub max_payments: u64,
    #[serde(default = "default_creation_fee")]
    pub creation_fee: u64,
    #[serde(default)]
    pub next_payment_id: u64,
}

fn default_fee_rate() -> u64 {
    DEFAULT_FEE_RATE
}

fn default_max_payments() -> u64 {
    DEFAULT_MAX_PAYMENTS
}

fn default_creation_fee() -> u64 {
    DEFAULT_CREATION_FEE
}

impl LedgerConfig {
    pub fn new(contract_owner: impl Into<Principal>) -> Self {
        Self {
            contract_owner: contract_owner.into(),
            escrow_account: None,
            payment_fee_rate: DEFAULT_FEE_RATE,
            max_payments: DEFAULT_MAX_PAYMENTS,
            creation_fee: DEFAULT_CREATION_FEE,
            next_payment_id: 0,
        }
    }

    /// Reads a JSON configuration file and checks it against the same bounds
    /// the admin setters enforce.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let config: Self = serde_json::from_slice(&bytes)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.payment_fee_rate > MAX_FEE_RATE as u64 {
            return Err(PaymentError::ConfigError(format!(
                "payment_fee_rate {} exceeds {}",
                self.payment_fee_rate, MAX_FEE_RATE
            )));
        }
        if self.max_payments == 0 {
            return Err(PaymentError::ConfigError(
                "max_payments must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_owner(&self, caller: &Principal) -> bool {
        &self.contract_owner == caller
    }

    pub fn escrow(&self) -> Result<&Principal> {
        self.escrow_account.as_ref().ok_or(PaymentError::EscrowNotSet)
    }

    pub fn set_payment_fee_rate(&mut self, rate: i64) -> Result<()> {
        if !(0..=MAX_FEE_RATE).contains(&rate) {
            return Err(PaymentError::InvalidFeeRate(rate));
        }
        self.payment_fee_rate = rate as u64;
        Ok(())
    }

    pub fn set_max_payments(&mut self, max: i64) -> Result<()> {
        if max <= 0 {
            return Err(PaymentError::InvalidUpdateParam(max));
        }
        self.max_payments = max as u64;
        Ok(())
    }

    pub fn set_creation_fee(&mut self, fee: i64) -> Result<()> {
        if fee < 0 {
            return Err(PaymentError::InvalidUpdateParam(fee));
        }
        self.creation_fee = fee as u64;
        Ok(())
    }

    pub fn has_capacity(&self) -> bool {
        self.next_payment_id < self.max_payments
    }
}
