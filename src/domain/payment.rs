use super::principal::Principal;
use crate::error::PaymentError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type OrderId = u64;

pub const MAX_LOCATION_LEN: usize = 50;
pub const MAX_GRACE_PERIOD: i64 = 30;
pub const MAX_INTEREST_RATE: i64 = 20;

/// The closed set of currencies a payment may be denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "STX")]
    Stx,
    #[serde(rename = "BTC")]
    Btc,
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Stx => "STX",
            Currency::Btc => "BTC",
            Currency::Usd => "USD",
        }
    }
}

impl FromStr for Currency {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STX" => Ok(Currency::Stx),
            "BTC" => Ok(Currency::Btc),
            "USD" => Ok(Currency::Usd),
            other => Err(PaymentError::InvalidCurrency(other.to_string())),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split of a gross amount into the withheld fee and the net owed to the vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    pub fee: u64,
    pub net: u64,
}

impl FeeSplit {
    /// `fee = floor(gross * rate / 100)`, truncating integer division.
    ///
    /// Computed in `u128`; with `rate <= 100` the fee never exceeds `gross`,
    /// so narrowing back is lossless.
    pub fn compute(gross: u64, rate_percent: u64) -> Self {
        let fee = (u128::from(gross) * u128::from(rate_percent) / 100) as u64;
        Self {
            fee,
            net: gross - fee,
        }
    }
}

/// Raw arguments of a payment creation as they arrive at the boundary.
///
/// Fields stay unvalidated here so the ledger can check them in its fixed
/// order, e.g. an unknown currency is reported only after the vendor check.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub order_id: OrderId,
    pub vendor: Principal,
    pub amount: i64,
    pub currency: String,
    pub location: String,
    pub grace_period: i64,
    pub interest_rate: i64,
}

/// A payment held in escrow, keyed by its order id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub order_id: OrderId,
    pub customer: Principal,
    pub vendor: Principal,
    /// Net amount owed to the vendor (gross minus fee).
    pub amount: u64,
    pub fee: u64,
    pub status: PaymentStatus,
    /// Logical time of the last status change.
    pub timestamp: u64,
    pub currency: Currency,
    pub location: String,
    pub grace_period: i64,
    pub interest_rate: i64,
}

impl Payment {
    pub fn is_pending(&self) -> bool {
        self.status == PaymentStatus::Pending
    }

    /// Moves a pending payment into a terminal status.
    pub fn settle(&mut self, status: PaymentStatus, time: u64) -> Result<(), PaymentError> {
        if !self.is_pending() || status == PaymentStatus::Pending {
            return Err(PaymentError::PaymentAlreadyProcessed(self.order_id));
        }
        self.status = status;
        self.timestamp = time;
        Ok(())
    }
}

/// The last transition applied to a payment. Overwritten on each transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentUpdate {
    pub update_status: PaymentStatus,
    pub update_timestamp: u64,
    pub updater: Principal,
}

pub fn validate_location(location: &str) -> Result<(), PaymentError> {
    let len = location.chars().count();
    if len == 0 || len > MAX_LOCATION_LEN {
        return Err(PaymentError::InvalidLocation);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn pending_payment() -> Payment {
        Payment {
            order_id: 1,
            customer: Principal::from("ST1CUSTOMER"),
            vendor: Principal::from("ST3VENDOR"),
            amount: 990,
            fee: 10,
            status: PaymentStatus::Pending,
            timestamp: 0,
            currency: Currency::Stx,
            location: "TruckLocation".to_string(),
            grace_period: 7,
            interest_rate: 5,
        }
    }

    #[test]
    fn test_fee_split_truncates() {
        assert_eq!(FeeSplit::compute(1000, 1), FeeSplit { fee: 10, net: 990 });
        assert_eq!(FeeSplit::compute(99, 1), FeeSplit { fee: 0, net: 99 });
        assert_eq!(FeeSplit::compute(199, 10), FeeSplit { fee: 19, net: 180 });
        assert_eq!(FeeSplit::compute(500, 0), FeeSplit { fee: 0, net: 500 });
    }

    #[test]
    fn test_fee_split_large_amount_does_not_overflow() {
        let split = FeeSplit::compute(u64::MAX, 10);
        assert_eq!(split.fee, u64::MAX / 10);
        assert_eq!(split.fee + split.net, u64::MAX);
    }

    #[test]
    fn test_fee_split_random_amounts() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let gross: u64 = rng.gen_range(1..=1_000_000_000);
            let rate: u64 = rng.gen_range(0..=10);
            let split = FeeSplit::compute(gross, rate);
            assert_eq!(split.fee, gross * rate / 100);
            assert_eq!(split.net, gross - split.fee);
        }
    }

    #[test]
    fn test_currency_parsing() {
        assert_eq!("STX".parse::<Currency>().unwrap(), Currency::Stx);
        assert_eq!("BTC".parse::<Currency>().unwrap(), Currency::Btc);
        assert_eq!("USD".parse::<Currency>().unwrap(), Currency::Usd);
        assert!(matches!(
            "usd".parse::<Currency>(),
            Err(PaymentError::InvalidCurrency(_))
        ));
        assert!(matches!(
            "".parse::<Currency>(),
            Err(PaymentError::InvalidCurrency(_))
        ));
    }

    #[test]
    fn test_location_bounds() {
        assert!(validate_location("x").is_ok());
        assert!(validate_location(&"a".repeat(50)).is_ok());
        assert!(matches!(
            validate_location(""),
            Err(PaymentError::InvalidLocation)
        ));
        assert!(matches!(
            validate_location(&"a".repeat(51)),
            Err(PaymentError::InvalidLocation)
        ));
    }

    #[test]
    fn test_settle_is_terminal() {
        let mut payment = pending_payment();
        payment.settle(PaymentStatus::Completed, 5).unwrap();
        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(payment.timestamp, 5);

        let result = payment.settle(PaymentStatus::Refunded, 6);
        assert!(matches!(
            result,
            Err(PaymentError::PaymentAlreadyProcessed(1))
        ));
        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(payment.timestamp, 5);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&PaymentStatus::Refunded).unwrap();
        assert_eq!(json, "\"refunded\"");
        let json = serde_json::to_string(&Currency::Btc).unwrap();
        assert_eq!(json, "\"BTC\"");
    }
}
