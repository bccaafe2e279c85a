use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentError>;

/// Every failure the ledger or its adapters can report.
///
/// Ledger rejections map one-to-one onto the numeric codes published at the
/// call boundary (see [`PaymentError::code`]). Infrastructure variants carry
/// no code: they abort the call before anything is committed.
#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("caller is not authorized")]
    NotAuthorized,
    #[error("amount must be positive")]
    InvalidAmount,
    #[error("order {0} has already been paid")]
    OrderAlreadyPaid(u64),
    #[error("order {0} not found")]
    OrderNotFound(u64),
    #[error("vendor must differ from the customer")]
    InvalidVendor,
    #[error("payment {0} has already been processed")]
    PaymentAlreadyProcessed(u64),
    #[error("escrow account is not set")]
    EscrowNotSet,
    #[error("fee rate {0} is outside 0..=10")]
    InvalidFeeRate(i64),
    #[error("maximum number of payments reached")]
    MaxPaymentsExceeded,
    #[error("unsupported currency {0:?}")]
    InvalidCurrency(String),
    #[error("location must be 1 to 50 characters")]
    InvalidLocation,
    #[error("grace period {0} exceeds 30 days")]
    InvalidGracePeriod(i64),
    #[error("interest rate {0} exceeds 20 percent")]
    InvalidInterestRate(i64),
    #[error("caller is not the contract owner")]
    NotOwner,
    #[error("invalid update parameter: {0}")]
    InvalidUpdateParam(i64),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Malformed call: {0}")]
    MalformedCall(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl PaymentError {
    /// Numeric code exposed to callers, `None` for infrastructure failures.
    pub fn code(&self) -> Option<u32> {
        let code = match self {
            Self::NotAuthorized => 100,
            Self::InvalidAmount => 101,
            Self::OrderAlreadyPaid(_) => 103,
            Self::OrderNotFound(_) => 106,
            Self::InvalidVendor => 107,
            Self::PaymentAlreadyProcessed(_) => 109,
            Self::EscrowNotSet => 111,
            Self::InvalidFeeRate(_) => 113,
            Self::MaxPaymentsExceeded => 114,
            Self::InvalidCurrency(_) => 115,
            Self::InvalidLocation => 116,
            Self::InvalidGracePeriod(_) => 117,
            Self::InvalidInterestRate(_) => 118,
            Self::NotOwner => 119,
            Self::InvalidUpdateParam(_) => 120,
            _ => return None,
        };
        Some(code)
    }

    /// True for rejections produced by ledger rules, as opposed to I/O or storage.
    pub fn is_rejection(&self) -> bool {
        self.code().is_some()
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for PaymentError {
    fn from(err: rocksdb::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}
