//! Application layer containing the ledger service.
//!
//! `PaymentLedger` owns the configuration and drives every call through the
//! storage port; `call` maps calls onto the `(success, value)` receipts the
//! outside world sees.

pub mod call;
pub mod ledger;
