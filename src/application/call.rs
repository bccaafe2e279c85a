use super::ledger::PaymentLedger;
use crate::domain::payment::{OrderId, PaymentRequest};
use crate::domain::principal::{CallContext, Principal};
use crate::error::{PaymentError, Result};
use serde::Serialize;
use std::fmt;

/// One call against the ledger, as submitted by a customer, vendor or owner.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerCall {
    SetEscrowAccount(Principal),
    SetPaymentFeeRate(i64),
    SetMaxPayments(i64),
    SetCreationFee(i64),
    ProcessPayment(PaymentRequest),
    CompletePayment(OrderId),
    RefundPayment(OrderId),
    GetPaymentCount,
}

impl LedgerCall {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerCall::SetEscrowAccount(_) => "set_escrow_account",
            LedgerCall::SetPaymentFeeRate(_) => "set_payment_fee_rate",
            LedgerCall::SetMaxPayments(_) => "set_max_payments",
            LedgerCall::SetCreationFee(_) => "set_creation_fee",
            LedgerCall::ProcessPayment(_) => "process_payment",
            LedgerCall::CompletePayment(_) => "complete_payment",
            LedgerCall::RefundPayment(_) => "refund_payment",
            LedgerCall::GetPaymentCount => "get_payment_count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReceiptValue {
    Flag(bool),
    Number(u64),
}

impl fmt::Display for ReceiptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiptValue::Flag(flag) => write!(f, "{flag}"),
            ReceiptValue::Number(n) => write!(f, "{n}"),
        }
    }
}

/// The `(success, value)` pair returned across the call boundary.
///
/// On a granular failure `value` is the numeric error code; on a coarse one
/// it is `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub success: bool,
    pub value: ReceiptValue,
}

impl Receipt {
    pub fn ok(value: ReceiptValue) -> Self {
        Self {
            success: true,
            value,
        }
    }

    pub fn flag(flag: bool) -> Self {
        Self {
            success: flag,
            value: ReceiptValue::Flag(flag),
        }
    }

    /// Turns a granular outcome into a receipt. Infrastructure failures stay errors.
    fn granular<T>(result: Result<T>, value: impl FnOnce(T) -> ReceiptValue) -> Result<Self> {
        match result {
            Ok(v) => Ok(Self::ok(value(v))),
            Err(err) => match err.code() {
                Some(code) => Ok(Self {
                    success: false,
                    value: ReceiptValue::Number(u64::from(code)),
                }),
                None => Err(err),
            },
        }
    }
}

impl PaymentLedger {
    /// Dispatches a call and reports it the way the boundary contract does.
    pub async fn execute(&mut self, ctx: &CallContext, call: LedgerCall) -> Result<Receipt> {
        let admin_ok = |()| ReceiptValue::Flag(true);
        match call {
            LedgerCall::SetEscrowAccount(escrow) => {
                Receipt::granular(self.set_escrow_account(ctx, escrow).await, admin_ok)
            }
            LedgerCall::SetPaymentFeeRate(rate) => {
                Receipt::granular(self.set_payment_fee_rate(ctx, rate).await, admin_ok)
            }
            LedgerCall::SetMaxPayments(max) => {
                Receipt::granular(self.set_max_payments(ctx, max).await, admin_ok)
            }
            LedgerCall::SetCreationFee(fee) => {
                Receipt::granular(self.set_creation_fee(ctx, fee).await, admin_ok)
            }
            LedgerCall::ProcessPayment(request) => Receipt::granular(
                self.process_payment(ctx, request).await,
                ReceiptValue::Number,
            ),
            LedgerCall::CompletePayment(order_id) => {
                Ok(Receipt::flag(self.complete_payment(ctx, order_id).await?))
            }
            LedgerCall::RefundPayment(order_id) => {
                Ok(Receipt::flag(self.refund_payment(ctx, order_id).await?))
            }
            LedgerCall::GetPaymentCount => Ok(Receipt::ok(ReceiptValue::Number(
                self.payment_count(),
            ))),
        }
    }
}

impl From<PaymentError> for Receipt {
    /// Receipt for a rejection; infrastructure errors become a bare failure.
    fn from(err: PaymentError) -> Self {
        match err.code() {
            Some(code) => Self {
                success: false,
                value: ReceiptValue::Number(u64::from(code)),
            },
            None => Self::flag(false),
        }
    }
}
