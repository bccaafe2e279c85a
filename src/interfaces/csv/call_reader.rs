use crate::application::call::LedgerCall;
use crate::domain::payment::{OrderId, PaymentRequest};
use crate::domain::principal::{CallContext, Principal};
use crate::error::{PaymentError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    SetEscrowAccount,
    SetPaymentFeeRate,
    SetMaxPayments,
    SetCreationFee,
    ProcessPayment,
    CompletePayment,
    RefundPayment,
    GetPaymentCount,
}

/// One row of the calls CSV.
///
/// `principal` carries the vendor of a payment or the new escrow account;
/// `amount` carries the gross amount of a payment or the admin parameter.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CallRecord {
    pub call: CallKind,
    pub caller: String,
    pub time: u64,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub principal: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub grace_period: Option<i64>,
    #[serde(default)]
    pub interest_rate: Option<i64>,
}

impl CallRecord {
    /// Splits the row into its call context and the call itself.
    ///
    /// A missing currency or location is passed on as empty so the ledger
    /// reports it with its own error code; grace period and interest rate
    /// default to zero.
    pub fn into_call(self) -> Result<(CallContext, LedgerCall)> {
        let kind = self.call;
        let call = match kind {
            CallKind::SetEscrowAccount => {
                LedgerCall::SetEscrowAccount(require(self.principal, "principal", kind)?.into())
            }
            CallKind::SetPaymentFeeRate => {
                LedgerCall::SetPaymentFeeRate(require(self.amount, "amount", kind)?)
            }
            CallKind::SetMaxPayments => {
                LedgerCall::SetMaxPayments(require(self.amount, "amount", kind)?)
            }
            CallKind::SetCreationFee => {
                LedgerCall::SetCreationFee(require(self.amount, "amount", kind)?)
            }
            CallKind::ProcessPayment => LedgerCall::ProcessPayment(PaymentRequest {
                order_id: require(self.order_id, "order_id", kind)?,
                vendor: Principal::from(require(self.principal, "principal", kind)?),
                amount: require(self.amount, "amount", kind)?,
                currency: self.currency.unwrap_or_default(),
                location: self.location.unwrap_or_default(),
                grace_period: self.grace_period.unwrap_or(0),
                interest_rate: self.interest_rate.unwrap_or(0),
            }),
            CallKind::CompletePayment => {
                LedgerCall::CompletePayment(require(self.order_id, "order_id", kind)?)
            }
            CallKind::RefundPayment => {
                LedgerCall::RefundPayment(require(self.order_id, "order_id", kind)?)
            }
            CallKind::GetPaymentCount => LedgerCall::GetPaymentCount,
        };
        Ok((CallContext::new(self.caller, self.time), call))
    }
}

fn require<T>(value: Option<T>, field: &str, kind: CallKind) -> Result<T> {
    value.ok_or_else(|| PaymentError::MalformedCall(format!("{kind:?} requires `{field}`")))
}

/// Reads ledger calls from a CSV source.
///
/// Wraps `csv::Reader`, trimming whitespace and accepting short records so
/// calls can omit trailing columns they do not use.
pub struct CallReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CallReader<R> {
    /// Creates a new `CallReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and deserializes calls, one per row.
    pub fn calls(self) -> impl Iterator<Item = Result<CallRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PaymentError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "call, caller, time, order_id, principal, amount, currency, location, grace_period, interest_rate";

    fn read(rows: &str) -> Vec<Result<CallRecord>> {
        let data = format!("{HEADER}\n{rows}");
        CallReader::new(data.as_bytes()).calls().collect()
    }

    #[test]
    fn test_reader_valid_stream() {
        let results = read(
            "set_escrow_account, ST1OWNER, 0, , ST2ESCROW\n\
             process_payment, ST1CUSTOMER, 1, 7, ST3VENDOR, 1000, STX, Truck, 7, 5\n\
             complete_payment, ST3VENDOR, 2, 7",
        );
        assert_eq!(results.len(), 3);

        let (ctx, call) = results[0].as_ref().unwrap().clone().into_call().unwrap();
        assert_eq!(ctx.caller, Principal::from("ST1OWNER"));
        assert_eq!(call, LedgerCall::SetEscrowAccount(Principal::from("ST2ESCROW")));

        let (ctx, call) = results[1].as_ref().unwrap().clone().into_call().unwrap();
        assert_eq!(ctx.time, 1);
        match call {
            LedgerCall::ProcessPayment(request) => {
                assert_eq!(request.order_id, 7);
                assert_eq!(request.vendor, Principal::from("ST3VENDOR"));
                assert_eq!(request.amount, 1000);
                assert_eq!(request.currency, "STX");
                assert_eq!(request.location, "Truck");
                assert_eq!(request.grace_period, 7);
                assert_eq!(request.interest_rate, 5);
            }
            other => panic!("unexpected call {other:?}"),
        }

        let (_, call) = results[2].as_ref().unwrap().clone().into_call().unwrap();
        assert_eq!(call, LedgerCall::CompletePayment(7));
    }

    #[test]
    fn test_missing_location_becomes_empty() {
        let results = read("process_payment, ST1CUSTOMER, 1, 7, ST3VENDOR, 1000, STX, , , ");
        let (_, call) = results[0].as_ref().unwrap().clone().into_call().unwrap();
        match call {
            LedgerCall::ProcessPayment(request) => {
                assert_eq!(request.location, "");
                assert_eq!(request.grace_period, 0);
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[test]
    fn test_grace_and_interest_reach_the_ledger_unchecked() {
        let results = read(
            "process_payment, ST1CUSTOMER, 1, 7, ST3VENDOR, 1000, STX, Depot, -1, 0\n\
             process_payment, ST1CUSTOMER, 1, 8, ST3VENDOR, 1000, STX, Depot, 4294967296, 21",
        );
        let grace_and_interest: Vec<(i64, i64)> = results
            .into_iter()
            .map(|record| match record.unwrap().into_call().unwrap() {
                (_, LedgerCall::ProcessPayment(request)) => {
                    (request.grace_period, request.interest_rate)
                }
                (_, other) => panic!("unexpected call {other:?}"),
            })
            .collect();
        assert_eq!(grace_and_interest, vec![(-1, 0), (4_294_967_296, 21)]);
    }

    #[test]
    fn test_missing_required_field() {
        let results = read("complete_payment, ST3VENDOR, 2, ");
        let result = results[0].as_ref().unwrap().clone().into_call();
        assert!(matches!(result, Err(PaymentError::MalformedCall(_))));
    }

    #[test]
    fn test_reader_malformed_line() {
        let results = read("withdraw, ST1CUSTOMER, 1, 7");
        assert!(results[0].is_err());

        let results = read("process_payment, ST1CUSTOMER, 1, 7, ST3VENDOR, lots, STX");
        assert!(results[0].is_err());
    }
}
