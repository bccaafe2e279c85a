use crate::application::call::Receipt;
use crate::domain::payment::Payment;
use crate::domain::transfer::TransferIntent;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct TransferRow<'a> {
    seq: usize,
    amount: u64,
    from: &'a str,
    to: &'a str,
}

#[derive(Serialize)]
struct ReceiptRow<'a> {
    line: usize,
    call: &'a str,
    success: bool,
    value: String,
}

/// Writes ledger state as CSV. Use one writer per output: payments,
/// transfer intents or receipts.
pub struct LedgerWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> LedgerWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes the payment table, header included.
    pub fn write_payments(&mut self, payments: &[Payment]) -> Result<()> {
        if payments.is_empty() {
            self.writer.write_record([
                "order_id",
                "customer",
                "vendor",
                "amount",
                "fee",
                "status",
                "timestamp",
                "currency",
                "location",
                "grace_period",
                "interest_rate",
            ])?;
        }
        for payment in payments {
            self.writer.serialize(payment)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes the transfer-intent log, numbered in append order.
    pub fn write_transfers(&mut self, transfers: &[TransferIntent]) -> Result<()> {
        if transfers.is_empty() {
            self.writer.write_record(["seq", "amount", "from", "to"])?;
        }
        for (seq, intent) in transfers.iter().enumerate() {
            self.writer.serialize(TransferRow {
                seq,
                amount: intent.amount,
                from: intent.from.as_str(),
                to: intent.to.as_str(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Appends one receipt; `line` is the call's 1-based data row in the input.
    pub fn write_receipt(&mut self, line: usize, call: &str, receipt: &Receipt) -> Result<()> {
        self.writer.serialize(ReceiptRow {
            line,
            call,
            success: receipt.success,
            value: receipt.value.to_string(),
        })?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
