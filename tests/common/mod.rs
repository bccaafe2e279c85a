use std::io::{Error, Write};
use tempfile::NamedTempFile;

pub const HEADER: &str =
    "call, caller, time, order_id, principal, amount, currency, location, grace_period, interest_rate";

/// Writes a calls CSV with the standard header followed by `rows`.
pub fn calls_file(rows: &[&str]) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "{HEADER}")?;
    for row in rows {
        writeln!(file, "{row}")?;
    }
    file.flush()?;
    Ok(file)
}

pub const SET_ESCROW: &str = "set_escrow_account, ST1OWNER, 0, , ST2ESCROW";

pub fn pay(order_id: u64, amount: i64) -> String {
    format!("process_payment, ST1CUSTOMER, 1, {order_id}, ST3VENDOR, {amount}, STX, TruckLocation, 7, 5")
}
