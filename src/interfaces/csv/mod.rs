//! Batch CSV interface: a file of ledger calls in, ledger state out.

pub mod call_reader;
pub mod ledger_writer;
