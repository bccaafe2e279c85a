use clap::Parser;
use escrow_ledger::application::call::Receipt;
use escrow_ledger::application::ledger::PaymentLedger;
use escrow_ledger::domain::config::LedgerConfig;
use escrow_ledger::domain::ports::LedgerStoreBox;
use escrow_ledger::infrastructure::in_memory::InMemoryLedgerStore;
#[cfg(feature = "storage-rocksdb")]
use escrow_ledger::infrastructure::rocksdb::RocksDBStore;
use escrow_ledger::interfaces::csv::call_reader::{CallReader, CallRecord};
use escrow_ledger::interfaces::csv::ledger_writer::LedgerWriter;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing::{debug, error, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input calls CSV file
    input: PathBuf,

    /// Contract owner principal, used with the default configuration.
    #[arg(long, required_unless_present = "config")]
    owner: Option<String>,

    /// JSON ledger configuration file. Takes precedence over --owner.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Write the transfer-intent log to this CSV file.
    #[arg(long)]
    transfers: Option<PathBuf>,

    /// Write one (success, value) receipt per call to this CSV file.
    #[arg(long)]
    receipts: Option<PathBuf>,
}

fn open_store(db_path: Option<PathBuf>) -> Result<LedgerStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => Ok(Box::new(RocksDBStore::open(path).into_diagnostic()?)),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
            );
            Ok(Box::new(InMemoryLedgerStore::new()))
        }
        None => Ok(Box::new(InMemoryLedgerStore::new())),
    }
}

fn load_config(cli: &Cli) -> Result<LedgerConfig> {
    match (&cli.config, &cli.owner) {
        (Some(path), _) => LedgerConfig::from_json_file(path).into_diagnostic(),
        (None, Some(owner)) => Ok(LedgerConfig::new(owner.as_str())),
        (None, None) => Err(miette::miette!("either --config or --owner is required")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "escrow_ledger=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal()),
        )
        .init();

    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let store = open_store(cli.db_path.clone())?;
    let mut ledger = PaymentLedger::open(store, config).await.into_diagnostic()?;

    let mut receipts = match &cli.receipts {
        Some(path) => Some(LedgerWriter::new(File::create(path).into_diagnostic()?)),
        None => None,
    };

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CallReader::new(file);
    for (index, record) in reader.calls().enumerate() {
        let line = index + 1;
        let (ctx, call) = match record.and_then(CallRecord::into_call) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(line, "Error reading call: {e}");
                continue;
            }
        };

        let name = call.name();
        let receipt = match ledger.execute(&ctx, call).await {
            Ok(receipt) => receipt,
            Err(e) => {
                error!(line, call = name, "Error processing call: {e}");
                Receipt::from(e)
            }
        };
        debug!(line, call = name, success = receipt.success, value = %receipt.value, "Call processed");

        if let Some(writer) = receipts.as_mut() {
            writer.write_receipt(line, name, &receipt).into_diagnostic()?;
        }
    }

    if let Some(writer) = receipts.as_mut() {
        writer.flush().into_diagnostic()?;
    }

    if let Some(path) = &cli.transfers {
        let transfers = ledger.transfers().await.into_diagnostic()?;
        let mut writer = LedgerWriter::new(File::create(path).into_diagnostic()?);
        writer.write_transfers(&transfers).into_diagnostic()?;
    }

    let payments = ledger.payments().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = LedgerWriter::new(stdout.lock());
    writer.write_payments(&payments).into_diagnostic()?;

    Ok(())
}
