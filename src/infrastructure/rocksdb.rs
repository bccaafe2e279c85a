use crate::domain::config::LedgerConfig;
use crate::domain::payment::{OrderId, Payment, PaymentUpdate};
use crate::domain::ports::{LedgerCommit, LedgerStore};
use crate::domain::transfer::TransferIntent;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family holding the single ledger configuration record.
pub const CF_CONFIG: &str = "config";
/// Column Family for payments, keyed by order id.
pub const CF_PAYMENTS: &str = "payments";
/// Column Family for the last transition of each payment.
pub const CF_UPDATES: &str = "updates";
/// Column Family for the append-only transfer-intent log, keyed by sequence.
pub const CF_TRANSFERS: &str = "transfers";

const CONFIG_KEY: &[u8] = b"ledger";

/// A persistent ledger store backed by RocksDB.
///
/// Every commit is written as one `WriteBatch`, so a crash never leaves a
/// payment without its transfer intents. Keys are big-endian so iteration
/// follows order id and append order.
///
/// `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at `path`, creating any missing
    /// column family.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_CONFIG, CF_PAYMENTS, CF_UPDATES, CF_TRANSFERS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| PaymentError::StorageError(format!("column family {name} not found")))
    }

    fn read<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(&cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn read_all<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }

    fn next_transfer_seq(&self) -> Result<u64> {
        let cf = self.cf(CF_TRANSFERS)?;
        match self.db.iterator_cf(cf, IteratorMode::End).next() {
            Some(item) => {
                let (key, _value) = item?;
                let bytes: [u8; 8] = key.as_ref().try_into().map_err(|_| {
                    PaymentError::StorageError("malformed transfer key".to_string())
                })?;
                Ok(u64::from_be_bytes(bytes) + 1)
            }
            None => Ok(0),
        }
    }
}

#[async_trait]
impl LedgerStore for RocksDBStore {
    async fn load_config(&self) -> Result<Option<LedgerConfig>> {
        self.read(CF_CONFIG, CONFIG_KEY)
    }

    async fn get_payment(&self, order_id: OrderId) -> Result<Option<Payment>> {
        self.read(CF_PAYMENTS, &order_id.to_be_bytes())
    }

    async fn get_update(&self, order_id: OrderId) -> Result<Option<PaymentUpdate>> {
        self.read(CF_UPDATES, &order_id.to_be_bytes())
    }

    async fn all_payments(&self) -> Result<Vec<Payment>> {
        self.read_all(CF_PAYMENTS)
    }

    async fn transfers(&self) -> Result<Vec<TransferIntent>> {
        self.read_all(CF_TRANSFERS)
    }

    async fn commit(&self, commit: LedgerCommit) -> Result<()> {
        let mut batch = WriteBatch::default();

        if let Some(config) = &commit.config {
            batch.put_cf(self.cf(CF_CONFIG)?, CONFIG_KEY, serde_json::to_vec(config)?);
        }
        if let Some(payment) = &commit.payment {
            batch.put_cf(
                self.cf(CF_PAYMENTS)?,
                payment.order_id.to_be_bytes(),
                serde_json::to_vec(payment)?,
            );
        }
        if let Some((order_id, update)) = &commit.update {
            batch.put_cf(
                self.cf(CF_UPDATES)?,
                order_id.to_be_bytes(),
                serde_json::to_vec(update)?,
            );
        }
        if !commit.transfers.is_empty() {
            let cf = self.cf(CF_TRANSFERS)?;
            let mut seq = self.next_transfer_seq()?;
            for intent in &commit.transfers {
                batch.put_cf(cf, seq.to_be_bytes(), serde_json::to_vec(intent)?);
                seq += 1;
            }
        }

        self.db.write(batch)?;
        Ok(())
    }
}
