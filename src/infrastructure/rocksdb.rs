use crate::domain::partner::{Actor, Invoice, Partner, SaleOrder};
use crate::domain::ports::{PartnerDirectory, SalesStore, TransactionStore};
use crate::domain::transaction::Transaction;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for partner records.
pub const CF_PARTNERS: &str = "partners";
/// Column Family for invoices.
pub const CF_INVOICES: &str = "invoices";
/// Column Family for sale orders.
pub const CF_ORDERS: &str = "orders";
/// Column Family for payment transactions.
pub const CF_TRANSACTIONS: &str = "transactions";

const COLUMN_FAMILIES: [&str; 4] = [CF_PARTNERS, CF_INVOICES, CF_ORDERS, CF_TRANSACTIONS];

/// A persistent store implementation using RocksDB.
///
/// Each entity lives in its own Column Family, keyed by its big-endian id and
/// stored as JSON. A transaction update is a single `put`, so a record is
/// always either fully old or fully new.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that every required column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect::<Vec<_>>();
        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn put<T: Serialize>(&self, cf_name: &str, id: u64, value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, id.to_be_bytes(), bytes)?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, cf_name: &str, id: u64) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, id.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }

    fn last_id(&self, cf_name: &str) -> Result<u64> {
        let cf = self.cf(cf_name)?;
        match self.db.iterator_cf(cf, IteratorMode::End).next() {
            Some(item) => {
                let (key, _value) = item?;
                let bytes: [u8; 8] = key.as_ref().try_into().map_err(|_| {
                    PaymentError::InternalError(Box::new(std::io::Error::other(format!(
                        "malformed key in column family {cf_name}"
                    ))))
                })?;
                Ok(u64::from_be_bytes(bytes))
            }
            None => Ok(0),
        }
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            PaymentError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    pub fn insert_partner(&self, partner: &Partner) -> Result<()> {
        self.put(CF_PARTNERS, partner.id, partner)
    }

    pub fn insert_invoice(&self, invoice: &Invoice) -> Result<()> {
        self.put(CF_INVOICES, invoice.id, invoice)
    }

    pub fn insert_order(&self, order: &SaleOrder) -> Result<()> {
        self.put(CF_ORDERS, order.id, order)
    }
}

#[async_trait]
impl PartnerDirectory for RocksDBStore {
    async fn try_read(&self, id: u64, actor: Actor) -> Result<Partner> {
        let partner = self.read_privileged(id).await?;
        if partner.readable_by(actor) {
            Ok(partner)
        } else {
            Err(PaymentError::AccessDenied {
                entity: "partner",
                id,
            })
        }
    }

    async fn read_privileged(&self, id: u64) -> Result<Partner> {
        self.get(CF_PARTNERS, id)?
            .ok_or(PaymentError::RecordNotFound {
                entity: "partner",
                id,
            })
    }

    async fn find_by_name_and_email(&self, name: &str, email: &str) -> Result<Option<Partner>> {
        Ok(self
            .scan::<Partner>(CF_PARTNERS)?
            .into_iter()
            .find(|p| p.name == name && p.email.as_deref() == Some(email)))
    }

    async fn create(&self, mut partner: Partner) -> Result<Partner> {
        partner.id = self.last_id(CF_PARTNERS)? + 1;
        self.put(CF_PARTNERS, partner.id, &partner)?;
        Ok(partner)
    }
}

#[async_trait]
impl SalesStore for RocksDBStore {
    async fn invoice(&self, id: u64) -> Result<Option<Invoice>> {
        self.get(CF_INVOICES, id)
    }

    async fn invoice_by_name(&self, name: &str) -> Result<Option<Invoice>> {
        Ok(self
            .scan::<Invoice>(CF_INVOICES)?
            .into_iter()
            .find(|inv| inv.name == name))
    }

    async fn order(&self, id: u64) -> Result<Option<SaleOrder>> {
        self.get(CF_ORDERS, id)
    }
}

#[async_trait]
impl TransactionStore for RocksDBStore {
    async fn store(&self, tx: Transaction) -> Result<()> {
        self.put(CF_TRANSACTIONS, tx.id, &tx)
    }

    async fn find_by_reference(
        &self,
        reference: &str,
        provider_code: &str,
    ) -> Result<Vec<Transaction>> {
        Ok(self
            .scan::<Transaction>(CF_TRANSACTIONS)?
            .into_iter()
            .filter(|tx| tx.reference == reference && tx.provider_code == provider_code)
            .collect())
    }

    async fn latest_for_order(&self, sale_order_id: u64) -> Result<Option<Transaction>> {
        Ok(self
            .scan::<Transaction>(CF_TRANSACTIONS)?
            .into_iter()
            .filter(|tx| tx.sale_order_id == Some(sale_order_id))
            .max_by_key(|tx| tx.id))
    }

    async fn next_id(&self) -> Result<u64> {
        Ok(self.last_id(CF_TRANSACTIONS)? + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        for name in COLUMN_FAMILIES {
            assert!(store.db.cf_handle(name).is_some());
        }
    }

    #[tokio::test]
    async fn test_rocksdb_partner_directory() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let mut partner = Partner::new(1, "Ada Lovelace");
        partner.restricted = true;
        store.insert_partner(&partner).unwrap();

        assert!(store.try_read(1, Actor::Public).await.is_err());
        assert_eq!(store.read_privileged(1).await.unwrap(), partner);

        let created = store.create(Partner::new(0, "Guest Customer")).await.unwrap();
        assert_eq!(created.id, 2);
    }

    #[tokio::test]
    async fn test_rocksdb_sales_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let invoice = Invoice {
            id: 12,
            name: "INV/2024/00012".to_string(),
            partner_id: 1,
        };
        store.insert_invoice(&invoice).unwrap();
        store
            .insert_order(&SaleOrder {
                id: 7,
                name: "S00007".to_string(),
                partner_id: 2,
            })
            .unwrap();

        assert_eq!(store.invoice(12).await.unwrap(), Some(invoice.clone()));
        assert_eq!(
            store.invoice_by_name("INV/2024/00012").await.unwrap(),
            Some(invoice)
        );
        assert_eq!(store.order(7).await.unwrap().map(|o| o.partner_id), Some(2));
        assert_eq!(store.order(8).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rocksdb_transaction_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let tx = Transaction::draft(1, "S00001", dec!(100.0), "USD", false).with_sale_order(9);
        TransactionStore::store(&store, tx.clone()).await.unwrap();

        let found = store.find_by_reference("S00001", "cybersource").await.unwrap();
        assert_eq!(found, vec![tx.clone()]);
        assert_eq!(store.latest_for_order(9).await.unwrap(), Some(tx));
        assert_eq!(store.next_id().await.unwrap(), 2);
    }
}
