use crate::domain::partner::{Actor, Invoice, Partner, SaleOrder};
use crate::domain::ports::{PartnerDirectory, PostProcessing, SalesStore, TransactionStore};
use crate::domain::transaction::Transaction;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory partner directory.
///
/// Enforces the same read rules as the order system: restricted partners are
/// only visible to internal users and to their own portal user.
#[derive(Default, Clone)]
pub struct InMemoryPartnerDirectory {
    partners: Arc<RwLock<HashMap<u64, Partner>>>,
}

impl InMemoryPartnerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a partner, keeping its id.
    pub async fn insert(&self, partner: Partner) {
        self.partners.write().await.insert(partner.id, partner);
    }

    pub async fn len(&self) -> usize {
        self.partners.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.partners.read().await.is_empty()
    }
}

#[async_trait]
impl PartnerDirectory for InMemoryPartnerDirectory {
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
        let partners = self.partners.read().await;
        partners.get(&id).cloned().ok_or(PaymentError::RecordNotFound {
            entity: "partner",
            id,
        })
    }

    async fn find_by_name_and_email(&self, name: &str, email: &str) -> Result<Option<Partner>> {
        let partners = self.partners.read().await;
        Ok(partners
            .values()
            .filter(|p| p.name == name && p.email.as_deref() == Some(email))
            .min_by_key(|p| p.id)
            .cloned())
    }

    async fn create(&self, mut partner: Partner) -> Result<Partner> {
        let mut partners = self.partners.write().await;
        partner.id = partners.keys().max().map_or(1, |max| max + 1);
        partners.insert(partner.id, partner.clone());
        Ok(partner)
    }
}

/// In-memory invoices and sale orders.
#[derive(Default, Clone)]
pub struct InMemorySalesStore {
    invoices: Arc<RwLock<HashMap<u64, Invoice>>>,
    orders: Arc<RwLock<HashMap<u64, SaleOrder>>>,
}

impl InMemorySalesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_invoice(&self, invoice: Invoice) {
        self.invoices.write().await.insert(invoice.id, invoice);
    }

    pub async fn insert_order(&self, order: SaleOrder) {
        self.orders.write().await.insert(order.id, order);
    }
}

#[async_trait]
impl SalesStore for InMemorySalesStore {
    async fn invoice(&self, id: u64) -> Result<Option<Invoice>> {
        Ok(self.invoices.read().await.get(&id).cloned())
    }

    async fn invoice_by_name(&self, name: &str) -> Result<Option<Invoice>> {
        let invoices = self.invoices.read().await;
        Ok(invoices.values().find(|inv| inv.name == name).cloned())
    }

    async fn order(&self, id: u64) -> Result<Option<SaleOrder>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }
}

/// A thread-safe in-memory store for transactions, keyed by id.
#[derive(Default, Clone)]
pub struct InMemoryTransactionStore {
    transactions: Arc<RwLock<HashMap<u64, Transaction>>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<Transaction> {
        let mut all: Vec<Transaction> = self.transactions.read().await.values().cloned().collect();
        all.sort_by_key(|tx| tx.id);
        all
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn store(&self, tx: Transaction) -> Result<()> {
        let mut transactions = self.transactions.write().await;
        transactions.insert(tx.id, tx);
        Ok(())
    }

    async fn find_by_reference(
        &self,
        reference: &str,
        provider_code: &str,
    ) -> Result<Vec<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions
            .values()
            .filter(|tx| tx.reference == reference && tx.provider_code == provider_code)
            .cloned()
            .collect())
    }

    async fn latest_for_order(&self, sale_order_id: u64) -> Result<Option<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions
            .values()
            .filter(|tx| tx.sale_order_id == Some(sale_order_id))
            .max_by_key(|tx| tx.id)
            .cloned())
    }

    async fn next_id(&self) -> Result<u64> {
        let transactions = self.transactions.read().await;
        Ok(transactions.keys().max().map_or(1, |max| max + 1))
    }
}

/// Records post-processing requests instead of running a scheduler.
#[derive(Default, Clone)]
pub struct InMemoryPostProcessing {
    triggered: Arc<RwLock<Vec<String>>>,
}

impl InMemoryPostProcessing {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn triggered(&self) -> Vec<String> {
        self.triggered.read().await.clone()
    }
}

#[async_trait]
impl PostProcessing for InMemoryPostProcessing {
    async fn trigger(&self, reference: &str) -> Result<()> {
        self.triggered.write().await.push(reference.to_string());
        Ok(())
    }
}
