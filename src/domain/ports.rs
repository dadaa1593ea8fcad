use super::partner::{Actor, Invoice, Partner, SaleOrder};
use super::transaction::Transaction;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Customer records, readable at two privilege levels.
#[async_trait]
pub trait PartnerDirectory: Send + Sync {
    /// Reads a partner as `actor` would see it. Fails with `AccessDenied` when
    /// the actor may not read the record.
    async fn try_read(&self, id: u64, actor: Actor) -> Result<Partner>;
    /// Reads a partner regardless of who is checking out.
    async fn read_privileged(&self, id: u64) -> Result<Partner>;
    async fn find_by_name_and_email(&self, name: &str, email: &str) -> Result<Option<Partner>>;
    /// Inserts a new partner and returns it with its assigned id.
    async fn create(&self, partner: Partner) -> Result<Partner>;
}

/// Read access to invoices and sale orders.
#[async_trait]
pub trait SalesStore: Send + Sync {
    async fn invoice(&self, id: u64) -> Result<Option<Invoice>>;
    async fn invoice_by_name(&self, name: &str) -> Result<Option<Invoice>>;
    async fn order(&self, id: u64) -> Result<Option<SaleOrder>>;
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Inserts or replaces the whole record in one write.
    async fn store(&self, tx: Transaction) -> Result<()>;
    async fn find_by_reference(
        &self,
        reference: &str,
        provider_code: &str,
    ) -> Result<Vec<Transaction>>;
    /// The most recently created transaction linked to a sale order.
    async fn latest_for_order(&self, sale_order_id: u64) -> Result<Option<Transaction>>;
    async fn next_id(&self) -> Result<u64>;
}

/// Schedules the payment post-processing job (accounting, refunds).
#[async_trait]
pub trait PostProcessing: Send + Sync {
    async fn trigger(&self, reference: &str) -> Result<()>;
}

/// What came back from one authorization call.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorReply {
    pub status: u16,
    /// Raw response body as received.
    pub body: String,
    /// Parsed body, handed back verbatim to the checkout caller on success.
    pub data: Value,
}

impl ProcessorReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let data = serde_json::from_str(&body).unwrap_or(Value::Null);
        Self { status, body, data }
    }
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Sends an authorization request. Only transport failures are errors;
    /// processor-side rejections come back as a non-201 reply.
    async fn create_payment(&self, request: &Value) -> Result<ProcessorReply>;
}

pub type PartnerDirectoryBox = Box<dyn PartnerDirectory>;
pub type SalesStoreBox = Box<dyn SalesStore>;
pub type PaymentProcessorBox = Box<dyn PaymentProcessor>;
pub type PostProcessingBox = Box<dyn PostProcessing>;
/// Shared between the orchestrator and the reconciler.
pub type SharedTransactionStore = Arc<dyn TransactionStore>;
