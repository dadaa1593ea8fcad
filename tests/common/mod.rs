#![allow(dead_code)]

use cybs_checkout::application::billing::BillingResolver;
use cybs_checkout::application::orchestrator::PaymentOrchestrator;
use cybs_checkout::application::reconciler::TransactionReconciler;
use cybs_checkout::config::GatewayConfig;
use cybs_checkout::domain::card::TokenizedCard;
use cybs_checkout::domain::checkout::{CheckoutRequest, CheckoutValues, CustomerInput};
use cybs_checkout::domain::partner::{Actor, Partner};
use cybs_checkout::domain::ports::TransactionStore;
use cybs_checkout::domain::transaction::Transaction;
use cybs_checkout::infrastructure::in_memory::{
    InMemoryPartnerDirectory, InMemoryPostProcessing, InMemorySalesStore,
    InMemoryTransactionStore,
};
use cybs_checkout::infrastructure::scripted::ScriptedProcessor;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

pub const CARD_NUMBER: &str = "4111111111111111";

/// An orchestrator wired to in-memory adapters, with handles to inspect them.
pub struct Harness {
    pub orchestrator: PaymentOrchestrator,
    pub processor: ScriptedProcessor,
    pub partners: InMemoryPartnerDirectory,
    pub sales: InMemorySalesStore,
    pub transactions: InMemoryTransactionStore,
    pub post_processing: InMemoryPostProcessing,
}

impl Harness {
    pub fn new(processor: ScriptedProcessor) -> Self {
        Self::with_config(GatewayConfig::default(), processor)
    }

    pub fn with_config(config: GatewayConfig, processor: ScriptedProcessor) -> Self {
        let partners = InMemoryPartnerDirectory::new();
        let sales = InMemorySalesStore::new();
        let transactions = InMemoryTransactionStore::new();
        let post_processing = InMemoryPostProcessing::new();

        let billing = BillingResolver::new(
            Box::new(partners.clone()),
            Box::new(sales.clone()),
            config.billing_defaults.clone(),
            config.guest.clone(),
        );
        let shared: Arc<dyn TransactionStore> = Arc::new(transactions.clone());
        let reconciler = TransactionReconciler::new(
            shared.clone(),
            Box::new(post_processing.clone()),
            config.provider.code.clone(),
        );
        let orchestrator = PaymentOrchestrator::new(
            config,
            Box::new(processor.clone()),
            billing,
            shared,
            reconciler,
        );

        Self {
            orchestrator,
            processor,
            partners,
            sales,
            transactions,
            post_processing,
        }
    }

    /// Stores a draft transaction the way the checkout page does before paying.
    pub async fn seed_draft(&self, tx: Transaction) -> Transaction {
        self.transactions.store(tx.clone()).await.unwrap();
        tx
    }

    pub async fn transaction(&self, reference: &str) -> Transaction {
        self.transactions
            .all()
            .await
            .into_iter()
            .find(|tx| tx.reference == reference)
            .unwrap()
    }
}

pub fn card() -> TokenizedCard {
    TokenizedCard {
        number: CARD_NUMBER.to_string(),
        exp_month: "12".to_string(),
        exp_year: "2031".to_string(),
        security_code: "737".to_string(),
    }
}

pub fn request(reference: &str, amount: Decimal) -> CheckoutRequest {
    CheckoutRequest {
        reference: reference.to_string(),
        values: CheckoutValues {
            amount,
            currency: "USD".to_string(),
            partner: None,
        },
        customer_input: CustomerInput {
            card: card(),
            device_fingerprint: None,
        },
        sale_order_id: None,
        invoice_id: None,
        force_3ds: false,
        actor: Actor::Public,
    }
}

pub fn draft(id: u64, reference: &str) -> Transaction {
    Transaction::draft(id, reference, dec!(100.00), "USD", false)
}

pub fn partner(id: u64, name: &str) -> Partner {
    let mut partner = Partner::new(id, name);
    partner.street = Some("12 Market Street".to_string());
    partner.city = Some("San Francisco".to_string());
    partner.state_code = Some("CA".to_string());
    partner.zip = Some("94105".to_string());
    partner.country_code = Some("US".to_string());
    partner.email = Some(format!("{}@example.com", name.to_lowercase().replace(' ', ".")));
    partner.phone = Some("4155550100".to_string());
    partner
}
