use chrono::Local;
use clap::Parser;
use cybs_checkout::application::billing::BillingResolver;
use cybs_checkout::application::orchestrator::PaymentOrchestrator;
use cybs_checkout::application::reconciler::TransactionReconciler;
use cybs_checkout::config::GatewayConfig;
use cybs_checkout::domain::checkout::CheckoutRequest;
use cybs_checkout::domain::fingerprint::DeviceFingerprint;
use cybs_checkout::domain::partner::Partner;
use cybs_checkout::domain::ports::{
    PartnerDirectoryBox, PaymentProcessorBox, SalesStoreBox, SharedTransactionStore,
};
use cybs_checkout::domain::transaction::Transaction;
use cybs_checkout::infrastructure::http_processor::HttpProcessor;
use cybs_checkout::infrastructure::in_memory::{
    InMemoryPartnerDirectory, InMemoryPostProcessing, InMemorySalesStore,
    InMemoryTransactionStore,
};
use cybs_checkout::infrastructure::scripted::{
    ScriptedProcessor, ScriptedStep, bad_request, created,
};
use cybs_checkout::interfaces::csv::partner_reader::PartnerReader;
use cybs_checkout::interfaces::csv::sales_reader::{SalesDocument, SalesReader};
use cybs_checkout::interfaces::csv::transaction_writer::TransactionWriter;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Checkout submission (JSON) as posted by the payment form
    request: PathBuf,

    /// Gateway configuration (TOML). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Partner records (CSV) to load before the checkout
    #[arg(long)]
    partners: Option<PathBuf>,

    /// Invoices and sale orders (CSV) to load before the checkout
    #[arg(long)]
    sales: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Answer with this processor status instead of calling the payments API
    #[arg(long, value_name = "STATUS")]
    simulate: Option<String>,
}

/// The storage ports, seeded and ready to be handed to the application layer.
struct Stores {
    partners: PartnerDirectoryBox,
    sales: SalesStoreBox,
    transactions: SharedTransactionStore,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => GatewayConfig::load(path).into_diagnostic()?,
        None => GatewayConfig::default(),
    };

    let mut partners = Vec::new();
    if let Some(path) = &cli.partners {
        let file = File::open(path).into_diagnostic()?;
        for partner in PartnerReader::new(file).partners() {
            match partner {
                Ok(partner) => partners.push(partner),
                Err(e) => eprintln!("Error reading partner: {}", e),
            }
        }
    }

    let mut sales = Vec::new();
    if let Some(path) = &cli.sales {
        let file = File::open(path).into_diagnostic()?;
        for document in SalesReader::new(file).documents() {
            match document {
                Ok(document) => sales.push(document),
                Err(e) => eprintln!("Error reading sales document: {}", e),
            }
        }
    }

    let file = File::open(&cli.request).into_diagnostic()?;
    let mut request: CheckoutRequest = serde_json::from_reader(file).into_diagnostic()?;
    if request.device_fingerprint().is_none() {
        let today = Local::now().date_naive();
        let fingerprint = match request.sale_order_id {
            Some(order_id) => DeviceFingerprint::for_order(today, order_id),
            None => DeviceFingerprint::random(today, &mut rand::thread_rng()),
        };
        info!(
            session_id = %fingerprint.session_id(&config.provider.merchant_id),
            "generated device fingerprint"
        );
        request.customer_input.device_fingerprint = Some(fingerprint.to_string());
    }

    let stores = open_stores(cli.db_path, partners, sales).await?;
    let transactions = stores.transactions.clone();
    ensure_draft(&transactions, &request, &config).await?;

    let processor: PaymentProcessorBox = match &cli.simulate {
        Some(status) => Box::new(simulated_processor(status, &config.step_up.marker)),
        None => Box::new(HttpProcessor::new(&config.provider).into_diagnostic()?),
    };

    let billing = BillingResolver::new(
        stores.partners,
        stores.sales,
        config.billing_defaults.clone(),
        config.guest.clone(),
    );
    let reconciler = TransactionReconciler::new(
        transactions.clone(),
        Box::new(InMemoryPostProcessing::new()),
        config.provider.code.clone(),
    );
    let provider_code = config.provider.code.clone();
    let orchestrator =
        PaymentOrchestrator::new(config, processor, billing, transactions.clone(), reconciler);

    match orchestrator.checkout(&request).await {
        Ok(payload) => info!(payload = %payload, "checkout completed"),
        Err(e) => eprintln!("Error processing checkout: {}", e),
    }

    let reference = if request.reference.trim().is_empty() {
        match request.sale_order_id {
            Some(order_id) => transactions
                .latest_for_order(order_id)
                .await
                .into_diagnostic()?
                .map(|tx| tx.reference),
            None => None,
        }
    } else {
        Some(request.reference.trim().to_string())
    };
    let results = match reference {
        Some(reference) => transactions
            .find_by_reference(&reference, &provider_code)
            .await
            .into_diagnostic()?,
        None => Vec::new(),
    };

    let stdout = io::stdout();
    let mut writer = TransactionWriter::new(stdout.lock());
    writer.write_transactions(&results).into_diagnostic()?;

    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
async fn open_stores(
    db_path: Option<PathBuf>,
    partners: Vec<Partner>,
    sales: Vec<SalesDocument>,
) -> Result<Stores> {
    use cybs_checkout::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(db_path) => {
            let store = RocksDBStore::open(db_path).into_diagnostic()?;
            for partner in &partners {
                store.insert_partner(partner).into_diagnostic()?;
            }
            for document in &sales {
                let inserted = match document {
                    SalesDocument::Invoice(invoice) => store.insert_invoice(invoice),
                    SalesDocument::Order(order) => store.insert_order(order),
                };
                inserted.into_diagnostic()?;
            }
            Ok(Stores {
                partners: Box::new(store.clone()),
                sales: Box::new(store.clone()),
                transactions: Arc::new(store),
            })
        }
        None => Ok(in_memory_stores(partners, sales).await),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
async fn open_stores(
    db_path: Option<PathBuf>,
    partners: Vec<Partner>,
    sales: Vec<SalesDocument>,
) -> Result<Stores> {
    if let Some(db_path) = db_path {
        tracing::warn!(
            db_path = %db_path.display(),
            "persistent storage requested but the storage-rocksdb feature is not enabled, falling back to in-memory storage"
        );
    }
    Ok(in_memory_stores(partners, sales).await)
}

async fn in_memory_stores(partners: Vec<Partner>, sales: Vec<SalesDocument>) -> Stores {
    let directory = InMemoryPartnerDirectory::new();
    for partner in partners {
        directory.insert(partner).await;
    }
    let sales_store = InMemorySalesStore::new();
    for document in sales {
        match document {
            SalesDocument::Invoice(invoice) => sales_store.insert_invoice(invoice).await,
            SalesDocument::Order(order) => sales_store.insert_order(order).await,
        }
    }
    Stores {
        partners: Box::new(directory),
        sales: Box::new(sales_store),
        transactions: Arc::new(InMemoryTransactionStore::new()),
    }
}

/// Creates the draft transaction for the submitted reference unless it exists.
async fn ensure_draft(
    transactions: &SharedTransactionStore,
    request: &CheckoutRequest,
    config: &GatewayConfig,
) -> Result<()> {
    let reference = request.reference.trim();
    if reference.is_empty() {
        return Ok(());
    }
    let existing = transactions
        .find_by_reference(reference, &config.provider.code)
        .await
        .into_diagnostic()?;
    if !existing.is_empty() {
        return Ok(());
    }

    let id = transactions.next_id().await.into_diagnostic()?;
    let mut tx = Transaction::draft(
        id,
        reference,
        request.values.amount,
        request.values.currency.clone(),
        config.provider.capture_manually,
    );
    tx.provider_code = config.provider.code.clone();
    if let Some(order_id) = request.sale_order_id {
        tx = tx.with_sale_order(order_id);
    }
    if let Some(invoice_id) = request.invoice_id {
        tx = tx.with_invoice(invoice_id);
    }
    if let Some(partner_id) = request.values.partner {
        tx = tx.with_partner(partner_id);
    }
    transactions.store(tx).await.into_diagnostic()?;
    info!(reference, id, "draft transaction created");
    Ok(())
}

/// A processor that answers every call with `status`.
///
/// Simulating the step-up marker first asks for authentication, then
/// authorizes the retried request.
fn simulated_processor(status: &str, marker: &str) -> ScriptedProcessor {
    if status == marker {
        info!(marker, "simulating a processor that requires step-up authentication");
        return ScriptedProcessor::new([
            ScriptedStep::Reply(bad_request(
                marker,
                "The cardholder is enrolled in Payer Authentication",
            )),
            ScriptedStep::Reply(created("AUTHORIZED")),
        ]);
    }
    ScriptedProcessor::with_status(status)
}
