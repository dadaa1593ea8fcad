use crate::domain::partner::{Invoice, SaleOrder};
use crate::error::{PaymentError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum DocumentKind {
    Invoice,
    Order,
}

#[derive(Debug, Deserialize)]
struct SalesRecord {
    #[serde(rename = "type")]
    kind: DocumentKind,
    id: u64,
    name: String,
    partner_id: u64,
}

/// A sales document from a seed file.
#[derive(Debug, PartialEq, Clone)]
pub enum SalesDocument {
    Invoice(Invoice),
    Order(SaleOrder),
}

impl From<SalesRecord> for SalesDocument {
    fn from(record: SalesRecord) -> Self {
        match record.kind {
            DocumentKind::Invoice => SalesDocument::Invoice(Invoice {
                id: record.id,
                name: record.name,
                partner_id: record.partner_id,
            }),
            DocumentKind::Order => SalesDocument::Order(SaleOrder {
                id: record.id,
                name: record.name,
                partner_id: record.partner_id,
            }),
        }
    }
}

/// Reads invoices and sale orders from a CSV source with a
/// `type, id, name, partner_id` header, `type` being `invoice` or `order`.
pub struct SalesReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> SalesReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    pub fn documents(self) -> impl Iterator<Item = Result<SalesDocument>> {
        self.reader
            .into_deserialize::<SalesRecord>()
            .map(|result| result.map(SalesDocument::from).map_err(PaymentError::from))
    }
}
