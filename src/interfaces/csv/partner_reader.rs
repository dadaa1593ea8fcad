use crate::domain::partner::Partner;
use crate::error::{PaymentError, Result};
use serde::Deserialize;
use std::io::Read;

/// One row of a partner seed file.
///
/// Blank cells are read as missing values, and a missing or blank
/// `restricted` cell means the record is public.
#[derive(Debug, Deserialize)]
struct PartnerRecord {
    id: u64,
    name: String,
    #[serde(default)]
    street: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state_code: Option<String>,
    #[serde(default)]
    zip: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    restricted: Option<bool>,
}

impl From<PartnerRecord> for Partner {
    fn from(record: PartnerRecord) -> Self {
        Partner {
            id: record.id,
            name: record.name,
            street: record.street,
            city: record.city,
            state_code: record.state_code,
            zip: record.zip,
            country_code: record.country_code,
            email: record.email,
            phone: record.phone,
            restricted: record.restricted.unwrap_or(false),
        }
    }
}

/// Reads partner records from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<Partner>`.
/// It trims whitespace and accepts rows with trailing columns left out.
pub struct PartnerReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> PartnerReader<R> {
    /// Creates a new `PartnerReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes partners.
    pub fn partners(self) -> impl Iterator<Item = Result<Partner>> {
        self.reader
            .into_deserialize::<PartnerRecord>()
            .map(|result| result.map(Partner::from).map_err(PaymentError::from))
    }
}
