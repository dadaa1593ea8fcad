use crate::domain::transaction::{Transaction, TransactionState};
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct TransactionRow<'a> {
    reference: &'a str,
    state: TransactionState,
    provider_reference: Option<&'a str>,
    response_code: Option<&'a str>,
    response_message: Option<&'a str>,
    device_fingerprint: Option<&'a str>,
    state_message: Option<&'a str>,
}

impl<'a> From<&'a Transaction> for TransactionRow<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            reference: &tx.reference,
            state: tx.state,
            provider_reference: tx.provider_reference.as_deref(),
            response_code: tx.response_code.as_deref(),
            response_message: tx.response_message.as_deref(),
            device_fingerprint: tx.device_fingerprint.as_deref(),
            state_message: tx.state_message.as_deref(),
        }
    }
}

/// Writes transaction summaries as CSV, one row per transaction.
pub struct TransactionWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> TransactionWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes the header followed by every transaction, then flushes.
    ///
    /// The header is written even when there is nothing to report.
    pub fn write_transactions<'a>(
        &mut self,
        transactions: impl IntoIterator<Item = &'a Transaction>,
    ) -> Result<()> {
        let mut transactions = transactions.into_iter().peekable();
        if transactions.peek().is_none() {
            self.writer.write_record([
                "reference",
                "state",
                "provider_reference",
                "response_code",
                "response_message",
                "device_fingerprint",
                "state_message",
            ])?;
        }
        for tx in transactions {
            self.writer.serialize(TransactionRow::from(tx))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
