use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentError>;

/// Fallback message shown to the customer when the processor gives no reason.
pub const GENERIC_PROCESSING_ERROR: &str = "unable to process the payment, please try again";

#[derive(Error, Debug)]
pub enum PaymentError {
    /// Input or cross-system consistency problem, safe to show to the customer.
    #[error("{0}")]
    ValidationError(String),

    /// The processor refused or failed the request. Carries a customer-facing message.
    #[error("Payment processing error: {0}")]
    ProcessingError(String),

    /// Step-up authentication was required again after the retry carrying it.
    #[error("Payment authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Network-level failure talking to the processor. Never shown to the customer as-is.
    #[error("Processor transport error: {0}")]
    TransportError(String),

    #[error("No transaction found matching reference {0}.")]
    TransactionNotFound(String),

    #[error("Access denied to {entity} {id}")]
    AccessDenied { entity: &'static str, id: u64 },

    #[error("{entity} {id} does not exist")]
    RecordNotFound { entity: &'static str, id: u64 },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),

    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl PaymentError {
    /// Whether the error may be shown verbatim to the person paying.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::ProcessingError(_)
                | Self::AuthenticationFailed(_)
                | Self::TransactionNotFound(_)
        )
    }

    /// Converts any error into one that is safe to return to the checkout caller.
    ///
    /// Internal details are replaced by the generic processing message; they are
    /// expected to have been logged before this point.
    pub fn into_user_facing(self) -> Self {
        if self.is_user_facing() {
            self
        } else {
            Self::ProcessingError(GENERIC_PROCESSING_ERROR.to_string())
        }
    }
}
