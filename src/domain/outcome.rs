use serde::{Deserialize, Serialize};

/// Result of interpreting a processor reply, as handed to the reconciler.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Authorized,
    PartiallyAuthorized,
    PendingReview,
    Declined,
    Pending,
    /// Success envelope carrying a status this gateway does not map; treated as authorized.
    UnknownSuccess,
    /// Failure forced by an operator or raised outside the processor reply.
    Error,
    /// Anything the reconciler cannot map.
    #[serde(other)]
    Unrecognized,
}

impl Outcome {
    /// Maps the `status` field of a processor success envelope.
    pub fn from_processor_status(status: &str) -> Self {
        match status {
            "AUTHORIZED" => Self::Authorized,
            "PARTIAL_AUTHORIZED" => Self::PartiallyAuthorized,
            "AUTHORIZED_PENDING_REVIEW" => Self::PendingReview,
            "DECLINED" => Self::Declined,
            "PENDING" => Self::Pending,
            _ => Self::UnknownSuccess,
        }
    }

    pub fn is_authorization(self) -> bool {
        matches!(
            self,
            Self::Authorized | Self::PartiallyAuthorized | Self::UnknownSuccess
        )
    }
}

/// Everything the reconciler needs to update one transaction.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Notification {
    pub reference: String,
    pub outcome: Outcome,
    /// Raw processor status, stored as the response code.
    #[serde(default)]
    pub processor_status: String,
    #[serde(default)]
    pub approval_code: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub device_fingerprint: Option<String>,
    /// Set when an operator explicitly captures an authorized payment.
    #[serde(default)]
    pub manual_capture: bool,
}

impl Notification {
    pub fn new(reference: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            reference: reference.into(),
            outcome,
            processor_status: String::new(),
            approval_code: None,
            message: String::new(),
            device_fingerprint: None,
            manual_capture: false,
        }
    }

    pub fn with_processor_status(mut self, status: impl Into<String>) -> Self {
        self.processor_status = status.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_approval_code(mut self, code: Option<String>) -> Self {
        self.approval_code = code;
        self
    }

    pub fn with_device_fingerprint(mut self, fingerprint: Option<String>) -> Self {
        self.device_fingerprint = fingerprint.filter(|f| !f.trim().is_empty());
        self
    }

    pub fn with_manual_capture(mut self, manual_capture: bool) -> Self {
        self.manual_capture = manual_capture;
        self
    }
}
