use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Code under which transactions of this gateway are registered.
pub const PROVIDER_CODE: &str = "cybersource";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionState {
    #[default]
    Draft,
    Pending,
    Authorized,
    Done,
    Canceled,
    Error,
}

impl TransactionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Canceled | Self::Error)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// Terminal states are final; re-applying the current state is accepted so
    /// that a repeated notification only refreshes the diagnostics.
    pub fn can_transition_to(self, next: TransactionState) -> bool {
        if self == next {
            return true;
        }
        if self.is_terminal() || next == Self::Draft {
            return false;
        }
        match next {
            Self::Pending => self == Self::Draft,
            _ => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Authorized => "authorized",
            Self::Done => "done",
            Self::Canceled => "canceled",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for TransactionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    #[default]
    OnlineDirect,
    OnlineToken,
    Offline,
    Refund,
    Validation,
}

/// A payment attempt as stored by the order system.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Transaction {
    /// Store-assigned, increasing with creation order.
    pub id: u64,
    pub reference: String,
    pub provider_code: String,
    pub state: TransactionState,
    pub operation: Operation,
    pub amount: Decimal,
    pub currency: String,
    pub partner_id: Option<u64>,
    pub sale_order_id: Option<u64>,
    pub invoice_id: Option<u64>,
    /// Copied from the provider configuration when the transaction is created.
    pub capture_manually: bool,
    pub provider_reference: Option<String>,
    pub response_code: Option<String>,
    pub response_message: Option<String>,
    pub device_fingerprint: Option<String>,
    /// Reason recorded with a cancellation or an error.
    pub state_message: Option<String>,
}

impl Transaction {
    /// Creates a transaction in `draft`, as the checkout flow does before calling the processor.
    pub fn draft(
        id: u64,
        reference: impl Into<String>,
        amount: Decimal,
        currency: impl Into<String>,
        capture_manually: bool,
    ) -> Self {
        Self {
            id,
            reference: reference.into(),
            provider_code: PROVIDER_CODE.to_string(),
            state: TransactionState::Draft,
            operation: Operation::OnlineDirect,
            amount,
            currency: currency.into(),
            partner_id: None,
            sale_order_id: None,
            invoice_id: None,
            capture_manually,
            provider_reference: None,
            response_code: None,
            response_message: None,
            device_fingerprint: None,
            state_message: None,
        }
    }

    pub fn with_sale_order(mut self, sale_order_id: u64) -> Self {
        self.sale_order_id = Some(sale_order_id);
        self
    }

    pub fn with_invoice(mut self, invoice_id: u64) -> Self {
        self.invoice_id = Some(invoice_id);
        self
    }

    pub fn with_partner(mut self, partner_id: u64) -> Self {
        self.partner_id = Some(partner_id);
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    /// The reference the processor knows this transaction by.
    pub fn provider_reference_for(reference: &str) -> String {
        format!("{PROVIDER_CODE}-{reference}")
    }
}
