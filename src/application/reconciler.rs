use crate::domain::outcome::{Notification, Outcome};
use crate::domain::ports::{PostProcessingBox, SharedTransactionStore};
use crate::domain::transaction::{Operation, Transaction, TransactionState};
use crate::error::{PaymentError, Result};
use tracing::{info, warn};

/// State a notification moves a transaction to, with the reason to record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: TransactionState,
    pub message: Option<String>,
}

/// Maps an outcome onto the lifecycle, given the provider's capture mode.
pub fn transition_for(notification: &Notification, capture_manually: bool) -> Transition {
    let outcome = notification.outcome;
    match outcome {
        o if o.is_authorization() => Transition {
            state: if capture_manually && !notification.manual_capture {
                TransactionState::Authorized
            } else {
                TransactionState::Done
            },
            message: None,
        },
        Outcome::PendingReview | Outcome::Pending => Transition {
            state: TransactionState::Pending,
            message: None,
        },
        Outcome::Declined => Transition {
            state: TransactionState::Canceled,
            message: Some(format!(
                "Payment was declined: {}",
                non_empty_or(&notification.message, "No message")
            )),
        },
        Outcome::Error => Transition {
            state: TransactionState::Error,
            message: Some(format!(
                "Payment processing error: {}",
                non_empty_or(&notification.message, "Unknown error")
            )),
        },
        _ => Transition {
            state: TransactionState::Error,
            message: Some("Unexpected payment status".to_string()),
        },
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() { fallback } else { value }
}

/// Applies processor outcomes to stored transactions.
///
/// The reconciler is the only writer of a transaction's state once it has
/// left the checkout flow. Every update replaces the record in one write, so
/// the state never disagrees with the diagnostics stored next to it.
pub struct TransactionReconciler {
    transactions: SharedTransactionStore,
    post_processing: PostProcessingBox,
    provider_code: String,
}

impl TransactionReconciler {
    pub fn new(
        transactions: SharedTransactionStore,
        post_processing: PostProcessingBox,
        provider_code: impl Into<String>,
    ) -> Self {
        Self {
            transactions,
            post_processing,
            provider_code: provider_code.into(),
        }
    }

    /// Finds the single transaction of this provider with `reference`.
    pub async fn find_transaction(&self, reference: &str) -> Result<Transaction> {
        let mut matches = self
            .transactions
            .find_by_reference(reference, &self.provider_code)
            .await?;
        match matches.len() {
            0 => Err(PaymentError::TransactionNotFound(reference.to_string())),
            1 => Ok(matches.remove(0)),
            n => Err(PaymentError::ValidationError(format!(
                "{n} transactions share reference {reference}"
            ))),
        }
    }

    /// Moves the referenced transaction to the state the notification implies.
    ///
    /// Returns the stored record. A transition the lifecycle forbids (leaving a
    /// terminal state, going back to pending) is logged and leaves the record
    /// untouched.
    pub async fn reconcile(&self, notification: &Notification) -> Result<Transaction> {
        let tx = self.find_transaction(&notification.reference).await?;
        let transition = transition_for(notification, tx.capture_manually);

        if notification.outcome == Outcome::Unrecognized {
            warn!(
                reference = %tx.reference,
                "unknown outcome for transaction, marking it as errored"
            );
        }

        if !tx.state.can_transition_to(transition.state) {
            warn!(
                reference = %tx.reference,
                from = %tx.state,
                to = %transition.state,
                "ignoring transition not allowed by the transaction lifecycle"
            );
            return Ok(tx);
        }

        let previous_state = tx.state;
        let mut updated = tx;
        updated.provider_reference = Some(Transaction::provider_reference_for(&updated.reference));
        updated.response_code = Some(notification.processor_status.clone()).filter(|c| !c.is_empty());
        updated.response_message = Some(notification.message.clone()).filter(|m| !m.is_empty());
        if let Some(fingerprint) = &notification.device_fingerprint {
            info!(reference = %updated.reference, fingerprint = %fingerprint, "stored device fingerprint");
            updated.device_fingerprint = Some(fingerprint.clone());
        }
        updated.state = transition.state;
        updated.state_message = transition.message;

        self.transactions.store(updated.clone()).await?;
        info!(
            reference = %updated.reference,
            status = %notification.processor_status,
            approval_code = notification.approval_code.as_deref().unwrap_or(""),
            state = %updated.state,
            "transaction reconciled"
        );

        if updated.state == TransactionState::Done
            && previous_state != TransactionState::Done
            && updated.operation == Operation::Refund
        {
            self.post_processing.trigger(&updated.reference).await?;
        }

        Ok(updated)
    }

    /// Back-office action: force a transaction of this provider into `error`.
    pub async fn mark_error(&self, reference: &str) -> Result<Transaction> {
        let notification = Notification::new(reference, Outcome::Error);
        self.reconcile(&notification).await
    }
}
