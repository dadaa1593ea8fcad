use super::billing::BillingResolver;
use super::reconciler::TransactionReconciler;
use super::request::{AuthorizationRequest, masked_for_log};
use crate::config::GatewayConfig;
use crate::domain::billing::BillingProfile;
use crate::domain::checkout::CheckoutRequest;
use crate::domain::outcome::{Notification, Outcome};
use crate::domain::ports::{PaymentProcessorBox, ProcessorReply, SharedTransactionStore};
use crate::domain::reference;
use crate::error::{GENERIC_PROCESSING_ERROR, PaymentError, Result};
use serde_json::Value;
use tracing::{error, info, warn};

const HTTP_CREATED: u16 = 201;
const HTTP_BAD_REQUEST: u16 = 400;

/// Outcome of a single call to the processor, before interpretation.
enum Attempt {
    Reply(ProcessorReply),
    StepUpRequired,
    Failed(PaymentError),
}

/// Drives one checkout submission from form input to reconciled transaction.
pub struct PaymentOrchestrator {
    config: GatewayConfig,
    processor: PaymentProcessorBox,
    billing: BillingResolver,
    transactions: SharedTransactionStore,
    reconciler: TransactionReconciler,
}

impl PaymentOrchestrator {
    pub fn new(
        config: GatewayConfig,
        processor: PaymentProcessorBox,
        billing: BillingResolver,
        transactions: SharedTransactionStore,
        reconciler: TransactionReconciler,
    ) -> Self {
        Self {
            config,
            processor,
            billing,
            transactions,
            reconciler,
        }
    }

    /// Authorizes a checkout and returns the processor's payload.
    ///
    /// Errors are always safe to show to the customer; anything internal has
    /// been logged and replaced by a generic message.
    pub async fn checkout(&self, request: &CheckoutRequest) -> Result<Value> {
        self.process(request).await.map_err(|e| {
            if !e.is_user_facing() {
                error!(error = %e, "checkout failed");
            }
            e.into_user_facing()
        })
    }

    async fn process(&self, request: &CheckoutRequest) -> Result<Value> {
        let reference = self.resolve_reference(request).await?;
        let sources = BillingResolver::plan(
            &reference,
            request.invoice_id,
            request.sale_order_id,
            request.values.partner,
        );
        let billing = self.billing.resolve(&sources, request.actor).await;
        let reply = self.authorize(request, &reference, &billing.profile).await?;
        self.interpret(request, &reference, reply).await
    }

    /// Uses the submitted reference, or the latest one of the sale order.
    async fn resolve_reference(&self, request: &CheckoutRequest) -> Result<String> {
        let submitted = request.reference.trim();
        if !submitted.is_empty() {
            return Ok(submitted.to_string());
        }
        let Some(order_id) = request.sale_order_id else {
            return Err(PaymentError::ValidationError(
                "A payment reference is required".to_string(),
            ));
        };
        let latest = self
            .transactions
            .latest_for_order(order_id)
            .await
            .unwrap_or_else(|e| {
                warn!(sale_order_id = order_id, error = %e, "could not look up order transactions");
                None
            });
        match latest {
            Some(tx) => {
                info!(sale_order_id = order_id, reference = %tx.reference, "using latest order transaction");
                Ok(tx.reference)
            }
            None => Err(PaymentError::ValidationError(format!(
                "No transaction found for sale order {order_id}"
            ))),
        }
    }

    /// Calls the processor, retrying once with step-up data when it asks for it.
    async fn authorize(
        &self,
        request: &CheckoutRequest,
        reference: &str,
        billing: &BillingProfile,
    ) -> Result<ProcessorReply> {
        let mut step_up = request.force_3ds;
        match self.attempt(request, reference, billing, step_up).await? {
            Attempt::Reply(reply) => return Ok(reply),
            Attempt::Failed(e) => return Err(transport_failure(e)),
            Attempt::StepUpRequired if step_up => return Err(authentication_failed()),
            Attempt::StepUpRequired => {
                info!(reference, "processor requires step-up authentication, retrying once");
                step_up = true;
            }
        }
        match self.attempt(request, reference, billing, step_up).await? {
            Attempt::Reply(reply) => Ok(reply),
            Attempt::Failed(e) => Err(transport_failure(e)),
            Attempt::StepUpRequired => Err(authentication_failed()),
        }
    }

    async fn attempt(
        &self,
        request: &CheckoutRequest,
        reference: &str,
        billing: &BillingProfile,
        step_up: bool,
    ) -> Result<Attempt> {
        let tree = AuthorizationRequest {
            reference,
            card: &request.customer_input.card,
            amount: request.values.amount,
            currency: &request.values.currency,
            billing,
            device_fingerprint: request.device_fingerprint(),
            step_up,
        }
        .to_value(&self.config.step_up)?;
        info!(reference, step_up, request = %masked_for_log(&tree), "sending authorization request");

        let timeout = self.config.provider.timeout();
        let result = match tokio::time::timeout(timeout, self.processor.create_payment(&tree)).await {
            Ok(result) => result,
            Err(_) => Err(PaymentError::TransportError(format!(
                "no reply within {} ms",
                timeout.as_millis()
            ))),
        };

        let marker = self.config.step_up.marker.as_str();
        let attempt = match result {
            Ok(reply) => {
                info!(reference, status = reply.status, body = %reply.body, "processor replied");
                if reply.status == HTTP_BAD_REQUEST && reply.body.contains(marker) {
                    Attempt::StepUpRequired
                } else {
                    Attempt::Reply(reply)
                }
            }
            Err(e) if e.to_string().contains(marker) => Attempt::StepUpRequired,
            Err(e) => Attempt::Failed(e),
        };
        Ok(attempt)
    }

    async fn interpret(
        &self,
        request: &CheckoutRequest,
        reference: &str,
        reply: ProcessorReply,
    ) -> Result<Value> {
        if reply.status != HTTP_CREATED {
            error!(reference, status = reply.status, "payment request failed");
            let message = reply_message(&reply.data)
                .unwrap_or_else(|| GENERIC_PROCESSING_ERROR.to_string());
            return Err(PaymentError::ProcessingError(message));
        }

        let Some(status) = reply
            .data
            .as_object()
            .and_then(|envelope| envelope.get("status"))
            .and_then(Value::as_str)
        else {
            error!(reference, body = %reply.body, "accepted reply carries no payment status");
            return Err(PaymentError::ProcessingError(
                GENERIC_PROCESSING_ERROR.to_string(),
            ));
        };
        let outcome = Outcome::from_processor_status(status);
        info!(reference, status, ?outcome, "payment status interpreted");

        let approval_code = reply
            .data
            .pointer("/processorInformation/approvalCode")
            .and_then(Value::as_str)
            .map(str::to_string);
        let notification = Notification::new(reference, outcome)
            .with_processor_status(status)
            .with_message(reply_message(&reply.data).unwrap_or_else(|| status.to_string()))
            .with_approval_code(approval_code)
            .with_device_fingerprint(request.device_fingerprint().map(str::to_string));

        if reference::is_invoice_reference(reference) && !self.transaction_exists(reference).await? {
            // The processor already accepted the payment, its payload still goes back.
            error!(reference, "no transaction for invoice payment, skipping reconciliation");
            return Ok(reply.data);
        }

        self.reconciler.reconcile(&notification).await?;
        Ok(reply.data)
    }

    async fn transaction_exists(&self, reference: &str) -> Result<bool> {
        match self.reconciler.find_transaction(reference).await {
            Ok(_) => Ok(true),
            Err(PaymentError::TransactionNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn transport_failure(e: PaymentError) -> PaymentError {
    error!(error = %e, "exception when calling the payment processor");
    PaymentError::ProcessingError(GENERIC_PROCESSING_ERROR.to_string())
}

fn authentication_failed() -> PaymentError {
    PaymentError::AuthenticationFailed(
        "the card issuer requires additional authentication that could not be completed"
            .to_string(),
    )
}

/// Human-readable message of a processor envelope, if it carries one.
fn reply_message(data: &Value) -> Option<String> {
    ["/message", "/errorInformation/message"]
        .iter()
        .find_map(|pointer| data.pointer(pointer).and_then(Value::as_str))
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}
