use crate::domain::ports::{PaymentProcessor, ProcessorReply};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A scripted processor step: either a reply or a transport failure.
#[derive(Debug, Clone)]
pub enum ScriptedStep {
    Reply(ProcessorReply),
    TransportError(String),
}

/// Processor double that plays back queued replies and records every request.
///
/// When the script runs out it keeps answering with the last step, so a
/// single-step script behaves like a processor that always answers the same.
#[derive(Clone, Default)]
pub struct ScriptedProcessor {
    steps: Arc<Mutex<VecDeque<ScriptedStep>>>,
    last: Arc<Mutex<Option<ScriptedStep>>>,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl ScriptedProcessor {
    pub fn new(steps: impl IntoIterator<Item = ScriptedStep>) -> Self {
        Self {
            steps: Arc::new(Mutex::new(steps.into_iter().collect())),
            ..Self::default()
        }
    }

    /// A processor that authorizes with `status` inside a 201 envelope.
    pub fn with_status(status: &str) -> Self {
        Self::new([ScriptedStep::Reply(created(status))])
    }

    pub async fn requests(&self) -> Vec<Value> {
        self.requests.lock().await.clone()
    }

    pub async fn calls(&self) -> usize {
        self.requests.lock().await.len()
    }
}

/// A 201 success envelope in the processor's format.
pub fn created(status: &str) -> ProcessorReply {
    let body = json!({
        "id": "7000000000000000000001",
        "status": status,
        "processorInformation": {"approvalCode": "831000", "responseCode": "00"},
    });
    ProcessorReply::new(201, body.to_string())
}

/// A 201 decline envelope carrying a processor message.
pub fn declined(message: &str) -> ProcessorReply {
    let body = json!({
        "id": "7000000000000000000002",
        "status": "DECLINED",
        "message": message,
        "errorInformation": {"reason": "PROCESSOR_DECLINED", "message": message},
    });
    ProcessorReply::new(201, body.to_string())
}

/// A 400 failure envelope with the given reason and message.
pub fn bad_request(reason: &str, message: &str) -> ProcessorReply {
    let body = json!({"status": "INVALID_REQUEST", "reason": reason, "message": message});
    ProcessorReply::new(400, body.to_string())
}

#[async_trait]
impl PaymentProcessor for ScriptedProcessor {
    async fn create_payment(&self, request: &Value) -> Result<ProcessorReply> {
        self.requests.lock().await.push(request.clone());

        let next = self.steps.lock().await.pop_front();
        let step = {
            let mut last = self.last.lock().await;
            match next {
                Some(step) => {
                    *last = Some(step.clone());
                    step
                }
                None => last.clone().ok_or_else(|| {
                    PaymentError::TransportError("scripted processor has no reply".to_string())
                })?,
            }
        };

        match step {
            ScriptedStep::Reply(reply) => Ok(reply),
            ScriptedStep::TransportError(message) => Err(PaymentError::TransportError(message)),
        }
    }
}
