//! Application layer containing the checkout orchestration.
//!
//! [`orchestrator::PaymentOrchestrator`] is the entry point for a checkout
//! submission: it resolves billing data through [`billing::BillingResolver`],
//! talks to the processor and hands the interpreted reply to
//! [`reconciler::TransactionReconciler`], the only component that changes a
//! transaction's state.

pub mod billing;
pub mod orchestrator;
pub mod reconciler;
pub mod request;
