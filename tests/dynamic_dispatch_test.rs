mod common;

use common::{Harness, draft, request};
use cybs_checkout::domain::ports::{PartnerDirectoryBox, SharedTransactionStore};
use cybs_checkout::domain::partner::{Actor, Partner};
use cybs_checkout::domain::transaction::TransactionState;
use cybs_checkout::infrastructure::in_memory::{InMemoryPartnerDirectory, InMemoryTransactionStore};
use cybs_checkout::infrastructure::scripted::ScriptedProcessor;
use rust_decimal_macros::dec;
use std::sync::Arc;

#[tokio::test]
async fn test_stores_as_trait_objects() {
    let directory: PartnerDirectoryBox = Box::new(InMemoryPartnerDirectory::new());
    let transactions: SharedTransactionStore = Arc::new(InMemoryTransactionStore::new());

    // Verify Send + Sync by spawning tasks
    let partner_handle = tokio::spawn(async move {
        let created = directory.create(Partner::new(0, "Grace Hopper")).await.unwrap();
        directory.try_read(created.id, Actor::Public).await.unwrap()
    });

    let store = transactions.clone();
    let tx_handle = tokio::spawn(async move {
        store.store(draft(1, "S00050")).await.unwrap();
        store.find_by_reference("S00050", "cybersource").await.unwrap()
    });

    assert_eq!(partner_handle.await.unwrap().name, "Grace Hopper");
    assert_eq!(tx_handle.await.unwrap().len(), 1);
    assert_eq!(transactions.next_id().await.unwrap(), 2);
}

#[tokio::test]
async fn test_concurrent_checkouts_share_one_orchestrator() {
    let harness = Arc::new(Harness::new(ScriptedProcessor::with_status("AUTHORIZED")));
    for id in 1..=8 {
        harness.seed_draft(draft(id, &format!("S{id:05}"))).await;
    }

    let mut handles = Vec::new();
    for id in 1..=8u64 {
        let harness = harness.clone();
        handles.push(tokio::spawn(async move {
            harness
                .orchestrator
                .checkout(&request(&format!("S{id:05}"), dec!(10)))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let all = harness.transactions.all().await;
    assert_eq!(all.len(), 8);
    assert!(all.iter().all(|tx| tx.state == TransactionState::Done));
    assert_eq!(harness.processor.calls().await, 8);
}
