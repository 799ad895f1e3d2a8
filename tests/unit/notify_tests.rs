/*!
 * Tests for review notifications
 */

use std::sync::Arc;

use async_trait::async_trait;
use transync::{
    BatchItem, EngineError, EngineResult, LogNotifier, ReviewNotice, ReviewNotifier, ReviewReason,
    Submitter, SyncOptions, Synchronizer,
};

use crate::common::{no_cancel, TestEngine};

/// Notifier whose delivery channel is down
#[derive(Debug)]
struct FailingNotifier;

#[async_trait]
impl ReviewNotifier for FailingNotifier {
    async fn review_needed(&self, _notice: ReviewNotice) -> EngineResult<()> {
        Err(EngineError::Infrastructure("mail relay unreachable".to_string()))
    }
}

/// Test that the log notifier always accepts a notice
#[test]
fn test_logNotifier_reviewNeeded_shouldSucceed() {
    let result = tokio_test::block_on(async {
        LogNotifier
            .review_needed(ReviewNotice {
                language: "de".to_string(),
                count: 3,
                reason: ReviewReason::NewTranslations,
            })
            .await
    });
    assert!(result.is_ok());
}

/// Test that a failing notifier does not fail the committed import
#[test]
fn test_import_withFailingNotifier_shouldStillReport() {
    let report = tokio_test::block_on(async {
        let engine = TestEngine::new().await;
        let save = engine.singular("Save").await;
        let sync = Synchronizer::new(
            engine.store.clone(),
            Arc::new(FailingNotifier),
            SyncOptions::default(),
        );

        sync.import(
            "de",
            &Submitter::administrator(),
            vec![BatchItem::new(save.fingerprint.clone(), vec!["Speichern"])],
            &no_cancel(),
        )
        .await
        .unwrap();
        // A contributor's alternative waits for review and triggers the notifier
        sync.import(
            "de",
            &Submitter::contributor(),
            vec![BatchItem::new(save.fingerprint, vec!["Sichern"])],
            &no_cancel(),
        )
        .await
    });

    let report = report.unwrap();
    assert_eq!(report.new_approval_needed, 1);
}
