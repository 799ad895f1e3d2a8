/*!
 * Integration tests for concurrent imports and migrations
 */

use std::collections::HashSet;

use transync::{Approval, BatchItem, Submitter};

use crate::common::{no_cancel, three_forms, TestEngine};

/// Test that parallel imports into one language keep a single current row per string
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_import_concurrentBatches_shouldKeepSingleCurrent() {
    let engine = TestEngine::new().await;
    let mut strings = Vec::new();
    for i in 0..20 {
        strings.push(engine.singular(&format!("Message {}", i)).await);
    }

    let mut handles = Vec::new();
    for worker in 0..4 {
        let sync = engine.synchronizer();
        let batch: Vec<BatchItem> = strings
            .iter()
            .map(|s| BatchItem::new(s.fingerprint.clone(), vec![format!("Text {}", worker)]))
            .collect();
        let submitter = if worker % 2 == 0 {
            Submitter::administrator()
        } else {
            Submitter::contributor()
        };
        handles.push(tokio::spawn(async move {
            sync.import("de", &submitter, batch, &no_cancel()).await
        }));
    }

    for handle in handles {
        let report = handle.await.unwrap().unwrap();
        assert_eq!(report.total(), 20);
    }

    assert!(engine.store.check_single_current("de").await.unwrap().is_empty());
    for string in &strings {
        let history = engine.store.translation_history("de", string.id).await.unwrap();
        assert_eq!(history.iter().filter(|t| t.is_current).count(), 1);
        let distinct: HashSet<_> = history.iter().map(|t| t.texts.clone()).collect();
        assert_eq!(distinct.len(), history.len(), "texts must not be duplicated");
    }
}

/// Test that a migration and an import on the same language do not interleave
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_migrate_concurrentWithImport_shouldSeeConsistentRows() {
    let engine = TestEngine::new().await;
    let files = engine.plural("%d file", "%d files").await;
    engine
        .synchronizer()
        .import(
            "de",
            &Submitter::administrator(),
            vec![BatchItem::new(files.fingerprint.clone(), vec!["%d Datei", "%d Dateien"])],
            &no_cancel(),
        )
        .await
        .unwrap();

    let migrator = engine.migrator();
    let migration =
        tokio::spawn(async move { migrator.migrate("de", three_forms(), &no_cancel()).await });

    let sync = engine.synchronizer();
    let fingerprint = files.fingerprint.clone();
    let import = tokio::spawn(async move {
        sync.import(
            "de",
            &Submitter::contributor(),
            vec![BatchItem::new(fingerprint, vec!["%d Datei", "%d Dateien"])],
            &no_cancel(),
        )
        .await
    });

    migration.await.unwrap().unwrap();
    // Runs either before the migration (untouched) or after it (slot count mismatch)
    let import_result = import.await.unwrap();
    if let Ok(report) = &import_result {
        assert_eq!(report.existing_current_untouched, 1);
    }

    let current = engine.store.current_translation("de", files.id).await.unwrap().unwrap();
    assert_eq!(current.texts.get(2), "%d Dateien");
    assert_eq!(current.approval, Approval::Pending);
    assert!(engine.store.check_single_current("de").await.unwrap().is_empty());
}
