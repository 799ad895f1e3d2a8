/*!
 * Integration tests for plural schema migration
 */

use transync::{
    Approval, BatchItem, Cancellation, EngineError, PluralCategory, PluralForm, PluralSchema,
    ReviewOverride, ReviewReason, Submitter, ValidationError,
};

use crate::common::{no_cancel, three_forms, two_forms, TestEngine};

/// Import an approved plural translation and return its string ID
async fn seed_plural(engine: &TestEngine, language: &str, texts: &[&str]) -> i64 {
    let files = engine.plural("%d file", "%d files").await;
    engine
        .synchronizer()
        .import(
            language,
            &Submitter::administrator(),
            vec![BatchItem::new(files.fingerprint.clone(), texts.to_vec())],
            &no_cancel(),
        )
        .await
        .unwrap();
    files.id
}

/// Test growing from two to three forms
#[tokio::test]
async fn test_migrate_growing_shouldSeedNewSlotAndDemote() {
    let engine = TestEngine::new().await;
    let string_id = seed_plural(&engine, "de", &["%d Datei", "%d Dateien"]).await;

    let report = engine
        .migrator()
        .migrate("de", three_forms(), &no_cancel())
        .await
        .unwrap();
    assert_eq!(report.from_count, 2);
    assert_eq!(report.to_count, 3);
    assert_eq!(report.reshaped, 1);
    assert_eq!(report.demoted, 1);

    let current = engine.store.current_translation("de", string_id).await.unwrap().unwrap();
    assert_eq!(current.texts.get(0), "%d Datei");
    assert_eq!(current.texts.get(1), "%d Dateien");
    assert_eq!(current.texts.get(2), "%d Dateien");
    assert_eq!(current.approval, Approval::Pending);

    let language = engine.languages.get("de").await.unwrap().unwrap();
    assert_eq!(language.plural_count(), 3);
    assert_eq!(language.plural_formula, three_forms().formula);

    let notices = engine.notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].count, 1);
    assert_eq!(notices[0].reason, ReviewReason::PluralSchemaChanged);
}

/// Test shrinking from three to two forms
#[tokio::test]
async fn test_migrate_shrinking_shouldMoveLastFormAndBlankTail() {
    let engine = TestEngine::new().await;
    let string_id = seed_plural(&engine, "ru", &["%d файл", "%d файла", "%d файлов"]).await;

    let report = engine
        .migrator()
        .migrate("ru", two_forms(), &no_cancel())
        .await
        .unwrap();
    assert_eq!(report.reshaped, 1);
    assert_eq!(report.demoted, 1);

    let current = engine.store.current_translation("ru", string_id).await.unwrap().unwrap();
    assert_eq!(current.texts.get(0), "%d файл");
    assert_eq!(current.texts.get(1), "%d файлов");
    assert_eq!(current.texts.get(2), "");
    assert_eq!(current.approval, Approval::Pending);
}

/// Test that pending rows are reshaped without counting as demoted
#[tokio::test]
async fn test_migrate_withPendingRow_shouldReshapeWithoutDemotion() {
    let engine = TestEngine::new().await;
    let files = engine.plural("%d file", "%d files").await;
    engine
        .synchronizer()
        .import(
            "de",
            &Submitter::administrator().with_review(ReviewOverride::Unapprove),
            vec![BatchItem::new(files.fingerprint.clone(), vec!["%d Datei", "%d Dateien"])],
            &no_cancel(),
        )
        .await
        .unwrap();

    let report = engine
        .migrator()
        .migrate("de", three_forms(), &no_cancel())
        .await
        .unwrap();
    assert_eq!(report.reshaped, 1);
    assert_eq!(report.demoted, 0);
    assert!(engine.notifier.notices().is_empty());
}

/// Test that singular strings keep their single slot
#[tokio::test]
async fn test_migrate_shouldLeaveSingularStringsAlone() {
    let engine = TestEngine::new().await;
    let save = engine.singular("Save").await;
    engine
        .synchronizer()
        .import(
            "de",
            &Submitter::administrator(),
            vec![BatchItem::new(save.fingerprint.clone(), vec!["Speichern"])],
            &no_cancel(),
        )
        .await
        .unwrap();

    let report = engine
        .migrator()
        .migrate("de", three_forms(), &no_cancel())
        .await
        .unwrap();
    assert_eq!(report.reshaped, 0);

    let current = engine.store.current_translation("de", save.id).await.unwrap().unwrap();
    assert_eq!(current.texts.get(1), "");
    assert_eq!(current.approval, Approval::Approved);
}

/// Test that an unchanged count still refreshes the formula
#[tokio::test]
async fn test_migrate_withSameCount_shouldOnlyUpdateSchema() {
    let engine = TestEngine::new().await;
    let string_id = seed_plural(&engine, "de", &["%d Datei", "%d Dateien"]).await;

    let schema = PluralSchema::new(
        "n != 1",
        vec![
            PluralForm::new(PluralCategory::One, "1"),
            PluralForm::new(PluralCategory::Other, "0, 2~16, 100, 1000"),
        ],
    );
    let report = engine
        .migrator()
        .migrate("de", schema.clone(), &no_cancel())
        .await
        .unwrap();
    assert_eq!(report.reshaped, 0);

    let language = engine.languages.get("de").await.unwrap().unwrap();
    assert_eq!(language.plural_formula, "n != 1");
    assert_eq!(language.plural_forms, schema.forms);

    let current = engine.store.current_translation("de", string_id).await.unwrap().unwrap();
    assert_eq!(current.approval, Approval::Approved);
}

/// Test that a cancelled migration leaves rows and schema as they were
#[tokio::test]
async fn test_migrate_withCancelledToken_shouldRollBackEverything() {
    let engine = TestEngine::new().await;
    let string_id = seed_plural(&engine, "de", &["%d Datei", "%d Dateien"]).await;

    let cancel = Cancellation::new();
    cancel.cancel();
    let result = engine.migrator().migrate("de", three_forms(), &cancel).await;
    assert!(matches!(result, Err(EngineError::Cancelled { committed: 0 })));

    let language = engine.languages.get("de").await.unwrap().unwrap();
    assert_eq!(language.plural_count(), 2);
    let current = engine.store.current_translation("de", string_id).await.unwrap().unwrap();
    assert_eq!(current.texts.get(2), "");
    assert_eq!(current.approval, Approval::Approved);
}

/// Test that invalid schemas are refused up front
#[tokio::test]
async fn test_migrate_withEmptySchema_shouldFail() {
    let engine = TestEngine::new().await;
    let result = engine
        .migrator()
        .migrate("de", PluralSchema::new("0", vec![]), &no_cancel())
        .await;
    assert!(matches!(
        result,
        Err(EngineError::Validation(ValidationError::InvalidPluralSchema(_)))
    ));
}
