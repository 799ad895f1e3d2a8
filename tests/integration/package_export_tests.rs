/*!
 * Integration tests for version-scoped export and progress
 */

use transync::{BatchItem, EngineError, Submitter, ValidationError};

use crate::common::{no_cancel, TestEngine};

/// Package `core` with versions 1.0, 1.1 and dev-2.0; 1.1 ships three strings
async fn seed_package(engine: &TestEngine) -> (String, String, String) {
    let save = engine.singular("Save").await;
    let open = engine.singular("Open").await;
    let files = engine.plural("%d file", "%d files").await;

    engine.packages.register_package("core", "Core").await.unwrap();
    for version in ["1.0", "1.1", "dev-2.0"] {
        engine.packages.add_version("core", version, version).await.unwrap();
    }
    let v11 = engine
        .packages
        .resolve_version("core", "1.1")
        .await
        .unwrap()
        .unwrap();
    engine
        .packages
        .link_strings(v11.id, vec![save.id, open.id, files.id])
        .await
        .unwrap();

    (save.fingerprint, open.fingerprint, files.fingerprint)
}

/// Test that only current approved rows are exported
#[tokio::test]
async fn test_exportVersion_shouldOnlyIncludeApprovedCurrentRows() {
    let engine = TestEngine::new().await;
    let (save, open, files) = seed_package(&engine).await;
    let sync = engine.synchronizer();

    sync.import(
        "de",
        &Submitter::administrator(),
        vec![
            BatchItem::new(save.clone(), vec!["Speichern"]),
            BatchItem::new(files.clone(), vec!["%d Datei", "%d Dateien"]),
        ],
        &no_cancel(),
    )
    .await
    .unwrap();
    // Current but pending: not exportable
    sync.import(
        "de",
        &Submitter::contributor(),
        vec![BatchItem::new(open.clone(), vec!["Öffnen"])],
        &no_cancel(),
    )
    .await
    .unwrap();

    let export = engine
        .packages
        .export_version("core", "1.1.0", "de")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(export.version, "1.1");
    assert_eq!(export.entries.len(), 3);

    let by_fingerprint = |fp: &str| {
        export
            .entries
            .iter()
            .find(|e| e.fingerprint == fp)
            .unwrap()
            .translations
            .clone()
    };
    assert_eq!(by_fingerprint(&save), Some(vec!["Speichern".to_string()]));
    assert_eq!(by_fingerprint(&open), None);
    assert_eq!(
        by_fingerprint(&files),
        Some(vec!["%d Datei".to_string(), "%d Dateien".to_string()])
    );
}

/// Test progress statistics for a resolved version
#[tokio::test]
async fn test_versionProgress_shouldCountApprovedCurrentRows() {
    let engine = TestEngine::new().await;
    let (save, _, _) = seed_package(&engine).await;

    engine
        .synchronizer()
        .import(
            "de",
            &Submitter::administrator(),
            vec![BatchItem::new(save, vec!["Speichern"])],
            &no_cancel(),
        )
        .await
        .unwrap();

    // 1.1rc2 strips to 1.1
    let progress = engine
        .packages
        .version_progress("core", "1.1rc2", "de")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(progress.version, "1.1");
    assert_eq!(progress.total, 3);
    assert_eq!(progress.translated, 1);
    assert!((progress.percentage - 100.0 / 3.0).abs() < 1e-9);

    // 1.0 ships no strings
    let progress = engine
        .packages
        .version_progress("core", "1.0", "de")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(progress.total, 0);
    assert_eq!(progress.percentage, 0.0);
}

/// Test the failure modes of version-scoped reads
#[tokio::test]
async fn test_exportVersion_withUnknownPackageOrLanguage_shouldFail() {
    let engine = TestEngine::new().await;
    seed_package(&engine).await;

    let result = engine.packages.export_version("ghost", "1.0", "de").await;
    assert!(matches!(
        result,
        Err(EngineError::Validation(ValidationError::UnknownPackage(_)))
    ));

    let result = engine.packages.export_version("core", "1.0", "fr").await;
    assert!(matches!(
        result,
        Err(EngineError::Validation(ValidationError::UnknownLanguage(_)))
    ));
}

/// Test that a package without versions yields no export
#[tokio::test]
async fn test_exportVersion_withoutVersions_shouldReturnNone() {
    let engine = TestEngine::new().await;
    engine.packages.register_package("bare", "Bare").await.unwrap();
    assert!(engine
        .packages
        .export_version("bare", "1.0", "de")
        .await
        .unwrap()
        .is_none());
}
