/*!
 * Common test utilities for the transync test suite
 */

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use transync::{
    Cancellation, EngineResult, LanguageRegistry, NewLanguage, PackageRegistry, PluralCategory,
    PluralForm, PluralSchema, ReviewNotice, ReviewNotifier, StringCatalog, StringRecord,
    SyncOptions, Synchronizer, PluralMigrator, TranslationStore, VersionScheme,
};

/// Notifier that keeps every notice for later inspection
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<ReviewNotice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<ReviewNotice> {
        self.notices.lock().clone()
    }
}

#[async_trait]
impl ReviewNotifier for RecordingNotifier {
    async fn review_needed(&self, notice: ReviewNotice) -> EngineResult<()> {
        self.notices.lock().push(notice);
        Ok(())
    }
}

/// `one` / `other`, as in German
pub fn two_forms() -> PluralSchema {
    PluralSchema::new(
        "(n != 1)",
        vec![
            PluralForm::new(PluralCategory::One, "1"),
            PluralForm::new(PluralCategory::Other, "0, 2~16, 100"),
        ],
    )
}

/// `one` / `few` / `many`, as in Russian
pub fn three_forms() -> PluralSchema {
    PluralSchema::new(
        "(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2)",
        vec![
            PluralForm::new(PluralCategory::One, "1, 21, 31"),
            PluralForm::new(PluralCategory::Few, "2~4, 22~24"),
            PluralForm::new(PluralCategory::Many, "0, 5~20, 100"),
        ],
    )
}

/// In-memory engine with `en` as source, `de` (two forms) and `ru` (three forms)
pub struct TestEngine {
    pub store: TranslationStore,
    pub languages: LanguageRegistry,
    pub catalog: StringCatalog,
    pub packages: PackageRegistry,
    pub notifier: Arc<RecordingNotifier>,
}

/// Route library logs to the test output; `RUST_LOG=debug` shows per-pair outcomes
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

impl TestEngine {
    pub async fn new() -> Self {
        init_logging();
        let store = TranslationStore::new_in_memory().expect("in-memory store");
        let repo = store.repository().clone();
        let languages = LanguageRegistry::new(repo.clone());

        languages
            .register(NewLanguage::new("en", two_forms()).source())
            .await
            .expect("register en");
        languages
            .register(NewLanguage::new("de", two_forms()))
            .await
            .expect("register de");
        languages
            .register(NewLanguage::new("ru", three_forms()))
            .await
            .expect("register ru");

        Self {
            store,
            languages,
            catalog: StringCatalog::new(repo.clone()),
            packages: PackageRegistry::new(repo, VersionScheme::default()),
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }

    pub fn synchronizer(&self) -> Synchronizer {
        self.synchronizer_with(SyncOptions::default())
    }

    pub fn synchronizer_with(&self, options: SyncOptions) -> Synchronizer {
        Synchronizer::new(self.store.clone(), self.notifier.clone(), options)
    }

    pub fn migrator(&self) -> PluralMigrator {
        PluralMigrator::new(self.store.clone(), self.notifier.clone())
    }

    /// Register a singular source string
    pub async fn singular(&self, text: &str) -> StringRecord {
        self.catalog.register("", text, "").await.expect("register string")
    }

    /// Register a pluralizable source string
    pub async fn plural(&self, singular: &str, plural: &str) -> StringRecord {
        self.catalog
            .register("", singular, plural)
            .await
            .expect("register string")
    }
}

pub fn no_cancel() -> Cancellation {
    Cancellation::new()
}
