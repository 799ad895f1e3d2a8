/*!
 * Packages and version-scoped reads.
 *
 * A caller names a package version loosely (`8.2`, `8.2.0rc1`); the
 * resolver maps that request onto a registered version before any
 * translation data is read. Export and progress only ever see current,
 * approved translations.
 */

use log::{debug, info};
use serde::Serialize;

use crate::database::models::{PackageRecord, PackageVersionRecord};
use crate::database::Repository;
use crate::errors::{EngineResult, ValidationError};
use crate::versions::VersionScheme;

/// One string of an exported package version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportEntry {
    pub fingerprint: String,
    pub context: String,
    pub singular: String,
    pub plural: String,
    /// Meaningful slots of the current approved translation, if any
    pub translations: Option<Vec<String>>,
}

/// Translations of a package version in one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionExport {
    pub package: String,
    /// The registered version the request resolved to
    pub version: String,
    pub language: String,
    pub entries: Vec<ExportEntry>,
}

/// Translation progress of a package version in one language
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionProgress {
    pub package: String,
    pub version: String,
    pub language: String,
    /// Strings shipped by the version
    pub total: usize,
    /// Strings with a current approved translation
    pub translated: usize,
    pub percentage: f64,
}

/// Registry of packages and their versions
#[derive(Clone)]
pub struct PackageRegistry {
    repo: Repository,
    scheme: VersionScheme,
}

impl PackageRegistry {
    pub fn new(repo: Repository, scheme: VersionScheme) -> Self {
        Self { repo, scheme }
    }

    pub async fn register_package(&self, handle: &str, name: &str) -> EngineResult<PackageRecord> {
        let package = self.repo.insert_package(handle, name).await?;
        info!("Registered package {}", handle);
        Ok(package)
    }

    /// Register a version; the version string must parse under the scheme
    pub async fn add_version(
        &self,
        handle: &str,
        version: &str,
        display_name: &str,
    ) -> EngineResult<PackageVersionRecord> {
        self.scheme.parse(version)?;
        let package = self.package(handle).await?;
        let record = self
            .repo
            .insert_package_version(package.id, version, display_name)
            .await?;
        debug!("Registered {} version {}", handle, version);
        Ok(record)
    }

    /// Attach catalog strings to a version; returns how many were new
    pub async fn link_strings(&self, version_id: i64, string_ids: Vec<i64>) -> EngineResult<usize> {
        Ok(self.repo.link_version_strings(version_id, string_ids).await?)
    }

    /// Resolve a loose version request to a registered version
    ///
    /// `None` means the package version is unknown.
    pub async fn resolve_version(
        &self,
        handle: &str,
        request: &str,
    ) -> EngineResult<Option<PackageVersionRecord>> {
        let package = self.package(handle).await?;
        let versions = self.repo.list_package_versions(package.id).await?;
        let raws: Vec<&str> = versions.iter().map(|v| v.version.as_str()).collect();

        let Some(best) = self.scheme.best_match(&raws, request)? else {
            debug!("No version of {} matches {}", handle, request);
            return Ok(None);
        };
        debug!("Resolved {} {} to {}", handle, request, best);
        Ok(versions.into_iter().find(|v| v.version == best.raw))
    }

    /// Current approved translations of every string in a version
    pub async fn export_version(
        &self,
        handle: &str,
        request: &str,
        language_id: &str,
    ) -> EngineResult<Option<VersionExport>> {
        let language = self
            .repo
            .get_language(language_id)
            .await?
            .ok_or_else(|| ValidationError::UnknownLanguage(language_id.to_string()))?;
        let Some(version) = self.resolve_version(handle, request).await? else {
            return Ok(None);
        };

        let rows = self.repo.version_translations(version.id, language_id).await?;
        let entries = rows
            .into_iter()
            .map(|(string, translation)| {
                let slots = string.slot_count(language.plural_count());
                ExportEntry {
                    translations: translation.map(|t| t.texts.meaningful(slots)),
                    fingerprint: string.fingerprint,
                    context: string.context,
                    singular: string.singular,
                    plural: string.plural,
                }
            })
            .collect();

        Ok(Some(VersionExport {
            package: handle.to_string(),
            version: version.version,
            language: language_id.to_string(),
            entries,
        }))
    }

    /// Share of a version's strings with a current approved translation
    pub async fn version_progress(
        &self,
        handle: &str,
        request: &str,
        language_id: &str,
    ) -> EngineResult<Option<VersionProgress>> {
        let Some(export) = self.export_version(handle, request, language_id).await? else {
            return Ok(None);
        };

        let total = export.entries.len();
        let translated = export
            .entries
            .iter()
            .filter(|e| e.translations.is_some())
            .count();
        let percentage = if total == 0 {
            0.0
        } else {
            (translated as f64 / total as f64) * 100.0
        };

        Ok(Some(VersionProgress {
            package: export.package,
            version: export.version,
            language: export.language,
            total,
            translated,
            percentage,
        }))
    }

    async fn package(&self, handle: &str) -> EngineResult<PackageRecord> {
        Ok(self
            .repo
            .get_package_by_handle(handle)
            .await?
            .ok_or_else(|| ValidationError::UnknownPackage(handle.to_string()))?)
    }
}
