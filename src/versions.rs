/*!
 * Package version resolver.
 *
 * Versions are dotted numbers with an optional pre-release suffix
 * (`1.2`, `8.2.0rc1`, `2.0-beta.3`) or development versions carrying a
 * configurable prefix (`dev-8.2.x`, `dev-master`). Everything here is pure
 * and safe to call from any number of tasks at once.
 */

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;

use crate::errors::ValidationError;

/// Default marker of a version tracking an unreleased branch
pub const DEFAULT_DEVELOPMENT_PREFIX: &str = "dev-";

/// Width of a development version's comparison key
const KEY_WIDTH: usize = 8;

static RELEASE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^v?(\d+(?:\.\d+)*)(?:[-._]?(alpha|beta|rc|a|b)\.?(\d*))?$").unwrap()
});

static DEVELOPMENT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^v?(\d+(?:\.\d+)*)(?:\.x|\.\*|\*)?$").unwrap());

/// Pre-release stage, in release order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Alpha,
    Beta,
    Rc,
}

impl Stage {
    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "alpha" | "a" => Some(Stage::Alpha),
            "beta" | "b" => Some(Stage::Beta),
            "rc" => Some(Stage::Rc),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Alpha => write!(f, "alpha"),
            Stage::Beta => write!(f, "beta"),
            Stage::Rc => write!(f, "rc"),
        }
    }
}

/// Pre-release suffix such as `rc1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreRelease {
    pub stage: Stage,
    pub number: u64,
}

/// A version string broken into its comparable parts
///
/// Equality is version equivalence: `2.0.0` equals `2`.
#[derive(Debug, Clone)]
pub struct ParsedVersion {
    /// The string as registered or requested
    pub raw: String,
    /// Numeric components; empty for a development version naming a branch
    pub base: Vec<u64>,
    /// Whether the version tracks an unreleased branch
    pub development: bool,
    /// Pre-release suffix, never set on development versions
    pub pre_release: Option<PreRelease>,
}

impl ParsedVersion {
    /// Numeric components without trailing zeros, so `2.0.0` and `2` agree
    pub fn trimmed_base(&self) -> &[u64] {
        let len = self
            .base
            .iter()
            .rposition(|&c| c != 0)
            .map(|i| i + 1)
            .unwrap_or(0);
        &self.base[..len]
    }

    /// Comparison key
    ///
    /// A development version extends its base with `u64::MAX`, so it sorts
    /// after every release sharing that base.
    pub fn key(&self) -> Vec<u64> {
        let mut key = self.trimmed_base().to_vec();
        if self.development {
            while key.len() < KEY_WIDTH {
                key.push(u64::MAX);
            }
        }
        key
    }

    /// Whether this development version tracks a branch that `other` belongs to
    fn tracks(&self, other: &ParsedVersion) -> bool {
        let base = self.trimmed_base();
        self.development && !base.is_empty() && other.trimmed_base().starts_with(base)
    }
}

impl fmt::Display for ParsedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Ord for ParsedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key()).then_with(|| {
            // A release sorts after its own pre-releases
            match (&self.pre_release, &other.pre_release) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            }
        })
    }
}

impl PartialEq for ParsedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ParsedVersion {}

impl PartialOrd for ParsedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Parsing and matching rules for one installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionScheme {
    development_prefix: String,
}

impl Default for VersionScheme {
    fn default() -> Self {
        Self::new(DEFAULT_DEVELOPMENT_PREFIX)
    }
}

fn parse_components(digits: &str, raw: &str) -> Result<Vec<u64>, ValidationError> {
    digits
        .split('.')
        .map(|c| {
            c.parse::<u64>()
                .map_err(|_| ValidationError::InvalidVersion(raw.to_string()))
        })
        .collect()
}

impl VersionScheme {
    pub fn new(development_prefix: impl Into<String>) -> Self {
        Self {
            development_prefix: development_prefix.into(),
        }
    }

    pub fn development_prefix(&self) -> &str {
        &self.development_prefix
    }

    /// Parse a version string
    pub fn parse(&self, raw: &str) -> Result<ParsedVersion, ValidationError> {
        let trimmed = raw.trim();

        if !self.development_prefix.is_empty() {
            if let Some(rest) = trimmed.strip_prefix(self.development_prefix.as_str()) {
                // Anything that is not a numeric branch is a named branch like `master`
                let base = match DEVELOPMENT_PATTERN.captures(rest) {
                    Some(caps) => parse_components(&caps[1], raw)?,
                    None => Vec::new(),
                };
                return Ok(ParsedVersion {
                    raw: raw.to_string(),
                    base,
                    development: true,
                    pre_release: None,
                });
            }
        }

        let caps = RELEASE_PATTERN
            .captures(trimmed)
            .ok_or_else(|| ValidationError::InvalidVersion(raw.to_string()))?;
        let base = parse_components(&caps[1], raw)?;
        let pre_release = match caps.get(2).and_then(|m| Stage::parse(m.as_str())) {
            Some(stage) => {
                let number = match caps.get(3).map(|m| m.as_str()) {
                    Some(n) if !n.is_empty() => n
                        .parse::<u64>()
                        .map_err(|_| ValidationError::InvalidVersion(raw.to_string()))?,
                    _ => 0,
                };
                Some(PreRelease { stage, number })
            }
            None => None,
        };

        Ok(ParsedVersion {
            raw: raw.to_string(),
            base,
            development: false,
            pre_release,
        })
    }

    /// Compare two version strings
    pub fn compare(&self, a: &str, b: &str) -> Result<Ordering, ValidationError> {
        Ok(self.parse(a)?.cmp(&self.parse(b)?))
    }

    /// Sort version strings; fails on the first one that does not parse
    pub fn sort<S: AsRef<str>>(
        &self,
        versions: &[S],
        order: SortOrder,
    ) -> Result<Vec<ParsedVersion>, ValidationError> {
        let mut parsed = versions
            .iter()
            .map(|v| self.parse(v.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        parsed.sort();
        if order == SortOrder::Descending {
            parsed.reverse();
        }
        Ok(parsed)
    }

    /// Map a requested version onto the closest registered one
    ///
    /// The request's pre-release suffix is ignored (`8.2.0rc1` looks for
    /// `8.2.0`). The highest registered version not above the request wins,
    /// unless the next version up is a development version tracking the
    /// request's branch, which then wins even over an exact release. When every
    /// registered version is above the request the lowest one is returned.
    /// Registered versions that do not parse are skipped.
    pub fn best_match<S: AsRef<str>>(
        &self,
        available: &[S],
        requested: &str,
    ) -> Result<Option<ParsedVersion>, ValidationError> {
        let request = self.parse(requested)?;
        let target = request.key();

        let mut versions: Vec<ParsedVersion> = available
            .iter()
            .filter_map(|v| match self.parse(v.as_ref()) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!("Skipping registered version: {}", e);
                    None
                }
            })
            .collect();
        versions.sort();

        let Some(lowest) = versions.first() else {
            return Ok(None);
        };

        let mut best: Option<&ParsedVersion> = None;
        for version in &versions {
            if version.key() <= target {
                best = Some(version);
                continue;
            }
            if version.tracks(&request) {
                best = Some(version);
            }
            break;
        }

        Ok(Some(best.unwrap_or(lowest).clone()))
    }
}

/// Best match with the default development prefix
pub fn resolve<S: AsRef<str>>(
    available: &[S],
    requested: &str,
) -> Result<Option<String>, ValidationError> {
    Ok(VersionScheme::default()
        .best_match(available, requested)?
        .map(|v| v.raw))
}
