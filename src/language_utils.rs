use anyhow::{Result, anyhow};
use isolang::Language;

/// Language tag utilities
///
/// Language identifiers are locale tags such as `de`, `pt_BR` or
/// `sr-Latn`: an ISO 639-1 or ISO 639-2 code, optionally followed by
/// script/region subtags separated by `_` or `-`.

/// Map ISO 639-2/B codes that differ from their ISO 639-2/T form
fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    match code {
        "fre" => Some("fra"),
        "ger" => Some("deu"),
        "dut" => Some("nld"),
        "gre" => Some("ell"),
        "chi" => Some("zho"),
        "cze" => Some("ces"),
        "ice" => Some("isl"),
        "alb" => Some("sqi"),
        "arm" => Some("hye"),
        "baq" => Some("eus"),
        "bur" => Some("mya"),
        "per" => Some("fas"),
        "geo" => Some("kat"),
        "may" => Some("msa"),
        "mac" => Some("mkd"),
        "rum" => Some("ron"),
        "slo" => Some("slk"),
        "wel" => Some("cym"),
        _ => None,
    }
}

/// Look up the ISO language named by a primary subtag
fn primary_language(primary: &str) -> Option<Language> {
    let code = primary.to_lowercase();
    match code.len() {
        2 => Language::from_639_1(&code),
        3 => Language::from_639_3(part2b_to_part2t(&code).unwrap_or(&code)),
        _ => None,
    }
}

/// Split a tag into its primary subtag and the remaining subtags
fn split_tag(tag: &str) -> (&str, Vec<&str>) {
    let mut parts = tag.trim().split(['_', '-']);
    let primary = parts.next().unwrap_or("");
    (primary, parts.collect())
}

/// Validate a language tag and return its primary subtag
pub fn validate_language_tag(tag: &str) -> Result<String> {
    let (primary, rest) = split_tag(tag);

    if primary_language(primary).is_none() {
        return Err(anyhow!("Invalid language tag: {}", tag));
    }

    for subtag in rest {
        let valid = (2..=8).contains(&subtag.len())
            && subtag.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid {
            return Err(anyhow!("Invalid subtag '{}' in language tag: {}", subtag, tag));
        }
    }

    Ok(primary.to_lowercase())
}

/// English display name of a tag, e.g. `Portuguese (BR)` for `pt_BR`
pub fn language_display_name(tag: &str) -> Result<String> {
    validate_language_tag(tag)?;
    let (primary, rest) = split_tag(tag);
    let lang = primary_language(primary)
        .ok_or_else(|| anyhow!("Failed to get language from tag: {}", tag))?;

    if rest.is_empty() {
        Ok(lang.to_name().to_string())
    } else {
        Ok(format!("{} ({})", lang.to_name(), rest.join(", ")))
    }
}
