/*!
 * Tests for language tag utilities
 */

use transync::language_utils::{language_display_name, validate_language_tag};

/// Test validation of locale tags with region and script subtags
#[test]
fn test_validateLanguageTag_withLocaleTags_shouldAcceptSubtags() {
    assert_eq!(validate_language_tag("zh_Hant_TW").unwrap(), "zh");
    assert_eq!(validate_language_tag("es-419").unwrap(), "es");
    assert_eq!(validate_language_tag("deu").unwrap(), "deu");
}

/// Test rejection of malformed tags
#[test]
fn test_validateLanguageTag_withMalformedTags_shouldFail() {
    assert!(validate_language_tag("english").is_err());
    assert!(validate_language_tag("de_DEUTSCHLAND").is_err());
    assert!(validate_language_tag("_DE").is_err());
}

/// Test display names for bare and regional tags
#[test]
fn test_languageDisplayName_shouldUseEnglishNames() {
    assert_eq!(language_display_name("ru").unwrap(), "Russian");
    assert_eq!(language_display_name("fr_CA").unwrap(), "French (CA)");
    assert!(language_display_name("zz").is_err());
}
