/*!
 * Tests for package version parsing and best-match resolution
 */

use std::cmp::Ordering;

use transync::versions::{resolve, SortOrder, VersionScheme};

/// Test the documented resolution examples
#[test]
fn test_resolve_withReferenceExamples_shouldMatchExactly() {
    assert_eq!(
        resolve(&["1.0", "1.1", "dev-2.0"], "1.1").unwrap(),
        Some("1.1".to_string())
    );
    assert_eq!(resolve(&["1.0", "2.0"], "1.5").unwrap(), Some("1.0".to_string()));
    assert_eq!(resolve(&["1.0", "2.0"], "0.5").unwrap(), Some("1.0".to_string()));
    assert_eq!(resolve(&Vec::<String>::new(), "1.0").unwrap(), None);
}

/// Test that registration order does not matter
#[test]
fn test_resolve_withUnsortedInput_shouldSortFirst() {
    assert_eq!(
        resolve(&["2.0", "1.2", "1.10", "1.9"], "1.9.5").unwrap(),
        Some("1.9".to_string())
    );
    assert_eq!(
        resolve(&["2.0", "1.2", "1.10", "1.9"], "1.11").unwrap(),
        Some("1.10".to_string())
    );
}

/// Test that a development branch is preferred over an older release
#[test]
fn test_resolve_withDevelopmentBranchOfRequest_shouldPreferBranch() {
    assert_eq!(
        resolve(&["8.1", "dev-8.2.x", "9.0"], "8.2").unwrap(),
        Some("dev-8.2.x".to_string())
    );
    // Even when the request's release is registered
    assert_eq!(
        resolve(&["8.1", "8.2", "dev-8.2.x"], "8.2.0rc1").unwrap(),
        Some("dev-8.2.x".to_string())
    );
    // A branch of another line is never preferred
    assert_eq!(
        resolve(&["8.1", "dev-8.3.x", "9.0"], "8.2").unwrap(),
        Some("8.1".to_string())
    );
}

/// Test the total order over mixed version kinds
#[test]
fn test_sort_descending_shouldPutDevelopmentAboveItsReleases() {
    let sorted: Vec<String> = VersionScheme::default()
        .sort(&["1.0", "1.0.1", "dev-1.0", "1.0rc1", "0.9"], SortOrder::Descending)
        .unwrap()
        .into_iter()
        .map(|v| v.raw)
        .collect();
    assert_eq!(sorted, vec!["dev-1.0", "1.0.1", "1.0", "1.0rc1", "0.9"]);
}

/// Test comparison with a custom development prefix
#[test]
fn test_compare_withCustomPrefix_shouldTreatOldPrefixAsInvalid() {
    let scheme = VersionScheme::new("branch-");
    assert_eq!(scheme.compare("branch-2.0", "2.0.5").unwrap(), Ordering::Greater);
    assert!(scheme.compare("dev-2.0", "2.0").is_err());
}
