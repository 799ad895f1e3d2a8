/*!
 * Tests for the engine's error tiers
 */

use transync::{EngineError, ValidationError};

/// Test that validation errors stay distinguishable after passing through anyhow
#[test]
fn test_engineError_fromAnyhow_shouldKeepValidationTier() {
    let error: EngineError =
        anyhow::Error::new(ValidationError::UnknownPackage("core".to_string())).into();
    assert!(error.is_validation());
    assert_eq!(error.to_string(), "Validation error: Unknown package: core");
}

/// Test that anything else becomes an infrastructure error
#[test]
fn test_engineError_fromPlainAnyhow_shouldBeInfrastructure() {
    let error: EngineError = anyhow::anyhow!("disk on fire").into();
    assert!(!error.is_validation());
    assert!(matches!(error, EngineError::Infrastructure(ref msg) if msg.contains("disk on fire")));
}

/// Test the messages of slot errors
#[test]
fn test_validationError_display_shouldNameTheItem() {
    let error = ValidationError::PluralSlotMismatch {
        index: 4,
        expected: 3,
        actual: 2,
    };
    assert!(error.to_string().contains('4'));
}
