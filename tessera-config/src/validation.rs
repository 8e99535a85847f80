// Configuration validation

use crate::{ConfigError, Result};
use tessera_core::{AnyMetadata, MetadataKind};

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Configuration validator with rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Validate a file extension: a non-empty token without dots inside.
    pub fn is_extension(value: &str, field: &str) -> Result<()> {
        Self::not_empty(value, field)?;
        let bare = value.trim().trim_start_matches('.');
        if bare.is_empty() || bare.contains(['.', '/', '\\']) || bare.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be a single file extension, got '{}'",
                field, value
            )));
        }
        Ok(())
    }

    /// Validate that `value` names metadata of the given kind.
    pub fn is_metadata(kind: MetadataKind, value: &str, field: &str) -> Result<AnyMetadata> {
        Self::not_empty(value, field)?;
        AnyMetadata::parse(kind, value).map_err(|e| {
            ConfigError::ValidationError(format!("{} is not a valid {}: {}", field, kind, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty_validation() {
        assert!(ConfigValidator::not_empty("value", "field").is_ok());
        assert!(ConfigValidator::not_empty("", "field").is_err());
        assert!(ConfigValidator::not_empty("  ", "field").is_err());
    }

    #[test]
    fn test_extension_validation() {
        assert!(ConfigValidator::is_extension("geojson", "extension").is_ok());
        assert!(ConfigValidator::is_extension(".md", "extension").is_ok());
        assert!(ConfigValidator::is_extension(".", "extension").is_err());
        assert!(ConfigValidator::is_extension("tar.gz", "extension").is_err());
        assert!(ConfigValidator::is_extension("a b", "extension").is_err());
    }

    #[test]
    fn test_metadata_validation() {
        let parsed =
            ConfigValidator::is_metadata(MetadataKind::MediaType, "Text/HTML", "default_media_type")
                .unwrap();
        assert_eq!(parsed.name(), "text/html");

        let err = ConfigValidator::is_metadata(MetadataKind::Language, "en us", "default_language")
            .unwrap_err();
        assert!(err.to_string().contains("default_language"));
    }
}
