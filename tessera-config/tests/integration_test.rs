//! Integration tests for tessera-config

use std::fs;
use tessera_config::*;
use tessera_core::{Metadata, MetadataKind, NegotiationMode, encoding, language, media_type};

#[test]
fn test_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tessera.toml");
    fs::write(
        &path,
        r#"
mode = "strict"
default_language = "fr-ca"
default_encoding = "x-gzip"

[[extensions]]
extension = "geojson"
kind = "media-type"
name = "application/geo+json"

[[extensions]]
extension = "htm5"
kind = "media-type"
name = "text/html"
preferred = true
"#,
    )
    .unwrap();

    let config = NegotiationConfig::from_file(&path).unwrap();
    assert_eq!(config.mode, NegotiationMode::Strict);
    assert_eq!(config.extensions.len(), 2);
    assert_eq!(config.extensions[0].kind, MetadataKind::MediaType);
    assert!(config.extensions[1].preferred);

    let service = config.build_metadata_service().unwrap();
    assert_eq!(service.default_language(), &*language::FRENCH_CANADA);
    assert_eq!(service.default_encoding(), &*encoding::GZIP);
    assert_eq!(service.extension_for(&*media_type::TEXT_HTML), Some("htm5"));

    let variant = service.variant_for_file_name("map.geojson.fr");
    assert_eq!(variant.media_type().map(|m| m.name()), Some("application/geo+json"));
    assert_eq!(variant.languages(), &[language::FRENCH.clone()]);
}

#[test]
fn test_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tessera.json");
    fs::write(&path, r#"{"common_extensions": false, "default_media_type": "text/plain"}"#).unwrap();

    let service = NegotiationConfig::from_file(&path)
        .unwrap()
        .build_metadata_service()
        .unwrap();
    assert_eq!(service.default_media_type(), &*media_type::TEXT_PLAIN);
    assert!(service.extensions().is_empty());
}

#[test]
fn test_env_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".env");
    fs::write(&path, "# negotiation\nTESSERA_MODE=strict\nTESSERA_COMMON_EXTENSIONS=no\n").unwrap();

    let config = NegotiationConfig::from_file(&path).unwrap();
    assert_eq!(config.mode, NegotiationMode::Strict);
    assert!(!config.common_extensions);
}

#[test]
fn test_unknown_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tessera.yaml");
    fs::write(&path, "mode: strict").unwrap();

    assert!(matches!(
        NegotiationConfig::from_file(&path),
        Err(ConfigError::LoadError(_))
    ));
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        NegotiationConfig::from_file("/nonexistent/tessera.toml"),
        Err(ConfigError::LoadError(_))
    ));
}

#[test]
fn test_bad_extension_entry() {
    let json = r#"{"extensions": [{"extension": "x", "kind": "language", "name": "not a tag"}]}"#;
    let config = NegotiationConfig::from_str_with_format(json, FileFormat::Json).unwrap();
    assert!(matches!(
        config.build_metadata_service(),
        Err(ConfigError::ValidationError(_))
    ));

    let json = r#"{"extensions": [{"extension": "x", "kind": "colour", "name": "red"}]}"#;
    assert!(matches!(
        NegotiationConfig::from_str_with_format(json, FileFormat::Json),
        Err(ConfigError::DeserializationError(_))
    ));
}

#[test]
fn test_env_loader_with_prefix() {
    unsafe {
        std::env::set_var("TESSERA_IT_DEFAULT_LANGUAGE", "ja");
        std::env::set_var("TESSERA_IT_MODE", "strict");
    }

    let mut config = NegotiationConfig::default();
    config
        .apply_env(&EnvLoader::new(Some("TESSERA_IT".to_string())))
        .unwrap();
    assert_eq!(config.default_language, "ja");
    assert_eq!(config.mode, NegotiationMode::Strict);

    unsafe {
        std::env::remove_var("TESSERA_IT_DEFAULT_LANGUAGE");
        std::env::remove_var("TESSERA_IT_MODE");
    }
}
