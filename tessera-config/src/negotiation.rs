//! Negotiation settings and how they become a [`MetadataService`].
//!
//! Settings come from a JSON or TOML file, a `.env` file, or `TESSERA_*`
//! environment variables. Every name is checked against its metadata kind
//! before a service is built.
//!
//! # Examples
//!
//! ```
//! use tessera_config::{FileFormat, NegotiationConfig};
//! use tessera_core::{media_type, NegotiationMode};
//!
//! let config = NegotiationConfig::from_str_with_format(
//!     r#"
//!         mode = "strict"
//!         default_language = "fr"
//!
//!         [[extensions]]
//!         extension = "geojson"
//!         kind = "media-type"
//!         name = "application/geo+json"
//!     "#,
//!     FileFormat::Toml,
//! )
//! .unwrap();
//!
//! let service = config.build_metadata_service().unwrap();
//! assert_eq!(service.mode(), NegotiationMode::Strict);
//! assert_eq!(service.default_language().to_string(), "fr");
//! assert_eq!(service.media_type_for("html"), Some(&*media_type::TEXT_HTML));
//! assert_eq!(
//!     service.media_type_for("geojson").map(|m| m.to_string()),
//!     Some("application/geo+json".to_string())
//! );
//! ```

use crate::env::EnvLoader;
use crate::loader::{ConfigLoader, FileFormat};
use crate::validation::{ConfigValidator, Validate};
use crate::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tessera_core::{
    AnyMetadata, CharacterSet, Encoding, Language, MediaType, MetadataKind, MetadataService,
    NegotiationMode,
};
use tessera_log::{debug, info};

const TARGET: &str = "tessera::config";

// ============================================================================
// Settings
// ============================================================================

/// One extra file extension mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionConfig {
    pub extension: String,
    pub kind: MetadataKind,
    pub name: String,
    /// Put the mapping first so it is the one reported for its metadata.
    #[serde(default)]
    pub preferred: bool,
}

impl ExtensionConfig {
    pub fn new(extension: impl Into<String>, kind: MetadataKind, name: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            kind,
            name: name.into(),
            preferred: false,
        }
    }

    pub fn preferred(mut self) -> Self {
        self.preferred = true;
        self
    }
}

impl Validate for ExtensionConfig {
    fn validate(&self) -> Result<()> {
        ConfigValidator::is_extension(&self.extension, "extension")?;
        ConfigValidator::is_metadata(self.kind, &self.name, &format!("extension '{}'", self.extension))?;
        Ok(())
    }
}

/// Settings for the negotiator and its metadata service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationConfig {
    pub mode: NegotiationMode,
    pub default_media_type: String,
    pub default_language: String,
    pub default_character_set: String,
    pub default_encoding: String,
    /// Preload the common extension table.
    pub common_extensions: bool,
    pub extensions: Vec<ExtensionConfig>,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            mode: NegotiationMode::default(),
            default_media_type: "application/octet-stream".to_string(),
            default_language: "en-us".to_string(),
            default_character_set: "UTF-8".to_string(),
            default_encoding: "identity".to_string(),
            common_extensions: true,
            extensions: Vec::new(),
        }
    }
}

impl NegotiationConfig {
    /// Load settings from a file, detecting the format from its name.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let loader = ConfigLoader::auto(path)?;
        let config = match loader.format() {
            FileFormat::Env => {
                let value = loader.load_file(path)?;
                Self::from_pairs(string_pairs(&value))?
            }
            FileFormat::Json | FileFormat::Toml => loader.load_as(path)?,
        };

        debug!(target: TARGET, "Loaded negotiation settings"; path = path.display());
        Ok(config)
    }

    /// Parse settings from a string in the given format.
    pub fn from_str_with_format(content: &str, format: FileFormat) -> Result<Self> {
        let value = ConfigLoader::new(format).parse(content)?;
        match format {
            FileFormat::Env => Self::from_pairs(string_pairs(&value)),
            FileFormat::Json | FileFormat::Toml => serde_json::from_value(value)
                .map_err(|e| ConfigError::DeserializationError(e.to_string())),
        }
    }

    /// Defaults overridden by `TESSERA_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(&EnvLoader::tessera())?;
        Ok(config)
    }

    /// Read a `.env` file into the process environment, then load from it.
    ///
    /// Without a path a `.env` in the working directory is used if present.
    pub fn from_dotenv(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        Self::from_env()
    }

    /// Override settings with variables visible to `loader`.
    pub fn apply_env(&mut self, loader: &EnvLoader) -> Result<()> {
        let vars = loader.load()?;
        self.apply_overrides(vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Apply `key = value` string overrides. Keys are the field names,
    /// optionally prefixed with `tessera_`; unknown keys are ignored.
    pub fn apply_overrides<'a>(
        &mut self,
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<()> {
        for (key, value) in pairs {
            let lowered = key.to_ascii_lowercase();
            let key = lowered.strip_prefix("tessera_").unwrap_or(lowered.as_str());
            match key {
                "mode" => self.mode = value.parse()?,
                "default_media_type" => self.default_media_type = value.to_string(),
                "default_language" => self.default_language = value.to_string(),
                "default_character_set" => self.default_character_set = value.to_string(),
                "default_encoding" => self.default_encoding = value.to_string(),
                "common_extensions" => self.common_extensions = parse_bool(key, value)?,
                _ => continue,
            }
        }
        Ok(())
    }

    /// Settings as the string pairs [`apply_overrides`](Self::apply_overrides) reads.
    pub fn to_overrides(&self) -> HashMap<&'static str, String> {
        HashMap::from([
            ("mode", self.mode.to_string()),
            ("default_media_type", self.default_media_type.clone()),
            ("default_language", self.default_language.clone()),
            ("default_character_set", self.default_character_set.clone()),
            ("default_encoding", self.default_encoding.clone()),
            ("common_extensions", self.common_extensions.to_string()),
        ])
    }

    fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self> {
        let mut config = Self::default();
        config.apply_overrides(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
        Ok(config)
    }

    /// Validate every name and build the service.
    pub fn build_metadata_service(&self) -> Result<MetadataService> {
        self.validate()?;

        let mut service = if self.common_extensions {
            MetadataService::new()
        } else {
            MetadataService::empty()
        };
        service.set_mode(self.mode);

        service.set_default_media_type(MediaType::value_of(&self.default_media_type)?);
        service.set_default_language(Language::value_of(&self.default_language)?);
        service.set_default_character_set(CharacterSet::value_of(&self.default_character_set)?);
        service.set_default_encoding(Encoding::value_of(&self.default_encoding)?);

        for entry in &self.extensions {
            let metadata = AnyMetadata::parse(entry.kind, &entry.name)?;
            service.add_extension(&entry.extension, metadata, entry.preferred);
        }

        info!(
            target: TARGET,
            "Metadata service configured";
            mode = self.mode,
            extensions = service.extensions().len()
        );
        Ok(service)
    }
}

impl Validate for NegotiationConfig {
    fn validate(&self) -> Result<()> {
        ConfigValidator::is_metadata(MetadataKind::MediaType, &self.default_media_type, "default_media_type")?;
        ConfigValidator::is_metadata(MetadataKind::Language, &self.default_language, "default_language")?;
        ConfigValidator::is_metadata(
            MetadataKind::CharacterSet,
            &self.default_character_set,
            "default_character_set",
        )?;
        ConfigValidator::is_metadata(MetadataKind::Encoding, &self.default_encoding, "default_encoding")?;

        for entry in &self.extensions {
            entry.validate()?;
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::ParseError(format!(
            "{} expects a boolean, got '{}'",
            key, other
        ))),
    }
}

fn string_pairs(value: &serde_json::Value) -> Vec<(String, String)> {
    value
        .as_object()
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}
