//! Default metadata and file extension mappings.
//!
//! The [`MetadataService`] supplies the per-dimension defaults the negotiator
//! uses as tie-breaking hints, the [`NegotiationMode`], and an ordered table
//! mapping file extensions to metadata so that a file such as
//! `index.html.fr.gz` can be described as a [`Variant`].
//!
//! # Examples
//!
//! ```
//! use tessera_core::{encoding, language, media_type};
//! use tessera_core::service::MetadataService;
//!
//! let service = MetadataService::new();
//! let variant = service.variant_for_file_name("index.html.fr.gz");
//!
//! assert_eq!(variant.media_type(), Some(&*media_type::TEXT_HTML));
//! assert_eq!(variant.languages(), &[language::FRENCH.clone()]);
//! assert_eq!(variant.encodings(), &[encoding::GZIP.clone()]);
//! assert_eq!(service.extension_for(&*media_type::TEXT_PLAIN), Some("txt"));
//! ```

use crate::character_set::{self, CharacterSet};
use crate::encoding::{self, Encoding};
use crate::language::{self, Language};
use crate::media_type::{self, MediaType};
use crate::metadata::{AnyMetadata, Metadata};
use crate::variant::Variant;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tessera_log::trace;

// ============================================================================
// Negotiation Mode
// ============================================================================

/// How mismatches outside the media type dimension are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegotiationMode {
    /// Mismatching languages, character sets or encodings score zero.
    #[default]
    Flexible,
    /// Any mismatching dimension disqualifies the variant.
    Strict,
}

impl NegotiationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NegotiationMode::Flexible => "flexible",
            NegotiationMode::Strict => "strict",
        }
    }
}

impl fmt::Display for NegotiationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NegotiationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flexible" => Ok(NegotiationMode::Flexible),
            "strict" => Ok(NegotiationMode::Strict),
            other => Err(Error::InvalidMetadata(format!(
                "unknown negotiation mode '{}'",
                other
            ))),
        }
    }
}

// ============================================================================
// Extension Mappings
// ============================================================================

/// One file extension to metadata association.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataExtension {
    name: String,
    metadata: AnyMetadata,
}

impl MetadataExtension {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metadata(&self) -> &AnyMetadata {
        &self.metadata
    }
}

fn common_extensions() -> Vec<(&'static str, AnyMetadata)> {
    fn mt(value: &Lazy<MediaType>) -> AnyMetadata {
        AnyMetadata::MediaType(MediaType::clone(value))
    }
    fn lang(value: &Lazy<Language>) -> AnyMetadata {
        AnyMetadata::Language(Language::clone(value))
    }
    fn enc(value: &Lazy<Encoding>) -> AnyMetadata {
        AnyMetadata::Encoding(Encoding::clone(value))
    }

    vec![
        ("en", lang(&language::ENGLISH)),
        ("es", lang(&language::SPANISH)),
        ("fr", lang(&language::FRENCH)),
        ("de", lang(&language::GERMAN)),
        ("it", lang(&language::ITALIAN)),
        ("ja", lang(&language::JAPANESE)),
        ("ai", mt(&media_type::APPLICATION_POSTSCRIPT)),
        ("atom", mt(&media_type::APPLICATION_ATOM)),
        ("au", mt(&media_type::AUDIO_BASIC)),
        ("bin", mt(&media_type::APPLICATION_OCTET_STREAM)),
        ("bmp", mt(&media_type::IMAGE_BMP)),
        ("br", enc(&encoding::BROTLI)),
        ("class", mt(&media_type::APPLICATION_JAVA)),
        ("css", mt(&media_type::TEXT_CSS)),
        ("csv", mt(&media_type::TEXT_CSV)),
        ("dib", mt(&media_type::IMAGE_BMP)),
        ("doc", mt(&media_type::APPLICATION_WORD)),
        ("dtd", mt(&media_type::APPLICATION_XML_DTD)),
        ("eps", mt(&media_type::APPLICATION_POSTSCRIPT)),
        ("exe", mt(&media_type::APPLICATION_OCTET_STREAM)),
        ("gif", mt(&media_type::IMAGE_GIF)),
        ("gz", enc(&encoding::GZIP)),
        ("hqx", mt(&media_type::APPLICATION_MAC_BINHEX40)),
        ("htm", mt(&media_type::TEXT_HTML)),
        ("html", mt(&media_type::TEXT_HTML)),
        ("ico", mt(&media_type::IMAGE_ICON)),
        ("jad", mt(&media_type::TEXT_J2ME_APP_DESCRIPTOR)),
        ("jar", mt(&media_type::APPLICATION_JAVA_ARCHIVE)),
        ("java", mt(&media_type::TEXT_PLAIN)),
        ("jnlp", mt(&media_type::APPLICATION_JNLP)),
        ("jpe", mt(&media_type::IMAGE_JPEG)),
        ("jpeg", mt(&media_type::IMAGE_JPEG)),
        ("jpg", mt(&media_type::IMAGE_JPEG)),
        ("js", mt(&media_type::APPLICATION_JAVASCRIPT)),
        ("json", mt(&media_type::APPLICATION_JSON)),
        ("kar", mt(&media_type::AUDIO_MIDI)),
        ("latex", mt(&media_type::APPLICATION_LATEX)),
        ("man", mt(&media_type::APPLICATION_TROFF_MAN)),
        ("mathml", mt(&media_type::APPLICATION_MATHML)),
        ("mid", mt(&media_type::AUDIO_MIDI)),
        ("midi", mt(&media_type::AUDIO_MIDI)),
        ("mov", mt(&media_type::VIDEO_QUICKTIME)),
        ("mp2", mt(&media_type::AUDIO_MPEG)),
        ("mp3", mt(&media_type::AUDIO_MPEG)),
        ("mp4", mt(&media_type::VIDEO_MP4)),
        ("mpe", mt(&media_type::VIDEO_MPEG)),
        ("mpeg", mt(&media_type::VIDEO_MPEG)),
        ("mpg", mt(&media_type::VIDEO_MPEG)),
        ("pdf", mt(&media_type::APPLICATION_PDF)),
        ("png", mt(&media_type::IMAGE_PNG)),
        ("pps", mt(&media_type::APPLICATION_POWERPOINT)),
        ("ppt", mt(&media_type::APPLICATION_POWERPOINT)),
        ("ps", mt(&media_type::APPLICATION_POSTSCRIPT)),
        ("qt", mt(&media_type::VIDEO_QUICKTIME)),
        ("rdf", mt(&media_type::APPLICATION_RDF_XML)),
        ("rnc", mt(&media_type::APPLICATION_RELAXNG_COMPACT)),
        ("rng", mt(&media_type::APPLICATION_RELAXNG_XML)),
        ("rss", mt(&media_type::APPLICATION_RSS)),
        ("rtf", mt(&media_type::APPLICATION_RTF)),
        ("sit", mt(&media_type::APPLICATION_STUFFIT)),
        ("snd", mt(&media_type::AUDIO_BASIC)),
        ("svg", mt(&media_type::IMAGE_SVG)),
        ("swf", mt(&media_type::APPLICATION_FLASH)),
        ("tar", mt(&media_type::APPLICATION_TAR)),
        ("tex", mt(&media_type::APPLICATION_TEX)),
        ("tif", mt(&media_type::IMAGE_TIFF)),
        ("tiff", mt(&media_type::IMAGE_TIFF)),
        ("ulw", mt(&media_type::AUDIO_BASIC)),
        ("vrml", mt(&media_type::MODEL_VRML)),
        ("vxml", mt(&media_type::APPLICATION_VOICEXML)),
        ("wadl", mt(&media_type::APPLICATION_WADL)),
        ("wav", mt(&media_type::AUDIO_WAV)),
        ("wrl", mt(&media_type::MODEL_VRML)),
        ("xht", mt(&media_type::APPLICATION_XHTML)),
        ("xhtml", mt(&media_type::APPLICATION_XHTML)),
        ("xls", mt(&media_type::APPLICATION_EXCEL)),
        ("xml", mt(&media_type::TEXT_XML)),
        ("xml", mt(&media_type::APPLICATION_XML)),
        ("xsd", mt(&media_type::APPLICATION_W3C_SCHEMA)),
        ("xslt", mt(&media_type::APPLICATION_W3C_XSLT)),
        ("xul", mt(&media_type::APPLICATION_XUL)),
        ("yaml", mt(&media_type::APPLICATION_YAML)),
        ("z", mt(&media_type::APPLICATION_COMPRESS)),
        ("zip", mt(&media_type::APPLICATION_ZIP)),
        ("zst", enc(&encoding::ZSTD)),
    ]
}

// ============================================================================
// Metadata Service
// ============================================================================

static SHARED: Lazy<MetadataService> = Lazy::new(MetadataService::new);

/// Defaults and extension mappings consulted during negotiation.
#[derive(Debug, Clone)]
pub struct MetadataService {
    default_media_type: MediaType,
    default_language: Language,
    default_character_set: CharacterSet,
    default_encoding: Encoding,
    mode: NegotiationMode,
    mappings: Vec<MetadataExtension>,
}

impl MetadataService {
    /// Create a service with the standard defaults and the common extension
    /// table.
    pub fn new() -> Self {
        let mut service = Self::empty();
        service.add_common_extensions();
        service
    }

    /// Create a service with the standard defaults and no extensions.
    pub fn empty() -> Self {
        Self {
            default_media_type: media_type::APPLICATION_OCTET_STREAM.clone(),
            default_language: language::ENGLISH_US.clone(),
            default_character_set: character_set::UTF_8.clone(),
            default_encoding: encoding::IDENTITY.clone(),
            mode: NegotiationMode::default(),
            mappings: Vec::new(),
        }
    }

    /// A process-wide service with the standard configuration.
    pub fn shared() -> &'static MetadataService {
        &SHARED
    }

    /// Append the common extension table.
    pub fn add_common_extensions(&mut self) {
        for (extension, metadata) in common_extensions() {
            self.add_extension(extension, metadata, false);
        }
        // Plain text has several extensions; `txt` is the one reported back.
        self.add_extension("txt", media_type::TEXT_PLAIN.clone(), true);
        trace!("Loaded common extensions"; count = self.mappings.len());
    }

    /// Map `extension` to `metadata`. A preferred mapping goes first so that
    /// it wins both lookups.
    pub fn add_extension(&mut self, extension: &str, metadata: impl Into<AnyMetadata>, preferred: bool) {
        let mapping = MetadataExtension {
            name: extension.trim().trim_start_matches('.').to_ascii_lowercase(),
            metadata: metadata.into(),
        };

        if preferred {
            self.mappings.insert(0, mapping);
        } else {
            self.mappings.push(mapping);
        }
    }

    pub fn clear_extensions(&mut self) {
        self.mappings.clear();
    }

    pub fn extensions(&self) -> &[MetadataExtension] {
        &self.mappings
    }

    fn mappings_for<'a>(&'a self, extension: &str) -> impl Iterator<Item = &'a AnyMetadata> {
        let extension = extension.trim().trim_start_matches('.');
        self.mappings
            .iter()
            .filter(move |m| m.name.eq_ignore_ascii_case(extension))
            .map(|m| &m.metadata)
    }

    /// First metadata mapped to `extension`.
    pub fn metadata_for(&self, extension: &str) -> Option<&AnyMetadata> {
        self.mappings_for(extension).next()
    }

    /// First extension mapped to exactly `metadata`.
    pub fn extension_for<M: Metadata>(&self, metadata: &M) -> Option<&str> {
        let wanted = metadata.to_any();
        self.mappings
            .iter()
            .find(|m| m.metadata == wanted)
            .map(|m| m.name.as_str())
    }

    /// All extensions mapped to exactly `metadata`, in table order.
    pub fn extensions_for<M: Metadata>(&self, metadata: &M) -> Vec<&str> {
        let wanted = metadata.to_any();
        self.mappings
            .iter()
            .filter(|m| m.metadata == wanted)
            .map(|m| m.name.as_str())
            .collect()
    }

    pub fn media_type_for(&self, extension: &str) -> Option<&MediaType> {
        self.mappings_for(extension).find_map(AnyMetadata::as_media_type)
    }

    pub fn language_for(&self, extension: &str) -> Option<&Language> {
        self.mappings_for(extension).find_map(AnyMetadata::as_language)
    }

    pub fn character_set_for(&self, extension: &str) -> Option<&CharacterSet> {
        self.mappings_for(extension).find_map(AnyMetadata::as_character_set)
    }

    pub fn encoding_for(&self, extension: &str) -> Option<&Encoding> {
        self.mappings_for(extension).find_map(AnyMetadata::as_encoding)
    }

    /// Build a variant from a sequence of extensions. Later media types and
    /// character sets replace earlier ones; languages and encodings
    /// accumulate. Unknown extensions are skipped.
    pub fn variant_from_extensions<'e>(&self, extensions: impl IntoIterator<Item = &'e str>) -> Variant {
        let mut variant = Variant::default();
        for extension in extensions {
            match self.metadata_for(extension) {
                Some(AnyMetadata::MediaType(m)) => variant.set_media_type(Some(m.clone())),
                Some(AnyMetadata::CharacterSet(c)) => variant.set_character_set(Some(c.clone())),
                Some(AnyMetadata::Language(l)) => variant.add_language(l.clone()),
                Some(AnyMetadata::Encoding(e)) => variant.add_encoding(e.clone()),
                None => trace!("Unknown extension"; extension = extension),
            }
        }
        variant
    }

    /// Build a variant from a file name such as `index.html.fr.gz`; the part
    /// before the first dot is the base name.
    pub fn variant_for_file_name(&self, file_name: &str) -> Variant {
        let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
        let variant = self.variant_from_extensions(base.split('.').skip(1));
        variant.with_identifier(file_name)
    }

    pub fn default_media_type(&self) -> &MediaType {
        &self.default_media_type
    }

    pub fn default_language(&self) -> &Language {
        &self.default_language
    }

    pub fn default_character_set(&self) -> &CharacterSet {
        &self.default_character_set
    }

    pub fn default_encoding(&self) -> &Encoding {
        &self.default_encoding
    }

    pub fn mode(&self) -> NegotiationMode {
        self.mode
    }

    pub fn set_default_media_type(&mut self, media_type: MediaType) {
        self.default_media_type = media_type;
    }

    pub fn set_default_language(&mut self, language: Language) {
        self.default_language = language;
    }

    pub fn set_default_character_set(&mut self, character_set: CharacterSet) {
        self.default_character_set = character_set;
    }

    pub fn set_default_encoding(&mut self, encoding: Encoding) {
        self.default_encoding = encoding;
    }

    pub fn set_mode(&mut self, mode: NegotiationMode) {
        self.mode = mode;
    }

    /// Builder form of [`set_mode`](Self::set_mode).
    pub fn with_mode(mut self, mode: NegotiationMode) -> Self {
        self.mode = mode;
        self
    }
}

impl Default for MetadataService {
    fn default() -> Self {
        Self::new()
    }
}
