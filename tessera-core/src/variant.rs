//! Representation variants offered by a resource.

use crate::character_set::CharacterSet;
use crate::encoding::Encoding;
use crate::language::Language;
use crate::media_type::MediaType;
use crate::metadata::Metadata;
use std::fmt;

/// One representation a resource can serve, described by its metadata.
///
/// A variant carries at most one media type and one character set, and any
/// number of languages and encodings. Absent values are neutral during
/// negotiation.
///
/// # Examples
///
/// ```
/// use tessera_core::{encoding, language, media_type};
/// use tessera_core::variant::Variant;
///
/// let variant = Variant::new(media_type::TEXT_HTML.clone())
///     .with_language(language::FRENCH.clone())
///     .with_encoding(encoding::GZIP.clone())
///     .with_identifier("/index.html.fr.gz");
///
/// assert_eq!(variant.to_string(), "text/html; language=fr; encoding=gzip");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variant {
    media_type: Option<MediaType>,
    character_set: Option<CharacterSet>,
    languages: Vec<Language>,
    encodings: Vec<Encoding>,
    identifier: Option<String>,
}

impl Variant {
    pub fn new(media_type: MediaType) -> Self {
        Self {
            media_type: Some(media_type),
            ..Self::default()
        }
    }

    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }

    pub fn with_character_set(mut self, character_set: CharacterSet) -> Self {
        self.character_set = Some(character_set);
        self
    }

    /// Add a language; duplicates are ignored.
    pub fn with_language(mut self, language: Language) -> Self {
        self.add_language(language);
        self
    }

    /// Add an encoding; duplicates are ignored.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.add_encoding(encoding);
        self
    }

    /// Set the URI or path the variant is served from.
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn set_media_type(&mut self, media_type: Option<MediaType>) {
        self.media_type = media_type;
    }

    pub fn set_character_set(&mut self, character_set: Option<CharacterSet>) {
        self.character_set = character_set;
    }

    pub fn add_language(&mut self, language: Language) {
        if !self.languages.contains(&language) {
            self.languages.push(language);
        }
    }

    pub fn add_encoding(&mut self, encoding: Encoding) {
        if !self.encodings.contains(&encoding) {
            self.encodings.push(encoding);
        }
    }

    pub fn media_type(&self) -> Option<&MediaType> {
        self.media_type.as_ref()
    }

    pub fn character_set(&self) -> Option<&CharacterSet> {
        self.character_set.as_ref()
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn encodings(&self) -> &[Encoding] {
        &self.encodings
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Check if the variant carries no metadata at all.
    pub fn is_empty(&self) -> bool {
        self.media_type.is_none()
            && self.character_set.is_none()
            && self.languages.is_empty()
            && self.encodings.is_empty()
    }
}

impl From<MediaType> for Variant {
    fn from(media_type: MediaType) -> Self {
        Variant::new(media_type)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(media_type) = &self.media_type {
            parts.push(media_type.name().to_string());
        }
        if let Some(character_set) = &self.character_set {
            parts.push(format!("charset={}", character_set));
        }
        if !self.languages.is_empty() {
            let names: Vec<&str> = self.languages.iter().map(|l| l.name()).collect();
            parts.push(format!("language={}", names.join(",")));
        }
        if !self.encodings.is_empty() {
            let names: Vec<&str> = self.encodings.iter().map(|e| e.name()).collect();
            parts.push(format!("encoding={}", names.join(",")));
        }

        if parts.is_empty() {
            f.write_str("(empty variant)")
        } else {
            f.write_str(&parts.join("; "))
        }
    }
}
