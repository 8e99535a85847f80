//! The metadata model shared by every negotiation dimension.
//!
//! Four kinds of metadata describe a representation: its [`MediaType`], its
//! [`Language`]s, its [`CharacterSet`] and its [`Encoding`]s. They all
//! implement [`Metadata`], which gives them a normalized name, a parent
//! hierarchy ending at the "all" value, and an inclusion test used when
//! matching client preferences against variants.
//!
//! # Examples
//!
//! ```
//! use tessera_core::metadata::Metadata;
//! use tessera_core::language::{self, Language};
//!
//! let en_us = Language::parse("en-US").unwrap();
//! let chain: Vec<String> = en_us.ancestors().map(|l| l.name().to_string()).collect();
//! assert_eq!(chain, vec!["en", "*"]);
//! assert!(language::ENGLISH.includes(&en_us));
//! ```

use crate::character_set::CharacterSet;
use crate::encoding::Encoding;
use crate::language::Language;
use crate::media_type::MediaType;
use crate::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tessera_log::debug;

// ============================================================================
// Metadata Trait
// ============================================================================

/// Behaviour common to media types, languages, character sets and encodings.
///
/// Values are immutable and cheap to clone. Equality is by normalized name
/// (media types additionally compare parameters).
pub trait Metadata: Clone + PartialEq + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// The dimension this metadata belongs to.
    const KIND: MetadataKind;

    /// Normalized name, e.g. `text/html` or `en-us`.
    fn name(&self) -> &str;

    /// Human readable description, if one was registered.
    fn description(&self) -> Option<&str>;

    /// The next more general value, or `None` for the "all" value.
    fn parent(&self) -> Option<Self>;

    /// Check whether this value covers `other`.
    fn includes(&self, other: &Self) -> bool;

    /// Like [`includes`](Metadata::includes) but also comparing parameters
    /// where the kind has them. Used for preference ranges.
    fn includes_with_parameters(&self, other: &Self) -> bool {
        self.includes(other)
    }

    /// A concrete value contains no wildcard.
    fn is_concrete(&self) -> bool {
        !self.name().contains('*')
    }

    /// How precise this value is; `0` for the "all" value.
    fn specificity(&self) -> u8;

    /// Wrap a copy of this value into the kind-erased [`AnyMetadata`].
    fn to_any(&self) -> AnyMetadata;

    /// Iterate over the parent chain, nearest first.
    fn ancestors(&self) -> Ancestors<Self> {
        Ancestors {
            next: self.parent(),
        }
    }
}

/// Iterator over the parents of a metadata value.
#[derive(Debug, Clone)]
pub struct Ancestors<M> {
    next: Option<M>,
}

impl<M: Metadata> Iterator for Ancestors<M> {
    type Item = M;

    fn next(&mut self) -> Option<M> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

// ============================================================================
// Metadata Kinds
// ============================================================================

/// The four negotiation dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetadataKind {
    MediaType,
    Language,
    CharacterSet,
    Encoding,
}

impl MetadataKind {
    /// Get the kebab-case name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataKind::MediaType => "media-type",
            MetadataKind::Language => "language",
            MetadataKind::CharacterSet => "character-set",
            MetadataKind::Encoding => "encoding",
        }
    }
}

impl fmt::Display for MetadataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "media-type" | "mediatype" => Ok(MetadataKind::MediaType),
            "language" => Ok(MetadataKind::Language),
            "character-set" | "charset" => Ok(MetadataKind::CharacterSet),
            "encoding" => Ok(MetadataKind::Encoding),
            other => Err(crate::Error::InvalidMetadata(format!(
                "unknown metadata kind '{}'",
                other
            ))),
        }
    }
}

// ============================================================================
// AnyMetadata
// ============================================================================

/// Metadata of any kind, used where kinds flow together such as file
/// extension mappings.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyMetadata {
    MediaType(MediaType),
    Language(Language),
    CharacterSet(CharacterSet),
    Encoding(Encoding),
}

impl AnyMetadata {
    /// Resolve `name` as metadata of the given kind, preferring the
    /// registered instance.
    pub fn parse(kind: MetadataKind, name: &str) -> Result<Self> {
        Ok(match kind {
            MetadataKind::MediaType => AnyMetadata::MediaType(MediaType::value_of(name)?),
            MetadataKind::Language => AnyMetadata::Language(Language::value_of(name)?),
            MetadataKind::CharacterSet => {
                AnyMetadata::CharacterSet(CharacterSet::value_of(name)?)
            }
            MetadataKind::Encoding => AnyMetadata::Encoding(Encoding::value_of(name)?),
        })
    }

    pub fn kind(&self) -> MetadataKind {
        match self {
            AnyMetadata::MediaType(_) => MetadataKind::MediaType,
            AnyMetadata::Language(_) => MetadataKind::Language,
            AnyMetadata::CharacterSet(_) => MetadataKind::CharacterSet,
            AnyMetadata::Encoding(_) => MetadataKind::Encoding,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            AnyMetadata::MediaType(m) => m.name(),
            AnyMetadata::Language(m) => m.name(),
            AnyMetadata::CharacterSet(m) => m.name(),
            AnyMetadata::Encoding(m) => m.name(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            AnyMetadata::MediaType(m) => m.description(),
            AnyMetadata::Language(m) => m.description(),
            AnyMetadata::CharacterSet(m) => m.description(),
            AnyMetadata::Encoding(m) => m.description(),
        }
    }

    pub fn as_media_type(&self) -> Option<&MediaType> {
        match self {
            AnyMetadata::MediaType(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_language(&self) -> Option<&Language> {
        match self {
            AnyMetadata::Language(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_character_set(&self) -> Option<&CharacterSet> {
        match self {
            AnyMetadata::CharacterSet(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_encoding(&self) -> Option<&Encoding> {
        match self {
            AnyMetadata::Encoding(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for AnyMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<MediaType> for AnyMetadata {
    fn from(value: MediaType) -> Self {
        AnyMetadata::MediaType(value)
    }
}

impl From<Language> for AnyMetadata {
    fn from(value: Language) -> Self {
        AnyMetadata::Language(value)
    }
}

impl From<CharacterSet> for AnyMetadata {
    fn from(value: CharacterSet) -> Self {
        AnyMetadata::CharacterSet(value)
    }
}

impl From<Encoding> for AnyMetadata {
    fn from(value: Encoding) -> Self {
        AnyMetadata::Encoding(value)
    }
}

// ============================================================================
// Registry
// ============================================================================

/// A process-wide table of well-known metadata keyed by normalized name.
///
/// Readers share the lock; a miss takes the write lock for a single
/// insert-if-absent, so concurrent registrations of one name agree on the
/// stored instance.
#[derive(Debug)]
pub struct Registry<T> {
    entries: RwLock<HashMap<String, T>>,
}

impl<T: Clone> Registry<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Get the registered value for a normalized name.
    pub fn get(&self, name: &str) -> Option<T> {
        self.entries.read().get(name).cloned()
    }

    /// Get the registered value, inserting the one built by `make` if the
    /// name is unknown.
    pub fn get_or_insert_with(&self, name: &str, make: impl FnOnce() -> T) -> T {
        if let Some(existing) = self.get(name) {
            return existing;
        }

        let mut entries = self.entries.write();
        entries.entry(name.to_string()).or_insert_with(make).clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl<T: Clone> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Metadata> FromIterator<T> for Registry<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|value| (value.name().to_string(), value))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }
}

/// Insert `value` unless its name is already registered, returning the
/// stored instance.
pub(crate) fn register_in<T: Metadata>(registry: &Registry<T>, value: T) -> T {
    let key = value.name().to_string();
    let mut created = false;
    let stored = registry.get_or_insert_with(&key, || {
        created = true;
        value
    });

    if created {
        debug!(target: "tessera::registry", "Registered metadata"; kind = T::KIND, name = key);
    }

    stored
}

/// Declares well-known constants of a metadata kind.
///
/// Each constant resolves through the kind's registry on first use, and the
/// table of all names seeds that registry.
macro_rules! well_known {
    ($kind:ty { $($(#[$meta:meta])* $ident:ident => $name:literal, $desc:literal;)+ }) => {
        $(
            $(#[$meta])*
            pub static $ident: once_cell::sync::Lazy<$kind> =
                once_cell::sync::Lazy::new(|| <$kind>::well_known($name, $desc));
        )+

        pub(crate) const WELL_KNOWN: &[(&str, &str)] = &[$(($name, $desc)),+];
    };
}

pub(crate) use well_known;

/// Name and description storage for the kinds whose identity is a single
/// normalized token.
#[derive(Debug)]
pub(crate) struct Named {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
}

impl Named {
    pub(crate) fn new(name: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            name: name.into(),
            description: description.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{character_set, encoding, language, media_type};

    #[test]
    fn test_kind_from_str() {
        assert_eq!("media-type".parse::<MetadataKind>().unwrap(), MetadataKind::MediaType);
        assert_eq!("charset".parse::<MetadataKind>().unwrap(), MetadataKind::CharacterSet);
        assert_eq!("Character_Set".parse::<MetadataKind>().unwrap(), MetadataKind::CharacterSet);
        assert!("colour".parse::<MetadataKind>().is_err());
    }

    #[test]
    fn test_kind_serde_names() {
        let json = serde_json::to_string(&MetadataKind::CharacterSet).unwrap();
        assert_eq!(json, "\"character-set\"");
        let kind: MetadataKind = serde_json::from_str("\"media-type\"").unwrap();
        assert_eq!(kind, MetadataKind::MediaType);
    }

    #[test]
    fn test_any_metadata_parse() {
        let any = AnyMetadata::parse(MetadataKind::MediaType, "TEXT/HTML").unwrap();
        assert_eq!(any.kind(), MetadataKind::MediaType);
        assert_eq!(any.as_media_type(), Some(&*media_type::TEXT_HTML));
        assert_eq!(any.description(), Some("HTML document"));

        let any = AnyMetadata::parse(MetadataKind::Encoding, "x-gzip").unwrap();
        assert_eq!(any.as_encoding(), Some(&*encoding::GZIP));
        assert!(any.as_language().is_none());

        assert!(AnyMetadata::parse(MetadataKind::Language, "en us").is_err());
    }

    #[test]
    fn test_any_metadata_from() {
        let any: AnyMetadata = language::FRENCH.clone().into();
        assert_eq!(any.name(), "fr");
        assert_eq!(any.to_string(), "fr");

        let any: AnyMetadata = character_set::UTF_8.clone().into();
        assert_eq!(any.as_character_set(), Some(&*character_set::UTF_8));
    }

    #[test]
    fn test_registry_insert_if_absent() {
        let registry: Registry<Language> = Registry::new();
        assert!(registry.is_empty());

        let first = Language::parse("x-first").unwrap();
        let stored = register_in(&registry, first.clone());
        assert_eq!(stored, first);

        let again = register_in(&registry, Language::parse("x-first").unwrap());
        assert!(again.is_same_instance(&stored));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("x-first"));
        assert_eq!(registry.names(), vec!["x-first".to_string()]);
    }

    #[test]
    fn test_ancestors_terminate() {
        let mt = media_type::MediaType::parse("application/atom+xml; type=entry").unwrap();
        let chain: Vec<String> = mt.ancestors().map(|m| m.name().to_string()).collect();
        assert_eq!(chain, vec!["application/atom+xml", "application/*", "*/*"]);
    }
}
