//! Weighted client preferences.
//!
//! A [`PreferenceList`] holds `(metadata, quality)` pairs for one dimension in
//! the order the client gave them; [`ClientPreferences`] groups the four
//! dimensions of a request.
//!
//! # Examples
//!
//! ```
//! use tessera_core::media_type::{self, MediaType};
//! use tessera_core::preference::ClientPreferences;
//! use tessera_core::service::MetadataService;
//!
//! # fn main() -> tessera_core::Result<()> {
//! let prefs = ClientPreferences::new()
//!     .accept_media_type(media_type::TEXT_XML.clone(), 1.0)?
//!     .accept_media_type(media_type::TEXT_PLAIN.clone(), 0.5)?;
//!
//! let available = [media_type::TEXT_PLAIN.clone(), media_type::TEXT_XML.clone()];
//! let service = MetadataService::new();
//! assert_eq!(
//!     prefs.preferred_media_type(&available, &service),
//!     Some(&*media_type::TEXT_XML)
//! );
//! assert_eq!(prefs.media_types().quality_for(&media_type::TEXT_PLAIN), 0.5);
//! # Ok(())
//! # }
//! ```

use crate::character_set::CharacterSet;
use crate::encoding::Encoding;
use crate::language::Language;
use crate::media_type::MediaType;
use crate::metadata::Metadata;
use crate::negotiation;
use crate::service::MetadataService;
use crate::variant::Variant;
use crate::{Error, Result};
use std::fmt;

// ============================================================================
// Preference
// ============================================================================

/// A metadata value with the quality a client assigns it.
#[derive(Debug, Clone, PartialEq)]
pub struct Preference<T> {
    metadata: T,
    quality: f32,
}

impl<T: Metadata> Preference<T> {
    /// Quality used when the client gives none.
    pub const DEFAULT_QUALITY: f32 = 1.0;

    pub fn new(metadata: T) -> Self {
        Self {
            metadata,
            quality: Self::DEFAULT_QUALITY,
        }
    }

    /// Create a preference, rejecting qualities outside `[0, 1]`.
    pub fn with_quality(metadata: T, quality: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&quality) {
            return Err(Error::InvalidQuality(quality));
        }
        Ok(Self { metadata, quality })
    }

    pub fn metadata(&self) -> &T {
        &self.metadata
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }
}

impl<T: Metadata> fmt::Display for Preference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};q={}", self.metadata, self.quality)
    }
}

// ============================================================================
// Preference List
// ============================================================================

/// Preferences for one dimension, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceList<T> {
    entries: Vec<Preference<T>>,
}

impl<T: Metadata> PreferenceList<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a preference with quality 1.0.
    pub fn add(&mut self, metadata: T) -> &mut Self {
        self.entries.push(Preference::new(metadata));
        self
    }

    /// Append a preference with an explicit quality.
    pub fn add_with_quality(&mut self, metadata: T, quality: f32) -> Result<&mut Self> {
        self.entries.push(Preference::with_quality(metadata, quality)?);
        Ok(self)
    }

    pub fn push(&mut self, preference: Preference<T>) {
        self.entries.push(preference);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Preference<T>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The highest-quality entry whose metadata includes `value`. The
    /// earliest entry wins among equal qualities.
    pub fn preferred_for(&self, value: &T) -> Option<&Preference<T>> {
        let mut best: Option<&Preference<T>> = None;
        for preference in self.entries.iter().filter(|p| p.metadata.includes(value)) {
            if best.is_none_or(|b| preference.quality > b.quality) {
                best = Some(preference);
            }
        }
        best
    }

    /// Quality of [`preferred_for`](Self::preferred_for), or `0.0`.
    pub fn quality_for(&self, value: &T) -> f32 {
        self.preferred_for(value).map_or(0.0, Preference::quality)
    }
}

impl<T: Metadata> Default for PreferenceList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a PreferenceList<T> {
    type Item = &'a Preference<T>;
    type IntoIter = std::slice::Iter<'a, Preference<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<T: Metadata> FromIterator<Preference<T>> for PreferenceList<T> {
    fn from_iter<I: IntoIterator<Item = Preference<T>>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<T: Metadata> Extend<Preference<T>> for PreferenceList<T> {
    fn extend<I: IntoIterator<Item = Preference<T>>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

// ============================================================================
// Client Preferences
// ============================================================================

/// The four preference lists of one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientPreferences {
    media_types: PreferenceList<MediaType>,
    languages: PreferenceList<Language>,
    character_sets: PreferenceList<CharacterSet>,
    encodings: PreferenceList<Encoding>,
}

impl ClientPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept_media_type(mut self, media_type: MediaType, quality: f32) -> Result<Self> {
        self.media_types.add_with_quality(media_type, quality)?;
        Ok(self)
    }

    pub fn accept_language(mut self, language: Language, quality: f32) -> Result<Self> {
        self.languages.add_with_quality(language, quality)?;
        Ok(self)
    }

    pub fn accept_character_set(mut self, character_set: CharacterSet, quality: f32) -> Result<Self> {
        self.character_sets.add_with_quality(character_set, quality)?;
        Ok(self)
    }

    pub fn accept_encoding(mut self, encoding: Encoding, quality: f32) -> Result<Self> {
        self.encodings.add_with_quality(encoding, quality)?;
        Ok(self)
    }

    pub fn media_types(&self) -> &PreferenceList<MediaType> {
        &self.media_types
    }

    pub fn languages(&self) -> &PreferenceList<Language> {
        &self.languages
    }

    pub fn character_sets(&self) -> &PreferenceList<CharacterSet> {
        &self.character_sets
    }

    pub fn encodings(&self) -> &PreferenceList<Encoding> {
        &self.encodings
    }

    pub fn media_types_mut(&mut self) -> &mut PreferenceList<MediaType> {
        &mut self.media_types
    }

    pub fn languages_mut(&mut self) -> &mut PreferenceList<Language> {
        &mut self.languages
    }

    pub fn character_sets_mut(&mut self) -> &mut PreferenceList<CharacterSet> {
        &mut self.character_sets
    }

    pub fn encodings_mut(&mut self) -> &mut PreferenceList<Encoding> {
        &mut self.encodings
    }

    /// Check if the client expressed no preference in any dimension.
    pub fn is_empty(&self) -> bool {
        self.media_types.is_empty()
            && self.languages.is_empty()
            && self.character_sets.is_empty()
            && self.encodings.is_empty()
    }

    /// Negotiate over full variants with the given service.
    pub fn preferred_variant<'a>(
        &self,
        variants: &'a [Variant],
        service: &MetadataService,
    ) -> Option<&'a Variant> {
        negotiation::preferred_variant(variants, self, service)
    }

    pub fn preferred_media_type<'a>(
        &self,
        available: &'a [MediaType],
        service: &MetadataService,
    ) -> Option<&'a MediaType> {
        let variants: Vec<Variant> = available.iter().cloned().map(Variant::new).collect();
        preferred_index(&variants, self, service).map(|index| &available[index])
    }

    pub fn preferred_language<'a>(
        &self,
        available: &'a [Language],
        service: &MetadataService,
    ) -> Option<&'a Language> {
        let variants: Vec<Variant> = available
            .iter()
            .map(|language| Variant::default().with_language(language.clone()))
            .collect();
        preferred_index(&variants, self, service).map(|index| &available[index])
    }

    pub fn preferred_character_set<'a>(
        &self,
        available: &'a [CharacterSet],
        service: &MetadataService,
    ) -> Option<&'a CharacterSet> {
        let variants: Vec<Variant> = available
            .iter()
            .map(|charset| Variant::default().with_character_set(charset.clone()))
            .collect();
        preferred_index(&variants, self, service).map(|index| &available[index])
    }

    pub fn preferred_encoding<'a>(
        &self,
        available: &'a [Encoding],
        service: &MetadataService,
    ) -> Option<&'a Encoding> {
        let variants: Vec<Variant> = available
            .iter()
            .map(|encoding| Variant::default().with_encoding(encoding.clone()))
            .collect();
        preferred_index(&variants, self, service).map(|index| &available[index])
    }
}

/// Run the negotiator and map the winner back to its position.
fn preferred_index(
    variants: &[Variant],
    preferences: &ClientPreferences,
    service: &MetadataService,
) -> Option<usize> {
    let selected = negotiation::preferred_variant(variants, preferences, service)?;
    variants.iter().position(|v| std::ptr::eq(v, selected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::NegotiationMode;
    use crate::{character_set, encoding, language, media_type};

    #[test]
    fn test_default_quality() {
        let mut list = PreferenceList::new();
        list.add(media_type::TEXT_HTML.clone());
        assert_eq!(list.len(), 1);
        assert_eq!(list.iter().next().unwrap().quality(), 1.0);
    }

    #[test]
    fn test_invalid_quality() {
        let mut list = PreferenceList::new();
        for quality in [-0.1, 1.01, f32::NAN, f32::INFINITY] {
            let err = list.add_with_quality(language::ENGLISH.clone(), quality).unwrap_err();
            assert!(matches!(err, Error::InvalidQuality(_)));
        }
        assert!(list.is_empty());

        list.add_with_quality(language::ENGLISH.clone(), 0.0).unwrap();
        list.add_with_quality(language::FRENCH.clone(), 1.0).unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_insertion_order() {
        let mut list = PreferenceList::new();
        list.add_with_quality(encoding::GZIP.clone(), 0.2)
            .unwrap()
            .add(encoding::BROTLI.clone())
            .add_with_quality(encoding::IDENTITY.clone(), 0.5)
            .unwrap();

        let names: Vec<&str> = list.iter().map(|p| p.metadata().name()).collect();
        assert_eq!(names, vec!["gzip", "br", "identity"]);
    }

    #[test]
    fn test_preferred_for() {
        let mut list = PreferenceList::new();
        list.add_with_quality(media_type::ALL.clone(), 0.1)
            .unwrap()
            .add_with_quality(media_type::TEXT_ALL.clone(), 0.5)
            .unwrap()
            .add_with_quality(media_type::TEXT_ALL.clone(), 0.5)
            .unwrap();

        let best = list.preferred_for(&media_type::TEXT_PLAIN).unwrap();
        assert_eq!(best.metadata(), &*media_type::TEXT_ALL);
        assert!(std::ptr::eq(best, list.iter().nth(1).unwrap()));

        assert_eq!(list.quality_for(&media_type::IMAGE_PNG), 0.1);
        assert_eq!(list.quality_for(&media_type::TEXT_PLAIN), 0.5);

        let empty: PreferenceList<MediaType> = PreferenceList::new();
        assert_eq!(empty.quality_for(&media_type::TEXT_PLAIN), 0.0);
        assert!(empty.preferred_for(&media_type::TEXT_PLAIN).is_none());
    }

    #[test]
    fn test_client_preferences_builders() {
        let prefs = ClientPreferences::new()
            .accept_language(language::ENGLISH_US.clone(), 1.0)
            .unwrap()
            .accept_character_set(character_set::UTF_8.clone(), 0.8)
            .unwrap();

        assert!(!prefs.is_empty());
        assert_eq!(prefs.languages().len(), 1);
        assert_eq!(prefs.character_sets().quality_for(&character_set::UTF_8), 0.8);
        assert!(prefs.media_types().is_empty());
        assert!(ClientPreferences::new().is_empty());

        let err = ClientPreferences::new()
            .accept_encoding(encoding::GZIP.clone(), 2.0)
            .unwrap_err();
        assert_eq!(err, Error::InvalidQuality(2.0));
    }

    #[test]
    fn test_preferred_language() {
        let prefs = ClientPreferences::new()
            .accept_language(language::ENGLISH_US.clone(), 1.0)
            .unwrap()
            .accept_language(language::FRENCH_FRANCE.clone(), 0.9)
            .unwrap();

        let available = [language::FRENCH.clone(), language::ENGLISH.clone()];
        assert_eq!(prefs.preferred_language(&available, &MetadataService::new()), Some(&*language::ENGLISH));
    }

    #[test]
    fn test_preferred_encoding_and_charset() {
        let mut prefs = ClientPreferences::new();
        prefs.encodings_mut().add(encoding::BROTLI.clone());
        prefs.encodings_mut().add_with_quality(encoding::GZIP.clone(), 0.8).unwrap();
        prefs.character_sets_mut().add(character_set::ISO_8859_1.clone());

        let encodings = [encoding::GZIP.clone(), encoding::BROTLI.clone()];
        assert_eq!(prefs.preferred_encoding(&encodings, &MetadataService::new()), Some(&*encoding::BROTLI));

        let charsets = [character_set::UTF_8.clone(), character_set::ISO_8859_1.clone()];
        assert_eq!(prefs.preferred_character_set(&charsets, &MetadataService::new()), Some(&*character_set::ISO_8859_1));
    }

    #[test]
    fn test_preferred_media_type_none() {
        let prefs = ClientPreferences::new()
            .accept_media_type(media_type::APPLICATION_JSON.clone(), 1.0)
            .unwrap();
        let service = MetadataService::new();
        assert!(prefs.preferred_media_type(&[media_type::TEXT_HTML.clone()], &service).is_none());
        assert!(prefs.preferred_media_type(&[], &service).is_none());
    }

    #[test]
    fn test_single_dimension_helpers_follow_service() {
        let prefs = ClientPreferences::new()
            .accept_language(language::GERMAN.clone(), 1.0)
            .unwrap();
        let available = [language::FRENCH.clone()];

        let flexible = MetadataService::new();
        assert_eq!(prefs.preferred_language(&available, &flexible), Some(&*language::FRENCH));

        let strict = MetadataService::new().with_mode(NegotiationMode::Strict);
        assert!(prefs.preferred_language(&available, &strict).is_none());

        let mut custom = MetadataService::new();
        custom.set_default_encoding(encoding::GZIP.clone());
        let encodings = [encoding::IDENTITY.clone(), encoding::GZIP.clone()];
        assert_eq!(
            ClientPreferences::new().preferred_encoding(&encodings, &custom),
            Some(&*encoding::GZIP)
        );
    }

    #[test]
    fn test_preference_display() {
        let pref = Preference::with_quality(media_type::TEXT_HTML.clone(), 0.5).unwrap();
        assert_eq!(pref.to_string(), "text/html;q=0.5");
    }
}
