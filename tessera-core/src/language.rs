//! Language tags such as `en`, `en-us` or `zh-hant-tw`.
//!
//! Tags are lower-cased; `_` is accepted as a subtag separator. The parent of
//! a tag drops its last subtag, and a primary tag's parent is [`ALL`].

use crate::metadata::{self, AnyMetadata, Metadata, MetadataKind, Named, Registry, well_known};
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

/// A normalized language tag.
#[derive(Clone)]
pub struct Language {
    inner: Arc<Named>,
}

static REGISTRY: Lazy<Registry<Language>> = Lazy::new(|| {
    WELL_KNOWN
        .iter()
        .map(|(name, description)| Language::from_canonical(name, Some(description)))
        .collect()
});

fn normalize(tag: &str) -> Result<String> {
    let tag = tag.trim();
    if tag.is_empty() || tag == "*" {
        return Ok("*".to_string());
    }

    let normalized = tag.replace('_', "-").to_ascii_lowercase();
    for subtag in normalized.split('-') {
        if subtag.is_empty() || subtag.len() > 8 {
            return Err(Error::invalid("language", tag, "subtags must be 1 to 8 characters"));
        }
        if let Some(c) = subtag.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(Error::invalid("language", tag, format!("illegal character {:?}", c)));
        }
    }

    Ok(normalized)
}

impl Language {
    fn from_canonical(name: &str, description: Option<&str>) -> Self {
        Self {
            inner: Arc::new(Named::new(name, description)),
        }
    }

    pub(crate) fn well_known(name: &'static str, description: &'static str) -> Self {
        REGISTRY.get_or_insert_with(name, || Self::from_canonical(name, Some(description)))
    }

    /// Parse a tag into a transient instance.
    pub fn parse(tag: &str) -> Result<Self> {
        Ok(Self::from_canonical(&normalize(tag)?, None))
    }

    /// Register a language, returning the existing instance if the tag is
    /// already known.
    pub fn register(tag: &str, description: &str) -> Result<Self> {
        let candidate = Self::from_canonical(&normalize(tag)?, Some(description));
        Ok(metadata::register_in(&REGISTRY, candidate))
    }

    /// Get the registered language for `tag`, or a transient one.
    pub fn value_of(tag: &str) -> Result<Self> {
        let name = normalize(tag)?;
        Ok(REGISTRY
            .get(&name)
            .unwrap_or_else(|| Self::from_canonical(&name, None)))
    }

    pub fn registry() -> &'static Registry<Language> {
        &REGISTRY
    }

    /// The first subtag, e.g. `en` for `en-us`.
    pub fn primary_tag(&self) -> &str {
        self.name().split('-').next().unwrap_or("*")
    }

    /// Subtags after the primary one.
    pub fn subtags(&self) -> impl Iterator<Item = &str> {
        self.name().split('-').skip(1)
    }

    pub fn is_all(&self) -> bool {
        self.name() == "*"
    }

    pub fn is_same_instance(&self, other: &Language) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Metadata for Language {
    const KIND: MetadataKind = MetadataKind::Language;

    fn name(&self) -> &str {
        &self.inner.name
    }

    fn description(&self) -> Option<&str> {
        self.inner.description.as_deref()
    }

    fn parent(&self) -> Option<Self> {
        if self.is_all() {
            return None;
        }
        match self.name().rsplit_once('-') {
            Some((parent, _)) => Some(REGISTRY.get(parent).unwrap_or_else(|| Self::from_canonical(parent, None))),
            None => Some(ALL.clone()),
        }
    }

    fn includes(&self, other: &Self) -> bool {
        if self.is_all() || self == other {
            return true;
        }
        other
            .name()
            .strip_prefix(self.name())
            .is_some_and(|rest| rest.starts_with('-'))
    }

    /// Number of subtags; `*` is 0.
    fn specificity(&self) -> u8 {
        if self.is_all() {
            0
        } else {
            u8::try_from(self.name().split('-').count()).unwrap_or(u8::MAX)
        }
    }

    fn to_any(&self) -> AnyMetadata {
        AnyMetadata::Language(self.clone())
    }
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Language {}

impl Hash for Language {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Language").field(&self.name()).finish()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::value_of(s)
    }
}

well_known!(Language {
    ALL => "*", "All languages";
    ENGLISH => "en", "English";
    ENGLISH_AUSTRALIA => "en-au", "English (Australia)";
    ENGLISH_CANADA => "en-ca", "English (Canada)";
    ENGLISH_NEW_ZEALAND => "en-nz", "English (New Zealand)";
    ENGLISH_UNITED_KINGDOM => "en-gb", "English (United Kingdom)";
    ENGLISH_US => "en-us", "English (USA)";
    FRENCH => "fr", "French";
    FRENCH_CANADA => "fr-ca", "French (Canada)";
    FRENCH_FRANCE => "fr-fr", "French (France)";
    GERMAN => "de", "German";
    GERMAN_AUSTRIA => "de-at", "German (Austria)";
    GERMAN_SWITZERLAND => "de-ch", "German (Switzerland)";
    ITALIAN => "it", "Italian";
    JAPANESE => "ja", "Japanese";
    SPANISH => "es", "Spanish";
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(Language::parse("en-US").unwrap().name(), "en-us");
        assert_eq!(Language::parse(" en_GB ").unwrap().name(), "en-gb");
        assert_eq!(Language::parse("").unwrap().name(), "*");
        assert!(Language::parse("*").unwrap().is_all());
    }

    #[test]
    fn test_invalid_tags() {
        for tag in ["en us", "en--us", "toolongtag", "en-", "fr;q=1", "日本"] {
            assert!(
                matches!(Language::parse(tag), Err(Error::InvalidMetadata(_))),
                "{:?}",
                tag
            );
        }
    }

    #[test]
    fn test_parent_chain() {
        let tag = Language::parse("zh-hant-tw").unwrap();
        let chain: Vec<String> = tag.ancestors().map(|l| l.name().to_string()).collect();
        assert_eq!(chain, vec!["zh-hant", "zh", "*"]);

        assert!(ENGLISH_US.parent().unwrap().is_same_instance(&ENGLISH));
        assert!(ALL.parent().is_none());
    }

    #[test]
    fn test_includes() {
        assert!(ALL.includes(&FRENCH));
        assert!(ENGLISH.includes(&ENGLISH_US));
        assert!(ENGLISH.includes(&ENGLISH));
        assert!(!ENGLISH_US.includes(&ENGLISH));
        assert!(!ENGLISH_US.includes(&ENGLISH_UNITED_KINGDOM));
        assert!(!ENGLISH.includes(&Language::parse("eng").unwrap()));
    }

    #[test]
    fn test_specificity() {
        assert_eq!(ALL.specificity(), 0);
        assert_eq!(ENGLISH.specificity(), 1);
        assert_eq!(ENGLISH_US.specificity(), 2);
    }

    #[test]
    fn test_tags() {
        let tag = Language::parse("sr-latn-rs").unwrap();
        assert_eq!(tag.primary_tag(), "sr");
        assert_eq!(tag.subtags().collect::<Vec<_>>(), vec!["latn", "rs"]);
    }

    #[test]
    fn test_value_of() {
        assert!(Language::value_of("EN-us").unwrap().is_same_instance(&ENGLISH_US));
        assert_eq!(ENGLISH_US.description(), Some("English (USA)"));

        let registered = Language::register("x-klingon", "Klingon").unwrap();
        let again = Language::register("X-Klingon", "Other").unwrap();
        assert!(registered.is_same_instance(&again));
        assert_eq!(again.description(), Some("Klingon"));
    }
}
