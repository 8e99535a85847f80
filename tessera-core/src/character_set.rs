//! Character sets, named by their canonical upper-case IANA name.

use crate::metadata::{self, AnyMetadata, Metadata, MetadataKind, Named, Registry, well_known};
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

/// A character set such as `UTF-8`.
#[derive(Clone)]
pub struct CharacterSet {
    inner: Arc<Named>,
}

static REGISTRY: Lazy<Registry<CharacterSet>> = Lazy::new(|| {
    WELL_KNOWN
        .iter()
        .map(|(name, description)| CharacterSet::from_canonical(name, Some(description)))
        .collect()
});

/// Common spellings folded onto the canonical name.
const ALIASES: &[(&str, &str)] = &[
    ("UTF8", "UTF-8"),
    ("UTF16", "UTF-16"),
    ("LATIN1", "ISO-8859-1"),
    ("LATIN-1", "ISO-8859-1"),
    ("ISO8859-1", "ISO-8859-1"),
    ("ISO8859_1", "ISO-8859-1"),
    ("ISO_8859-1", "ISO-8859-1"),
    ("ASCII", "US-ASCII"),
    ("CP1252", "WINDOWS-1252"),
];

fn normalize(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() || name == "*" {
        return Ok("*".to_string());
    }

    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+')))
    {
        return Err(Error::invalid("character set", name, format!("illegal character {:?}", c)));
    }

    let upper = name.to_ascii_uppercase();
    Ok(ALIASES
        .iter()
        .find(|(alias, _)| *alias == upper)
        .map_or(upper, |(_, canonical)| canonical.to_string()))
}

impl CharacterSet {
    fn from_canonical(name: &str, description: Option<&str>) -> Self {
        Self {
            inner: Arc::new(Named::new(name, description)),
        }
    }

    pub(crate) fn well_known(name: &'static str, description: &'static str) -> Self {
        REGISTRY.get_or_insert_with(name, || Self::from_canonical(name, Some(description)))
    }

    pub fn parse(name: &str) -> Result<Self> {
        Ok(Self::from_canonical(&normalize(name)?, None))
    }

    pub fn register(name: &str, description: &str) -> Result<Self> {
        let candidate = Self::from_canonical(&normalize(name)?, Some(description));
        Ok(metadata::register_in(&REGISTRY, candidate))
    }

    pub fn value_of(name: &str) -> Result<Self> {
        let name = normalize(name)?;
        Ok(REGISTRY
            .get(&name)
            .unwrap_or_else(|| Self::from_canonical(&name, None)))
    }

    pub fn registry() -> &'static Registry<CharacterSet> {
        &REGISTRY
    }

    pub fn is_all(&self) -> bool {
        self.name() == "*"
    }

    pub fn is_same_instance(&self, other: &CharacterSet) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Metadata for CharacterSet {
    const KIND: MetadataKind = MetadataKind::CharacterSet;

    fn name(&self) -> &str {
        &self.inner.name
    }

    fn description(&self) -> Option<&str> {
        self.inner.description.as_deref()
    }

    fn parent(&self) -> Option<Self> {
        (!self.is_all()).then(|| ALL.clone())
    }

    fn includes(&self, other: &Self) -> bool {
        self.is_all() || self == other
    }

    fn specificity(&self) -> u8 {
        u8::from(!self.is_all())
    }

    fn to_any(&self) -> AnyMetadata {
        AnyMetadata::CharacterSet(self.clone())
    }
}

impl PartialEq for CharacterSet {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for CharacterSet {}

impl Hash for CharacterSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl fmt::Debug for CharacterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CharacterSet").field(&self.name()).finish()
    }
}

impl fmt::Display for CharacterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CharacterSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::value_of(s)
    }
}

well_known!(CharacterSet {
    ALL => "*", "All character sets";
    ISO_8859_1 => "ISO-8859-1", "ISO/IEC 8859-1 or Latin 1 character set";
    US_ASCII => "US-ASCII", "US ASCII character set";
    UTF_8 => "UTF-8", "UTF 8 character set";
    UTF_16 => "UTF-16", "UTF 16 character set";
    WINDOWS_1252 => "WINDOWS-1252", "Windows 1252 character set";
});
