//! Content encodings (`gzip`, `br`, `identity`, ...).

use crate::metadata::{self, AnyMetadata, Metadata, MetadataKind, Named, Registry, well_known};
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

/// A content encoding token, lower-cased.
#[derive(Clone)]
pub struct Encoding {
    inner: Arc<Named>,
}

static REGISTRY: Lazy<Registry<Encoding>> = Lazy::new(|| {
    WELL_KNOWN
        .iter()
        .map(|(name, description)| Encoding::from_canonical(name, Some(description)))
        .collect()
});

fn normalize(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() || name == "*" {
        return Ok("*".to_string());
    }

    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+')))
    {
        return Err(Error::invalid("encoding", name, format!("illegal character {:?}", c)));
    }

    Ok(match name.to_ascii_lowercase().as_str() {
        "x-gzip" => "gzip".to_string(),
        "x-compress" => "compress".to_string(),
        other => other.to_string(),
    })
}

impl Encoding {
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

    pub fn registry() -> &'static Registry<Encoding> {
        &REGISTRY
    }

    pub fn is_all(&self) -> bool {
        self.name() == "*"
    }

    pub fn is_same_instance(&self, other: &Encoding) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Metadata for Encoding {
    const KIND: MetadataKind = MetadataKind::Encoding;

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
        AnyMetadata::Encoding(self.clone())
    }
}

impl PartialEq for Encoding {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Encoding {}

impl Hash for Encoding {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl fmt::Debug for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Encoding").field(&self.name()).finish()
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::value_of(s)
    }
}

well_known!(Encoding {
    ALL => "*", "All encodings";
    BROTLI => "br", "Brotli compression";
    COMPRESS => "compress", "Common Unix compression";
    DEFLATE => "deflate", "Deflate compression using the zlib format";
    GZIP => "gzip", "GZip compression";
    IDENTITY => "identity", "The default encoding with no transformation";
    ZIP => "zip", "Zip compression";
    ZSTD => "zstd", "Zstandard compression";
});
