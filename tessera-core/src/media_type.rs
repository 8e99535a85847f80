//! Media types (MIME types) and their matching rules.
//!
//! A [`MediaType`] is a main type, a subtype and an ordered list of
//! [`Parameter`]s. Either token may be the `*` wildcard, and a subtype of the
//! form `*+suffix` matches every structured syntax with that suffix
//! (`application/*+xml` includes `application/atom+xml` and
//! `application/xml`).
//!
//! # Examples
//!
//! ```
//! use tessera_core::media_type::{self, MediaType};
//! use tessera_core::metadata::Metadata;
//!
//! let entry = MediaType::parse("Application/Atom+XML; type=entry").unwrap();
//! assert_eq!(entry.name(), "application/atom+xml; type=entry");
//! assert_eq!(entry.parent().as_ref(), Some(&*media_type::APPLICATION_ATOM));
//!
//! assert!(media_type::APPLICATION_ALL_XML.includes(&entry));
//! assert_eq!(
//!     MediaType::most_specific(&[
//!         media_type::ALL.clone(),
//!         media_type::TEXT_ALL.clone(),
//!         media_type::TEXT_PLAIN.clone(),
//!     ])
//!     .unwrap(),
//!     *media_type::TEXT_PLAIN
//! );
//! ```

use crate::metadata::{self, AnyMetadata, Metadata, MetadataKind, Registry, well_known};
use crate::{Error, Result};
use once_cell::sync::Lazy;
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

/// Characters that may not appear in a type, subtype or parameter name.
const TSPECIALS: &str = "()<>@,;:/[]?=\\\"";

type Parameters = SmallVec<[Parameter; 2]>;

// ============================================================================
// Parameters
// ============================================================================

/// A `name=value` media type parameter.
///
/// Names are case-insensitive and stored lower-cased; values are kept as
/// written, surrounding whitespace aside.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Parameter {
    name: String,
    value: String,
}

impl Parameter {
    pub fn new(name: &str, value: &str) -> Result<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid("parameter", name, "empty name"));
        }
        if trimmed == "*" {
            return Err(Error::invalid("parameter", name, "wildcard name"));
        }

        Ok(Self {
            name: normalize_token("parameter", trimmed)?,
            value: value.trim().to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Trim and validate a single token, lower-casing it. Empty means `*`.
fn normalize_token(kind: &str, token: &str) -> Result<String> {
    let token = token.trim();
    if token.is_empty() || token == "*" {
        return Ok("*".to_string());
    }

    if let Some(c) = token
        .chars()
        .find(|&c| (c as u32) <= 32 || (c as u32) >= 127 || TSPECIALS.contains(c))
    {
        return Err(Error::invalid(kind, token, format!("illegal character {:?}", c)));
    }

    Ok(token.to_ascii_lowercase())
}

fn parse_parts(name: &str) -> Result<(String, String, Parameters)> {
    let (type_part, parameter_part) = match name.split_once(';') {
        Some((type_part, rest)) => (type_part, Some(rest)),
        None => (name, None),
    };

    // Without a separator the whole name is the main type.
    let (main_type, sub_type) = match type_part.split_once('/') {
        Some((main, sub)) => (
            normalize_token("media type", main)?,
            normalize_token("media type", sub)?,
        ),
        None => (normalize_token("media type", type_part)?, "*".to_string()),
    };

    let mut parameters = Parameters::new();
    for piece in parameter_part.into_iter().flat_map(|rest| rest.split(';')) {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        let (key, value) = piece
            .split_once('=')
            .ok_or_else(|| Error::invalid("media type", name, format!("parameter '{}' has no value", piece)))?;
        parameters.push(Parameter::new(key, value)?);
    }

    Ok((main_type, sub_type, parameters))
}

fn canonical_name(main_type: &str, sub_type: &str, parameters: &[Parameter]) -> String {
    let mut name = String::with_capacity(main_type.len() + sub_type.len() + 1);
    name.push_str(main_type);
    name.push('/');
    name.push_str(sub_type);
    for parameter in parameters {
        name.push_str("; ");
        name.push_str(&parameter.name);
        name.push('=');
        name.push_str(&parameter.value);
    }
    name
}

/// Normalize a media type name, appending `parameters` after any parameters
/// already present in `name`.
///
/// ```
/// use tessera_core::media_type::{normalize, Parameter};
///
/// let extra = [Parameter::new("charset", "UTF-8").unwrap()];
/// assert_eq!(normalize(" TEXT / Plain ", &extra).unwrap(), "text/plain; charset=UTF-8");
/// assert_eq!(normalize("application", &[]).unwrap(), "application/*");
/// assert!(normalize("text/pl ain", &[]).is_err());
/// ```
pub fn normalize(name: &str, parameters: &[Parameter]) -> Result<String> {
    let (main_type, sub_type, mut merged) = parse_parts(name)?;
    merged.extend(parameters.iter().cloned());
    Ok(canonical_name(&main_type, &sub_type, &merged))
}

// ============================================================================
// Media Type
// ============================================================================

#[derive(Debug)]
struct Inner {
    name: String,
    main_type: String,
    sub_type: String,
    parameters: Parameters,
    description: Option<String>,
}

/// An immutable, cheaply clonable media type.
#[derive(Clone)]
pub struct MediaType {
    inner: Arc<Inner>,
}

static REGISTRY: Lazy<Registry<MediaType>> = Lazy::new(|| {
    WELL_KNOWN
        .iter()
        .map(|(name, description)| MediaType::from_static(name, description))
        .collect()
});

impl MediaType {
    fn from_parts(
        main_type: &str,
        sub_type: &str,
        parameters: Parameters,
        description: Option<&str>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: canonical_name(main_type, sub_type, &parameters),
                main_type: main_type.to_string(),
                sub_type: sub_type.to_string(),
                parameters,
                description: description.map(str::to_string),
            }),
        }
    }

    fn from_static(name: &str, description: &str) -> Self {
        let (main_type, sub_type) = name.split_once('/').unwrap_or((name, "*"));
        Self::from_parts(main_type, sub_type, Parameters::new(), Some(description))
    }

    pub(crate) fn well_known(name: &'static str, description: &'static str) -> Self {
        REGISTRY.get_or_insert_with(name, || Self::from_static(name, description))
    }

    /// The registered instance for `main/sub`, or a fresh one.
    fn base(main_type: &str, sub_type: &str) -> Self {
        REGISTRY
            .get(&canonical_name(main_type, sub_type, &[]))
            .unwrap_or_else(|| Self::from_parts(main_type, sub_type, Parameters::new(), None))
    }

    /// Parse a media type name such as `text/html; charset=UTF-8`.
    ///
    /// The result is a transient instance; use [`value_of`](Self::value_of)
    /// to get the registered one.
    pub fn parse(name: &str) -> Result<Self> {
        Self::parse_with_parameters(name, std::iter::empty())
    }

    /// Parse a media type name and append extra parameters.
    pub fn parse_with_parameters(
        name: &str,
        parameters: impl IntoIterator<Item = Parameter>,
    ) -> Result<Self> {
        let (main_type, sub_type, mut merged) = parse_parts(name)?;
        merged.extend(parameters);
        Ok(Self::from_parts(&main_type, &sub_type, merged, None))
    }

    /// Register a media type, returning the existing instance when the
    /// normalized name is already known.
    pub fn register(name: &str, description: &str) -> Result<Self> {
        let (main_type, sub_type, parameters) = parse_parts(name)?;
        let candidate = Self::from_parts(&main_type, &sub_type, parameters, Some(description));
        Ok(metadata::register_in(&REGISTRY, candidate))
    }

    /// Get the registered media type for `name`, or a transient one.
    pub fn value_of(name: &str) -> Result<Self> {
        let parsed = Self::parse(name)?;
        Ok(REGISTRY.get(parsed.name()).unwrap_or(parsed))
    }

    /// The process-wide media type registry.
    pub fn registry() -> &'static Registry<MediaType> {
        &REGISTRY
    }

    /// Pick the most specific of several media types.
    ///
    /// Scans left to right starting from the first value; a later candidate
    /// replaces the current one when its main type is not `*` and the current
    /// one still has a wildcard.
    pub fn most_specific(media_types: &[MediaType]) -> Result<MediaType> {
        let (first, rest) = media_types
            .split_first()
            .ok_or_else(|| Error::EmptyInput("no media type to choose from".to_string()))?;

        let mut result = first;
        for candidate in rest {
            if candidate.main_type() == "*" {
                continue;
            }
            if result.main_type() == "*" || result.sub_type().contains('*') {
                result = candidate;
            }
        }

        Ok(result.clone())
    }

    pub fn main_type(&self) -> &str {
        &self.inner.main_type
    }

    pub fn sub_type(&self) -> &str {
        &self.inner.sub_type
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.inner.parameters
    }

    pub fn has_parameters(&self) -> bool {
        !self.inner.parameters.is_empty()
    }

    /// First value of the named parameter.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.inner
            .parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.value.as_str())
    }

    /// Check if this is `*/*` without parameters.
    pub fn is_all(&self) -> bool {
        self.main_type() == "*" && self.sub_type() == "*" && !self.has_parameters()
    }

    /// Return a new media type with one more parameter.
    pub fn with_parameter(&self, name: &str, value: &str) -> Result<Self> {
        let mut parameters = self.inner.parameters.clone();
        parameters.push(Parameter::new(name, value)?);
        Ok(Self::from_parts(self.main_type(), self.sub_type(), parameters, None))
    }

    /// The same type without its parameters.
    pub fn without_parameters(&self) -> Self {
        if self.has_parameters() {
            Self::base(self.main_type(), self.sub_type())
        } else {
            self.clone()
        }
    }

    /// Inclusion test with explicit parameter handling.
    ///
    /// When parameters are compared, every parameter of `self` must appear
    /// with the same value among `other`'s parameters.
    pub fn includes_with(&self, other: &MediaType, ignore_parameters: bool) -> bool {
        if self.is_all() || self == other {
            return true;
        }

        if self.main_type() != other.main_type() {
            return false;
        }

        if self.sub_type() == other.sub_type() {
            return ignore_parameters
                || self
                    .parameters()
                    .iter()
                    .all(|p| other.parameter(p.name()) == Some(p.value()));
        }

        if self.sub_type() == "*" {
            return true;
        }

        self.sub_type()
            .strip_prefix("*+")
            .is_some_and(|suffix| other.sub_type().ends_with(suffix))
    }

    /// Equality that ignores parameters.
    pub fn eq_ignoring_parameters(&self, other: &MediaType) -> bool {
        self.main_type() == other.main_type() && self.sub_type() == other.sub_type()
    }

    /// Check if either type includes the other.
    pub fn is_compatible(&self, other: &MediaType) -> bool {
        self.includes(other) || other.includes(self)
    }

    /// Check if both handles point at the same instance.
    pub fn is_same_instance(&self, other: &MediaType) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Metadata for MediaType {
    const KIND: MetadataKind = MetadataKind::MediaType;

    fn name(&self) -> &str {
        &self.inner.name
    }

    fn description(&self) -> Option<&str> {
        self.inner.description.as_deref()
    }

    fn parent(&self) -> Option<Self> {
        if self.has_parameters() {
            Some(Self::base(self.main_type(), self.sub_type()))
        } else if self.sub_type() != "*" {
            Some(Self::base(self.main_type(), "*"))
        } else if self.main_type() == "*" {
            None
        } else {
            Some(ALL.clone())
        }
    }

    fn includes(&self, other: &Self) -> bool {
        self.includes_with(other, true)
    }

    /// Only the type tokens count; `*+xml` and wildcard parameter values are
    /// still concrete.
    fn is_concrete(&self) -> bool {
        self.main_type() != "*" && self.sub_type() != "*"
    }

    fn includes_with_parameters(&self, other: &Self) -> bool {
        self.includes_with(other, false)
    }

    /// `*/*` is 0, `type/*` 1, `type/*+suffix` 2, `type/sub` 3, plus one when
    /// parameters narrow it further.
    fn specificity(&self) -> u8 {
        let base = if self.main_type() == "*" {
            0
        } else if self.sub_type() == "*" {
            1
        } else if self.sub_type().starts_with("*+") {
            2
        } else {
            3
        };
        base + u8::from(self.has_parameters())
    }

    fn to_any(&self) -> AnyMetadata {
        AnyMetadata::MediaType(self.clone())
    }
}

impl PartialEq for MediaType {
    fn eq(&self, other: &Self) -> bool {
        if self.is_same_instance(other) {
            return true;
        }
        if !self.eq_ignoring_parameters(other)
            || self.parameters().len() != other.parameters().len()
        {
            return false;
        }

        let mut left: SmallVec<[&Parameter; 4]> = self.parameters().iter().collect();
        let mut right: SmallVec<[&Parameter; 4]> = other.parameters().iter().collect();
        left.sort();
        right.sort();
        left == right
    }
}

impl Eq for MediaType {}

impl Hash for MediaType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.main_type().hash(state);
        self.sub_type().hash(state);
    }
}

impl fmt::Debug for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MediaType").field(&self.name()).finish()
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MediaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::value_of(s)
    }
}

// ============================================================================
// Well-known Media Types
// ============================================================================

well_known!(MediaType {
    /// `*/*`
    ALL => "*/*", "All media";
    APPLICATION_ALL => "application/*", "All application documents";
    APPLICATION_ALL_JSON => "application/*+json", "All application/*+json documents";
    APPLICATION_ALL_XML => "application/*+xml", "All application/*+xml documents";
    APPLICATION_ATOM => "application/atom+xml", "Atom document";
    APPLICATION_ATOMPUB_CATEGORY => "application/atomcat+xml", "Atom category document";
    APPLICATION_ATOMPUB_SERVICE => "application/atomsvc+xml", "Atom service document";
    APPLICATION_COMPRESS => "application/x-compress", "Compressed file";
    APPLICATION_EXCEL => "application/vnd.ms-excel", "Microsoft Excel document";
    APPLICATION_FLASH => "application/x-shockwave-flash", "Shockwave Flash object";
    APPLICATION_GNU_TAR => "application/x-gtar", "GNU Tar archive";
    APPLICATION_GNU_ZIP => "application/x-gzip", "GNU Zip archive";
    APPLICATION_JAVA => "application/java", "Java class";
    APPLICATION_JAVA_ARCHIVE => "application/java-archive", "Java archive";
    APPLICATION_JAVASCRIPT => "application/javascript", "Javascript document";
    APPLICATION_JNLP => "application/x-java-jnlp-file", "JNLP";
    APPLICATION_JSON => "application/json", "JavaScript Object Notation document";
    APPLICATION_JSON_PATCH => "application/json-patch+json", "JSON patch document";
    APPLICATION_LATEX => "application/x-latex", "LaTeX";
    APPLICATION_MAC_BINHEX40 => "application/mac-binhex40", "Mac binhex40";
    APPLICATION_MATHML => "application/mathml+xml", "MathML XML document";
    APPLICATION_OCTET_STREAM => "application/octet-stream", "Raw octet stream";
    APPLICATION_PDF => "application/pdf", "Adobe PDF document";
    APPLICATION_POSTSCRIPT => "application/postscript", "Postscript document";
    APPLICATION_POWERPOINT => "application/vnd.ms-powerpoint", "Microsoft Powerpoint document";
    APPLICATION_RDF_XML => "application/rdf+xml", "Resource Description Framework document";
    APPLICATION_RELAXNG_COMPACT => "application/relax-ng-compact-syntax", "Relax NG Schema document, Compact syntax";
    APPLICATION_RELAXNG_XML => "application/x-relax-ng+xml", "Relax NG Schema document, XML syntax";
    APPLICATION_RSS => "application/rss+xml", "Really Simple Syndication document";
    APPLICATION_RTF => "application/rtf", "Rich Text Format document";
    APPLICATION_STUFFIT => "application/x-stuffit", "Stuffit archive";
    APPLICATION_TAR => "application/x-tar", "Tar archive";
    APPLICATION_TEX => "application/x-tex", "Tex file";
    APPLICATION_TROFF_MAN => "application/x-troff-man", "Manual file";
    APPLICATION_VOICEXML => "application/voicexml+xml", "VoiceXML";
    APPLICATION_W3C_SCHEMA => "application/x-xsd+xml", "W3C XML Schema document";
    APPLICATION_W3C_XSLT => "application/xslt+xml", "W3C XSLT Stylesheet";
    APPLICATION_WADL => "application/vnd.sun.wadl+xml", "Web Application Description Language document";
    APPLICATION_WORD => "application/msword", "Microsoft Word document";
    APPLICATION_WWW_FORM => "application/x-www-form-urlencoded", "Web form (URL encoded)";
    APPLICATION_XHTML => "application/xhtml+xml", "XHTML document";
    APPLICATION_XML => "application/xml", "XML document";
    APPLICATION_XML_DTD => "application/xml-dtd", "XML DTD";
    APPLICATION_XUL => "application/vnd.mozilla.xul+xml", "XUL document";
    APPLICATION_YAML => "application/x-yaml", "YAML document";
    APPLICATION_ZIP => "application/zip", "Zip archive";
    AUDIO_ALL => "audio/*", "All audios";
    AUDIO_BASIC => "audio/basic", "AU audio";
    AUDIO_MIDI => "audio/midi", "MIDI audio";
    AUDIO_MPEG => "audio/mpeg", "MPEG audio (MP3)";
    AUDIO_WAV => "audio/x-wav", "Waveform audio";
    IMAGE_ALL => "image/*", "All images";
    IMAGE_BMP => "image/bmp", "Windows bitmap";
    IMAGE_GIF => "image/gif", "GIF image";
    IMAGE_ICON => "image/x-icon", "Windows icon (Favicon)";
    IMAGE_JPEG => "image/jpeg", "JPEG image";
    IMAGE_PNG => "image/png", "PNG image";
    IMAGE_SVG => "image/svg+xml", "Scalable Vector Graphics";
    IMAGE_TIFF => "image/tiff", "TIFF image";
    MESSAGE_ALL => "message/*", "All messages";
    MODEL_ALL => "model/*", "All models";
    MODEL_VRML => "model/vrml", "VRML";
    MULTIPART_ALL => "multipart/*", "All multipart data";
    MULTIPART_FORM_DATA => "multipart/form-data", "Multipart form data";
    TEXT_ALL => "text/*", "All texts";
    TEXT_CALENDAR => "text/calendar", "iCalendar event";
    TEXT_CSS => "text/css", "CSS stylesheet";
    TEXT_CSV => "text/csv", "Comma-separated Values";
    TEXT_HTML => "text/html", "HTML document";
    TEXT_J2ME_APP_DESCRIPTOR => "text/vnd.sun.j2me.app-descriptor", "J2ME Application Descriptor";
    TEXT_JAVASCRIPT => "text/javascript", "Javascript document";
    TEXT_PLAIN => "text/plain", "Plain text";
    TEXT_URI_LIST => "text/uri-list", "List of URIs";
    TEXT_XML => "text/xml", "XML text";
    TEXT_YAML => "text/yaml", "YAML document";
    VIDEO_ALL => "video/*", "All videos";
    VIDEO_AVI => "video/x-msvideo", "AVI video";
    VIDEO_MP4 => "video/mp4", "MPEG-4 video";
    VIDEO_MPEG => "video/mpeg", "MPEG video";
    VIDEO_QUICKTIME => "video/quicktime", "Quicktime video";
});
