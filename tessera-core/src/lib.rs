//! Core metadata model and content negotiation for Tessera.
//!
//! This crate provides the four metadata kinds that describe a
//! representation ([`MediaType`], [`Language`], [`CharacterSet`] and
//! [`Encoding`]), the client [`ClientPreferences`] built from weighted
//! [`Preference`]s, and the negotiator that picks the best [`Variant`].
//!
//! # Examples
//!
//! ```
//! use tessera_core::prelude::*;
//! use tessera_core::{language, media_type};
//!
//! # fn main() -> tessera_core::Result<()> {
//! let preferences = ClientPreferences::new()
//!     .accept_media_type(media_type::TEXT_XML.clone(), 1.0)?
//!     .accept_media_type(media_type::TEXT_PLAIN.clone(), 0.5)?;
//!
//! let variants = [
//!     Variant::new(media_type::TEXT_PLAIN.clone()),
//!     Variant::new(media_type::TEXT_XML.clone()).with_language(language::ENGLISH.clone()),
//! ];
//!
//! let service = MetadataService::new();
//! let best = preferences.preferred_variant(&variants, &service).unwrap();
//! assert_eq!(best.media_type(), Some(&*media_type::TEXT_XML));
//! # Ok(())
//! # }
//! ```

pub mod character_set;
pub mod encoding;
pub mod error;
pub mod language;
pub mod media_type;
pub mod metadata;
pub mod negotiation;
pub mod preference;
pub mod service;
pub mod variant;

pub use character_set::CharacterSet;
pub use encoding::Encoding;
pub use error::{Error, Result};
pub use language::Language;
pub use media_type::{MediaType, Parameter};
pub use metadata::{AnyMetadata, Metadata, MetadataKind, Registry};
pub use negotiation::{preferred_variant, require_preferred_variant, score_variant};
pub use preference::{ClientPreferences, Preference, PreferenceList};
pub use service::{MetadataExtension, MetadataService, NegotiationMode};
pub use variant::Variant;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        AnyMetadata, CharacterSet, ClientPreferences, Encoding, Error, Language, MediaType,
        Metadata, MetadataKind, MetadataService, NegotiationMode, Preference, PreferenceList,
        Result, Variant,
    };
}
