// Tessera - media type matching and content negotiation for Rust
//
// This library models media types, languages, character sets and encodings,
// and selects the representation variant that best fits a client's weighted
// preferences.

// Re-export core functionality
pub use tessera_core::*;

// Re-export logging
pub use tessera_log as log;

// Re-export optional crates
#[cfg(feature = "config")]
pub use tessera_config;

// Prelude for common imports
pub mod prelude {
    pub use tessera_core::prelude::*;
    pub use tessera_core::{character_set, encoding, language, media_type};
    pub use tessera_core::{preferred_variant, require_preferred_variant};

    #[cfg(feature = "config")]
    pub use tessera_config::NegotiationConfig;
}
