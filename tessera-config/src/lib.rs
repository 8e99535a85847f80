// Negotiation settings for Tessera from files and environment variables

pub mod env;
pub mod error;
pub mod loader;
pub mod negotiation;
pub mod validation;

pub use env::{DEFAULT_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use negotiation::{ExtensionConfig, NegotiationConfig};
pub use validation::{ConfigValidator, Validate};

use tessera_core::MetadataService;

/// Build a metadata service from a settings file, then let `TESSERA_*`
/// environment variables override it.
pub fn load_metadata_service(path: impl AsRef<std::path::Path>) -> Result<MetadataService> {
    let mut config = NegotiationConfig::from_file(path)?;
    config.apply_env(&EnvLoader::tessera())?;
    config.build_metadata_service()
}
