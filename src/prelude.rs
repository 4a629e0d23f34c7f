//! Convenience re-exports for common use.

pub use crate::config::{CatalogSettings, ProviderConfig, RelayConfig};
pub use crate::error::{RelayError, Result};
pub use crate::models::{normalize, Catalog, ModelCatalogBuilder};
pub use crate::provider::{
    ProviderDescriptor, ProviderInvoker, ProviderRegistry, RegisteredProvider,
};
pub use crate::resolver::{FallbackResolver, Resolution};
pub use crate::store::{Blacklist, BlacklistStore, FailureTracker};
pub use crate::types::{ChatRequest, ModelMessage, Role};
