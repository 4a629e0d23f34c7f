//! Provider descriptors, the invocation seam, and the registry.

pub mod http;
pub mod openai_compatible;
pub mod registry;

pub use openai_compatible::OpenAiCompatibleInvoker;
pub use registry::{ProviderRegistry, RegisteredProvider};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RelayError;
use crate::types::InvocationRequest;

/// Identity and capability flags of a provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Unique provider name.
    pub name: String,
    /// Whether the provider is usable at all.
    pub working: bool,
    /// Whether the provider supports the interaction mode resolution requires.
    pub supports_stream: bool,
}

impl ProviderDescriptor {
    /// A working provider with stream support.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            working: true,
            supports_stream: true,
        }
    }

    pub fn with_working(mut self, working: bool) -> Self {
        self.working = working;
        self
    }

    pub fn with_stream_support(mut self, supports_stream: bool) -> Self {
        self.supports_stream = supports_stream;
        self
    }

    /// Only usable providers supporting the interaction mode take part in
    /// catalog building and resolution.
    pub fn is_eligible(&self) -> bool {
        self.working && self.supports_stream
    }
}

/// Performs the actual call for one (variant, provider) candidate.
///
/// Implementations own the wire protocol and timeouts. Any `Err` marks the
/// candidate as failed; an empty `Ok` is treated as no answer.
#[async_trait]
pub trait ProviderInvoker: Send + Sync {
    async fn invoke(&self, request: &InvocationRequest<'_>) -> Result<String, RelayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eligibility_requires_both_flags() {
        assert!(ProviderDescriptor::new("p").is_eligible());
        assert!(!ProviderDescriptor::new("p").with_working(false).is_eligible());
        assert!(!ProviderDescriptor::new("p")
            .with_stream_support(false)
            .is_eligible());
    }
}
