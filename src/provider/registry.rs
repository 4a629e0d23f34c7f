//! Provider registry for candidate enumeration.

use std::sync::Arc;
use std::time::Duration;

use super::{OpenAiCompatibleInvoker, ProviderDescriptor, ProviderInvoker};
use crate::config::RelayConfig;
use crate::error::{RelayError, Result};

/// A provider together with the raw models it reports and its invocation handle.
#[derive(Clone)]
pub struct RegisteredProvider {
    descriptor: ProviderDescriptor,
    models: Vec<String>,
    invoker: Arc<dyn ProviderInvoker>,
}

impl std::fmt::Debug for RegisteredProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredProvider")
            .field("descriptor", &self.descriptor)
            .field("models", &self.models)
            .field("invoker", &"..")
            .finish()
    }
}

impl RegisteredProvider {
    pub fn new(
        descriptor: ProviderDescriptor,
        models: Vec<String>,
        invoker: Arc<dyn ProviderInvoker>,
    ) -> Self {
        Self {
            descriptor,
            models,
            invoker,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    /// Raw model identifiers as reported by the provider.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn invoker(&self) -> &Arc<dyn ProviderInvoker> {
        &self.invoker
    }
}

/// Ordered set of providers. Declaration order is resolution order.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<RegisteredProvider>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Names must be unique.
    pub fn register(&mut self, provider: RegisteredProvider) -> Result<()> {
        if self.has_provider(provider.name()) {
            return Err(RelayError::InvalidArgument(format!(
                "Provider '{}' is already registered",
                provider.name()
            )));
        }
        self.providers.push(provider);
        Ok(())
    }

    /// Build OpenAI-compatible providers from configuration, in declared order.
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        let mut registry = Self::new();
        for entry in &config.providers {
            let invoker = OpenAiCompatibleInvoker::new(
                entry.base_url.clone(),
                entry.api_key(),
                Duration::from_secs(entry.timeout_secs),
            );
            let descriptor = ProviderDescriptor::new(entry.name.clone())
                .with_working(entry.working)
                .with_stream_support(entry.supports_stream);
            registry.register(RegisteredProvider::new(
                descriptor,
                entry.models.clone(),
                Arc::new(invoker),
            ))?;
        }
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredProvider> {
        self.providers.iter().find(|p| p.name() == name)
    }

    pub fn has_provider(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All providers in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredProvider> {
        self.providers.iter()
    }

    /// Usable providers supporting the interaction mode, in declaration order.
    pub fn eligible(&self) -> impl Iterator<Item = &RegisteredProvider> {
        self.providers
            .iter()
            .filter(|p| p.descriptor().is_eligible())
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
