//! Fallback resolution of logical models.
//!
//! A logical model expands to candidates: every raw variant in catalog order,
//! crossed with every eligible provider in registry order. The resolver walks
//! them one at a time, skipping anything blacklisted or previously failed,
//! and returns the first non-empty answer. Each failed invocation is written
//! to the [`FailureTracker`] before moving on, so later resolutions (in this
//! process or the next) never retry that pair.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::models::{Catalog, ModelCatalogBuilder};
use crate::provider::{ProviderRegistry, RegisteredProvider};
use crate::store::{Blacklist, BlacklistStore, FailureTracker};
use crate::types::{ChatRequest, InvocationRequest};

/// The answer to a resolution and the candidate that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub text: String,
    pub variant: String,
    pub provider: String,
    /// Number of invocations made, including the successful one.
    pub attempts: usize,
}

/// One (raw variant, provider) pair in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub variant: &'a str,
    pub provider: &'a str,
}

/// Why a candidate was passed over without being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ProviderBlacklisted,
    PreviouslyFailed,
    PairBlacklisted,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ProviderBlacklisted => "provider blacklisted",
            Self::PreviouslyFailed => "previously failed",
            Self::PairBlacklisted => "pair blacklisted",
        };
        f.write_str(s)
    }
}

/// Resolves logical models against a provider registry with persistent
/// failure memory.
#[derive(Debug, Clone)]
pub struct FallbackResolver {
    registry: Arc<ProviderRegistry>,
    catalog: Arc<Catalog>,
    blacklist: Arc<Blacklist>,
    failures: Arc<FailureTracker>,
}

impl FallbackResolver {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        catalog: Catalog,
        blacklist: Blacklist,
        failures: Arc<FailureTracker>,
    ) -> Self {
        Self {
            registry,
            catalog: Arc::new(catalog),
            blacklist: Arc::new(blacklist),
            failures,
        }
    }

    /// Load the persisted state named by `config` and build the catalog once
    /// for this session.
    pub fn from_config(config: &RelayConfig, registry: ProviderRegistry) -> Self {
        let blacklist = BlacklistStore::new(config.blacklist_path()).load();
        let failures = FailureTracker::open(config.failures_path());
        let catalog =
            ModelCatalogBuilder::new(config.catalog.clone()).build(&registry, &blacklist);
        Self::new(Arc::new(registry), catalog, blacklist, Arc::new(failures))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    pub fn failures(&self) -> &Arc<FailureTracker> {
        &self.failures
    }

    /// Logical models available for resolution, sorted.
    pub fn list_models(&self) -> Vec<&str> {
        self.catalog.names()
    }

    /// Every candidate for `model` in the order resolution would visit them,
    /// before any skip filter is applied.
    pub fn candidates(&self, model: &str) -> Result<Vec<Candidate<'_>>> {
        let variants = self.variants(model)?;
        Ok(self
            .candidate_iter(variants)
            .map(|(variant, provider)| Candidate {
                variant,
                provider: provider.name(),
            })
            .collect())
    }

    /// Resolve `model` and return the first successful answer.
    pub async fn resolve(&self, model: &str, request: &ChatRequest) -> Result<Resolution> {
        self.resolve_with_cancel(model, request, &CancellationToken::new())
            .await
    }

    /// Like [`resolve`](Self::resolve), abandoning the walk once `cancel` fires.
    ///
    /// The token is checked before each candidate and raced against the
    /// in-flight invocation, which is dropped on cancellation. A cancelled
    /// invocation is not recorded as a failure.
    pub async fn resolve_with_cancel(
        &self,
        model: &str,
        request: &ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<Resolution> {
        let variants = self.variants(model)?;

        let mut attempted = 0;
        let mut skipped = 0;

        for (variant, provider) in self.candidate_iter(variants) {
            if cancel.is_cancelled() {
                return Err(RelayError::Cancelled);
            }

            if let Some(reason) = self.skip_reason(variant, provider.name()).await {
                debug!(variant, provider = provider.name(), %reason, "Skipping candidate");
                skipped += 1;
                continue;
            }

            attempted += 1;
            debug!(variant, provider = provider.name(), attempt = attempted, "Trying candidate");

            let call = InvocationRequest::new(variant, provider.name(), request);
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RelayError::Cancelled),
                result = provider.invoker().invoke(&call) => result,
            };

            match outcome {
                Ok(text) if !text.is_empty() => {
                    info!(
                        model,
                        variant,
                        provider = provider.name(),
                        attempts = attempted,
                        "Resolved model"
                    );
                    return Ok(Resolution {
                        text,
                        variant: variant.to_string(),
                        provider: provider.name().to_string(),
                        attempts: attempted,
                    });
                }
                Ok(_) => {
                    debug!(variant, provider = provider.name(), "Empty response, moving on");
                }
                Err(e) => {
                    warn!(
                        variant,
                        provider = provider.name(),
                        error = %e,
                        "Candidate failed"
                    );
                    if let Err(pe) = self.failures.record_failure(variant, provider.name()).await {
                        warn!(
                            path = %self.failures.path().display(),
                            error = %pe,
                            "Could not persist candidate failure"
                        );
                    }
                }
            }
        }

        warn!(model, attempted, skipped, "All providers failed");
        Err(RelayError::AllProvidersFailed {
            model: model.to_string(),
            attempted,
            skipped,
        })
    }

    /// Blocking entry point for synchronous callers.
    ///
    /// Runs the same walk on a private current-thread runtime. Must not be
    /// called from inside a tokio runtime.
    pub fn resolve_blocking(&self, model: &str, request: &ChatRequest) -> Result<Resolution> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(RelayError::InvalidState(
                "resolve_blocking called from within an async runtime; use resolve".into(),
            ));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.resolve(model, request))
    }

    fn variants(&self, model: &str) -> Result<&[String]> {
        self.catalog
            .get(model)
            .ok_or_else(|| RelayError::ModelNotFound(model.to_string()))
    }

    fn candidate_iter<'a>(
        &'a self,
        variants: &'a [String],
    ) -> impl Iterator<Item = (&'a str, &'a RegisteredProvider)> + 'a {
        variants.iter().flat_map(move |variant| {
            self.registry
                .eligible()
                .map(move |provider| (variant.as_str(), provider))
        })
    }

    async fn skip_reason(&self, variant: &str, provider: &str) -> Option<SkipReason> {
        if self.blacklist.is_provider_excluded(provider) {
            return Some(SkipReason::ProviderBlacklisted);
        }
        if self.failures.has_failed(variant, provider).await {
            return Some(SkipReason::PreviouslyFailed);
        }
        if self.blacklist.is_pair_excluded(variant, provider) {
            return Some(SkipReason::PairBlacklisted);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ProviderDescriptor, ProviderInvoker};
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct FixedInvoker(&'static str);

    #[async_trait]
    impl ProviderInvoker for FixedInvoker {
        async fn invoke(&self, _request: &InvocationRequest<'_>) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn resolver(dir: &TempDir, blacklist: Blacklist) -> FallbackResolver {
        let mut registry = ProviderRegistry::new();
        for (name, working) in [("p1", true), ("off", false), ("p2", true)] {
            registry
                .register(RegisteredProvider::new(
                    ProviderDescriptor::new(name).with_working(working),
                    vec![],
                    Arc::new(FixedInvoker("ok")),
                ))
                .unwrap();
        }
        let catalog: Catalog = [("m".to_string(), vec!["b".to_string(), "a".to_string()])]
            .into_iter()
            .collect();
        let failures = Arc::new(FailureTracker::open(dir.path().join("f.json")));
        FallbackResolver::new(Arc::new(registry), catalog, blacklist, failures)
    }

    #[test]
    fn candidate_order_is_variants_then_eligible_providers() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir, Blacklist::default());
        let order: Vec<_> = resolver
            .candidates("m")
            .unwrap()
            .into_iter()
            .map(|c| (c.variant, c.provider))
            .collect();
        assert_eq!(
            order,
            vec![("a", "p1"), ("a", "p2"), ("b", "p1"), ("b", "p2")]
        );
    }

    #[test]
    fn candidates_for_unknown_model_is_not_found() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir, Blacklist::default());
        assert!(matches!(
            resolver.candidates("nope"),
            Err(RelayError::ModelNotFound(_))
        ));
    }

    #[tokio::test]
    async fn skip_reasons_follow_precedence() {
        let dir = TempDir::new().unwrap();
        let mut blacklist = Blacklist::default();
        blacklist.exclude_provider("p1");
        blacklist.exclude_pair("a", "p1");
        blacklist.exclude_pair("a", "p2");
        let resolver = resolver(&dir, blacklist);
        resolver.failures().record_failure("a", "p2").await.unwrap();

        assert_eq!(
            resolver.skip_reason("a", "p1").await,
            Some(SkipReason::ProviderBlacklisted)
        );
        assert_eq!(
            resolver.skip_reason("a", "p2").await,
            Some(SkipReason::PreviouslyFailed)
        );
        assert_eq!(resolver.skip_reason("b", "p2").await, None);
    }

    #[test]
    fn blocking_resolution_outside_runtime() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir, Blacklist::default());
        let resolution = resolver
            .resolve_blocking("m", &ChatRequest::prompt("hi"))
            .unwrap();
        assert_eq!(resolution.variant, "a");
        assert_eq!(resolution.provider, "p1");
        assert_eq!(resolution.attempts, 1);
    }

    #[tokio::test]
    async fn blocking_resolution_inside_runtime_is_rejected() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir, Blacklist::default());
        let err = resolver
            .resolve_blocking("m", &ChatRequest::prompt("hi"))
            .unwrap_err();
        assert!(matches!(err, RelayError::InvalidState(_)));
    }
}
