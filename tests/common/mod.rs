//! Shared test helpers and scripted provider invoker.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use modelrelay::error::RelayError;
use modelrelay::models::Catalog;
use modelrelay::provider::{
    ProviderDescriptor, ProviderInvoker, ProviderRegistry, RegisteredProvider,
};
use modelrelay::resolver::FallbackResolver;
use modelrelay::store::{Blacklist, FailureTracker};
use modelrelay::types::InvocationRequest;

/// Every (variant, provider) invocation, in call order, across all providers.
pub type CallLog = Arc<Mutex<Vec<(String, String)>>>;

/// What a scripted provider does when asked for a variant.
#[derive(Debug, Clone)]
pub enum Outcome {
    Reply(&'static str),
    Empty,
    Fail,
    /// Never completes.
    Hang,
}

/// Invoker answering from a per-variant script. Unscripted variants fail.
pub struct ScriptedInvoker {
    outcomes: HashMap<String, Outcome>,
    calls: CallLog,
}

impl ScriptedInvoker {
    pub fn new(calls: &CallLog) -> Self {
        Self {
            outcomes: HashMap::new(),
            calls: Arc::clone(calls),
        }
    }

    pub fn on(mut self, variant: &str, outcome: Outcome) -> Self {
        self.outcomes.insert(variant.to_string(), outcome);
        self
    }
}

#[async_trait]
impl ProviderInvoker for ScriptedInvoker {
    async fn invoke(&self, request: &InvocationRequest<'_>) -> Result<String, RelayError> {
        self.calls
            .lock()
            .unwrap()
            .push((request.model.to_string(), request.provider.to_string()));

        match self.outcomes.get(request.model).cloned().unwrap_or(Outcome::Fail) {
            Outcome::Reply(text) => Ok(text.to_string()),
            Outcome::Empty => Ok(String::new()),
            Outcome::Fail => Err(RelayError::provider(request.provider, "scripted failure")),
            Outcome::Hang => std::future::pending().await,
        }
    }
}

pub fn provider(name: &str, models: &[&str], invoker: ScriptedInvoker) -> RegisteredProvider {
    RegisteredProvider::new(
        ProviderDescriptor::new(name),
        models.iter().map(|m| m.to_string()).collect(),
        Arc::new(invoker),
    )
}

pub fn registry(providers: Vec<RegisteredProvider>) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    for provider in providers {
        registry.register(provider).unwrap();
    }
    registry
}

pub fn catalog(entries: &[(&str, &[&str])]) -> Catalog {
    entries
        .iter()
        .map(|(name, variants)| {
            (
                name.to_string(),
                variants.iter().map(|v| v.to_string()).collect(),
            )
        })
        .collect()
}

/// Temporary state directory plus a resolver whose failure record lives in it.
pub struct Harness {
    pub dir: TempDir,
    pub calls: CallLog,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            calls: CallLog::default(),
        }
    }

    pub fn failures_path(&self) -> PathBuf {
        self.dir.path().join("failed_llm_providers.json")
    }

    pub fn invoker(&self) -> ScriptedInvoker {
        ScriptedInvoker::new(&self.calls)
    }

    pub fn resolver(
        &self,
        registry: ProviderRegistry,
        catalog: Catalog,
        blacklist: Blacklist,
    ) -> FallbackResolver {
        let failures = Arc::new(FailureTracker::open(self.failures_path()));
        FallbackResolver::new(Arc::new(registry), catalog, blacklist, failures)
    }

    /// Drain and return the calls made so far.
    pub fn take_calls(&self) -> Vec<(String, String)> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }
}

pub fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(v, p)| (v.to_string(), p.to_string()))
        .collect()
}
