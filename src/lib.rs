//! modelrelay: logical model names over many LLM providers.
//!
//! Providers report overlapping models under inconsistent identifiers.
//! modelrelay folds those identifiers into logical names, builds a catalog of
//! which raw variants serve each name, and resolves a request by walking the
//! (variant, provider) candidates in a fixed order until one answers. Failed
//! candidates are remembered on disk and never retried.
//!
//! # Quick Start
//!
//! ```no_run
//! use modelrelay::prelude::*;
//!
//! # async fn example() -> modelrelay::error::Result<()> {
//! let config = RelayConfig::load(None)?;
//! let registry = ProviderRegistry::from_config(&config)?;
//! let resolver = FallbackResolver::from_config(&config, registry);
//!
//! let resolution = resolver.resolve("gpt-4o", &ChatRequest::prompt("Hello!")).await?;
//! println!("{} (via {})", resolution.text, resolution.provider);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod prelude;
pub mod provider;
pub mod resolver;
pub mod store;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
