//! CLI command handlers.

use tokio_util::sync::CancellationToken;

use super::{BlacklistCommands, CatalogArgs, ChatArgs, FailuresCommands};
use crate::config::RelayConfig;
use crate::error::Result;
use crate::provider::ProviderRegistry;
use crate::resolver::FallbackResolver;
use crate::store::{BlacklistStore, FailureTracker};
use crate::types::{ChatRequest, ModelMessage};

fn build_resolver(config: &RelayConfig) -> Result<FallbackResolver> {
    let registry = ProviderRegistry::from_config(config)?;
    Ok(FallbackResolver::from_config(config, registry))
}

/// Handle `modelrelay list`.
pub fn handle_list(config: &RelayConfig) -> Result<()> {
    let resolver = build_resolver(config)?;
    let models = resolver.list_models();
    if models.is_empty() {
        eprintln!("No logical models available. Check the [[providers]] section of your config.");
        return Ok(());
    }
    for name in models {
        println!("{name}");
    }
    Ok(())
}

/// Handle `modelrelay catalog [--json]`.
pub fn handle_catalog(config: &RelayConfig, args: CatalogArgs) -> Result<()> {
    let resolver = build_resolver(config)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(resolver.catalog())?);
        return Ok(());
    }
    for (name, variants) in resolver.catalog().iter() {
        println!("{name}");
        for variant in variants {
            println!("  {variant}");
        }
    }
    Ok(())
}

/// Handle `modelrelay chat`. Ctrl-C abandons the resolution.
pub async fn handle_chat(config: &RelayConfig, args: ChatArgs) -> Result<()> {
    let resolver = build_resolver(config)?;

    let mut messages = Vec::new();
    if let Some(system) = args.system {
        messages.push(ModelMessage::system(system));
    }
    messages.push(ModelMessage::user(args.prompt));
    let mut request = ChatRequest::from_messages(messages);
    if let Some(t) = args.temperature {
        request = request.with_temperature(t);
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let resolution = resolver
        .resolve_with_cancel(&args.model, &request, &cancel)
        .await?;
    println!("{}", resolution.text);
    eprintln!(
        "[{} via {}, {} attempt(s)]",
        resolution.variant, resolution.provider, resolution.attempts
    );
    Ok(())
}

/// Handle `modelrelay blacklist ...`.
pub fn handle_blacklist(config: &RelayConfig, command: BlacklistCommands) -> Result<()> {
    let store = BlacklistStore::new(config.blacklist_path());
    let blacklist = match command {
        BlacklistCommands::Show => store.load(),
        BlacklistCommands::Model { name } => store.update(|b| b.exclude_model(name))?,
        BlacklistCommands::Provider { name } => store.update(|b| b.exclude_provider(name))?,
        BlacklistCommands::Pair { variant, provider } => {
            store.update(|b| b.exclude_pair(variant, provider))?
        }
    };
    println!("{}", serde_json::to_string_pretty(&blacklist)?);
    Ok(())
}

/// Handle `modelrelay failures ...`.
pub async fn handle_failures(config: &RelayConfig, command: FailuresCommands) -> Result<()> {
    let tracker = FailureTracker::open(config.failures_path());
    match command {
        FailuresCommands::Show => {
            let record = tracker.snapshot().await;
            if record.is_empty() {
                println!("No recorded failures.");
            }
            for (variant, providers) in record.iter() {
                let providers: Vec<&str> = providers.iter().map(String::as_str).collect();
                println!("{variant}: {}", providers.join(", "));
            }
        }
        FailuresCommands::Clear => {
            tracker.clear().await?;
            println!("Cleared failure record at {}", tracker.path().display());
        }
    }
    Ok(())
}
