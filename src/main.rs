//! modelrelay CLI binary entry point.

use modelrelay::cli::{commands, Cli, Commands};
use modelrelay::config::RelayConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("modelrelay=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();

    let result = match RelayConfig::load(cli.config.as_deref()) {
        Ok(config) => match cli.command {
            Commands::List => commands::handle_list(&config),
            Commands::Catalog(args) => commands::handle_catalog(&config, args),
            Commands::Chat(args) => commands::handle_chat(&config, args).await,
            Commands::Blacklist(args) => commands::handle_blacklist(&config, args.command),
            Commands::Failures(args) => commands::handle_failures(&config, args.command).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
