mod commands;

use anyhow::Result;
use apify_framework::{CliConfig, Dispatcher, StdinSnapshot};
use std::io;
use tracing_subscriber::{EnvFilter, fmt};

const CLI_DESCRIPTION: &str = "Apify command-line interface (Apify CLI) helps you create, develop, build and run Apify Actors, and manage the Apify cloud platform from any computer.";

fn main() -> Result<()> {
    let config = CliConfig::from_env().description(CLI_DESCRIPTION);
    init_tracing(config.debug);

    let registry = commands::registry()?;
    tracing::debug!(keys = registry.len(), "command registry built");

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let dispatcher = Dispatcher::new(&registry, &config, StdinSnapshot::global());
    let code = dispatcher.run(&argv, &mut io::stdout().lock(), &mut io::stderr().lock());
    std::process::exit(code);
}

/// `APIFY_CLI_DEBUG` forces debug output; otherwise `RUST_LOG` applies.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}
