use std::path::Path;

use anyhow::Context;
use colored::Colorize;

use tether_server::{TetherConfig, TetherServer};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Config(args) => cmd_config(args, &cli.format),
    }
}

/// Load the configuration file if one was given, defaults otherwise.
fn load_config(path: Option<&Path>) -> anyhow::Result<TetherConfig> {
    match path {
        Some(path) => TetherConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(TetherConfig::default()),
    }
}

fn serve_config(args: &ServeArgs) -> anyhow::Result<TetherConfig> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    Ok(config)
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = serve_config(&args)?;
    let server = TetherServer::new(config).context("failed to start engine")?;

    println!(
        "{} Tether server on {}",
        "✓".green().bold(),
        server.config().server.bind_addr.to_string().bold()
    );
    for info in server.engine().registry().list().await {
        println!("  {} {} ({})", "seeded:".green(), info.name.as_str().yellow(), info.version);
    }

    server.serve().await?;
    Ok(())
}

fn cmd_config(args: ConfigArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    match format {
        OutputFormat::Text => print!("{}", config.to_toml()?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
    }
    Ok(())
}
