//! CLI entry point for pagestand

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pagestand")]
#[command(version)]
#[command(about = "A minimal content server for markdown pages", long_about = None)]
struct Cli {
    /// Document root (defaults to current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Port to listen on (overrides _config.yml)
    #[arg(short, long)]
    port: Option<u16>,

    /// IP address to bind to (overrides _config.yml)
    #[arg(short, long)]
    ip: Option<String>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a single page to stdout without starting the server
    Check {
        /// Page key, as it would appear in the URL
        key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "pagestand=debug,info"
    } else {
        "pagestand=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine document root
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("unable to determine working directory")?,
    };
    let site = pagestand::Site::new(&root)?;

    match cli.command {
        Some(Commands::Check { key }) => {
            let html = site
                .render_page(&key)
                .map_err(|e| anyhow::anyhow!(e.diagnostic()))?;
            print!("{}", html);
        }

        None => {
            let ip = cli.ip.unwrap_or_else(|| site.config.server.ip.clone());
            let port = cli.port.unwrap_or(site.config.server.port);
            pagestand::server::start(&site, &ip, port).await?;
        }
    }

    Ok(())
}
