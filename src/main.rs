use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use paywatch::browser;
use paywatch::captcha;
use paywatch::config::ResolvedConfig;
use paywatch::credentials::Credentials;
use paywatch::sink::LogSink;
use paywatch::watch::Watcher;

#[derive(Parser)]
#[command(name = "paywatch")]
#[command(about = "Incoming-transfer watcher for web payment portals")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "paywatch.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and poll the transfer page until interrupted (default)
    Watch,
    /// Perform a single login to verify credentials and captcha handling
    Login,
    /// Show the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "info,chromiumoxide=warn,chromiumoxide::conn=off,chromiumoxide::handler=off",
            )
        }))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .init();

    let cli = Cli::parse();

    let config = ResolvedConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config.display()))?;

    match cli.command.unwrap_or(Command::Watch) {
        Command::Config => {
            println!("Config file: {}", cli.config.display());
            println!("Login URL: {}", config.portal.login_url);
            println!("Transfer URL: {}", config.portal.transfer_url);
            println!(
                "Keep-alive URL: {}",
                config.portal.keepalive_url.as_deref().unwrap_or("(none)")
            );
            println!("Artifact directory: {}", config.artifact_dir.display());
            println!("Poll interval: {}s", config.watch.interval.as_secs());
            println!("Captcha mode: {:?}", config.captcha.mode);
        }
        Command::Login => {
            let resolver = captcha::create_resolver(&config.captcha)?;
            let credentials = Credentials::from_config(&config.credentials)?;

            match browser::login(&config, &credentials, resolver.as_ref()).await? {
                Some(session) => {
                    println!("Login succeeded ({} cookies captured).", session.cookies.len());
                }
                None => {
                    println!("Login abandoned: the captcha was not resolved.");
                }
            }
        }
        Command::Watch => {
            let resolver = captcha::create_resolver(&config.captcha)?;
            let watcher = Watcher::new(config, resolver, Box::new(LogSink))?;

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("exit by operator");
                }
                result = watcher.run() => {
                    result?;
                }
            }
        }
    }

    Ok(())
}
