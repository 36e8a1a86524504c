//! # slackbuf CLI
//!
//! Usage:
//!   slackbuf send -m "Deploy finished"     # Post one message now
//!   tail -f app.log | slackbuf pipe          # Batch stdin lines to Slack
//!   slackbuf config show                     # Show configuration (token masked)
//!   slackbuf config path                     # Print the default config path

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use slackbuf::{SlackBufConfig, SlackBufError, SlackBuffer, TracingSink};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "slackbuf",
    version,
    about = "Buffered Slack notifications",
    long_about = "Collects messages and posts them to a Slack channel in batches.\nToken and channel come from ~/.slackbuf/config.toml, SLACK_TOKEN and SLACK_CHANNEL."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Override the destination channel
    #[arg(long, global = true)]
    channel: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message immediately
    Send {
        /// Message to send
        #[arg(short, long)]
        message: String,
    },

    /// Read lines from stdin and post them in batches until EOF
    Pipe {
        /// Flush interval in milliseconds (overrides config)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Skip empty lines
        #[arg(long)]
        skip_empty: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Print the default config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "slackbuf=debug,slackbuf_scheduler=debug,slackbuf_channels=debug"
    } else {
        "slackbuf=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => SlackBufConfig::load_from(std::path::Path::new(path))?
            .with_overrides(std::env::var("SLACK_TOKEN").ok(), std::env::var("SLACK_CHANNEL").ok()),
        None => SlackBufConfig::load()?,
    };
    let mut config = config.with_overrides(None, cli.channel.clone());

    match cli.command {
        Commands::Send { message } => {
            let slack = start(&config)?;
            let result = slack.send_message(&message).await;
            slack.close().await;
            result.context("sending message")?;
            tracing::info!("Message sent to {}", config.slack.channel);
        }

        Commands::Pipe { interval_ms, skip_empty } => {
            if let Some(ms) = interval_ms {
                config.buffer.interval_ms = ms;
                config.buffer = config.buffer.normalized();
            }
            let slack = start(&config)?;
            tracing::info!(
                "Piping stdin to {} every {}ms",
                config.slack.channel,
                config.buffer.interval_ms
            );

            // Room frees up at the latest when a stuck flush times out.
            let wait = config.buffer.clone().normalized().timeout() * 2;
            let stats = pipe_lines(&slack, BufReader::new(tokio::io::stdin()), skip_empty, wait).await;
            slack.close().await;
            let stats = stats?;
            tracing::info!(
                "Read {} line(s), {} not queued, dropped {}",
                stats.read,
                stats.rejected,
                slack.dropped_count()
            );
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", config.to_masked_toml()?);
            }
            ConfigAction::Path => {
                println!("{}", SlackBufConfig::default_path().display());
            }
        },
    }

    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
struct PipeStats {
    read: u64,
    rejected: u64,
}

/// Queue every line of `reader`, waiting up to `wait` for room so a fast
/// producer is slowed down instead of losing lines.
async fn pipe_lines<R>(slack: &SlackBuffer, reader: R, skip_empty: bool, wait: Duration) -> Result<PipeStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut stats = PipeStats::default();
    while let Some(line) = lines.next_line().await? {
        if skip_empty && line.trim().is_empty() {
            continue;
        }
        stats.read += 1;
        match slack.enqueue(line, wait).await {
            Ok(()) => {}
            Err(e @ SlackBufError::Closed(_)) => {
                tracing::warn!("Stopped piping at line {}: {e}", stats.read);
                stats.rejected += 1;
                break;
            }
            Err(e) => {
                tracing::warn!("Line {} not queued: {e}", stats.read);
                stats.rejected += 1;
            }
        }
    }
    Ok(stats)
}

/// Start a buffer that reports background failures through tracing.
fn start(config: &SlackBufConfig) -> Result<SlackBuffer> {
    config.validate()?;
    Ok(SlackBuffer::builder(config.slack.token.clone(), config.slack.channel.clone())
        .api_url(config.slack.api_url.clone())
        .options(slackbuf::BufferOptions::from_config(&config.buffer).log_sink(Arc::new(TracingSink)))
        .start())
}
