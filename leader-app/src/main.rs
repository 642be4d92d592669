use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use leader_commands::{
    ChatLine, CommandHandler, StatsSource, extract_url, fetch_stats,
    lookup::{lmgtfy_url, urban_dictionary_url},
};
use leader_common::observability::{LogConfig, LogFormat, init_logging};
use leader_config::{LeaderConfig, LeaderConfigLoader};
use leader_http::{Credentials, FetchRequest};
use std::path::PathBuf;
use std::time::Duration;

mod console;

#[derive(Debug, Parser)]
#[command(name = "leader", about = "Leader-1 bot command utilities")]
struct Cli {
    /// YAML configuration; skipped when missing.
    #[arg(long, short, env = "LEADER_CONFIG", default_value = "leader.yaml")]
    config: PathBuf,

    /// Mirror log events to stderr.
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Print the Urban Dictionary link for a term.
    Urban {
        #[arg(required = true, num_args = 1..)]
        term: Vec<String>,
    },
    /// Print a "let me google that for you" link.
    Lmgtfy {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Fetch and summarise the configured stream stats.
    Stats {
        /// Print the decoded record as XML instead of the summary.
        #[arg(long)]
        xml: bool,
    },
    /// Print the first link found in the text.
    Link {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Fetch a page and print its body.
    Fetch {
        url: String,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        pass: Option<String>,
    },
    /// Run a chat line through the command handler and print the reply.
    Say {
        #[arg(long, default_value = "someone")]
        nick: String,
        #[arg(long, default_value = "#leader")]
        target: String,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(LogConfig {
        emit_stderr: cli.verbose,
        format: LogFormat::from_env(),
        ..LogConfig::default()
    })?;

    let cfg: LeaderConfig = LeaderConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()
        .with_context(|| format!("loading {}", cli.config.display()))?;

    run(cli.command, &cfg).await
}

async fn run(command: Cmd, cfg: &LeaderConfig) -> Result<()> {
    match command {
        Cmd::Urban { term } => println!("{}", urban_dictionary_url(&term.join(" "))),
        Cmd::Lmgtfy { query } => println!("{}", lmgtfy_url(&query.join(" "))),
        Cmd::Stats { xml } => {
            let source = StatsSource::from_config(cfg)
                .context("stream.stats_url is not configured")?;
            let stats = fetch_stats(&source).await?;
            if xml {
                println!("{}", stats.to_xml()?);
            } else {
                println!("{}", stats.summary());
            }
        }
        Cmd::Link { text } => {
            let text = text.join(" ");
            println!("{}", extract_url(&text)?);
        }
        Cmd::Fetch { url, user, pass } => {
            let credentials = Credentials::new(user.unwrap_or_default(), pass.unwrap_or_default());
            let body = FetchRequest::new(url)
                .with_credentials(credentials)
                .with_connect_timeout(Duration::from_secs(cfg.http.connect_timeout_secs))
                .with_io_timeout(Duration::from_secs(cfg.http.io_timeout_secs))
                .send()
                .await?;
            print!("{body}");
        }
        Cmd::Say { nick, target, text } => {
            let handler = CommandHandler::from_config(cfg);
            let line = ChatLine::new(nick, target, text.join(" "));
            let sent = handler.dispatch(&line, &console::Console).await?;
            if !sent {
                tracing::info!(text = %line.text, "no reply");
            }
        }
    }
    Ok(())
}
