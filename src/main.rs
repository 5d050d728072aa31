//! elon-daily-digest — Binary Entrypoint
//! Three stages on one binary: `ingest` fetches and persists today's posts,
//! `summarize` turns today's file into a published daily summary, and
//! `monitor` forwards freshly published summaries to the chat webhook.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use elon_daily_digest::config::Config;
use elon_daily_digest::ingest::x_api::XApiSource;
use elon_daily_digest::monitor::wechat::WechatNotifier;
use elon_daily_digest::publish::GitCli;
use elon_daily_digest::summarize::openai::OpenAiClient;
use elon_daily_digest::{daily, ingest, monitor, summarize};

#[derive(Parser)]
#[command(name = "elon-daily-digest")]
#[command(about = "Fetch, summarize, and publish one account's daily posts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch recent posts, drop promoted ones, persist today's file
    Ingest,
    /// Summarize today's file with the LLM and push the artifacts
    Summarize,
    /// Pull the archive repo and forward new summaries to the chat webhook
    Monitor,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("elon_daily_digest=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let cfg = Config::from_env()?;
    // One day key per run, threaded through every stage that needs it.
    let today = daily::today_utc();

    match cli.command {
        Command::Ingest => {
            let token = cfg
                .x_auth_token
                .clone()
                .context("missing X_AUTH_TOKEN env var")?;
            let source = XApiSource::new(token, None)?;
            let mut stdout = std::io::stdout();
            ingest::run_ingest(&source, &cfg.account.id, today, &cfg.tweets_dir, &mut stdout)
                .await?;
        }
        Command::Summarize => {
            let key = cfg
                .openai_api_key
                .clone()
                .context("missing OPENAI_API_KEY env var")?;
            let client = OpenAiClient::new(&cfg.openai_base_url, &key, &cfg.model)?;
            // A failed completion is a routine condition, contained inside
            // the stage; only the setup failures above exit non-zero.
            let _ = summarize::run_stage(&cfg, today, &client, &GitCli).await;
        }
        Command::Monitor => {
            let webhook = cfg
                .wechat_webhook_url
                .clone()
                .context("missing WECHAT_WEBHOOK_URL env var")?;
            let bot_key = cfg
                .wechat_bot_key
                .clone()
                .context("missing WECHAT_BOT_KEY env var")?;
            let notifier = WechatNotifier::new(webhook, bot_key)?;
            let state = std::path::Path::new(monitor::DEFAULT_STATE_FILE);
            monitor::run_monitor(&cfg.monitor_repo_dir, state, &notifier, &GitCli).await?;
        }
    }

    Ok(())
}
