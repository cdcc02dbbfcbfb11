use anyhow::{Context, Result};
use lecture_posts::{
    config::{self, Config},
    server,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

/// Picks the log filter: `RUST_LOG` if set, otherwise `server.logs.level`.
fn log_filter(config: &Config) -> Result<EnvFilter> {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return EnvFilter::try_from_default_env().context("RUST_LOG is not a valid filter");
    }

    let level = config.server.logs.level.as_str();
    level.parse::<LevelFilter>().with_context(|| {
        format!(
            "server.logs.level '{}' is not one of error, warn, info, debug, trace",
            level
        )
    })?;
    Ok(EnvFilter::new(level))
}

fn credential_source(config: &Config) -> &str {
    match config.llm.api_key {
        Some(_) => "config file",
        None => config.llm.api_key_env.as_str(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Nothing is logged until the filter is known, so config errors go to stderr
    let config = config::load().await.context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&config)?)
        .json()
        .init();

    info!(
        provider = ?config.llm.provider,
        model = %config.llm.model,
        credential = credential_source(&config),
        "Lecture posting server starting"
    );

    server::run(config).await?;

    Ok(())
}
