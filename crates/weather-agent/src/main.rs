//! Weather agent - interactive entry point.

use std::io;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use weather_agent::{cli, AppResult, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> AppResult<ExitCode> {
    let config = Config::load()?;

    init_logging(&config.agent.log_level);

    cli::run(&config, io::stdin().lock(), io::stdout()).await
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    // stdout belongs to the conversation; logs go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
