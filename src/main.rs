mod app;

use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use freight_quote::util::persistence::load_settings;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so they never interleave with the prompt.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = match load_settings() {
        Ok(settings) => settings,
        Err(err) => {
            error!(%err, "failed to load settings");
            return ExitCode::FAILURE;
        }
    };

    match app::run(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "freight-quote stopped");
            ExitCode::FAILURE
        }
    }
}
