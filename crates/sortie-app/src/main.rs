use std::process::ExitCode;

use sortie_app::config::AppConfig;
use sortie_app::telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load config");
            return ExitCode::FAILURE;
        }
    };

    match sortie_app::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "sortie stopped with an error");
            ExitCode::FAILURE
        }
    }
}
