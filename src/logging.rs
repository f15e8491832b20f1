// Logging setup.
// Pretty or JSON tracing output, filtered by RUST_LOG or the configured level.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::cli::LogFormat;

/// Configure and initialize logging for the job.
///
/// `RUST_LOG` takes precedence; otherwise dependencies log at `warn` and this
/// crate at `log_level`.
pub fn setup_logging(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,program_cache={}", log_level)));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_target(true))
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_target(true))
                .init();
        }
    }
}
