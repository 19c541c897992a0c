// orchestrator-service-rs/src/telemetry.rs
// Global tracing subscriber. `log` records from the config and model client
// crates are bridged into the same output. Logs go to stderr; stdout carries
// evaluation results.

use std::sync::atomic::{AtomicBool, Ordering};

use config_rs::{LogFormat, PipelineSettings};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Install the subscriber once; later calls are no-ops. `RUST_LOG` overrides `LOG_LEVEL`.
pub fn init_logging(settings: &PipelineSettings) -> Result<(), TryInitError> {
    if LOGGING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},reqwest=warn,hyper=warn", settings.log_level))
    });

    let result = match settings.log_format {
        LogFormat::Json => Registry::default()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => Registry::default()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init(),
    };

    if result.is_err() {
        LOGGING_INITIALIZED.store(false, Ordering::SeqCst);
    }
    result?;

    tracing::info!(
        level = %settings.log_level,
        format = ?settings.log_format,
        "logging_initialized"
    );
    Ok(())
}
