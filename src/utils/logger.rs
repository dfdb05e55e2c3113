use crate::utils::sdk_log::{LogThreshold, SdkLogBridge, SdkLogLayer, SinkFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Host filter used when `RUST_LOG` is unset.
///
/// SDK targets stay out of it: their events reach the output only through the bridge, which
/// writes them itself and is gated by the SDK threshold alone.
pub fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("obj_accel=debug")
        } else {
            EnvFilter::new("obj_accel=info")
        }
    })
}

pub fn init_cli_logger(verbose: bool, threshold: LogThreshold) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact()
                .with_filter(default_filter(verbose)),
        )
        .with(SdkLogLayer::new(SdkLogBridge::with_writer(
            threshold,
            std::io::stdout,
            SinkFormat::Text,
        )))
        .init();
}

pub fn init_json_logger(threshold: LogThreshold) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json()
                .with_filter(default_filter(false)),
        )
        .with(SdkLogLayer::new(SdkLogBridge::with_writer(
            threshold,
            std::io::stdout,
            SinkFormat::Json,
        )))
        .init();
}
