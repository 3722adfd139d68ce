//! Logging setup: console output, plus a daily rolling log file on request.

use autoclick_core::get_log_dir;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Targets are crate names; the binary's own events use the bin name `autoclick`.
const DEFAULT_FILTER: &str = "autoclick=info,autoclick_core=info,autoclick_platform=info";

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(DEFAULT_FILTER.replace("=info", "=debug"))
    } else {
        EnvFilter::new(DEFAULT_FILTER)
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return default_filter(true);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(false))
}

/// Initialize logging. `RUST_LOG` overrides the default filter unless `verbose` is set.
///
/// With `log_to_file`, logs are also written to `<data dir>/autoclick/logs/`.
pub fn setup(verbose: bool, log_to_file: bool) {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter(verbose));

    let file_layer = if log_to_file {
        let log_dir = get_log_dir();
        if let Err(e) = std::fs::create_dir_all(&log_dir) {
            eprintln!("Warning: Failed to create log directory {:?}: {}", log_dir, e);
            None
        } else {
            let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "autoclick.log");
            Some(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(file_appender)
                    .with_filter(env_filter(verbose)),
            )
        }
    } else {
        None
    };

    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();

    if log_to_file {
        tracing::info!("File logging enabled: {:?}", get_log_dir());
    }
}
