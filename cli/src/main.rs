mod args;
mod logging;

use args::Args;
use autoclick_core::{
    default_settings_path, load_settings_or_default, save_settings, ActivationController,
    ActivationMode, ClickSink, ConfigStore, HotkeyCapture, InputRouter, NoSurface, StatusSink,
};
use autoclick_platform::{start_input_hook, EnigoInjector, NoopInjector, PlatformError};
use clap::Parser;
use crossbeam_channel::bounded;
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error("failed to install Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// Prints status lines to stdout. Clearing is a no-op on a terminal.
struct ConsoleStatus;

impl StatusSink for ConsoleStatus {
    fn status(&self, message: &str) {
        if message.is_empty() {
            debug!("status cleared");
            return;
        }
        info!(status = message, "status");
        println!("{message}");
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::setup(args.verbose, args.log_file);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "autoclick failed");
            eprintln!("autoclick: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let status: Arc<dyn StatusSink> = Arc::new(ConsoleStatus);

    let settings_path = args.settings.clone().unwrap_or_else(default_settings_path);
    let store = ConfigStore::new(load_settings_or_default(&settings_path));
    args.apply(&store, status.as_ref());

    let sink: Arc<dyn ClickSink> = if args.dry_run {
        Arc::new(NoopInjector)
    } else {
        Arc::new(EnigoInjector::new()?)
    };

    let controller = Arc::new(ActivationController::new(store.clone(), sink));
    let capture = Arc::new(HotkeyCapture::new(store.clone(), status.clone(), Arc::new(NoSurface)));
    let router = InputRouter::new(store.clone(), capture, controller.clone());

    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.try_send(());
    })?;

    let hook = start_input_hook();

    let config = store.snapshot();
    info!(
        hotkey = %config.hotkey.label(),
        mode = %config.mode,
        button = %config.button,
        budget = ?config.click_budget(),
        delay_ms = config.delay_ms(),
        "autoclick ready"
    );
    if args.capture {
        router.begin_capture();
    } else {
        let hint = match config.mode {
            ActivationMode::Toggle => format!("Press {} to start or stop clicking.", config.hotkey.label()),
            ActivationMode::Hold => format!("Hold {} to click.", config.hotkey.label()),
        };
        status.status(&format!("{hint} Ctrl+C quits."));
    }

    router.run(hook.events(), &shutdown_rx);

    hook.stop();
    controller.shutdown();
    info!(clicks = controller.last_run_clicks(), "Shutting down");

    if let Err(e) = save_settings(&settings_path, &store.snapshot()) {
        warn!(error = %e, "Error saving settings");
        status.status(&format!("Could not save settings: {e}"));
    }
    Ok(())
}
