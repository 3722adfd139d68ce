//! Common error types for autoclick-platform.

use autoclick_core::MouseButton;
use thiserror::Error;

/// Platform-level errors.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("injection failed: {0}")]
    InjectionFailed(String),
    #[error("mouse button not supported on this platform: {0}")]
    UnsupportedButton(MouseButton),
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;
