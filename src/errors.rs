use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Unsupported locator kind: {0}")]
    UnsupportedLocator(String),

    #[error("Unsupported browser: {0}")]
    UnsupportedBrowser(String),

    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("JavaScript execution failed: {0}")]
    JavaScriptFailed(String),

    #[error("Interaction failed: {0}")]
    InteractionFailed(String),

    #[error("Screenshot failed: {0}")]
    ScreenshotFailed(String),

    #[error("Expected {expected} open window(s), found {actual}")]
    WindowCount { expected: usize, actual: usize },

    #[error("Timed out after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "firefox")]
    #[error("WebDriver command failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),
}

pub type Result<T> = std::result::Result<T, E2eError>;

impl E2eError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, E2eError::Timeout { .. })
    }
}

/// Fails the current scenario with [`E2eError::AssertionFailed`] instead of
/// panicking, so the harness still gets to run its teardown.
#[macro_export]
macro_rules! ensure_ui {
    ($cond:expr $(,)?) => {
        if !$cond {
            return Err($crate::errors::E2eError::AssertionFailed(
                stringify!($cond).to_string(),
            ));
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::errors::E2eError::AssertionFailed(format!($($arg)+)));
        }
    };
}
