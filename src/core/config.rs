use crate::errors::{E2eError, Result};
use crate::types::{BrowserKind, Viewport};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    pub browser: BrowserConfig,
    pub waits: WaitConfig,
    pub site: SiteConfig,
    pub screenshots_dir: PathBuf,
    /// Pause after scrolling to the last element of a failed test, so the
    /// screenshot shows it settled.
    pub failure_scroll_pause_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub kind: BrowserKind,
    pub headless: bool,
    pub viewport: Viewport,
    pub user_agent: Option<String>,
    pub args: Vec<String>,
    /// Where geckodriver listens. Only the Firefox backend uses it.
    pub webdriver_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    pub timeout_ms: u64,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub home_url: String,
    pub careers_url: String,
    pub job_board_host: String,
}

impl SuiteConfig {
    /// Reads a JSON config file; fields missing from the file keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            E2eError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: SuiteConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.waits.poll_interval_ms == 0 {
            return Err(E2eError::Config(
                "waits.poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.site.home_url.is_empty() {
            return Err(E2eError::Config("site.home_url is empty".to_string()));
        }
        Ok(())
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            kind: BrowserKind::Chrome,
            headless: false,
            viewport: Viewport::default(),
            user_agent: None,
            args: vec![],
            webdriver_url: "http://localhost:4444".to_string(),
        }
    }
}

impl WaitConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            poll_interval_ms: 500,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            home_url: "https://useinsider.com/".to_string(),
            careers_url: "https://useinsider.com/careers/".to_string(),
            job_board_host: "jobs.lever.co".to_string(),
        }
    }
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            waits: WaitConfig::default(),
            site: SiteConfig::default(),
            screenshots_dir: PathBuf::from("screenshots"),
            failure_scroll_pause_ms: 1000,
        }
    }
}
