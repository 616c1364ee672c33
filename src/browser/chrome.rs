use crate::core::{BrowserConfig, BrowserDriver};
use crate::errors::{E2eError, Result};
use crate::locator::{ElementRef, Strategy};
use crate::types::WindowHandle;
use async_trait::async_trait;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions, Tab};
use parking_lot::Mutex;
use serde_json::Value;
use std::ffi::OsStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Chrome over the DevTools protocol.
///
/// Windows are page targets; a handle is the target id. The browser process
/// is killed on `quit`, or when this value is dropped.
pub struct ChromeDriver {
    browser: Mutex<Option<Browser>>,
    active: Mutex<Arc<Tab>>,
}

impl ChromeDriver {
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let window_size_arg = format!(
            "--window-size={},{}",
            config.viewport.width, config.viewport.height
        );
        let user_agent_arg = config
            .user_agent
            .as_ref()
            .map(|ua| format!("--user-agent={}", ua));

        let mut args = vec![
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-dev-shm-usage"),
            // Script-driven clicks on target=_blank links must open a window.
            OsStr::new("--disable-popup-blocking"),
            OsStr::new("--start-maximized"),
            OsStr::new(&window_size_arg),
        ];

        if let Some(ref ua_arg) = user_agent_arg {
            args.push(OsStr::new(ua_arg));
        }

        for arg in &config.args {
            args.push(OsStr::new(arg));
        }

        let launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .args(args)
            .build()
            .map_err(|e| E2eError::LaunchFailed(e.to_string()))?;

        let browser =
            Browser::new(launch_options).map_err(|e| E2eError::LaunchFailed(e.to_string()))?;

        let tab = browser
            .wait_for_initial_tab()
            .map_err(|e| E2eError::LaunchFailed(e.to_string()))?;

        info!(headless = config.headless, "chrome launched");

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            active: Mutex::new(tab),
        })
    }

    pub fn is_running(&self) -> bool {
        self.browser.lock().is_some()
    }

    fn tab(&self) -> Arc<Tab> {
        self.active.lock().clone()
    }

    fn tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let browser = self.browser.lock();
        let browser = browser
            .as_ref()
            .ok_or_else(|| E2eError::InteractionFailed("browser is not running".to_string()))?;
        let tabs = browser
            .get_tabs()
            .lock()
            .map_err(|e| E2eError::InteractionFailed(format!("tab list unavailable: {}", e)))?;
        Ok(tabs.clone())
    }
}

#[async_trait]
impl BrowserDriver for ChromeDriver {
    async fn goto(&self, url: &str) -> Result<()> {
        let tab = self.tab();
        tab.navigate_to(url)
            .map_err(|e| E2eError::NavigationFailed(e.to_string()))?;

        tab.wait_until_navigated()
            .map_err(|e| E2eError::NavigationFailed(e.to_string()))?;

        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.tab().get_url())
    }

    async fn execute_script(&self, expression: &str) -> Result<Value> {
        let result = self
            .tab()
            .evaluate(expression, false)
            .map_err(|e| E2eError::JavaScriptFailed(e.to_string()))?;

        Ok(result.value.unwrap_or(Value::Null))
    }

    async fn click(&self, element: &ElementRef) -> Result<()> {
        let tab = self.tab();
        let found = match &element.strategy {
            Strategy::Css(css) => tab.find_elements(css),
            Strategy::XPath(xpath) => tab.find_elements_by_xpath(xpath),
        }
        .map_err(|e| E2eError::ElementNotFound(format!("{}: {}", element, e)))?;

        let target = found
            .get(element.index)
            .ok_or_else(|| E2eError::ElementNotFound(element.to_string()))?;

        target
            .click()
            .map_err(|e| E2eError::InteractionFailed(format!("{}: {}", element, e)))?;

        Ok(())
    }

    async fn window_handles(&self) -> Result<Vec<WindowHandle>> {
        Ok(self
            .tabs()?
            .iter()
            .map(|tab| WindowHandle::new(tab.get_target_id().clone()))
            .collect())
    }

    async fn current_window(&self) -> Result<WindowHandle> {
        Ok(WindowHandle::new(self.tab().get_target_id().clone()))
    }

    async fn switch_to_window(&self, handle: &WindowHandle) -> Result<()> {
        let tab = self
            .tabs()?
            .into_iter()
            .find(|tab| tab.get_target_id() == handle.as_str())
            .ok_or_else(|| {
                E2eError::InteractionFailed(format!("no window with handle {}", handle))
            })?;

        tab.activate()
            .map_err(|e| E2eError::InteractionFailed(e.to_string()))?;

        debug!(window = %handle, "switched window");
        *self.active.lock() = tab;
        Ok(())
    }

    async fn close_window(&self) -> Result<()> {
        self.tab()
            .close(true)
            .map_err(|e| E2eError::InteractionFailed(e.to_string()))?;
        Ok(())
    }

    async fn screenshot_png(&self) -> Result<Vec<u8>> {
        self.tab()
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| E2eError::ScreenshotFailed(e.to_string()))
    }

    async fn quit(&self) -> Result<()> {
        if !self.is_running() {
            return Ok(());
        }
        for tab in self.tabs()? {
            if let Err(e) = tab.close(false) {
                warn!(target_id = %tab.get_target_id(), error = %e, "could not close tab");
            }
        }
        // Dropping the last handle kills the process.
        drop(self.browser.lock().take());
        info!("chrome stopped");
        Ok(())
    }
}
