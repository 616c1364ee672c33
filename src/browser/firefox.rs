use crate::core::{BrowserConfig, BrowserDriver};
use crate::errors::{E2eError, Result};
use crate::locator::{ElementRef, Strategy};
use crate::types::WindowHandle;
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Value};
use tracing::{info, warn};

/// Firefox over W3C WebDriver, through a running geckodriver.
pub struct FirefoxDriver {
    client: Client,
}

impl FirefoxDriver {
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let mut args = config.args.clone();
        if config.headless {
            args.push("-headless".to_string());
        }
        args.push(format!("--width={}", config.viewport.width));
        args.push(format!("--height={}", config.viewport.height));

        let mut firefox_options = json!({ "args": args });
        if let Some(ua) = &config.user_agent {
            firefox_options["prefs"] = json!({ "general.useragent.override": ua });
        }

        let mut capabilities = serde_json::Map::new();
        capabilities.insert("browserName".to_string(), json!("firefox"));
        capabilities.insert("moz:firefoxOptions".to_string(), firefox_options);

        let client = ClientBuilder::native()
            .capabilities(capabilities)
            .connect(&config.webdriver_url)
            .await
            .map_err(|e| {
                E2eError::LaunchFailed(format!("{} ({})", e, config.webdriver_url))
            })?;

        if let Err(e) = client.maximize_window().await {
            // Headless sessions may refuse window management.
            warn!(error = %e, "could not maximize firefox window");
        }

        info!(webdriver = %config.webdriver_url, headless = config.headless, "firefox session started");
        Ok(Self { client })
    }

    async fn find_all(&self, strategy: &Strategy) -> Result<Vec<fantoccini::elements::Element>> {
        let locator = match strategy {
            Strategy::Css(css) => Locator::Css(css),
            Strategy::XPath(xpath) => Locator::XPath(xpath),
        };
        Ok(self.client.find_all(locator).await?)
    }
}

#[async_trait]
impl BrowserDriver for FirefoxDriver {
    async fn goto(&self, url: &str) -> Result<()> {
        self.client
            .goto(url)
            .await
            .map_err(|e| E2eError::NavigationFailed(e.to_string()))
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn execute_script(&self, expression: &str) -> Result<Value> {
        self.client
            .execute(&format!("return {};", expression), vec![])
            .await
            .map_err(|e| E2eError::JavaScriptFailed(e.to_string()))
    }

    async fn click(&self, element: &ElementRef) -> Result<()> {
        let found = self.find_all(&element.strategy).await?;
        let target = found
            .get(element.index)
            .ok_or_else(|| E2eError::ElementNotFound(element.to_string()))?;

        target
            .click()
            .await
            .map_err(|e| E2eError::InteractionFailed(format!("{}: {}", element, e)))
    }

    async fn window_handles(&self) -> Result<Vec<WindowHandle>> {
        Ok(self
            .client
            .windows()
            .await?
            .into_iter()
            .map(|handle| WindowHandle::new(String::from(handle)))
            .collect())
    }

    async fn current_window(&self) -> Result<WindowHandle> {
        Ok(WindowHandle::new(String::from(self.client.window().await?)))
    }

    async fn switch_to_window(&self, handle: &WindowHandle) -> Result<()> {
        let target = fantoccini::wd::WindowHandle::try_from(handle.as_str().to_string())
            .map_err(|e| E2eError::InteractionFailed(format!("bad window handle {}: {}", handle, e)))?;
        Ok(self.client.switch_to_window(target).await?)
    }

    async fn close_window(&self) -> Result<()> {
        Ok(self.client.close_window().await?)
    }

    async fn screenshot_png(&self) -> Result<Vec<u8>> {
        self.client
            .screenshot()
            .await
            .map_err(|e| E2eError::ScreenshotFailed(e.to_string()))
    }

    async fn quit(&self) -> Result<()> {
        Ok(self.client.clone().close().await?)
    }
}
