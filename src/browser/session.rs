use crate::core::{BrowserConfig, BrowserDriver};
use crate::errors::{E2eError, Result};
use crate::locator::{ElementRef, Locator};
use crate::types::BrowserKind;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Finds elements for page objects.
///
/// The session implements it directly; the harness wraps the session in a
/// decorator that also remembers the most recent hit.
#[async_trait]
pub trait ElementFinder: Send + Sync {
    async fn find_element(&self, locator: &Locator) -> Result<ElementRef>;

    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementRef>>;
}

/// A browser session owned by exactly one test.
pub struct Session {
    driver: Box<dyn BrowserDriver>,
    kind: BrowserKind,
    closed: AtomicBool,
}

impl Session {
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        info!(browser = %config.kind, "launching browser session");
        let driver: Box<dyn BrowserDriver> = match config.kind {
            #[cfg(feature = "chrome")]
            BrowserKind::Chrome => Box::new(super::chrome::ChromeDriver::launch(config).await?),
            #[cfg(feature = "firefox")]
            BrowserKind::Firefox => Box::new(super::firefox::FirefoxDriver::launch(config).await?),
            #[allow(unreachable_patterns)]
            other => {
                return Err(E2eError::UnsupportedBrowser(format!(
                    "{} (backend not compiled in)",
                    other
                )))
            }
        };
        Ok(Self::with_driver(config.kind, driver))
    }

    pub fn with_driver(kind: BrowserKind, driver: Box<dyn BrowserDriver>) -> Self {
        Self {
            driver,
            kind,
            closed: AtomicBool::new(false),
        }
    }

    pub fn kind(&self) -> BrowserKind {
        self.kind
    }

    pub fn driver(&self) -> &dyn BrowserDriver {
        self.driver.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Ends the browser session; only the first call reaches the driver.
    pub async fn quit(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!(browser = %self.kind, "quitting browser session");
        self.driver.quit().await
    }
}

#[async_trait]
impl ElementFinder for Session {
    async fn find_element(&self, locator: &Locator) -> Result<ElementRef> {
        let strategy = locator.strategy();
        let count = self.driver.count_matches(&strategy).await?;
        debug!(%locator, count, "find element");
        if count == 0 {
            return Err(E2eError::ElementNotFound(locator.to_string()));
        }
        Ok(ElementRef::new(strategy, 0, locator.to_string()))
    }

    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementRef>> {
        let strategy = locator.strategy();
        let count = self.driver.count_matches(&strategy).await?;
        debug!(%locator, count, "find elements");
        Ok((0..count)
            .map(|index| ElementRef::new(strategy.clone(), index, locator.to_string()))
            .collect())
    }
}
