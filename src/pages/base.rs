use crate::browser::{ElementFinder, Session};
use crate::core::{BrowserDriver, SiteConfig, WaitConfig};
use crate::errors::{E2eError, Result};
use crate::locator::{ElementRef, Locator};
use crate::types::WindowHandle;
use crate::wait::Wait;
use std::sync::Arc;
use tracing::{debug, info};

/// What every page object is built from: the test's session, the finder
/// used for lookups (possibly a tracking decorator), and suite settings.
#[derive(Clone)]
pub struct PageHandle {
    pub session: Arc<Session>,
    pub finder: Arc<dyn ElementFinder>,
    pub waits: WaitConfig,
    pub site: SiteConfig,
}

impl PageHandle {
    pub fn new(
        session: Arc<Session>,
        finder: Arc<dyn ElementFinder>,
        waits: WaitConfig,
        site: SiteConfig,
    ) -> Self {
        Self {
            session,
            finder,
            waits,
            site,
        }
    }
}

/// Element access and window helpers shared by all page objects.
#[derive(Clone)]
pub struct BasePage {
    handle: PageHandle,
}

impl BasePage {
    pub fn new(handle: PageHandle) -> Self {
        Self { handle }
    }

    pub fn driver(&self) -> &dyn BrowserDriver {
        self.handle.session.driver()
    }

    pub fn site(&self) -> &SiteConfig {
        &self.handle.site
    }

    /// The default bounded wait for this suite.
    pub fn wait(&self) -> Wait {
        Wait::from_config(&self.handle.waits)
    }

    pub async fn goto(&self, url: &str) -> Result<()> {
        info!(url, "navigating");
        self.driver().goto(url).await
    }

    pub async fn current_url(&self) -> Result<String> {
        self.driver().current_url().await
    }

    /// First element matching `locator`
    pub async fn get_element(&self, locator: &Locator) -> Result<ElementRef> {
        self.handle.finder.find_element(locator).await
    }

    /// All elements matching `locator`, possibly none
    pub async fn get_element_list(&self, locator: &Locator) -> Result<Vec<ElementRef>> {
        self.handle.finder.find_elements(locator).await
    }

    pub async fn is_element_displayed(&self, locator: &Locator) -> Result<bool> {
        let element = self.get_element(locator).await?;
        self.driver().element_is_displayed(&element).await
    }

    pub async fn element_text(&self, locator: &Locator) -> Result<String> {
        let element = self.get_element(locator).await?;
        self.driver().element_text(&element).await
    }

    pub async fn selected_option_text(&self, locator: &Locator) -> Result<Option<String>> {
        let element = self.get_element(locator).await?;
        self.driver().selected_option_text(&element).await
    }

    pub async fn wait_for_presence(&self, locator: &Locator) -> Result<ElementRef> {
        let finder = &self.handle.finder;
        self.wait()
            .until(&format!("presence of {}", locator), move || async move {
                finder.find_element(locator).await.map(Some)
            })
            .await
    }

    /// Waits until the element is present, displayed and enabled.
    pub async fn wait_for_clickable(&self, locator: &Locator) -> Result<ElementRef> {
        let finder = &self.handle.finder;
        let driver = self.driver();
        self.wait()
            .until(&format!("{} to be clickable", locator), move || async move {
                let element = finder.find_element(locator).await?;
                let ready = driver.element_is_displayed(&element).await?
                    && driver.element_is_enabled(&element).await?;
                Ok(if ready { Some(element) } else { None })
            })
            .await
    }

    /// Waits for presence, then clicks from page script so overlays and
    /// off-screen positions do not get in the way.
    pub async fn click(&self, locator: &Locator) -> Result<()> {
        self.wait_for_presence(locator).await?;
        let element = self.get_element(locator).await?;
        debug!(%element, "script click");
        self.driver().script_click(&element).await
    }

    /// Clicks the first match immediately with real pointer events.
    pub async fn native_click(&self, locator: &Locator) -> Result<()> {
        let element = self.get_element(locator).await?;
        debug!(%element, "native click");
        self.driver().click(&element).await
    }

    /// Returns the current window, failing fast unless it is the only one.
    pub async fn capture_current_window(&self) -> Result<WindowHandle> {
        let original_window = self.driver().current_window().await?;
        let open = self.driver().window_handles().await?.len();
        if open != 1 {
            return Err(E2eError::WindowCount {
                expected: 1,
                actual: open,
            });
        }
        Ok(original_window)
    }

    /// Waits for a second window, switches to it and, when `new_url` is
    /// given, waits until its address contains that fragment.
    pub async fn switch_to_new_window(
        &self,
        current_window: &WindowHandle,
        new_url: Option<&str>,
    ) -> Result<()> {
        let driver = self.driver();
        let handles = self
            .wait()
            .until("two open windows", move || async move {
                let handles = driver.window_handles().await?;
                Ok(if handles.len() == 2 { Some(handles) } else { None })
            })
            .await?;

        let new_window = handles
            .into_iter()
            .find(|handle| handle != current_window)
            .ok_or(E2eError::WindowCount {
                expected: 2,
                actual: 1,
            })?;
        driver.switch_to_window(&new_window).await?;
        info!(window = %new_window, "switched to new window");

        if let Some(fragment) = new_url {
            let url = self
                .wait()
                .until(&format!("url to contain {}", fragment), move || async move {
                    let url = driver.current_url().await?;
                    Ok(if url.contains(fragment) { Some(url) } else { None })
                })
                .await?;
            crate::ensure_ui!(
                url.contains(fragment),
                "new window url {} does not contain {}",
                url,
                fragment
            );
        }
        Ok(())
    }

    pub async fn close_window_and_return_to_original_window(
        &self,
        original_window: &WindowHandle,
    ) -> Result<()> {
        self.driver().close_window().await?;
        self.driver().switch_to_window(original_window).await?;
        info!(window = %original_window, "returned to original window");
        Ok(())
    }

    /// Polls the address until it differs from `current_page` and returns it.
    pub async fn wait_until_current_page_changed(&self, current_page: &str) -> Result<String> {
        let driver = self.driver();
        let changed_url = self
            .wait()
            .until(
                &format!("current page to change from {}", current_page),
                move || async move {
                    let url = driver.current_url().await?;
                    Ok(if url != current_page { Some(url) } else { None })
                },
            )
            .await?;
        info!(from = current_page, to = %changed_url, "page changed");
        Ok(changed_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDriver;
    use crate::types::BrowserKind;
    use std::time::Duration;

    fn page(fake: &FakeDriver) -> BasePage {
        let session = Arc::new(Session::with_driver(
            BrowserKind::Chrome,
            Box::new(fake.clone()),
        ));
        let waits = WaitConfig {
            timeout_ms: 150,
            poll_interval_ms: 5,
        };
        BasePage::new(PageHandle::new(
            session.clone(),
            session,
            waits,
            SiteConfig::default(),
        ))
    }

    #[tokio::test]
    async fn click_waits_for_presence_then_script_clicks() {
        let fake = FakeDriver::new("https://useinsider.com/careers/");
        let link = Locator::link("See all teams");
        fake.add_element(link.clone(), "See all teams");
        fake.appear_after(link.clone(), 3);

        page(&fake).click(&link).await.unwrap();
        assert_eq!(fake.clicks(), vec!["script:link=See all teams[0]".to_string()]);
    }

    #[tokio::test]
    async fn click_times_out_when_element_never_appears() {
        let fake = FakeDriver::new("https://useinsider.com/careers/");
        let err = page(&fake)
            .click(&Locator::link("See all QA jobs"))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(fake.clicks().is_empty());
    }

    #[tokio::test]
    async fn displayed_reflects_visibility() {
        let fake = FakeDriver::new("https://useinsider.com/careers/");
        let calling = Locator::id("career-find-our-calling");
        let hidden = Locator::class("e-swiper-container");
        fake.add_element(calling.clone(), "");
        fake.add_element(hidden.clone(), "");
        fake.set_displayed(hidden.clone(), false);

        let page = page(&fake);
        assert!(page.is_element_displayed(&calling).await.unwrap());
        assert!(!page.is_element_displayed(&hidden).await.unwrap());
        assert!(matches!(
            page.is_element_displayed(&Locator::id("career-our-location")).await,
            Err(E2eError::ElementNotFound(_))
        ));
    }

    #[tokio::test]
    async fn clickable_requires_enabled() {
        let fake = FakeDriver::new("about:blank");
        let button = Locator::css("button.apply");
        fake.add_element(button.clone(), "Apply");
        fake.set_enabled(button.clone(), false);

        let err = page(&fake).wait_for_clickable(&button).await.unwrap_err();
        assert!(err.is_timeout());

        fake.set_enabled(button.clone(), true);
        let element = page(&fake).wait_for_clickable(&button).await.unwrap();
        assert_eq!(element.description, "css=button.apply");
    }

    #[tokio::test]
    async fn capture_requires_exactly_one_window() {
        let fake = FakeDriver::new("https://useinsider.com/");
        let page = page(&fake);
        let original = page.capture_current_window().await.unwrap();
        assert_eq!(original.as_str(), "window-1");

        fake.open_window("https://jobs.lever.co/useinsider/123");
        let err = page.capture_current_window().await.unwrap_err();
        assert!(matches!(
            err,
            E2eError::WindowCount {
                expected: 1,
                actual: 2
            }
        ));
    }

    #[tokio::test]
    async fn switch_and_return_round_trip() {
        let fake = FakeDriver::new("https://useinsider.com/careers/open-positions/");
        let page = page(&fake);
        let original = page.capture_current_window().await.unwrap();

        let apply = Locator::xpath("//div[@id='jobs-list']/div[2]/div/a");
        fake.add_element(apply.clone(), "View Role");
        fake.on_click(apply.clone(), |state| {
            state.open_window("https://jobs.lever.co/useinsider/abc")
        });

        page.click(&apply).await.unwrap();
        page.switch_to_new_window(&original, Some("jobs.lever.co"))
            .await
            .unwrap();
        assert_eq!(
            page.current_url().await.unwrap(),
            "https://jobs.lever.co/useinsider/abc"
        );

        page.close_window_and_return_to_original_window(&original)
            .await
            .unwrap();
        assert_eq!(fake.window_count(), 1);
        assert_eq!(page.driver().current_window().await.unwrap(), original);
    }

    #[tokio::test]
    async fn switch_times_out_without_second_window() {
        let fake = FakeDriver::new("https://useinsider.com/");
        let page = page(&fake);
        let original = page.capture_current_window().await.unwrap();
        let err = page
            .switch_to_new_window(&original, None)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn switch_waits_for_expected_url() {
        let fake = FakeDriver::new("https://useinsider.com/");
        let page = page(&fake);
        let original = page.capture_current_window().await.unwrap();
        fake.open_window("about:blank");

        let err = page
            .switch_to_new_window(&original, Some("jobs.lever.co"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("jobs.lever.co"));
    }

    #[tokio::test]
    async fn page_change_returns_new_address() {
        let fake = FakeDriver::new("https://useinsider.com/careers/");
        fake.queue_urls(&[
            "https://useinsider.com/careers/",
            "https://useinsider.com/careers/",
            "https://useinsider.com/careers/quality-assurance/",
        ]);
        let changed = page(&fake)
            .wait_until_current_page_changed("https://useinsider.com/careers/")
            .await
            .unwrap();
        assert_eq!(changed, "https://useinsider.com/careers/quality-assurance/");
    }

    #[tokio::test]
    async fn page_change_times_out() {
        let fake = FakeDriver::new("https://useinsider.com/careers/");
        let started = std::time::Instant::now();
        let err = page(&fake)
            .wait_until_current_page_changed("https://useinsider.com/careers/")
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(started.elapsed() >= Duration::from_millis(150));
    }
}
