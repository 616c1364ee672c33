use super::base::{BasePage, PageHandle};
use crate::errors::Result;
use crate::locator::Locator;
use std::ops::Deref;
use tracing::info;

#[derive(Clone)]
pub struct HomePage {
    base: BasePage,
}

impl Deref for HomePage {
    type Target = BasePage;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl HomePage {
    pub fn new(handle: PageHandle) -> Self {
        Self {
            base: BasePage::new(handle),
        }
    }

    pub fn accept_cookies_button() -> Locator {
        Locator::id("wt-cli-accept-all-btn")
    }

    pub fn hero() -> Locator {
        Locator::id("desktop_hero_24")
    }

    /// Loads the home page, dismisses the cookie banner and checks the hero
    /// block rendered.
    pub async fn open_home_page(&self) -> Result<()> {
        let home_url = self.site().home_url.clone();
        self.goto(&home_url).await?;

        self.wait_for_clickable(&Self::accept_cookies_button()).await?;
        self.native_click(&Self::accept_cookies_button()).await?;

        crate::ensure_ui!(
            self.is_element_displayed(&Self::hero()).await?,
            "home page hero {} is not displayed",
            Self::hero()
        );
        info!(url = %home_url, "home page open");
        Ok(())
    }
}
