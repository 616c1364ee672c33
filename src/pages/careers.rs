use super::base::{BasePage, PageHandle};
use crate::errors::Result;
use crate::locator::Locator;
use std::ops::Deref;

#[derive(Clone)]
pub struct CareerPage {
    base: BasePage,
}

impl Deref for CareerPage {
    type Target = BasePage;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl CareerPage {
    pub fn new(handle: PageHandle) -> Self {
        Self {
            base: BasePage::new(handle),
        }
    }

    pub fn company_menu() -> Locator {
        Locator::xpath("//a[contains(text(),'Company')]")
    }

    pub fn careers_link(careers_url: &str) -> Locator {
        Locator::css(format!("a[href='{}']", careers_url))
    }

    pub fn find_our_calling() -> Locator {
        Locator::id("career-find-our-calling")
    }

    pub fn our_locations() -> Locator {
        Locator::id("career-our-location")
    }

    pub fn life_at_company() -> Locator {
        Locator::class("e-swiper-container")
    }

    /// Opens the Company menu and follows its Careers entry.
    pub async fn open_careers_page(&self) -> Result<()> {
        self.native_click(&Self::company_menu()).await?;

        let careers = Self::careers_link(&self.site().careers_url);
        self.wait_for_clickable(&careers).await?;
        self.native_click(&careers).await
    }
}
