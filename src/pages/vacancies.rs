//! The filtered open-positions list.
//!
//! Filtering runs client-side behind Select2 dropdowns, which give no signal
//! when the list finishes re-rendering. The list's markup is fingerprinted
//! before an option is picked and polled until the fingerprint moves. Any
//! other script touching `#jobs-list` during that window also counts as a
//! change; nothing stronger is exposed by the widget.

use super::base::{BasePage, PageHandle};
use crate::digest::ContentDigest;
use crate::errors::{E2eError, Result};
use crate::locator::{xpath_literal, Locator};
use serde::Serialize;
use std::ops::Deref;
use tracing::{debug, info};

pub const JOBS_LIST: &str = "#jobs-list";
pub const JOB_CARDS: &str = "//div[@id='jobs-list']/div";
pub const DEPARTMENT_SELECT: &str = "filter-by-department";

/// Close glyph Select2 renders in front of the current choice.
const CLEAR_GLYPH: char = '×';

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobPosting {
    pub title: String,
    pub department: String,
    pub location: String,
}

impl JobPosting {
    /// Parses a card's rendered text: title, department and location, one
    /// per line.
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        match lines.as_slice() {
            [title, department, location] => Ok(Self {
                title: title.to_string(),
                department: department.to_string(),
                location: location.to_string(),
            }),
            _ => Err(E2eError::AssertionFailed(format!(
                "job card should have 3 lines (title, department, location), got {}: {:?}",
                lines.len(),
                text
            ))),
        }
    }
}

/// Current Select2 choice without the leading clear glyph and extra
/// whitespace.
pub fn normalize_selection(raw: &str) -> String {
    let text = raw.trim_start();
    text.strip_prefix(CLEAR_GLYPH)
        .unwrap_or(text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Clone)]
pub struct VacanciesPage {
    base: BasePage,
}

impl Deref for VacanciesPage {
    type Target = BasePage;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl VacanciesPage {
    pub fn new(handle: PageHandle) -> Self {
        Self {
            base: BasePage::new(handle),
        }
    }

    pub fn location_filter() -> Locator {
        Locator::id("select2-filter-by-location-container")
    }

    pub fn department_filter() -> Locator {
        Locator::id("select2-filter-by-department-container")
    }

    pub fn jobs_list() -> Locator {
        Locator::css(JOBS_LIST)
    }

    pub fn job_cards() -> Locator {
        Locator::xpath(JOB_CARDS)
    }

    /// Link inside the `position`-th card (1-based, as in XPath).
    pub fn job_link(position: usize) -> Locator {
        Locator::xpath(format!("{}[{}]/div/a", JOB_CARDS, position))
    }

    async fn jobs_list_digest(&self) -> Result<ContentDigest> {
        let list = self.get_element(&Self::jobs_list()).await?;
        let html = self.driver().element_inner_html(&list).await?;
        Ok(ContentDigest::of(&html))
    }

    /// Picks `option_text` in a Select2 dropdown and waits for the job list
    /// to re-render.
    ///
    /// Returns `false` without touching the page when the option is already
    /// selected. A list that never changes surfaces as a timeout.
    pub async fn select_option_in_dropdown(
        &self,
        locator: &Locator,
        option_text: &str,
    ) -> Result<bool> {
        let option_text = normalize_selection(option_text);
        let option_text = option_text.as_str();
        let selected = self.wait_for_presence(locator).await?;
        let current_text = normalize_selection(&self.driver().element_text(&selected).await?);

        if current_text == option_text {
            debug!(%locator, option_text, "option already selected");
            return Ok(false);
        }

        let digest_before = self.jobs_list_digest().await?;
        debug!(%locator, from = %current_text, to = option_text, %digest_before, "changing filter");

        let control = self.wait_for_clickable(locator).await?;
        self.driver().click(&control).await?;

        let option = Locator::xpath(format!(
            "//li[normalize-space()={}]",
            xpath_literal(option_text)
        ));
        let option_elem = self.wait_for_clickable(&option).await?;
        self.driver().click(&option_elem).await?;

        let before = &digest_before;
        let digest_after = self
            .wait()
            .until("job list to re-render", move || async move {
                let digest = self.jobs_list_digest().await?;
                Ok(if digest != *before {
                    Some(digest)
                } else {
                    None
                })
            })
            .await?;

        info!(option_text, %digest_after, "filter applied");
        Ok(true)
    }

    pub async fn job_postings(&self) -> Result<Vec<JobPosting>> {
        let cards = self.get_element_list(&Self::job_cards()).await?;
        let mut postings = Vec::with_capacity(cards.len());
        for card in &cards {
            let text = self.driver().element_text(card).await?;
            postings.push(JobPosting::parse(&text)?);
        }
        Ok(postings)
    }

    /// Waits until the native department `<select>` shows `department`; the
    /// team page pre-selects it through the URL.
    pub async fn wait_for_department_preselected(&self, department: &str) -> Result<()> {
        let select = Locator::name(DEPARTMENT_SELECT);
        let select = &select;
        self.wait()
            .until(
                &format!("department filter to show {}", department),
                move || async move {
                    let text = self.selected_option_text(select).await?;
                    Ok((text.as_deref() == Some(department)).then_some(()))
                },
            )
            .await
    }

    /// Opens the `position`-th posting (1-based). Its link targets a new window.
    pub async fn open_job(&self, position: usize) -> Result<()> {
        self.click(&Self::job_link(position)).await
    }
}
