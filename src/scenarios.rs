//! End-to-end scenarios, registered by name for the runner.

use crate::errors::Result;
use crate::locator::Locator;
use crate::pages::{CareerPage, Pages, VacanciesPage};
use std::future::Future;
use std::pin::Pin;
use tracing::info;

pub type ScenarioFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

#[derive(Clone, Copy)]
pub struct Scenario {
    pub id: &'static str,
    pub run: fn(Pages) -> ScenarioFuture,
}

pub const ALL: &[Scenario] = &[Scenario {
    id: "careers::qa_careers",
    run: boxed_qa_careers,
}];

fn boxed_qa_careers(pages: Pages) -> ScenarioFuture {
    Box::pin(qa_careers(pages))
}

pub fn find(id: &str) -> Option<&'static Scenario> {
    ALL.iter().find(|scenario| scenario.id == id)
}

/// Scenarios whose id contains `filter`; all of them when there is none.
pub fn matching(filter: Option<&str>) -> Vec<&'static Scenario> {
    ALL.iter()
        .filter(|scenario| filter.map_or(true, |f| scenario.id.contains(f)))
        .collect()
}

const QA_DEPARTMENT: &str = "Quality Assurance";
const ISTANBUL: &str = "Istanbul, Turkiye";

/// Home → Careers → Quality Assurance team → filtered QA openings → a
/// posting on the external job board and back.
pub async fn qa_careers(pages: Pages) -> Result<()> {
    let Pages {
        home,
        careers,
        vacancies,
    } = pages;

    home.open_home_page().await?;
    let original_window = home.capture_current_window().await?;

    careers.open_careers_page().await?;
    for section in [
        CareerPage::find_our_calling(),
        CareerPage::our_locations(),
        CareerPage::life_at_company(),
    ] {
        crate::ensure_ui!(
            careers.is_element_displayed(&section).await?,
            "careers section {} is not displayed",
            section
        );
    }

    careers.click(&Locator::link("See all teams")).await?;
    careers.click(&Locator::link(QA_DEPARTMENT)).await?;
    let careers_url = careers.site().careers_url.clone();
    careers.wait_until_current_page_changed(&careers_url).await?;

    careers.click(&Locator::link("See all QA jobs")).await?;
    vacancies
        .wait_for_department_preselected(QA_DEPARTMENT)
        .await?;

    vacancies
        .select_option_in_dropdown(&VacanciesPage::location_filter(), ISTANBUL)
        .await?;
    vacancies
        .select_option_in_dropdown(&VacanciesPage::department_filter(), QA_DEPARTMENT)
        .await?;

    let postings = vacancies.job_postings().await?;
    info!(count = postings.len(), "checking filtered postings");
    for posting in &postings {
        crate::ensure_ui!(
            posting.title.contains(QA_DEPARTMENT),
            "title {:?} does not mention {}",
            posting.title,
            QA_DEPARTMENT
        );
        crate::ensure_ui!(
            posting.department == QA_DEPARTMENT,
            "department {:?} is not {}",
            posting.department,
            QA_DEPARTMENT
        );
        crate::ensure_ui!(
            posting.location == ISTANBUL,
            "location {:?} is not {}",
            posting.location,
            ISTANBUL
        );
    }

    vacancies.open_job(2).await?;
    let job_board = format!("https://{}", vacancies.site().job_board_host);
    vacancies
        .switch_to_new_window(&original_window, Some(&job_board))
        .await?;
    vacancies
        .close_window_and_return_to_original_window(&original_window)
        .await
}
