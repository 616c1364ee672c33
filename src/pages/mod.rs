pub mod base;
pub mod careers;
pub mod home;
pub mod vacancies;

pub use base::{BasePage, PageHandle};
pub use careers::CareerPage;
pub use home::HomePage;
pub use vacancies::{JobPosting, VacanciesPage};

/// Every page object a scenario can use, built once per test from the same
/// handle.
#[derive(Clone)]
pub struct Pages {
    pub home: HomePage,
    pub careers: CareerPage,
    pub vacancies: VacanciesPage,
}

impl Pages {
    pub fn assemble(handle: PageHandle) -> Self {
        Self {
            home: HomePage::new(handle.clone()),
            careers: CareerPage::new(handle.clone()),
            vacancies: VacanciesPage::new(handle),
        }
    }

    pub fn names() -> &'static [&'static str] {
        &["HomePage", "CareerPage", "VacanciesPage"]
    }

    /// Looks a page up by its type name.
    pub fn by_name(&self, name: &str) -> Option<&BasePage> {
        match name {
            "HomePage" => Some(&*self.home),
            "CareerPage" => Some(&*self.careers),
            "VacanciesPage" => Some(&*self.vacancies),
            _ => None,
        }
    }
}
