pub mod browser;
pub mod config;

pub use browser::BrowserDriver;
pub use config::{BrowserConfig, SiteConfig, SuiteConfig, WaitConfig};
