pub mod browser;
pub mod core;
pub mod digest;
pub mod errors;
pub mod harness;
pub mod locator;
pub mod pages;
pub mod scenarios;
pub mod types;
pub mod utils;
pub mod wait;

#[cfg(test)]
mod testing;

pub use browser::{ElementFinder, Session};
pub use core::{BrowserConfig, BrowserDriver, SiteConfig, SuiteConfig, WaitConfig};
pub use digest::ContentDigest;
pub use errors::{E2eError, Result};
pub use harness::{run_test, run_with_session, PhaseOutcome, TestReport};
pub use locator::{ElementRef, Locator, LocatorKind, Strategy};
pub use pages::Pages;
pub use types::*;
pub use wait::Wait;
