#[cfg(feature = "chrome")]
pub mod chrome;
#[cfg(feature = "firefox")]
pub mod firefox;
pub mod session;

pub use session::{ElementFinder, Session};
