use crate::core::BrowserDriver;
use crate::errors::Result;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::info;

pub struct ScreenshotManager;

impl ScreenshotManager {
    /// `<test id>_<timestamp>.png`, flattened so a test path never turns into
    /// nested directories.
    pub fn file_name(test_id: &str, taken_at: DateTime<Local>) -> String {
        format!(
            "{}_{}.png",
            test_id,
            taken_at.format("%Y-%m-%d_%H-%M-%S")
        )
        .replace('/', "_")
        .replace("::", "__")
    }

    pub async fn save_to_file(driver: &dyn BrowserDriver, file_path: &Path) -> Result<()> {
        let screenshot_bytes = driver.screenshot_png().await?;
        tokio::fs::write(file_path, screenshot_bytes).await?;
        Ok(())
    }

    /// Saves a timestamped screenshot of the active window under `dir`,
    /// creating it if needed, and returns the written path.
    pub async fn save_for_test(
        driver: &dyn BrowserDriver,
        dir: &Path,
        test_id: &str,
    ) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(Self::file_name(test_id, Local::now()));
        Self::save_to_file(driver, &path).await?;
        info!(path = %path.display(), "screenshot saved");
        Ok(path)
    }
}
