use crate::errors::Result;
use crate::locator::{ElementRef, Strategy};
use crate::types::WindowHandle;
use crate::utils::javascript;
use async_trait::async_trait;
use serde_json::Value;

/// One live browser session, whichever protocol drives it.
///
/// Backends implement the protocol-level operations. Element reads come as
/// provided methods built on [`BrowserDriver::execute_script`], so both
/// backends observe the DOM through the same in-page scripts.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Navigate the active window and wait for the load to finish
    async fn goto(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    /// Evaluate a single JavaScript expression in the active window
    async fn execute_script(&self, expression: &str) -> Result<Value>;

    /// Click with real pointer events, the way a user would
    async fn click(&self, element: &ElementRef) -> Result<()>;

    async fn window_handles(&self) -> Result<Vec<WindowHandle>>;

    async fn current_window(&self) -> Result<WindowHandle>;

    async fn switch_to_window(&self, handle: &WindowHandle) -> Result<()>;

    /// Close the active window. The caller must switch to another one.
    async fn close_window(&self) -> Result<()>;

    async fn screenshot_png(&self) -> Result<Vec<u8>>;

    /// End the session. Calling it twice is harmless.
    async fn quit(&self) -> Result<()>;

    async fn count_matches(&self, strategy: &Strategy) -> Result<usize> {
        let value = self
            .execute_script(&javascript::count_script(strategy))
            .await?;
        javascript::expect_count(value)
    }

    async fn element_text(&self, element: &ElementRef) -> Result<String> {
        let value = self
            .execute_script(&javascript::element_script(element, javascript::INNER_TEXT))
            .await?;
        javascript::expect_string(value, element)
    }

    async fn element_inner_html(&self, element: &ElementRef) -> Result<String> {
        let value = self
            .execute_script(&javascript::element_script(element, javascript::INNER_HTML))
            .await?;
        javascript::expect_string(value, element)
    }

    async fn element_is_displayed(&self, element: &ElementRef) -> Result<bool> {
        let value = self
            .execute_script(&javascript::element_script(element, javascript::IS_DISPLAYED))
            .await?;
        javascript::expect_bool(value, element)
    }

    async fn element_is_enabled(&self, element: &ElementRef) -> Result<bool> {
        let value = self
            .execute_script(&javascript::element_script(element, javascript::IS_ENABLED))
            .await?;
        javascript::expect_bool(value, element)
    }

    /// Text of the first selected `<option>` of a native `<select>`
    async fn selected_option_text(&self, element: &ElementRef) -> Result<Option<String>> {
        let value = self
            .execute_script(&javascript::element_script(
                element,
                javascript::SELECTED_OPTION_TEXT,
            ))
            .await?;
        let text = javascript::expect_string(value, element)?;
        Ok(if text.is_empty() { None } else { Some(text) })
    }

    /// `element.click()` from page script: no visibility or overlap checks
    async fn script_click(&self, element: &ElementRef) -> Result<()> {
        let value = self
            .execute_script(&javascript::element_script(element, javascript::SCRIPT_CLICK))
            .await?;
        javascript::expect_bool(value, element).map(|_| ())
    }

    async fn scroll_into_view_with_offset(
        &self,
        element: &ElementRef,
        header_height: u32,
        extra_padding: u32,
    ) -> Result<()> {
        let body = javascript::scroll_with_offset_body(header_height, extra_padding);
        let value = self
            .execute_script(&javascript::element_script(element, &body))
            .await?;
        javascript::expect_bool(value, element).map(|_| ())
    }
}
