//! In-page JavaScript shared by every backend.
//!
//! Scripts are single expressions (immediately invoked functions) that return
//! primitives only, so they evaluate the same way over the DevTools protocol
//! and over WebDriver's `execute/sync`. A `null` result means the referenced
//! element no longer resolves.

use crate::errors::{E2eError, Result};
use crate::locator::{ElementRef, Strategy};
use serde_json::Value;

pub const INNER_TEXT: &str = "return el.innerText;";

pub const INNER_HTML: &str = "return el.innerHTML;";

pub const IS_ENABLED: &str = "return !el.disabled;";

pub const SCRIPT_CLICK: &str = "el.click(); return true;";

pub const SELECTED_OPTION_TEXT: &str = r#"
    if (!el.selectedOptions || el.selectedOptions.length === 0) return '';
    return el.selectedOptions[0].text;
"#;

pub const IS_DISPLAYED: &str = r#"
    const rect = el.getBoundingClientRect();
    const style = window.getComputedStyle(el);
    return rect.width > 0 &&
           rect.height > 0 &&
           style.visibility !== 'hidden' &&
           style.display !== 'none' &&
           parseFloat(style.opacity) > 0;
"#;

/// Embeds `value` as a JavaScript string literal.
pub fn js_string(value: &str) -> String {
    // JSON strings are valid JS string literals.
    serde_json::Value::String(value.to_string()).to_string()
}

/// Expression evaluating to an array of every node matching `strategy`.
pub fn nodes_expression(strategy: &Strategy) -> String {
    match strategy {
        Strategy::Css(css) => format!(
            "Array.from(document.querySelectorAll({}))",
            js_string(css)
        ),
        Strategy::XPath(xpath) => format!(
            r#"(function() {{
                const snapshot = document.evaluate({}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                const nodes = [];
                for (let i = 0; i < snapshot.snapshotLength; i++) {{
                    nodes.push(snapshot.snapshotItem(i));
                }}
                return nodes;
            }})()"#,
            js_string(xpath)
        ),
    }
}

pub fn count_script(strategy: &Strategy) -> String {
    format!("{}.length", nodes_expression(strategy))
}

/// Runs `body` with `el` bound to the referenced element, or yields `null`.
pub fn element_script(element: &ElementRef, body: &str) -> String {
    format!(
        r#"(function() {{
            const el = {}[{}];
            if (!el) return null;
            {}
        }})()"#,
        nodes_expression(&element.strategy),
        element.index,
        body
    )
}

/// Scrolls so the element sits just below a fixed header.
pub fn scroll_with_offset_body(header_height: u32, extra_padding: u32) -> String {
    format!(
        r#"
        const rect = el.getBoundingClientRect();
        const offset = window.pageYOffset + rect.top - {} - {};
        window.scrollTo({{ top: offset, behavior: 'instant' }});
        return true;
        "#,
        header_height, extra_padding
    )
}

pub fn expect_string(value: Value, element: &ElementRef) -> Result<String> {
    match value {
        Value::Null => Err(E2eError::ElementNotFound(element.to_string())),
        Value::String(s) => Ok(s),
        other => Err(E2eError::JavaScriptFailed(format!(
            "expected a string for {}, got {}",
            element, other
        ))),
    }
}

pub fn expect_bool(value: Value, element: &ElementRef) -> Result<bool> {
    match value {
        Value::Null => Err(E2eError::ElementNotFound(element.to_string())),
        Value::Bool(b) => Ok(b),
        other => Err(E2eError::JavaScriptFailed(format!(
            "expected a boolean for {}, got {}",
            element, other
        ))),
    }
}

pub fn expect_count(value: Value) -> Result<usize> {
    value
        .as_u64()
        .map(|n| n as usize)
        .ok_or_else(|| E2eError::JavaScriptFailed(format!("expected a count, got {}", value)))
}
