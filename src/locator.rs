//! Symbolic locators and the lookup strategies they resolve to.
//!
//! Every locator kind is resolved to either a CSS selector or an XPath
//! expression, the two query languages both backends evaluate in-page. Kinds
//! that the W3C protocol handles specially (link text, class name) are
//! rewritten into equivalent XPath so the Chrome backend needs no extra cases.

use crate::errors::{E2eError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorKind {
    Id,
    Name,
    Path,
    Selector,
    Class,
    Link,
    PartialLink,
}

impl LocatorKind {
    /// Case-insensitive lookup. `None` is the "unsupported kind" sentinel.
    pub fn from_name(name: &str) -> Option<LocatorKind> {
        match name.to_lowercase().as_str() {
            "id" => Some(LocatorKind::Id),
            "name" => Some(LocatorKind::Name),
            "path" | "xpath" => Some(LocatorKind::Path),
            "selector" | "css" => Some(LocatorKind::Selector),
            "class" => Some(LocatorKind::Class),
            "link" => Some(LocatorKind::Link),
            "partial_link" => Some(LocatorKind::PartialLink),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LocatorKind::Id => "id",
            LocatorKind::Name => "name",
            LocatorKind::Path => "xpath",
            LocatorKind::Selector => "css",
            LocatorKind::Class => "class",
            LocatorKind::Link => "link",
            LocatorKind::PartialLink => "partial_link",
        }
    }
}

/// The query actually run against the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    Css(String),
    XPath(String),
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Css(css) => write!(f, "css={}", css),
            Strategy::XPath(xpath) => write!(f, "xpath={}", xpath),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub kind: LocatorKind,
    pub value: String,
}

impl Locator {
    pub fn new(kind: LocatorKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Builds a locator from a kind name such as `"id"` or `"XPATH"`.
    pub fn parse(value: impl Into<String>, kind: &str) -> Result<Self> {
        let kind = LocatorKind::from_name(kind)
            .ok_or_else(|| E2eError::UnsupportedLocator(kind.to_string()))?;
        Ok(Self::new(kind, value))
    }

    pub fn id(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::Id, value)
    }

    pub fn name(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::Name, value)
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::Path, value)
    }

    pub fn css(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::Selector, value)
    }

    pub fn class(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::Class, value)
    }

    pub fn link(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::Link, value)
    }

    pub fn partial_link(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::PartialLink, value)
    }

    pub fn strategy(&self) -> Strategy {
        let value = self.value.as_str();
        match self.kind {
            LocatorKind::Id => Strategy::XPath(format!("//*[@id={}]", xpath_literal(value))),
            LocatorKind::Name => Strategy::XPath(format!("//*[@name={}]", xpath_literal(value))),
            LocatorKind::Path => Strategy::XPath(value.to_string()),
            LocatorKind::Selector => Strategy::Css(value.to_string()),
            LocatorKind::Class => Strategy::XPath(format!(
                "//*[contains(concat(' ', normalize-space(@class), ' '), {})]",
                xpath_literal(&format!(" {} ", value.trim()))
            )),
            LocatorKind::Link => {
                Strategy::XPath(format!("//a[normalize-space(.)={}]", xpath_literal(value)))
            }
            LocatorKind::PartialLink => Strategy::XPath(format!(
                "//a[contains(normalize-space(.), {})]",
                xpath_literal(value)
            )),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind.as_str(), self.value)
    }
}

/// Quotes `value` as an XPath 1.0 string literal.
///
/// XPath has no escape sequences, so a value holding both quote kinds is
/// spelled out with `concat()`.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }

    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

/// A lazy reference to the `index`-th match of a strategy.
///
/// Nothing is cached: each operation on the reference re-runs the query in
/// the live document, so a re-rendered node is picked up transparently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRef {
    pub strategy: Strategy,
    pub index: usize,
    pub description: String,
}

impl ElementRef {
    pub fn new(strategy: Strategy, index: usize, description: impl Into<String>) -> Self {
        Self {
            strategy,
            index,
            description: description.into(),
        }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.description, self.index)
    }
}
