//! Scripted in-memory driver for unit tests.
//!
//! Elements are registered per locator and matched by resolved strategy, so
//! page objects run unchanged against it. Clicks can carry effects that
//! mutate the fake page, which is how re-renders and new windows are staged.
//!
//! [`ScriptDriver`] sits one level lower: it only answers `execute_script`,
//! so the trait's provided element reads run their real scripts against it.

use crate::core::BrowserDriver;
use crate::errors::{E2eError, Result};
use crate::locator::{ElementRef, Locator, Strategy};
use crate::types::WindowHandle;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

type Effect = Box<dyn FnMut(&mut FakeState) + Send>;

struct FakeElement {
    strategy: Strategy,
    text: String,
    html: String,
    displayed: bool,
    enabled: bool,
    selected_option: Option<String>,
    /// Lookups that still miss before the element shows up.
    hidden_for: usize,
}

struct FakeWindow {
    handle: WindowHandle,
    url: String,
}

pub struct FakeState {
    elements: Vec<FakeElement>,
    windows: Vec<FakeWindow>,
    current: Option<usize>,
    next_window: usize,
    on_click: Vec<(Strategy, Effect)>,
    pending_urls: VecDeque<String>,
    clicks: Vec<String>,
    scrolled: Vec<String>,
    quit_calls: usize,
    fail_screenshot: bool,
    fail_scroll: bool,
}

impl FakeState {
    fn matching(&self, strategy: &Strategy) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| &e.strategy == strategy && e.hidden_for == 0)
            .map(|(i, _)| i)
            .collect()
    }

    fn resolve(&self, element: &ElementRef) -> Result<usize> {
        self.matching(&element.strategy)
            .get(element.index)
            .copied()
            .ok_or_else(|| E2eError::ElementNotFound(element.to_string()))
    }

    fn first_mut(&mut self, locator: &Locator) -> &mut FakeElement {
        let strategy = locator.strategy();
        self.elements
            .iter_mut()
            .find(|e| e.strategy == strategy)
            .unwrap_or_else(|| panic!("fake has no element for {}", locator))
    }

    pub fn set_html(&mut self, locator: &Locator, html: &str) {
        self.first_mut(locator).html = html.to_string();
    }

    pub fn set_text(&mut self, locator: &Locator, text: &str) {
        self.first_mut(locator).text = text.to_string();
    }

    pub fn remove_elements(&mut self, locator: &Locator) {
        let strategy = locator.strategy();
        self.elements.retain(|e| e.strategy != strategy);
    }

    pub fn add_element(&mut self, locator: &Locator, text: &str) {
        self.elements.push(FakeElement {
            strategy: locator.strategy(),
            text: text.to_string(),
            html: String::new(),
            displayed: true,
            enabled: true,
            selected_option: None,
            hidden_for: 0,
        });
    }

    pub fn open_window(&mut self, url: &str) {
        self.next_window += 1;
        self.windows.push(FakeWindow {
            handle: WindowHandle::new(format!("window-{}", self.next_window)),
            url: url.to_string(),
        });
    }

    /// Points the active window at `url`, as a followed link would.
    pub fn navigate(&mut self, url: &str) {
        if let Ok(window) = self.active() {
            window.url = url.to_string();
        }
    }

    fn active(&mut self) -> Result<&mut FakeWindow> {
        let index = self
            .current
            .ok_or_else(|| E2eError::InteractionFailed("no active window".to_string()))?;
        Ok(&mut self.windows[index])
    }
}

#[derive(Clone)]
pub struct FakeDriver {
    state: Arc<Mutex<FakeState>>,
}

impl FakeDriver {
    pub fn new(url: &str) -> Self {
        let mut state = FakeState {
            elements: Vec::new(),
            windows: Vec::new(),
            current: Some(0),
            next_window: 0,
            on_click: Vec::new(),
            pending_urls: VecDeque::new(),
            clicks: Vec::new(),
            scrolled: Vec::new(),
            quit_calls: 0,
            fail_screenshot: false,
            fail_scroll: false,
        };
        state.open_window(url);
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn add_element(&self, locator: Locator, text: &str) {
        self.state.lock().add_element(&locator, text);
    }

    pub fn set_html(&self, locator: Locator, html: &str) {
        self.state.lock().set_html(&locator, html);
    }

    pub fn set_displayed(&self, locator: Locator, displayed: bool) {
        self.state.lock().first_mut(&locator).displayed = displayed;
    }

    pub fn set_enabled(&self, locator: Locator, enabled: bool) {
        self.state.lock().first_mut(&locator).enabled = enabled;
    }

    pub fn set_selected_option(&self, locator: Locator, option: &str) {
        self.state.lock().first_mut(&locator).selected_option = Some(option.to_string());
    }

    /// The element misses `lookups` counts before it becomes visible.
    pub fn appear_after(&self, locator: Locator, lookups: usize) {
        self.state.lock().first_mut(&locator).hidden_for = lookups;
    }

    pub fn on_click<F>(&self, locator: Locator, effect: F)
    where
        F: FnMut(&mut FakeState) + Send + 'static,
    {
        self.state
            .lock()
            .on_click
            .push((locator.strategy(), Box::new(effect)));
    }

    /// Successive `current_url` reads return these, one per read.
    pub fn queue_urls(&self, urls: &[&str]) {
        self.state
            .lock()
            .pending_urls
            .extend(urls.iter().map(|u| u.to_string()));
    }

    pub fn open_window(&self, url: &str) {
        self.state.lock().open_window(url);
    }

    pub fn fail_screenshot(&self) {
        self.state.lock().fail_screenshot = true;
    }

    pub fn fail_scroll(&self) {
        self.state.lock().fail_scroll = true;
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().clicks.clone()
    }

    pub fn scrolled(&self) -> Vec<String> {
        self.state.lock().scrolled.clone()
    }

    pub fn quit_calls(&self) -> usize {
        self.state.lock().quit_calls
    }

    pub fn window_count(&self) -> usize {
        self.state.lock().windows.len()
    }

    pub fn active_url(&self) -> Option<String> {
        let state = self.state.lock();
        state.current.map(|i| state.windows[i].url.clone())
    }

    fn record_click(&self, element: &ElementRef, how: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.resolve(element)?;
        state.clicks.push(format!("{}:{}", how, element));

        let mut effects = std::mem::take(&mut state.on_click);
        for (strategy, effect) in effects.iter_mut() {
            if strategy == &element.strategy {
                effect(&mut *state);
            }
        }
        effects.append(&mut state.on_click);
        state.on_click = effects;
        Ok(())
    }

    fn read<T>(&self, element: &ElementRef, f: impl FnOnce(&FakeElement) -> T) -> Result<T> {
        let state = self.state.lock();
        let index = state.resolve(element)?;
        Ok(f(&state.elements[index]))
    }
}

#[async_trait]
impl BrowserDriver for FakeDriver {
    async fn goto(&self, url: &str) -> Result<()> {
        self.state.lock().active()?.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let mut state = self.state.lock();
        if let Some(next) = state.pending_urls.pop_front() {
            state.active()?.url = next;
        }
        Ok(state.active()?.url.clone())
    }

    async fn execute_script(&self, _expression: &str) -> Result<Value> {
        Ok(Value::Null)
    }

    async fn click(&self, element: &ElementRef) -> Result<()> {
        self.record_click(element, "native")
    }

    async fn window_handles(&self) -> Result<Vec<WindowHandle>> {
        Ok(self
            .state
            .lock()
            .windows
            .iter()
            .map(|w| w.handle.clone())
            .collect())
    }

    async fn current_window(&self) -> Result<WindowHandle> {
        Ok(self.state.lock().active()?.handle.clone())
    }

    async fn switch_to_window(&self, handle: &WindowHandle) -> Result<()> {
        let mut state = self.state.lock();
        let index = state
            .windows
            .iter()
            .position(|w| &w.handle == handle)
            .ok_or_else(|| E2eError::InteractionFailed(format!("no window {}", handle)))?;
        state.current = Some(index);
        Ok(())
    }

    async fn close_window(&self) -> Result<()> {
        let mut state = self.state.lock();
        let index = state
            .current
            .take()
            .ok_or_else(|| E2eError::InteractionFailed("no active window".to_string()))?;
        state.windows.remove(index);
        Ok(())
    }

    async fn screenshot_png(&self) -> Result<Vec<u8>> {
        if self.state.lock().fail_screenshot {
            return Err(E2eError::ScreenshotFailed("fake refused".to_string()));
        }
        Ok(FAKE_PNG.to_vec())
    }

    async fn quit(&self) -> Result<()> {
        self.state.lock().quit_calls += 1;
        Ok(())
    }

    async fn count_matches(&self, strategy: &Strategy) -> Result<usize> {
        let mut state = self.state.lock();
        for element in state.elements.iter_mut() {
            if &element.strategy == strategy && element.hidden_for > 0 {
                element.hidden_for -= 1;
            }
        }
        Ok(state.matching(strategy).len())
    }

    async fn element_text(&self, element: &ElementRef) -> Result<String> {
        self.read(element, |e| e.text.clone())
    }

    async fn element_inner_html(&self, element: &ElementRef) -> Result<String> {
        self.read(element, |e| e.html.clone())
    }

    async fn element_is_displayed(&self, element: &ElementRef) -> Result<bool> {
        self.read(element, |e| e.displayed)
    }

    async fn element_is_enabled(&self, element: &ElementRef) -> Result<bool> {
        self.read(element, |e| e.enabled)
    }

    async fn selected_option_text(&self, element: &ElementRef) -> Result<Option<String>> {
        self.read(element, |e| e.selected_option.clone())
    }

    async fn script_click(&self, element: &ElementRef) -> Result<()> {
        self.record_click(element, "script")
    }

    async fn scroll_into_view_with_offset(
        &self,
        element: &ElementRef,
        header_height: u32,
        extra_padding: u32,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_scroll {
            return Err(E2eError::JavaScriptFailed("scroll refused".to_string()));
        }
        state.resolve(element)?;
        state
            .scrolled
            .push(format!("{}@{}+{}", element, header_height, extra_padding));
        Ok(())
    }
}

/// Driver that records every script and answers with queued values.
///
/// Only the required trait methods are implemented; element reads go through
/// the provided defaults.
#[derive(Clone, Default)]
pub struct ScriptDriver {
    scripts: Arc<Mutex<Vec<String>>>,
    replies: Arc<Mutex<VecDeque<Value>>>,
}

impl ScriptDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, value: Value) -> &Self {
        self.replies.lock().push_back(value);
        self
    }

    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().clone()
    }
}

#[async_trait]
impl BrowserDriver for ScriptDriver {
    async fn goto(&self, _url: &str) -> Result<()> {
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok("about:blank".to_string())
    }

    async fn execute_script(&self, expression: &str) -> Result<Value> {
        self.scripts.lock().push(expression.to_string());
        Ok(self.replies.lock().pop_front().unwrap_or(Value::Null))
    }

    async fn click(&self, _element: &ElementRef) -> Result<()> {
        Ok(())
    }

    async fn window_handles(&self) -> Result<Vec<WindowHandle>> {
        Ok(vec![WindowHandle::new("main")])
    }

    async fn current_window(&self) -> Result<WindowHandle> {
        Ok(WindowHandle::new("main"))
    }

    async fn switch_to_window(&self, _handle: &WindowHandle) -> Result<()> {
        Ok(())
    }

    async fn close_window(&self) -> Result<()> {
        Ok(())
    }

    async fn screenshot_png(&self) -> Result<Vec<u8>> {
        Ok(FAKE_PNG.to_vec())
    }

    async fn quit(&self) -> Result<()> {
        Ok(())
    }
}
