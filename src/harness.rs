//! Per-test lifecycle: acquire a session, run the body, collect debug state
//! on failure, always release the session.
//!
//! Outcomes are recorded per phase the way a test runner reports them
//! (`setup`, `call`, `teardown`). A failed call triggers the debug routine:
//! scroll the last element the test found into view below the fixed site
//! header, pause, and save a screenshot. Nothing in that routine can replace
//! the original failure.

use crate::browser::{ElementFinder, Session};
use crate::core::SuiteConfig;
use crate::errors::Result;
use crate::locator::{ElementRef, Locator};
use crate::pages::{PageHandle, Pages};
use crate::utils::ScreenshotManager;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinError;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Height of the site's fixed header.
pub const HEADER_HEIGHT: u32 = 80;
pub const EXTRA_PADDING: u32 = 10;

/// Most recent element a test looked up, shared between the finder and
/// teardown.
pub type LastElement = Arc<Mutex<Option<ElementRef>>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum PhaseOutcome {
    Passed,
    Failed(String),
    Skipped,
}

impl PhaseOutcome {
    pub fn failed(&self) -> bool {
        matches!(self, PhaseOutcome::Failed(_))
    }
}

/// State threaded through one test's setup, call and teardown.
pub struct TestContext {
    pub test_id: String,
    pub run_id: Uuid,
    last_element: LastElement,
    setup: PhaseOutcome,
    call: PhaseOutcome,
    teardown: PhaseOutcome,
    screenshot: Option<PathBuf>,
    started: Instant,
}

impl TestContext {
    pub fn new(test_id: impl Into<String>) -> Self {
        Self {
            test_id: test_id.into(),
            run_id: Uuid::new_v4(),
            last_element: Arc::new(Mutex::new(None)),
            setup: PhaseOutcome::Skipped,
            call: PhaseOutcome::Skipped,
            teardown: PhaseOutcome::Skipped,
            screenshot: None,
            started: Instant::now(),
        }
    }

    pub fn last_element(&self) -> LastElement {
        Arc::clone(&self.last_element)
    }

    fn into_report(self) -> TestReport {
        TestReport {
            test_id: self.test_id,
            run_id: self.run_id.to_string(),
            setup: self.setup,
            call: self.call,
            teardown: self.teardown,
            screenshot: self.screenshot,
            duration_ms: self.started.elapsed().as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TestReport {
    pub test_id: String,
    pub run_id: String,
    pub setup: PhaseOutcome,
    pub call: PhaseOutcome,
    pub teardown: PhaseOutcome,
    pub screenshot: Option<PathBuf>,
    pub duration_ms: u64,
}

impl TestReport {
    /// Setup and call both passed. Teardown problems are reported but do not
    /// fail the test.
    pub fn passed(&self) -> bool {
        self.setup == PhaseOutcome::Passed && self.call == PhaseOutcome::Passed
    }

    pub fn failure(&self) -> Option<&str> {
        [&self.setup, &self.call]
            .into_iter()
            .find_map(|outcome| match outcome {
                PhaseOutcome::Failed(message) => Some(message.as_str()),
                _ => None,
            })
    }
}

/// Finder decorator that remembers every element it successfully finds.
pub struct TrackingFinder {
    inner: Arc<dyn ElementFinder>,
    last_element: LastElement,
}

impl TrackingFinder {
    pub fn new(inner: Arc<dyn ElementFinder>, last_element: LastElement) -> Self {
        Self {
            inner,
            last_element,
        }
    }
}

#[async_trait]
impl ElementFinder for TrackingFinder {
    async fn find_element(&self, locator: &Locator) -> Result<ElementRef> {
        let element = self.inner.find_element(locator).await?;
        *self.last_element.lock() = Some(element.clone());
        Ok(element)
    }

    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementRef>> {
        self.inner.find_elements(locator).await
    }
}

/// Launches a browser from `config` and runs `body` against it.
pub async fn run_test<F, Fut>(config: &SuiteConfig, test_id: &str, body: F) -> TestReport
where
    F: FnOnce(Pages) -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let mut ctx = TestContext::new(test_id);
    info!(test_id, run_id = %ctx.run_id, browser = %config.browser.kind, "setup");

    match Session::launch(&config.browser).await {
        Ok(session) => run_in_context(config, ctx, Arc::new(session), body).await,
        Err(e) => {
            error!(test_id, error = %e, "setup failed");
            ctx.setup = PhaseOutcome::Failed(e.to_string());
            ctx.into_report()
        }
    }
}

/// Runs `body` against an already established session, which is quit before
/// returning.
pub async fn run_with_session<F, Fut>(
    config: &SuiteConfig,
    test_id: &str,
    session: Session,
    body: F,
) -> TestReport
where
    F: FnOnce(Pages) -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    run_in_context(config, TestContext::new(test_id), Arc::new(session), body).await
}

async fn run_in_context<F, Fut>(
    config: &SuiteConfig,
    mut ctx: TestContext,
    session: Arc<Session>,
    body: F,
) -> TestReport
where
    F: FnOnce(Pages) -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    ctx.setup = PhaseOutcome::Passed;

    let finder = Arc::new(TrackingFinder::new(session.clone(), ctx.last_element()));
    let pages = Pages::assemble(PageHandle::new(
        session.clone(),
        finder,
        config.waits.clone(),
        config.site.clone(),
    ));

    info!(test_id = %ctx.test_id, "call");
    ctx.call = match tokio::spawn(body(pages)).await {
        Ok(Ok(())) => PhaseOutcome::Passed,
        Ok(Err(e)) => PhaseOutcome::Failed(e.to_string()),
        Err(join_error) => PhaseOutcome::Failed(panic_message(join_error)),
    };

    if let PhaseOutcome::Failed(message) = &ctx.call {
        error!(test_id = %ctx.test_id, error = %message, "test failed");
        ctx.screenshot = collect_failure_state(config, &ctx, &session).await;
    }

    ctx.teardown = match session.quit().await {
        Ok(()) => PhaseOutcome::Passed,
        Err(e) => {
            warn!(test_id = %ctx.test_id, error = %e, "could not quit browser session");
            PhaseOutcome::Failed(e.to_string())
        }
    };

    let report = ctx.into_report();
    info!(
        test_id = %report.test_id,
        passed = report.passed(),
        duration_ms = report.duration_ms,
        "teardown finished"
    );
    report
}

async fn collect_failure_state(
    config: &SuiteConfig,
    ctx: &TestContext,
    session: &Session,
) -> Option<PathBuf> {
    let last_element = ctx.last_element.lock().clone();
    match last_element {
        Some(element) => {
            match session
                .driver()
                .scroll_into_view_with_offset(&element, HEADER_HEIGHT, EXTRA_PADDING)
                .await
            {
                Ok(()) => {
                    tokio::time::sleep(Duration::from_millis(config.failure_scroll_pause_ms))
                        .await;
                    info!(%element, "scrolled to last interacted element");
                }
                Err(e) => warn!(%element, error = %e, "could not scroll to element"),
            }
        }
        None => info!("no last element tracked"),
    }

    match ScreenshotManager::save_for_test(session.driver(), &config.screenshots_dir, &ctx.test_id)
        .await
    {
        Ok(path) => Some(path),
        Err(e) => {
            warn!(error = %e, "could not save failure screenshot");
            None
        }
    }
}

fn panic_message(join_error: JoinError) -> String {
    if !join_error.is_panic() {
        return join_error.to_string();
    }
    let payload = join_error.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    format!("panicked: {}", message)
}
