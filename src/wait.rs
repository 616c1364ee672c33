//! Bounded polling.

use crate::core::config::WaitConfig;
use crate::errors::{E2eError, Result};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wait {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Wait {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    pub fn from_config(config: &WaitConfig) -> Self {
        Self::new(config.timeout(), config.poll_interval())
    }

    /// Polls `condition` until it yields a value or the timeout expires.
    ///
    /// `Ok(None)` and `ElementNotFound` both mean "not yet"; any other error
    /// ends the wait immediately. The condition always runs at least once.
    pub async fn until<T, F, Fut>(&self, what: &str, mut condition: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let start_time = Instant::now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            match condition().await {
                Ok(Some(value)) => {
                    debug!(what, attempts, elapsed = ?start_time.elapsed(), "wait satisfied");
                    return Ok(value);
                }
                Ok(None) | Err(E2eError::ElementNotFound(_)) => {}
                Err(e) => return Err(e),
            }

            if start_time.elapsed() >= self.timeout {
                debug!(what, attempts, "wait expired");
                return Err(E2eError::Timeout {
                    what: what.to_string(),
                    timeout: self.timeout,
                });
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}

impl Default for Wait {
    fn default() -> Self {
        Self::from_config(&WaitConfig::default())
    }
}
