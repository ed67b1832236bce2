//! Polling waits over element conditions
//!
//! A wait repeatedly evaluates a condition against a freshly resolved
//! element handle until it observes `true` or the deadline elapses.
//! The handle is re-resolved on every iteration on purpose: the
//! underlying node may have been replaced by a re-render between two
//! attempts, and a cached handle would go stale.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::debug;

use crate::conditions::{self, CountCondition};
use crate::config::ExpectConfig;
use crate::driver::{ElementDriver, ElementHandle};
use crate::errors::ExpectError;
use crate::selector::Selector;

/// Deadline-bounded condition poller
#[derive(Clone)]
pub struct Waiter {
    driver: Arc<dyn ElementDriver>,
    timeout: Duration,
    poll_interval: Duration,
}

impl Waiter {
    /// Create a waiter using the process-wide configuration
    pub fn new(driver: Arc<dyn ElementDriver>) -> Self {
        Self::with_config(driver, ExpectConfig::global())
    }

    /// Create a waiter from an explicit configuration
    pub fn with_config(driver: Arc<dyn ElementDriver>, config: &ExpectConfig) -> Self {
        Self {
            driver,
            timeout: config.expectation_timeout(),
            poll_interval: config.poll_interval(),
        }
    }

    /// Override the wait deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the pause between condition evaluations
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// The driver this waiter polls through
    pub fn driver(&self) -> &Arc<dyn ElementDriver> {
        &self.driver
    }

    /// Poll `condition` against the selector until it holds or the
    /// default deadline elapses.
    ///
    /// An evaluation error counts as "not yet true" and polling
    /// continues; the last such error is folded into the timeout
    /// message so a wait that never could evaluate still explains
    /// itself.
    pub async fn until<C, Fut>(
        &self,
        selector: &Selector,
        description: &str,
        condition: C,
    ) -> Result<(), ExpectError>
    where
        C: Fn(Arc<dyn ElementHandle>) -> Fut,
        Fut: Future<Output = Result<bool, ExpectError>>,
    {
        self.until_within(selector, description, self.timeout, condition)
            .await
    }

    /// [`Waiter::until`] with an explicit deadline
    pub async fn until_within<C, Fut>(
        &self,
        selector: &Selector,
        description: &str,
        timeout: Duration,
        condition: C,
    ) -> Result<(), ExpectError>
    where
        C: Fn(Arc<dyn ElementHandle>) -> Fut,
        Fut: Future<Output = Result<bool, ExpectError>>,
    {
        let deadline = Instant::now() + timeout;
        let mut last_error: Option<ExpectError> = None;

        loop {
            if Instant::now() >= deadline {
                let mut description = description.to_string();
                if let Some(err) = last_error {
                    description.push_str(&format!(" (last evaluation error: {err})"));
                }
                return Err(ExpectError::WaitTimeout {
                    description,
                    selector: selector.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }

            match selector.resolve(self.driver.as_ref()).await {
                Ok(handle) => match condition(handle).await {
                    Ok(true) => return Ok(()),
                    Ok(false) => last_error = None,
                    Err(err) => {
                        debug!("condition not evaluable yet: {err}");
                        last_error = Some(err);
                    }
                },
                Err(err) => {
                    debug!("selector not resolvable yet: {err}");
                    last_error = Some(ExpectError::predicate(err));
                }
            }

            sleep(self.poll_interval).await;
        }
    }

    /// Wait for the element to be present in the document tree
    pub async fn present(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.until(selector, "for element to be present", |el| async move {
            conditions::present(&*el).await
        })
        .await
    }

    /// Wait for the element to be absent from the document tree
    pub async fn not_present(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.until(selector, "for element to be absent", |el| async move {
            conditions::not(conditions::present(&*el)).await
        })
        .await
    }

    /// Wait for the element to be present and visible
    pub async fn displayed(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.until(selector, "for element to be displayed", |el| async move {
            conditions::displayed(&*el).await
        })
        .await
    }

    /// Wait for the element to be hidden (it may remain in the DOM)
    pub async fn not_displayed(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.until(
            selector,
            "for element to not be displayed",
            |el| async move { conditions::not(conditions::displayed(&*el)).await },
        )
        .await
    }

    /// Wait for the element to accept interaction
    pub async fn enabled(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.until(selector, "for element to be enabled", |el| async move {
            conditions::compose(conditions::present(&*el), || conditions::enabled(&*el)).await
        })
        .await
    }

    /// Wait for the element to reject interaction
    pub async fn disabled(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.until(selector, "for element to be disabled", |el| async move {
            conditions::compose(conditions::present(&*el), || {
                conditions::not(conditions::enabled(&*el))
            })
            .await
        })
        .await
    }

    /// Wait for the element to be clickable (displayed and enabled)
    pub async fn clickable(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.until(selector, "for element to be clickable", |el| async move {
            conditions::clickable(&*el).await
        })
        .await
    }

    /// Wait for the element's effective text to equal `expected`
    pub async fn text_equals(&self, selector: &Selector, expected: &str) -> Result<(), ExpectError> {
        let description = format!("for element's text to be '{expected}'");
        self.until(selector, &description, |el| {
            let expected = expected.to_string();
            async move { conditions::text_equals(&*el, &expected).await }
        })
        .await
    }

    /// Wait for the element's effective text to contain `fragment`
    pub async fn text_contains(
        &self,
        selector: &Selector,
        fragment: &str,
    ) -> Result<(), ExpectError> {
        let description = format!("for element's text to contain '{fragment}'");
        self.until(selector, &description, |el| {
            let fragment = fragment.to_string();
            async move { conditions::text_contains(&*el, &fragment).await }
        })
        .await
    }

    /// Wait for the element's effective text to match the regex pattern
    pub async fn text_matches(
        &self,
        selector: &Selector,
        pattern: &str,
    ) -> Result<(), ExpectError> {
        let description = format!("for element's text to match '{pattern}'");
        self.until(selector, &description, |el| {
            let pattern = pattern.to_string();
            async move { conditions::text_matches(&*el, &pattern).await }
        })
        .await
    }

    /// Wait for a checkbox to reach the expected checked state
    pub async fn checkbox_checked(
        &self,
        selector: &Selector,
        expected: bool,
    ) -> Result<(), ExpectError> {
        let description = format!("for checkbox to be {}", if expected { "selected" } else { "unselected" });
        self.until(selector, &description, move |el| async move {
            conditions::checkbox_checked(&*el, expected).await
        })
        .await
    }

    /// Wait for the number of matching elements to satisfy the condition
    pub async fn count(
        &self,
        selector: &Selector,
        expected: CountCondition,
    ) -> Result<(), ExpectError> {
        let description = match expected {
            CountCondition::Equals(n) => format!("for element's count to be '{n}'"),
            CountCondition::AtLeast(n) => format!("for element's count to be at least '{n}'"),
        };
        let deadline_timeout = self.timeout;
        // Count waits poll the driver directly; there is no single
        // handle to resolve.
        let deadline = Instant::now() + deadline_timeout;
        loop {
            if Instant::now() >= deadline {
                return Err(ExpectError::WaitTimeout {
                    description,
                    selector: selector.to_string(),
                    timeout_ms: deadline_timeout.as_millis() as u64,
                });
            }
            match conditions::element_count(self.driver.as_ref(), selector, expected).await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(err) => debug!("count condition not evaluable yet: {err}"),
            }
            sleep(self.poll_interval).await;
        }
    }
}
