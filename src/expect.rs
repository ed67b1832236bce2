//! Expectation DSL
//!
//! High-level "expect" calls: each builds a condition, hands it to the
//! polling wait and wraps the whole wait in the retry engine, so a
//! transient failure of the wait itself (driver hiccup, element churn)
//! gets a fresh multi-second budget before the expectation gives up.

use std::sync::Arc;

use crate::conditions::{self, CountCondition};
use crate::config::ExpectConfig;
use crate::driver::ElementDriver;
use crate::errors::ExpectError;
use crate::retry::Retrier;
use crate::selector::Selector;
use crate::waiting::Waiter;

/// Retry-wrapped expectations over element state
#[derive(Clone)]
pub struct Expectation {
    waiter: Waiter,
    retry: Retrier,
}

impl Expectation {
    /// Create an expectation layer using the process-wide configuration
    pub fn new(driver: Arc<dyn ElementDriver>) -> Self {
        Self {
            waiter: Waiter::new(driver),
            retry: Retrier::default(),
        }
    }

    /// Create an expectation layer from an explicit configuration
    pub fn with_config(driver: Arc<dyn ElementDriver>, config: &ExpectConfig) -> Self {
        Self {
            waiter: Waiter::with_config(driver, config),
            retry: Retrier::with_config(config),
        }
    }

    /// Build from pre-configured parts
    pub fn from_parts(waiter: Waiter, retry: Retrier) -> Self {
        Self { waiter, retry }
    }

    /// The underlying waiter
    pub fn waiter(&self) -> &Waiter {
        &self.waiter
    }

    /// Element is in the DOM, though possibly hidden
    pub async fn present(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.retry.execute(|| self.waiter.present(selector)).await
    }

    /// Element is not in the DOM
    pub async fn not_present(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.retry
            .execute(|| self.waiter.not_present(selector))
            .await
    }

    /// Element is in the DOM and visible to the user
    pub async fn displayed(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.retry.execute(|| self.waiter.displayed(selector)).await
    }

    /// Element is not visible, though it may remain in the DOM
    pub async fn not_displayed(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.retry
            .execute(|| self.waiter.not_displayed(selector))
            .await
    }

    /// Element accepts interaction
    pub async fn enabled(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.retry.execute(|| self.waiter.enabled(selector)).await
    }

    /// Element rejects interaction
    pub async fn disabled(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.retry.execute(|| self.waiter.disabled(selector)).await
    }

    /// Element is displayed and enabled
    pub async fn clickable(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.retry.execute(|| self.waiter.clickable(selector)).await
    }

    /// Element's effective text equals `expected` (trimmed on both sides)
    pub async fn text_equals(
        &self,
        selector: &Selector,
        expected: &str,
    ) -> Result<(), ExpectError> {
        self.retry
            .execute(|| self.waiter.text_equals(selector, expected))
            .await
    }

    /// Element's effective text differs from `text`
    pub async fn text_not_equal(&self, selector: &Selector, text: &str) -> Result<(), ExpectError> {
        let description = format!("for element's text not to be '{text}'");
        self.retry
            .execute(|| {
                self.waiter.until(selector, &description, |el| {
                    let text = text.to_string();
                    async move { conditions::not(conditions::text_equals(&*el, &text)).await }
                })
            })
            .await
    }

    /// Element's effective text is empty
    pub async fn empty_text(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.text_equals(selector, "").await
    }

    /// Element's effective text contains `fragment`
    pub async fn text_contains(
        &self,
        selector: &Selector,
        fragment: &str,
    ) -> Result<(), ExpectError> {
        self.retry
            .execute(|| self.waiter.text_contains(selector, fragment))
            .await
    }

    /// Element's effective text matches the regex pattern
    pub async fn text_matches(
        &self,
        selector: &Selector,
        pattern: &str,
    ) -> Result<(), ExpectError> {
        self.retry
            .execute(|| self.waiter.text_matches(selector, pattern))
            .await
    }

    /// Checkbox is selected or unselected as expected
    pub async fn checkbox_checked(
        &self,
        selector: &Selector,
        checked: bool,
    ) -> Result<(), ExpectError> {
        self.retry
            .execute(|| self.waiter.checkbox_checked(selector, checked))
            .await
    }

    /// Exactly `expected` elements match the selector
    pub async fn count(&self, selector: &Selector, expected: u32) -> Result<(), ExpectError> {
        self.retry
            .execute(|| self.waiter.count(selector, CountCondition::Equals(expected)))
            .await
    }

    /// At least `expected` elements match the selector
    pub async fn count_at_least(
        &self,
        selector: &Selector,
        expected: u32,
    ) -> Result<(), ExpectError> {
        self.retry
            .execute(|| self.waiter.count(selector, CountCondition::AtLeast(expected)))
            .await
    }

    /// Named attribute equals the expected value (trimmed on both sides)
    pub async fn attribute_equals(
        &self,
        selector: &Selector,
        attribute: &str,
        expected: &str,
    ) -> Result<(), ExpectError> {
        let description = format!("for attribute '{attribute}' to equal '{expected}'");
        self.retry
            .execute(|| {
                self.waiter.until(selector, &description, |el| {
                    let attribute = attribute.to_string();
                    let expected = expected.to_string();
                    async move { conditions::attribute_equals(&*el, &attribute, &expected).await }
                })
            })
            .await
    }

    /// Named attribute differs from the value
    pub async fn attribute_not_equal(
        &self,
        selector: &Selector,
        attribute: &str,
        value: &str,
    ) -> Result<(), ExpectError> {
        let description = format!("for attribute '{attribute}' not to equal '{value}'");
        self.retry
            .execute(|| {
                self.waiter.until(selector, &description, |el| {
                    let attribute = attribute.to_string();
                    let value = value.to_string();
                    async move {
                        conditions::not(conditions::attribute_equals(&*el, &attribute, &value))
                            .await
                    }
                })
            })
            .await
    }

    /// Named attribute contains the fragment
    pub async fn attribute_contains(
        &self,
        selector: &Selector,
        attribute: &str,
        fragment: &str,
    ) -> Result<(), ExpectError> {
        let description = format!("for attribute '{attribute}' to contain '{fragment}'");
        self.retry
            .execute(|| {
                self.waiter.until(selector, &description, |el| {
                    let attribute = attribute.to_string();
                    let fragment = fragment.to_string();
                    async move {
                        conditions::attribute_contains(&*el, &attribute, &fragment).await
                    }
                })
            })
            .await
    }

    /// Named attribute, parsed as a base-10 integer, is within `[min, max]`
    pub async fn attribute_in_range(
        &self,
        selector: &Selector,
        attribute: &str,
        min: i64,
        max: i64,
    ) -> Result<(), ExpectError> {
        let description = format!("for attribute '{attribute}' to be between {min} and {max}");
        self.retry
            .execute(|| {
                self.waiter.until(selector, &description, |el| {
                    let attribute = attribute.to_string();
                    async move {
                        conditions::attribute_in_range(&*el, &attribute, min, max).await
                    }
                })
            })
            .await
    }

    /// Element carries the named attribute
    pub async fn has_attribute(
        &self,
        selector: &Selector,
        attribute: &str,
    ) -> Result<(), ExpectError> {
        let description = format!("for element to have attribute '{attribute}'");
        self.retry
            .execute(|| {
                self.waiter.until(selector, &description, |el| {
                    let attribute = attribute.to_string();
                    async move { conditions::has_attribute(&*el, &attribute).await }
                })
            })
            .await
    }

    /// Element does not carry the named attribute
    pub async fn has_no_attribute(
        &self,
        selector: &Selector,
        attribute: &str,
    ) -> Result<(), ExpectError> {
        let description = format!("for element to have no attribute '{attribute}'");
        self.retry
            .execute(|| {
                self.waiter.until(selector, &description, |el| {
                    let attribute = attribute.to_string();
                    async move {
                        conditions::not(conditions::has_attribute(&*el, &attribute)).await
                    }
                })
            })
            .await
    }
}
