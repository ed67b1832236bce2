//! Predicate primitives and combinators
//!
//! Atomic boolean checks against a single element handle, plus the
//! composition vocabulary the waiting and retry layers are written in.
//! Predicates never mutate UI state. A predicate that cannot currently
//! be evaluated (element detached mid-check, driver hiccup) fails with
//! [`ExpectError::Predicate`]; callers that poll treat that as "not yet
//! true".

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::warn;

use crate::driver::{ElementDriver, ElementHandle};
use crate::errors::ExpectError;
use crate::selector::Selector;

/// Short-circuiting AND over two deferred conditions.
///
/// `second` is only evaluated when `first` resolves true. A failure
/// inside `second` after a truthy `first` is logged and degrades to
/// `Ok(true)` instead of propagating: transient evaluation errors must
/// not abort a multi-second polling wait, the caller re-polls against
/// the degraded result. Failures of `first` propagate as-is.
pub async fn compose<F, S, Fut>(first: F, second: S) -> Result<bool, ExpectError>
where
    F: Future<Output = Result<bool, ExpectError>>,
    S: FnOnce() -> Fut,
    Fut: Future<Output = Result<bool, ExpectError>>,
{
    if !first.await? {
        return Ok(false);
    }
    match second().await {
        Ok(result) => Ok(result),
        Err(err) => {
            warn!("error in condition compose, keeping first result: {err}");
            Ok(true)
        }
    }
}

/// Logical negation. Unlike [`compose`], evaluation failures propagate.
pub async fn not<F>(condition: F) -> Result<bool, ExpectError>
where
    F: Future<Output = Result<bool, ExpectError>>,
{
    Ok(!condition.await?)
}

/// Element currently exists in the document tree
pub async fn present(el: &dyn ElementHandle) -> Result<bool, ExpectError> {
    el.exists().await.map_err(ExpectError::predicate)
}

/// Element is rendered with nonzero visual presence
pub async fn visible(el: &dyn ElementHandle) -> Result<bool, ExpectError> {
    el.is_visible().await.map_err(ExpectError::predicate)
}

/// Element accepts interaction
pub async fn enabled(el: &dyn ElementHandle) -> Result<bool, ExpectError> {
    el.is_enabled().await.map_err(ExpectError::predicate)
}

/// Element is present and visible
pub async fn displayed(el: &dyn ElementHandle) -> Result<bool, ExpectError> {
    compose(present(el), || visible(el)).await
}

/// Element is displayed and enabled
pub async fn clickable(el: &dyn ElementHandle) -> Result<bool, ExpectError> {
    compose(displayed(el), || enabled(el)).await
}

/// Effective text of an element.
///
/// Checkbox-like controls report their checked state coerced to
/// `"true"`/`"false"`, text-input-like controls report their current
/// value, everything else its rendered text content.
pub async fn effective_text(el: &dyn ElementHandle) -> Result<String, ExpectError> {
    let tag_type = el.attribute("type").await.map_err(ExpectError::predicate)?;
    match tag_type.as_deref() {
        Some("checkbox") => {
            let checked = el
                .attribute("checked")
                .await
                .map_err(ExpectError::predicate)?;
            Ok((checked.as_deref() == Some("true")).to_string())
        }
        Some("text") => {
            let value = el
                .attribute("value")
                .await
                .map_err(ExpectError::predicate)?;
            Ok(value.unwrap_or_default())
        }
        _ => el.text().await.map_err(ExpectError::predicate),
    }
}

/// Effective text equals the expected value, whitespace-trimmed on both sides
pub async fn text_equals(el: &dyn ElementHandle, expected: &str) -> Result<bool, ExpectError> {
    compose(present(el), || async {
        let actual = effective_text(el).await?;
        Ok(actual.trim() == expected.trim())
    })
    .await
}

/// Effective text contains the fragment (no trimming)
pub async fn text_contains(el: &dyn ElementHandle, fragment: &str) -> Result<bool, ExpectError> {
    compose(present(el), || async {
        let actual = effective_text(el).await?;
        Ok(actual.contains(fragment))
    })
    .await
}

/// Effective text matches the regex pattern (no trimming)
pub async fn text_matches(el: &dyn ElementHandle, pattern: &str) -> Result<bool, ExpectError> {
    let re = Regex::new(pattern)
        .map_err(|err| ExpectError::Predicate(format!("invalid regex '{pattern}': {err}")))?;
    compose(present(el), || async {
        let actual = effective_text(el).await?;
        Ok(re.is_match(&actual))
    })
    .await
}

/// Checkbox checked state, with the absent attribute coerced to `"false"`,
/// equals the expected state. Guarded by the element being displayed.
pub async fn checkbox_checked(el: &dyn ElementHandle, expected: bool) -> Result<bool, ExpectError> {
    compose(displayed(el), || async {
        let checked = el
            .attribute("checked")
            .await
            .map_err(ExpectError::predicate)?;
        let actual = checked.as_deref() == Some("true");
        Ok(actual == expected)
    })
    .await
}

/// Named attribute equals the expected value, whitespace-trimmed on both sides
pub async fn attribute_equals(
    el: &dyn ElementHandle,
    name: &str,
    expected: &str,
) -> Result<bool, ExpectError> {
    compose(present(el), || async {
        let value = el.attribute(name).await.map_err(ExpectError::predicate)?;
        Ok(value
            .map(|actual| actual.trim() == expected.trim())
            .unwrap_or(false))
    })
    .await
}

/// Named attribute contains the fragment
pub async fn attribute_contains(
    el: &dyn ElementHandle,
    name: &str,
    fragment: &str,
) -> Result<bool, ExpectError> {
    compose(present(el), || async {
        let value = el.attribute(name).await.map_err(ExpectError::predicate)?;
        Ok(value
            .map(|actual| actual.contains(fragment))
            .unwrap_or(false))
    })
    .await
}

/// Named attribute, parsed as a base-10 integer, falls inside `[min, max]`.
///
/// Non-numeric values fail the comparison without erroring.
pub async fn attribute_in_range(
    el: &dyn ElementHandle,
    name: &str,
    min: i64,
    max: i64,
) -> Result<bool, ExpectError> {
    compose(present(el), || async {
        let value = el.attribute(name).await.map_err(ExpectError::predicate)?;
        Ok(value
            .as_deref()
            .and_then(parse_leading_int)
            .map(|number| number >= min && number <= max)
            .unwrap_or(false))
    })
    .await
}

/// Named attribute is set, whatever its value
pub async fn has_attribute(
    el: &dyn ElementHandle,
    name: &str,
) -> Result<bool, ExpectError> {
    compose(present(el), || async {
        let value = el.attribute(name).await.map_err(ExpectError::predicate)?;
        Ok(value.is_some())
    })
    .await
}

/// Base-10 integer parse that, like the DOM's own coercions, accepts a
/// numeric prefix ("12px" parses as 12) and rejects anything with no
/// leading digits.
fn parse_leading_int(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1i64, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let numeric: String = digits.chars().take_while(|c| c.is_ascii_digit()).collect();
    if numeric.is_empty() {
        return None;
    }
    numeric.parse::<i64>().ok().map(|n| sign * n)
}

/// Numeric comparison over an element count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountCondition {
    /// Exactly this many elements
    Equals(u32),

    /// This many elements or more
    AtLeast(u32),
}

impl CountCondition {
    /// Check if a count matches the condition
    pub fn matches(&self, count: u32) -> bool {
        match self {
            CountCondition::Equals(expected) => count == *expected,
            CountCondition::AtLeast(minimum) => count >= *minimum,
        }
    }
}

/// Number of elements matching a multi-element selector satisfies the condition
pub async fn element_count(
    driver: &dyn ElementDriver,
    selector: &Selector,
    expected: CountCondition,
) -> Result<bool, ExpectError> {
    let count = driver
        .count_matching(selector)
        .await
        .map_err(ExpectError::predicate)?;
    Ok(expected.matches(count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::DriverError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubElement {
        present: bool,
        visible: bool,
        enabled: bool,
        text: String,
        attributes: Mutex<HashMap<String, String>>,
        fail_visibility: bool,
    }

    impl StubElement {
        fn rendered(text: &str) -> Self {
            Self {
                present: true,
                visible: true,
                enabled: true,
                text: text.to_string(),
                ..Default::default()
            }
        }

        fn with_attribute(self, name: &str, value: &str) -> Self {
            self.attributes
                .lock()
                .unwrap()
                .insert(name.to_string(), value.to_string());
            self
        }

        fn set_attribute(&self, name: &str, value: &str) {
            self.attributes
                .lock()
                .unwrap()
                .insert(name.to_string(), value.to_string());
        }
    }

    #[async_trait]
    impl ElementHandle for StubElement {
        async fn exists(&self) -> Result<bool, DriverError> {
            Ok(self.present)
        }

        async fn is_visible(&self) -> Result<bool, DriverError> {
            if self.fail_visibility {
                return Err(DriverError::Stale("node detached".into()));
            }
            Ok(self.visible)
        }

        async fn is_enabled(&self) -> Result<bool, DriverError> {
            Ok(self.enabled)
        }

        async fn text(&self) -> Result<String, DriverError> {
            Ok(self.text.clone())
        }

        async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError> {
            Ok(self.attributes.lock().unwrap().get(name).cloned())
        }

        async fn click(&self) -> Result<(), DriverError> {
            Ok(())
        }

        async fn send_keys(&self, _keys: &str) -> Result<(), DriverError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn compose_short_circuits_on_falsy_first() {
        let second_evaluated = AtomicBool::new(false);
        let result = compose(async { Ok(false) }, || {
            second_evaluated.store(true, Ordering::SeqCst);
            async { Ok(true) }
        })
        .await;
        assert!(!result.unwrap());
        assert!(!second_evaluated.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn compose_fails_soft_when_second_errors() {
        let result = compose(async { Ok(true) }, || async {
            Err(ExpectError::Predicate("element vanished".into()))
        })
        .await;
        assert!(result.unwrap());
    }

    #[tokio::test]
    async fn compose_propagates_first_error() {
        let result = compose(
            async { Err(ExpectError::Predicate("cannot resolve".into())) },
            || async { Ok(true) },
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn not_negates_and_propagates_errors() {
        assert!(!not(async { Ok(true) }).await.unwrap());
        assert!(not(async { Ok(false) }).await.unwrap());
        assert!(not(async { Err(ExpectError::Predicate("gone".into())) })
            .await
            .is_err());
    }

    #[tokio::test]
    async fn displayed_absorbs_visibility_error_after_presence() {
        let el = StubElement {
            present: true,
            fail_visibility: true,
            ..Default::default()
        };
        // Fail-soft: presence held, the visibility probe died mid-check.
        assert!(displayed(&el).await.unwrap());
    }

    #[tokio::test]
    async fn displayed_requires_presence() {
        let el = StubElement::default();
        assert!(!displayed(&el).await.unwrap());
    }

    #[tokio::test]
    async fn clickable_requires_enabled() {
        let mut el = StubElement::rendered("Submit");
        assert!(clickable(&el).await.unwrap());
        el.enabled = false;
        assert!(!clickable(&el).await.unwrap());
    }

    #[tokio::test]
    async fn effective_text_of_checkbox_reports_checked_state() {
        let el = StubElement::rendered("ignored").with_attribute("type", "checkbox");
        assert_eq!(effective_text(&el).await.unwrap(), "false");
        el.set_attribute("checked", "true");
        assert_eq!(effective_text(&el).await.unwrap(), "true");
    }

    #[tokio::test]
    async fn effective_text_of_text_input_reports_value() {
        let el = StubElement::rendered("ignored")
            .with_attribute("type", "text")
            .with_attribute("value", "hello");
        assert_eq!(effective_text(&el).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn text_equals_trims_both_sides() {
        let el = StubElement::rendered("  Done  ");
        assert!(text_equals(&el, "Done").await.unwrap());
        assert!(text_equals(&el, " Done ").await.unwrap());
        assert!(!text_equals(&el, "Pending").await.unwrap());
    }

    #[tokio::test]
    async fn text_contains_does_not_trim() {
        let el = StubElement::rendered("  Done  ");
        assert!(text_contains(&el, " Done").await.unwrap());
        assert!(text_contains(&el, "one").await.unwrap());
        assert!(!text_contains(&el, "Done!").await.unwrap());
    }

    #[tokio::test]
    async fn text_matches_uses_untrimmed_text() {
        let el = StubElement::rendered("order #42 shipped");
        assert!(text_matches(&el, r"#\d+").await.unwrap());
        assert!(!text_matches(&el, r"^\d+$").await.unwrap());
        assert!(text_matches(&el, r"(unclosed").await.is_err());
    }

    #[tokio::test]
    async fn checkbox_checked_defaults_absent_attribute_to_false() {
        let el = StubElement::rendered("").with_attribute("type", "checkbox");
        assert!(checkbox_checked(&el, false).await.unwrap());
        assert!(!checkbox_checked(&el, true).await.unwrap());

        el.set_attribute("checked", "true");
        assert!(checkbox_checked(&el, true).await.unwrap());
        assert!(!checkbox_checked(&el, false).await.unwrap());
    }

    #[tokio::test]
    async fn attribute_comparisons() {
        let el = StubElement::rendered("")
            .with_attribute("class", " btn primary ")
            .with_attribute("data-count", "12px");
        assert!(attribute_equals(&el, "class", "btn primary").await.unwrap());
        assert!(attribute_contains(&el, "class", "primary").await.unwrap());
        assert!(!attribute_contains(&el, "class", "danger").await.unwrap());
        assert!(has_attribute(&el, "class").await.unwrap());
        assert!(!has_attribute(&el, "id").await.unwrap());

        assert!(attribute_in_range(&el, "data-count", 10, 20).await.unwrap());
        assert!(!attribute_in_range(&el, "data-count", 13, 20).await.unwrap());
        // Missing and non-numeric attributes fail the comparison, never error.
        assert!(!attribute_in_range(&el, "missing", 0, 100).await.unwrap());
        assert!(!attribute_in_range(&el, "class", 0, 100).await.unwrap());
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int("  42  "), Some(42));
        assert_eq!(parse_leading_int("12px"), Some(12));
        assert_eq!(parse_leading_int("-7"), Some(-7));
        assert_eq!(parse_leading_int("+7"), Some(7));
        assert_eq!(parse_leading_int("px12"), None);
        assert_eq!(parse_leading_int(""), None);
    }

    #[test]
    fn test_count_condition() {
        assert!(CountCondition::Equals(5).matches(5));
        assert!(!CountCondition::Equals(5).matches(4));
        assert!(CountCondition::AtLeast(3).matches(3));
        assert!(CountCondition::AtLeast(3).matches(4));
        assert!(!CountCondition::AtLeast(3).matches(2));
    }

    #[tokio::test]
    async fn primitive_evaluation_is_idempotent() {
        let el = StubElement::rendered("steady");
        assert_eq!(present(&el).await.unwrap(), present(&el).await.unwrap());
        assert_eq!(displayed(&el).await.unwrap(), displayed(&el).await.unwrap());
        assert_eq!(
            text_equals(&el, "steady").await.unwrap(),
            text_equals(&el, "steady").await.unwrap()
        );
    }
}
