//! Base DSL actions
//!
//! Side-effecting interactions built on the expectation, waiting and
//! retry layers. Every action gates on the relevant expectation first
//! (a click on a disabled button should fail early and loudly, not
//! silently do nothing) and funnels the driver call through the retry
//! engine, since drivers occasionally drop an input event on a page
//! that is mid-render.

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::ExpectConfig;
use crate::driver::ElementDriver;
use crate::errors::ExpectError;
use crate::expect::Expectation;
use crate::retry::Retrier;
use crate::selector::Selector;
use crate::waiting::Waiter;

/// WebDriver key code for Enter
pub const ENTER_KEY: &str = "\u{e007}";

/// WebDriver key code for Backspace
pub const BACKSPACE_KEY: &str = "\u{e003}";

/// Settle time after a click, letting re-renders triggered by it land
const DEFAULT_SETTLE: Duration = Duration::from_millis(1000);

/// Pause between individual typed characters
const DEFAULT_KEY_DELAY: Duration = Duration::from_millis(100);

const SCROLL_TOP_SCRIPT: &str = "window.scrollTo(0, 0);";

const DISPATCH_MOUSE_EVENT_SCRIPT: &str = "\
const el = document.querySelector(arguments[0]);\
if (el) { el.dispatchEvent(new MouseEvent(arguments[1], {bubbles: true, cancelable: true})); }";

const JS_CLICK_SCRIPT: &str = "\
const el = document.querySelector(arguments[0]);\
if (el) { el.click(); }";

/// Side-effecting UI actions
#[derive(Clone)]
pub struct Action {
    driver: Arc<dyn ElementDriver>,
    expect: Expectation,
    waiter: Waiter,
    retry: Retrier,
}

impl Action {
    /// Create an action layer using the process-wide configuration
    pub fn new(driver: Arc<dyn ElementDriver>) -> Self {
        Self::with_config(driver, ExpectConfig::global())
    }

    /// Create an action layer from an explicit configuration
    pub fn with_config(driver: Arc<dyn ElementDriver>, config: &ExpectConfig) -> Self {
        Self {
            expect: Expectation::with_config(driver.clone(), config),
            waiter: Waiter::with_config(driver.clone(), config),
            retry: Retrier::with_config(config),
            driver,
        }
    }

    /// Click the element once it is clickable, then let the page settle
    pub async fn click(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.click_with_settle(selector, DEFAULT_SETTLE).await
    }

    /// [`Action::click`] with an explicit settle delay
    pub async fn click_with_settle(
        &self,
        selector: &Selector,
        settle: Duration,
    ) -> Result<(), ExpectError> {
        self.expect.clickable(selector).await?;

        // Scroll to origin first so fixed headers cannot swallow the click.
        let _ = self.driver.run_in_page(SCROLL_TOP_SCRIPT, Vec::new()).await;

        self.retry
            .execute(|| async {
                let handle = selector
                    .resolve(self.driver.as_ref())
                    .await
                    .map_err(ExpectError::driver)?;
                handle.click().await.map_err(ExpectError::driver)
            })
            .await?;

        sleep(settle).await;
        Ok(())
    }

    /// Click the element whether or not it is clickable.
    ///
    /// Useful for elements that appear only briefly (timed
    /// notifications): the click is attempted best-effort and a miss is
    /// not an error.
    pub async fn click_if_clickable(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.retry
            .execute(|| async {
                if let Ok(handle) = selector.resolve(self.driver.as_ref()).await {
                    let _ = handle.click().await;
                }
                Ok(())
            })
            .await
    }

    /// Click through script injection instead of native emulation
    pub async fn js_click(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.expect.clickable(selector).await?;
        self.run_element_script(selector, JS_CLICK_SCRIPT, Vec::new())
            .await
    }

    /// Dispatch a synthetic double click on the element
    pub async fn double_click(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.dispatch_mouse_event(selector, "dblclick").await
    }

    /// Hover the element by dispatching a synthetic mouseover
    pub async fn hover(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.dispatch_mouse_event(selector, "mouseover").await
    }

    /// Dispatch a synthetic mousemove on the element
    pub async fn mousemove(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.dispatch_mouse_event(selector, "mousemove").await
    }

    /// Send raw keys to the element
    pub async fn send_keys(&self, selector: &Selector, keys: &str) -> Result<(), ExpectError> {
        let handle = selector
            .resolve(self.driver.as_ref())
            .await
            .map_err(ExpectError::driver)?;
        handle.send_keys(keys).await.map_err(ExpectError::driver)
    }

    /// Press Enter on the element
    pub async fn click_enter(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.send_keys(selector, ENTER_KEY).await
    }

    /// Type text character by character, with a small pause between keys.
    ///
    /// Slow typing gives input listeners time to run between
    /// characters; pasting the whole string at once is exactly what
    /// loses input on busy pages.
    pub async fn type_text(&self, selector: &Selector, text: &str) -> Result<(), ExpectError> {
        self.type_text_with_delay(selector, text, DEFAULT_KEY_DELAY)
            .await
    }

    /// [`Action::type_text`] with an explicit inter-key delay
    pub async fn type_text_with_delay(
        &self,
        selector: &Selector,
        text: &str,
        key_delay: Duration,
    ) -> Result<(), ExpectError> {
        if text.is_empty() {
            return Ok(());
        }
        self.click_with_settle(selector, Duration::ZERO).await?;
        let handle = selector
            .resolve(self.driver.as_ref())
            .await
            .map_err(ExpectError::driver)?;
        for character in text.chars() {
            handle
                .send_keys(&character.to_string())
                .await
                .map_err(ExpectError::driver)?;
            sleep(key_delay).await;
        }
        Ok(())
    }

    /// Clear the element's current value with backspaces, repeating the
    /// whole sequence until the text is observed empty
    pub async fn clear_text(&self, selector: &Selector) -> Result<(), ExpectError> {
        self.retry
            .repeat_action(
                || async {
                    let handle = selector
                        .resolve(self.driver.as_ref())
                        .await
                        .map_err(ExpectError::driver)?;
                    let value = handle
                        .attribute("value")
                        .await
                        .map_err(ExpectError::driver)?
                        .unwrap_or_default();
                    for _ in 0..value.chars().count() {
                        handle
                            .send_keys(BACKSPACE_KEY)
                            .await
                            .map_err(ExpectError::driver)?;
                    }
                    Ok(())
                },
                || self.waiter.text_equals(selector, ""),
            )
            .await
    }

    /// Replace the element's current value with new text.
    ///
    /// Clears first, then repeats the typing until the text is observed
    /// to have stuck; some inputs drop the first few keystrokes while
    /// re-rendering.
    pub async fn type_new_text(&self, selector: &Selector, text: &str) -> Result<(), ExpectError> {
        self.clear_text(selector).await?;
        self.retry
            .repeat_action(
                || self.type_text_with_delay(selector, text, DEFAULT_KEY_DELAY),
                || self.waiter.text_equals(selector, text),
            )
            .await
    }

    /// Click an element and require another element to become displayed,
    /// re-clicking if the click did not register
    pub async fn click_and_expect_displayed(
        &self,
        click_selector: &Selector,
        displayed_selector: &Selector,
    ) -> Result<(), ExpectError> {
        self.retry
            .repeat_action(
                || async {
                    if let Ok(handle) = click_selector.resolve(self.driver.as_ref()).await {
                        let _ = handle.click().await;
                    }
                    Ok(())
                },
                || self.waiter.displayed(displayed_selector),
            )
            .await
    }

    async fn dispatch_mouse_event(
        &self,
        selector: &Selector,
        event: &str,
    ) -> Result<(), ExpectError> {
        self.expect.displayed(selector).await?;
        self.run_element_script(selector, DISPATCH_MOUSE_EVENT_SCRIPT, vec![json!(event)])
            .await
    }

    /// Run a page-context script against the element's CSS locator.
    ///
    /// The locator is passed as the script's first argument, extra
    /// arguments follow it. Only raw CSS selectors can cross into the
    /// page context; pre-resolved handles have no string form there.
    async fn run_element_script(
        &self,
        selector: &Selector,
        script: &str,
        extra_args: Vec<Value>,
    ) -> Result<(), ExpectError> {
        let css = selector.as_css().ok_or_else(|| {
            ExpectError::Internal(
                "script-injected events require a CSS selector, got a resolved handle".to_string(),
            )
        })?;
        let mut args = vec![json!(css)];
        args.extend(extra_args);

        self.retry
            .execute(|| async {
                self.driver
                    .run_in_page(script, args.clone())
                    .await
                    .map(|_| ())
                    .map_err(ExpectError::driver)
            })
            .await
    }
}
