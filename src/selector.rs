//! Selector normalization
//!
//! A selector is either a raw CSS locator or an element handle the
//! caller already resolved. Mirroring the driver's own lookup rules,
//! normalization happens once per evaluation attempt so that element
//! replacement between polling iterations is tolerated.

use std::fmt;
use std::sync::Arc;

use crate::driver::{DriverError, ElementDriver, ElementHandle};

/// Locator for a single element
#[derive(Clone)]
pub enum Selector {
    /// CSS locator expression, re-resolved on every dereference
    Css(String),

    /// Already-resolved handle supplied by the caller
    Resolved(Arc<dyn ElementHandle>),
}

impl Selector {
    /// Create a CSS selector
    pub fn css(selector: impl Into<String>) -> Self {
        Selector::Css(selector.into())
    }

    /// The raw CSS locator, if this selector carries one
    pub fn as_css(&self) -> Option<&str> {
        match self {
            Selector::Css(css) => Some(css.as_str()),
            Selector::Resolved(_) => None,
        }
    }

    /// Normalize into an element handle via the driver.
    ///
    /// Already-resolved selectors are returned as-is; raw locators go
    /// through the driver's resolution function.
    pub async fn resolve(
        &self,
        driver: &dyn ElementDriver,
    ) -> Result<Arc<dyn ElementHandle>, DriverError> {
        match self {
            Selector::Resolved(handle) => Ok(Arc::clone(handle)),
            Selector::Css(_) => driver.resolve(self).await,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(css) => f.write_str(css),
            Selector::Resolved(_) => f.write_str("<resolved element>"),
        }
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(css) => f.debug_tuple("Css").field(css).finish(),
            Selector::Resolved(_) => f.write_str("Resolved(..)"),
        }
    }
}

impl From<&str> for Selector {
    fn from(css: &str) -> Self {
        Selector::Css(css.to_string())
    }
}

impl From<String> for Selector {
    fn from(css: String) -> Self {
        Selector::Css(css)
    }
}

impl From<Arc<dyn ElementHandle>> for Selector {
    fn from(handle: Arc<dyn ElementHandle>) -> Self {
        Selector::Resolved(handle)
    }
}
