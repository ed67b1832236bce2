//! Consumed driver capabilities
//!
//! The automation driver (session management, element lookup, native
//! input, script injection) lives outside this crate. These traits are
//! the seam it plugs into; everything above them only borrows a handle
//! per call and never caches element identity across polling attempts.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::selector::Selector;

/// Errors produced at the driver boundary
#[derive(Debug, Error, Clone)]
pub enum DriverError {
    /// No element matched the locator at dereference time
    #[error("Element not found: {0}")]
    NotFound(String),

    /// The element was replaced or detached between lookup and use
    #[error("Stale element: {0}")]
    Stale(String),

    /// Injected script failed to execute
    #[error("Script execution failed: {0}")]
    Script(String),

    /// Transport or protocol failure
    #[error("Driver I/O error: {0}")]
    Io(String),
}

/// Live reference to a single element in the automated target.
///
/// Every read is fallible: the underlying node can vanish between any
/// two calls. Reads must not mutate UI state; `click` and `send_keys`
/// are the only mutating operations.
#[async_trait]
pub trait ElementHandle: Send + Sync {
    /// True iff the element currently exists in the document tree
    async fn exists(&self) -> Result<bool, DriverError>;

    /// True iff the element is rendered with nonzero visual presence
    async fn is_visible(&self) -> Result<bool, DriverError>;

    /// True iff the element accepts interaction
    async fn is_enabled(&self) -> Result<bool, DriverError>;

    /// Rendered text content of the element
    async fn text(&self) -> Result<String, DriverError>;

    /// Named attribute value, `None` when the attribute is absent
    async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError>;

    /// Native click on the element
    async fn click(&self) -> Result<(), DriverError>;

    /// Send keyboard input to the element
    async fn send_keys(&self, keys: &str) -> Result<(), DriverError>;
}

/// Driver seam supplied by the host environment
#[async_trait]
pub trait ElementDriver: Send + Sync {
    /// Resolve a selector into an element handle.
    ///
    /// Resolution is lazy: absence of a matching node is observed
    /// through [`ElementHandle::exists`], not reported here, so waits
    /// for not-yet-rendered elements can keep polling.
    async fn resolve(&self, selector: &Selector) -> Result<Arc<dyn ElementHandle>, DriverError>;

    /// Count all elements matching a multi-element selector
    async fn count_matching(&self, selector: &Selector) -> Result<u32, DriverError>;

    /// Execute a function in the live page context.
    ///
    /// Used for synthetic input-device events that native emulation
    /// cannot express. `args` are made available to the script as its
    /// positional arguments.
    async fn run_in_page(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError>;
}
