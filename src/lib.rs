//! Reliable expectations, waits and retries for UI automation drivers
//!
//! UI state changes asynchronously: elements render late, detach
//! mid-check and silently drop input events. This crate makes a
//! requested check or action eventually succeed or fail clearly:
//! - Predicate primitives and combinators over a single element handle
//! - Polling waits with selector-annotated timeout diagnostics
//! - A fixed-budget retry engine that reports failures at the original
//!   call site instead of inside the retry plumbing
//! - Expectation and action DSLs built on those layers
//!
//! The browser-automation driver itself is consumed behind the
//! [`driver::ElementDriver`] and [`driver::ElementHandle`] seams.

pub mod actions;
pub mod conditions;
pub mod config;
pub mod driver;
pub mod errors;
pub mod expect;
pub mod retry;
pub mod selector;
pub mod waiting;

pub use actions::*;
pub use conditions::*;
pub use config::*;
pub use driver::*;
pub use errors::*;
pub use expect::*;
pub use retry::*;
pub use selector::*;
pub use waiting::*;
