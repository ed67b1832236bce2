//! Error types for expectations, waits and retries

use thiserror::Error;

/// Error enumeration for the expectation core
#[derive(Debug, Error, Clone)]
pub enum ExpectError {
    /// A predicate could not be evaluated against the element
    #[error("Predicate evaluation failed: {0}")]
    Predicate(String),

    /// A polling wait's deadline elapsed before the condition became true
    #[error("Wait timeout after {timeout_ms}ms {description}. Selector: {selector}")]
    WaitTimeout {
        description: String,
        selector: String,
        timeout_ms: u64,
    },

    /// A retried action failed on every attempt
    ///
    /// `caller` is the rendering of the call site captured before the
    /// first attempt, so the failure points at the test that asked for
    /// the action instead of the retry plumbing.
    #[error("Retry budget exhausted after {attempts} attempts: {cause}\nOriginally invoked at:\n{caller}")]
    RetryExhausted {
        attempts: u32,
        cause: String,
        caller: String,
    },

    /// Driver communication error
    #[error("Driver error: {0}")]
    Driver(String),

    /// Required process-wide configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExpectError {
    /// Wrap a lower-level failure as a predicate evaluation error
    pub fn predicate(err: impl std::fmt::Display) -> Self {
        ExpectError::Predicate(err.to_string())
    }

    /// Wrap a lower-level failure as a driver error
    pub fn driver(err: impl std::fmt::Display) -> Self {
        ExpectError::Driver(err.to_string())
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExpectError::WaitTimeout { .. } | ExpectError::Predicate(_) | ExpectError::Driver(_)
        )
    }

    /// Get error severity level (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            ExpectError::Internal(_) | ExpectError::Configuration(_) => 3,
            ExpectError::RetryExhausted { .. } | ExpectError::Driver(_) => 2,
            ExpectError::WaitTimeout { .. } => 1,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ExpectError::Predicate("gone".into()).is_retryable());
        assert!(ExpectError::WaitTimeout {
            description: "for element to be displayed".into(),
            selector: "#login".into(),
            timeout_ms: 100,
        }
        .is_retryable());
        assert!(!ExpectError::Configuration("timeout unset".into()).is_retryable());
        assert!(!ExpectError::RetryExhausted {
            attempts: 3,
            cause: "boom".into(),
            caller: "here".into(),
        }
        .is_retryable());
    }

    #[test]
    fn test_wait_timeout_message_carries_selector_and_description() {
        let err = ExpectError::WaitTimeout {
            description: "for element's text to be 'Done'".into(),
            selector: ".status".into(),
            timeout_ms: 5000,
        };
        let message = err.to_string();
        assert!(message.contains("for element's text to be 'Done'"));
        assert!(message.contains(".status"));
        assert!(message.contains("5000"));
    }
}
