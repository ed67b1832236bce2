//! Retry engine for flaky UI actions
//!
//! Drivers occasionally report success for an action that never
//! registered, or fail transiently while a page re-renders. Repeating
//! the action a small, fixed number of times with a fixed delay is
//! enough to stabilize most of that flakiness; longer backoff only
//! slows a suite down without improving reliability.
//!
//! The diagnostic wrinkle: by the time the last asynchronous attempt
//! fails, the rejection's own trace points deep into the retry
//! plumbing. [`CallerContext`] is captured synchronously at the entry
//! point, before any asynchronous work, and spliced into the final
//! [`ExpectError::RetryExhausted`] so the failure reads as if it
//! happened at the call site, with the underlying cause appended.

use std::backtrace::Backtrace;
use std::future::Future;
use std::panic::Location;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::ExpectConfig;
use crate::errors::ExpectError;

/// Call-site context captured before asynchronous work begins
pub struct CallerContext {
    location: &'static Location<'static>,
    backtrace: Backtrace,
}

impl CallerContext {
    /// Capture the current call site.
    ///
    /// Must be called from a synchronous frame; capturing inside an
    /// async body would record the executor's poll site instead.
    #[track_caller]
    pub fn capture() -> Self {
        Self {
            location: Location::caller(),
            backtrace: Backtrace::force_capture(),
        }
    }

    /// File, line and column of the original invocation
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Pretty rendering: the call site first, then the full trace
    pub fn render(&self) -> String {
        format!("{}\n{}", self.location, self.backtrace)
    }

    fn exhausted(&self, attempts: u32, cause: ExpectError) -> ExpectError {
        ExpectError::RetryExhausted {
            attempts,
            cause: cause.to_string(),
            caller: self.render(),
        }
    }
}

/// Fixed-budget, fixed-delay retry executor
#[derive(Clone, Copy, Debug)]
pub struct Retrier {
    attempts: u32,
    delay: Duration,
}

impl Default for Retrier {
    fn default() -> Self {
        let config = ExpectConfig::global();
        Self {
            attempts: config.retry_attempts,
            delay: config.retry_delay(),
        }
    }
}

impl Retrier {
    /// Create a retrier with an explicit budget and inter-attempt delay
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    /// Create a retrier from an explicit configuration
    pub fn with_config(config: &ExpectConfig) -> Self {
        Self::new(config.retry_attempts, config.retry_delay())
    }

    /// Maximum number of attempts before giving up
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Invoke `action` until it succeeds, retrying with the fixed delay.
    ///
    /// The action is invoked at most `attempts` times. Exhaustion fails
    /// with [`ExpectError::RetryExhausted`] carrying the caller context
    /// captured here, synchronously, before the first attempt.
    #[track_caller]
    pub fn execute<A, Fut, T>(&self, action: A) -> impl Future<Output = Result<T, ExpectError>>
    where
        A: Fn() -> Fut,
        Fut: Future<Output = Result<T, ExpectError>>,
    {
        let caller = CallerContext::capture();
        let budget = *self;
        async move {
            let mut attempt = 1u32;
            loop {
                match action().await {
                    Ok(value) => return Ok(value),
                    Err(error) if attempt < budget.attempts => {
                        info!(
                            "action failed, attempt {attempt} of {}: {error}",
                            budget.attempts
                        );
                        sleep(budget.delay).await;
                        attempt += 1;
                    }
                    Err(error) => return Err(caller.exhausted(attempt, error)),
                }
            }
        }
    }

    /// Re-drive a side-effecting action until its success condition holds.
    ///
    /// Every attempt re-runs `action` before re-checking `condition`:
    /// an action that silently failed to register (a missed click, say)
    /// would otherwise leave the condition waiting forever. The
    /// action's own result is ignored; only the condition decides.
    #[track_caller]
    pub fn repeat_action<A, AFut, C, CFut>(
        &self,
        action: A,
        condition: C,
    ) -> impl Future<Output = Result<(), ExpectError>>
    where
        A: Fn() -> AFut,
        AFut: Future<Output = Result<(), ExpectError>>,
        C: Fn() -> CFut,
        CFut: Future<Output = Result<(), ExpectError>>,
    {
        let caller = CallerContext::capture();
        let budget = *self;
        async move {
            let mut attempt = 1u32;
            loop {
                if let Err(error) = action().await {
                    debug!("repeated action reported an error: {error}");
                }
                match condition().await {
                    Ok(()) => return Ok(()),
                    Err(error) if attempt < budget.attempts => {
                        info!(
                            "condition failed, attempt {attempt} of {}: {error}",
                            budget.attempts
                        );
                        sleep(budget.delay).await;
                        attempt += 1;
                    }
                    Err(error) => return Err(caller.exhausted(attempt, error)),
                }
            }
        }
    }
}

/// Best-effort repetition of an action a fixed number of times.
///
/// Repetitions are sequential: each one is awaited before the next is
/// scheduled. Failures are logged and ignored; this is a stabilizer
/// for cases where no reliable success condition can be formulated,
/// not a correctness mechanism.
pub async fn times<A, Fut>(action: A, count: u32, delay: Duration)
where
    A: Fn() -> Fut,
    Fut: Future<Output = Result<(), ExpectError>>,
{
    for repetition in 0..count {
        if let Err(error) = action().await {
            debug!("repetition {} failed: {error}", repetition + 1);
        }
        if repetition + 1 < count {
            sleep(delay).await;
        }
    }
}
