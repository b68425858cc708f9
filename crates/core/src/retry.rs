// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded retry with a fixed delay between attempts

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Blocks the calling thread between retry attempts
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Real sleeper backed by `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Fake sleeper for testing that records requested delays instead of waiting
#[derive(Debug, Clone, Default)]
pub struct FakeSleeper {
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl FakeSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far, in order
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Sleeper for FakeSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(duration);
    }
}

/// Which failures are worth another attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOn {
    /// Any I/O error
    AnyIo,
    /// Only "directory not empty", the symptom of handles released late
    DirectoryNotEmpty,
}

impl RetryOn {
    pub fn qualifies(&self, err: &io::Error) -> bool {
        match self {
            RetryOn::AnyIo => true,
            RetryOn::DirectoryNotEmpty => err.kind() == io::ErrorKind::DirectoryNotEmpty,
        }
    }
}

/// Final failure of a retried operation
#[derive(Debug, Error)]
#[error("gave up after {attempts} attempt(s): {source}")]
pub struct RetryError {
    pub attempts: u32,
    #[source]
    pub source: io::Error,
}

/// Retry policy: total attempts, fixed delay, qualifying errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; zero behaves as one
    pub max_attempts: u32,
    pub delay: Duration,
    pub retry_on: RetryOn,
}

impl RetryPolicy {
    pub const DEFAULT_ATTEMPTS: u32 = 3;
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(3);

    pub fn new(max_attempts: u32, delay: Duration, retry_on: RetryOn) -> Self {
        Self {
            max_attempts,
            delay,
            retry_on,
        }
    }

    /// Policy for recursive folder deletes: retry only on "not empty"
    pub fn folder_delete() -> Self {
        Self::new(
            Self::DEFAULT_ATTEMPTS,
            Self::DEFAULT_DELAY,
            RetryOn::DirectoryNotEmpty,
        )
    }

    /// Policy for file deletes: retry on any I/O error
    pub fn file_delete() -> Self {
        Self::new(Self::DEFAULT_ATTEMPTS, Self::DEFAULT_DELAY, RetryOn::AnyIo)
    }

    /// Same policy without the delay
    pub fn without_delay(self) -> Self {
        Self {
            delay: Duration::ZERO,
            ..self
        }
    }

    /// Run `op` until it succeeds, fails with a non-qualifying error, or
    /// runs out of attempts. `op` receives the 1-based attempt number.
    pub fn run<T, F>(&self, sleeper: &dyn Sleeper, mut op: F) -> Result<T, RetryError>
    where
        F: FnMut(u32) -> io::Result<T>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(err) if attempt < attempts && self.retry_on.qualifies(&err) => {
                    sleeper.sleep(self.delay);
                    attempt += 1;
                }
                Err(source) => {
                    return Err(RetryError {
                        attempts: attempt,
                        source,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
