// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! stowage-core: building blocks for the stowage persistence layer
//!
//! This crate provides:
//! - Null-safe accessors over parsed JSON documents
//! - Retry policies with an injectable sleeper for testable delays
//! - TOML configuration for the storage components
//! - File-system-safe naming for entity-derived paths

pub mod config;
pub mod document;
pub mod naming;
pub mod retry;

// Re-exports
pub use config::{ConfigError, RetryConfig, StoreConfig};
pub use document::{DocumentNode, Field, Rendering};
pub use naming::{file_system_safe, shortened_entity_name};
pub use retry::{FakeSleeper, RetryError, RetryOn, RetryPolicy, Sleeper, ThreadSleeper};
