// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage configuration
//!
//! Loaded from TOML. Every key is optional; missing keys take the defaults
//! the storage components use out of the box.

use crate::retry::{RetryOn, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Chunk size used when streaming one file onto another (1 MiB)
pub const DEFAULT_COPY_CHUNK_SIZE: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Attempts and delay for one retried operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Fixed pause between attempts (e.g. "3s", "250ms")
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: RetryPolicy::DEFAULT_ATTEMPTS,
            delay: RetryPolicy::DEFAULT_DELAY,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self, retry_on: RetryOn) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.delay, retry_on)
    }
}

/// Settings shared by the file, document and tabular stores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Bytes read then written per step when appending tables
    pub copy_chunk_size: usize,
    /// Recursive folder deletes retry only while the OS reports "not empty"
    pub folder_delete: RetryConfig,
    /// File deletes retry on any I/O error
    pub file_delete: RetryConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            copy_chunk_size: DEFAULT_COPY_CHUNK_SIZE,
            folder_delete: RetryConfig::default(),
            file_delete: RetryConfig::default(),
        }
    }
}

impl StoreConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: StoreConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn folder_delete_policy(&self) -> RetryPolicy {
        self.folder_delete.policy(RetryOn::DirectoryNotEmpty)
    }

    pub fn file_delete_policy(&self) -> RetryPolicy {
        self.file_delete.policy(RetryOn::AnyIo)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.copy_chunk_size == 0 {
            return Err(ConfigError::Invalid(
                "copy_chunk_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
