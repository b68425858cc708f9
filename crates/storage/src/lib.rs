// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! stowage-storage: file-backed stores for documents and tables
//!
//! Every public operation logs its own failures and reports plain
//! success or failure, so callers never handle storage errors directly.

mod error;
mod fs_ops;
mod header;
mod json;
mod record_map;
mod tabular;

pub use error::StorageError;
pub use fs_ops::{Bom, FileOps};
pub use header::{copy_chunked, skip_header, HeaderSkip};
pub use json::DocumentStore;
pub use record_map::RecordMap;
pub use tabular::{TabularStore, WriteMode};
