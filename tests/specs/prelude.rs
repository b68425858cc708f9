//! Shared helpers for stowage specs

pub use serde::{Deserialize, Serialize};
pub use serde_json::json;
pub use std::path::{Path, PathBuf};
pub use stowage_core::{FakeSleeper, StoreConfig};
pub use stowage_storage::{Bom, DocumentStore, FileOps, RecordMap, TabularStore, WriteMode};

use tempfile::TempDir;

/// A scratch directory plus stores wired to a fake sleeper
pub struct Workspace {
    dir: TempDir,
    pub sleeper: FakeSleeper,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            sleeper: FakeSleeper::new(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Write a file, creating parent directories
    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).unwrap()
    }

    pub fn files(&self) -> FileOps {
        FileOps::new().with_sleeper(self.sleeper.clone())
    }

    pub fn documents(&self) -> DocumentStore {
        DocumentStore::new(self.files())
    }

    pub fn tables(&self) -> TabularStore {
        TabularStore::new(self.files())
    }
}
