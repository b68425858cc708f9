// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resilient file and folder mutation
//!
//! Deletes retry under a [`RetryPolicy`] because some file systems release
//! handles asynchronously after a delete. Every operation reports plain
//! success or failure; causes are logged, never returned.

use crate::error::StorageError;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stowage_core::{RetryError, RetryPolicy, Sleeper, StoreConfig, ThreadSleeper};
use tracing::{error, info, warn, Span};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Whether whole-file text writes start with a UTF-8 byte-order mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bom {
    Include,
    #[default]
    Omit,
}

/// Retrying primitives for creating, deleting and copying files and folders
#[derive(Clone)]
pub struct FileOps {
    folder_delete: RetryPolicy,
    file_delete: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    span: Span,
}

impl Default for FileOps {
    fn default() -> Self {
        Self::new()
    }
}

impl FileOps {
    pub fn new() -> Self {
        Self::from_config(&StoreConfig::default())
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            folder_delete: config.folder_delete_policy(),
            file_delete: config.file_delete_policy(),
            sleeper: Arc::new(ThreadSleeper),
            span: tracing::info_span!("file_ops"),
        }
    }

    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    pub fn with_policies(mut self, folder_delete: RetryPolicy, file_delete: RetryPolicy) -> Self {
        self.folder_delete = folder_delete;
        self.file_delete = file_delete;
        self
    }

    /// Span every operation of this instance is recorded under
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Create `path` and any missing ancestors. Idempotent.
    pub fn ensure_folder(&self, path: &Path) -> bool {
        let _guard = self.span.enter();
        match try_ensure_folder(path) {
            Ok(()) => true,
            Err(e) => {
                error!(path = %path.display(), error = %e, "unable to create folder");
                false
            }
        }
    }

    /// Create the folder that will hold `file_path`
    pub fn ensure_folder_for_file(&self, file_path: &Path) -> bool {
        match file_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => self.ensure_folder(parent),
            _ => true,
        }
    }

    /// Recursively delete `path`. Missing folders count as deleted.
    pub fn delete_folder(&self, path: &Path) -> bool {
        let _guard = self.span.enter();
        let result = self.folder_delete.run(self.sleeper.as_ref(), |attempt| {
            if !path.is_dir() {
                return Ok(());
            }
            info!(path = %path.display(), attempt, "deleting folder");
            ignore_not_found(fs::remove_dir_all(path)).inspect_err(|e| {
                warn!(path = %path.display(), attempt, error = %e, "unable to delete folder");
            })
        });
        report_delete(path, &self.folder_delete, result, "folder")
    }

    /// Delete a single file. Missing files count as deleted.
    pub fn delete_file(&self, path: &Path) -> bool {
        let _guard = self.span.enter();
        let result = self.file_delete.run(self.sleeper.as_ref(), |attempt| {
            if !path.is_file() {
                return Ok(());
            }
            info!(path = %path.display(), attempt, "deleting file");
            ignore_not_found(fs::remove_file(path)).inspect_err(|e| {
                warn!(path = %path.display(), attempt, error = %e, "unable to delete file");
            })
        });
        report_delete(path, &self.file_delete, result, "file")
    }

    /// Mirror `source` into `target`, overwriting existing files.
    ///
    /// The first failed file copy in a folder stops the remaining files of
    /// that folder, but subfolders are still visited. Nothing is rolled back.
    pub fn copy_folder(&self, source: &Path, target: &Path) -> bool {
        let _guard = self.span.enter();
        self.copy_folder_recursive(source, target)
    }

    fn copy_folder_recursive(&self, source: &Path, target: &Path) -> bool {
        if !self.ensure_folder(target) {
            return false;
        }

        let (files, folders) = match list_folder(source) {
            Ok(listing) => listing,
            Err(e) => {
                error!(path = %source.display(), error = %e, "unable to list folder");
                return false;
            }
        };

        let mut ok = true;
        for file in &files {
            let Some(name) = file.file_name() else {
                continue;
            };
            let dest = target.join(name);
            info!(from = %file.display(), to = %dest.display(), "copying file");
            if let Err(e) = fs::copy(file, &dest) {
                error!(from = %file.display(), to = %dest.display(), error = %e, "unable to copy file");
                ok = false;
                break;
            }
        }

        for folder in &folders {
            let Some(name) = folder.file_name() else {
                continue;
            };
            if !self.copy_folder_recursive(folder, &target.join(name)) {
                ok = false;
            }
        }

        ok
    }

    /// Copy one file, creating the destination folder first
    pub fn copy_file(&self, source: &Path, target: &Path) -> bool {
        let _guard = self.span.enter();
        self.ensure_folder_for_file(target);
        info!(from = %source.display(), to = %target.display(), "copying file");
        match fs::copy(source, target) {
            Ok(_) => true,
            Err(e) => {
                error!(from = %source.display(), to = %target.display(), error = %e, "unable to copy file");
                false
            }
        }
    }

    /// Write `contents` as the whole file, creating folders as needed
    pub fn save_text(&self, contents: &str, path: &Path, bom: Bom) -> bool {
        let _guard = self.span.enter();
        if !self.ensure_folder_for_file(path) {
            return false;
        }
        info!(path = %path.display(), len = contents.len(), "writing text file");
        match try_save_text(contents, path, bom) {
            Ok(()) => true,
            Err(e) => {
                error!(path = %path.display(), error = %e, "unable to write file");
                false
            }
        }
    }

    /// Whole file as text with any byte-order mark removed; `""` when the
    /// file is missing or unreadable
    pub fn read_text(&self, path: &Path) -> String {
        let _guard = self.span.enter();
        if !path.is_file() {
            warn!(path = %path.display(), "unable to find file");
            return String::new();
        }
        info!(path = %path.display(), "reading file");
        match fs::read(path) {
            Ok(bytes) => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);
                String::from_utf8_lossy(body).into_owned()
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "unable to read file");
                String::new()
            }
        }
    }

    /// Fresh buffered writer at `path` (truncating), folders created
    pub fn create_text_writer(&self, path: &Path) -> Option<BufWriter<File>> {
        let _guard = self.span.enter();
        if !self.ensure_folder_for_file(path) {
            return None;
        }
        info!(path = %path.display(), "opening writer");
        match File::create(path) {
            Ok(file) => Some(BufWriter::new(file)),
            Err(e) => {
                error!(path = %path.display(), error = %e, "unable to open file for writing");
                None
            }
        }
    }
}

fn try_ensure_folder(path: &Path) -> Result<(), StorageError> {
    if !path.is_dir() {
        info!(path = %path.display(), "creating folder");
        fs::create_dir_all(path).map_err(StorageError::io(path))?;
    }
    Ok(())
}

fn try_save_text(contents: &str, path: &Path, bom: Bom) -> Result<(), StorageError> {
    let mut file = File::create(path).map_err(StorageError::io(path))?;
    if bom == Bom::Include {
        file.write_all(UTF8_BOM).map_err(StorageError::io(path))?;
    }
    file.write_all(contents.as_bytes())
        .map_err(StorageError::io(path))?;
    Ok(())
}

fn report_delete(
    path: &Path,
    policy: &RetryPolicy,
    result: Result<(), RetryError>,
    what: &'static str,
) -> bool {
    match result {
        Ok(()) => true,
        Err(source) => {
            let err = StorageError::Retry {
                path: path.to_path_buf(),
                source,
            };
            error!(
                path = %path.display(),
                delay = %humantime::format_duration(policy.delay),
                error = %err,
                "giving up deleting {}",
                what
            );
            false
        }
    }
}

fn ignore_not_found(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Files and subfolders of `path`, each sorted by name
fn list_folder(path: &Path) -> io::Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut files = Vec::new();
    let mut folders = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let entry_path = entry.path();
        if entry_path.is_dir() {
            folders.push(entry_path);
        } else {
            files.push(entry_path);
        }
    }
    files.sort();
    folders.sort();
    Ok((files, folders))
}

#[cfg(test)]
#[path = "fs_ops_tests.rs"]
mod tests;
