// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON file-based storage for whole documents
//!
//! Documents are loaded and written whole. Writes always create or fully
//! overwrite the target file.

use crate::error::StorageError;
use crate::fs_ops::FileOps;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{error, info, warn, Span};

/// Load and save structured documents as JSON text files
#[derive(Clone)]
pub struct DocumentStore {
    files: FileOps,
    span: Span,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(FileOps::new())
    }
}

impl DocumentStore {
    pub fn new(files: FileOps) -> Self {
        Self {
            files,
            span: tracing::info_span!("document_store"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Load a file holding a single JSON object
    pub fn load_document(&self, path: &Path) -> Option<Value> {
        let _guard = self.span.enter();
        load(path, "JSON object", |text| parse_shaped(path, text, Shape::Object))
    }

    /// Load a file holding a JSON array
    pub fn load_document_array(&self, path: &Path) -> Option<Value> {
        let _guard = self.span.enter();
        load(path, "JSON array", |text| parse_shaped(path, text, Shape::Array))
    }

    /// Load a JSON array of objects as records of type `T`
    pub fn load_typed_list<T: DeserializeOwned>(&self, path: &Path) -> Option<Vec<T>> {
        let _guard = self.span.enter();
        load(path, std::any::type_name::<Vec<T>>(), |text| {
            serde_json::from_str(text).map_err(StorageError::json(path))
        })
    }

    /// Write `value` as pretty-printed JSON, null fields included
    pub fn save_object<T: Serialize + ?Sized>(&self, value: &T, path: &Path) -> bool {
        let _guard = self.span.enter();
        if !self.files.ensure_folder_for_file(path) {
            return false;
        }
        info!(
            path = %path.display(),
            kind = std::any::type_name::<T>(),
            "writing object"
        );
        match try_save(value, path) {
            Ok(()) => true,
            Err(e) => {
                error!(path = %path.display(), error = %e, "unable to write object");
                false
            }
        }
    }

    /// Write a JSON array
    pub fn save_array(&self, array: &[Value], path: &Path) -> bool {
        {
            let _guard = self.span.enter();
            info!(path = %path.display(), elements = array.len(), "writing JSON array");
        }
        self.save_object(array, path)
    }
}

fn load<T>(
    path: &Path,
    what: &str,
    parse: impl FnOnce(&str) -> Result<T, StorageError>,
) -> Option<T> {
    if !path.is_file() {
        warn!(path = %path.display(), "unable to find file");
        return None;
    }
    info!(path = %path.display(), "reading {}", what);

    let result = fs::read_to_string(path)
        .map_err(StorageError::io(path))
        .and_then(|text| parse(text.strip_prefix('\u{feff}').unwrap_or(text.as_str())));
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            error!(path = %path.display(), error = %e, "unable to load JSON");
            None
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    Object,
    Array,
}

impl Shape {
    fn name(self) -> &'static str {
        match self {
            Shape::Object => "object",
            Shape::Array => "array",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Shape::Object => value.is_object(),
            Shape::Array => value.is_array(),
        }
    }
}

fn parse_shaped(path: &Path, text: &str, shape: Shape) -> Result<Value, StorageError> {
    let value: Value = serde_json::from_str(text).map_err(StorageError::json(path))?;
    if shape.matches(&value) {
        Ok(value)
    } else {
        Err(StorageError::UnexpectedShape {
            path: path.to_path_buf(),
            expected: shape.name(),
        })
    }
}

fn try_save<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), StorageError> {
    let file = File::create(path).map_err(StorageError::io(path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(StorageError::json(path))?;
    writer.flush().map_err(StorageError::io(path))?;
    Ok(())
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
