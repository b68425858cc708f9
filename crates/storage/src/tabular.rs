// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CSV storage for typed records and the table append/merge engine
//!
//! Tables are written with LF line endings on every platform so that
//! partial tables produced by different workers concatenate byte for byte.

use crate::error::StorageError;
use crate::fs_ops::FileOps;
use crate::header::{copy_chunked, skip_header};
use crate::record_map::RecordMap;
use csv::{ByteRecord, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Seek, SeekFrom, Write};
use std::path::Path;
use stowage_core::config::DEFAULT_COPY_CHUNK_SIZE;
use stowage_core::StoreConfig;
use thiserror::Error;
use tracing::{error, info, trace, warn, Span};

/// How `write_records` treats an existing file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteMode {
    /// Append data rows to an existing file instead of replacing it
    pub append: bool,
    /// Write the header row when the file is created
    pub include_header: bool,
}

impl WriteMode {
    /// Create or overwrite, header first
    pub const CREATE: WriteMode = WriteMode {
        append: false,
        include_header: true,
    };
    /// Append rows when the file exists, otherwise create it with a header
    pub const APPEND: WriteMode = WriteMode {
        append: true,
        include_header: true,
    };

    pub fn without_header(self) -> Self {
        Self {
            include_header: false,
            ..self
        }
    }
}

impl Default for WriteMode {
    fn default() -> Self {
        Self::CREATE
    }
}

/// Typed CSV reads and writes plus the header-aware table append
#[derive(Clone)]
pub struct TabularStore {
    files: FileOps,
    chunk_size: usize,
    span: Span,
}

impl Default for TabularStore {
    fn default() -> Self {
        Self::new(FileOps::new())
    }
}

impl TabularStore {
    pub fn new(files: FileOps) -> Self {
        Self {
            files,
            chunk_size: DEFAULT_COPY_CHUNK_SIZE,
            span: tracing::info_span!("tabular_store"),
        }
    }

    pub fn from_config(files: FileOps, config: &StoreConfig) -> Self {
        Self::new(files).with_chunk_size(config.copy_chunk_size)
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Write `records` to `path`. `None` records is a successful no-op.
    pub fn write_records<T: Serialize>(
        &self,
        records: Option<&[T]>,
        map: &RecordMap<T>,
        path: &Path,
        mode: WriteMode,
    ) -> bool {
        let Some(records) = records else {
            return true;
        };
        let _guard = self.span.enter();
        if !self.files.ensure_folder_for_file(path) {
            return false;
        }
        trace!(
            path = %path.display(),
            kind = std::any::type_name::<T>(),
            count = records.len(),
            append = mode.append,
            "writing records"
        );

        match try_write_file(records, map, path, mode) {
            Ok(()) => true,
            Err(e) => {
                error!(path = %path.display(), error = %e, "unable to write CSV");
                false
            }
        }
    }

    /// Serialize `records` (with header) into memory
    pub fn write_records_to_buffer<T: Serialize>(
        &self,
        records: Option<&[T]>,
        map: &RecordMap<T>,
    ) -> Option<Vec<u8>> {
        let records = records?;
        let _guard = self.span.enter();
        trace!(
            kind = std::any::type_name::<T>(),
            count = records.len(),
            "writing records to buffer"
        );

        let buffer = Vec::with_capacity(1024 * records.len());
        match write_rows(buffer, records, map, true, Path::new("<buffer>")) {
            Ok(buffer) => Some(buffer),
            Err(e) => {
                error!(error = %e, "unable to write CSV to buffer");
                None
            }
        }
    }

    /// Read records written with the same `map`.
    ///
    /// Rows whose first cell starts with a non-empty `skip_prefix` are
    /// dropped. Malformed rows are logged and skipped. `None` when the file
    /// is missing or cannot be read at all.
    pub fn read_records<T: DeserializeOwned>(
        &self,
        path: &Path,
        map: &RecordMap<T>,
        skip_prefix: &str,
    ) -> Option<Vec<T>> {
        let _guard = self.span.enter();
        trace!(
            path = %path.display(),
            kind = std::any::type_name::<T>(),
            "reading records"
        );
        if !path.is_file() {
            warn!(path = %path.display(), "file does not exist");
            return None;
        }

        match try_read(path, map, skip_prefix) {
            Ok(records) => Some(records),
            Err(e) => {
                error!(path = %path.display(), error = %e, "unable to read CSV");
                None
            }
        }
    }

    /// Append the table at `source` onto the table at `target`.
    ///
    /// A missing or empty source is a no-op. A missing or empty target
    /// receives the source verbatim. Otherwise only the source's data rows
    /// are appended.
    pub fn append_table(&self, target: &Path, source: &Path) -> bool {
        let _guard = self.span.enter();
        if !self.files.ensure_folder_for_file(target) {
            return false;
        }
        trace!(target = %target.display(), source = %source.display(), "appending table");

        match self.try_append_table(target, source) {
            Ok(()) => true,
            Err(e) => {
                error!(
                    target = %target.display(),
                    source = %source.display(),
                    error = %e,
                    "appending tables failed"
                );
                false
            }
        }
    }

    /// Append the table at `source` onto an open output.
    ///
    /// The source header is kept only when the output is empty. Data is
    /// written at the output's end.
    pub fn append_table_to<W>(&self, target: &mut W, source: &Path) -> bool
    where
        W: Write + Seek + ?Sized,
    {
        let _guard = self.span.enter();
        trace!(source = %source.display(), "appending table to open stream");

        match self.try_append_table_to(target, source) {
            Ok(()) => true,
            Err(e) => {
                error!(source = %source.display(), error = %e, "appending table to open stream failed");
                false
            }
        }
    }

    /// Merge `sources` in order into a fresh table at `target`, holding one
    /// handle for the whole merge. Sources are deleted afterwards when
    /// `remove_sources` is set and the merge succeeded.
    pub fn merge_tables<P: AsRef<Path>>(
        &self,
        target: &Path,
        sources: &[P],
        remove_sources: bool,
    ) -> bool {
        let _guard = self.span.enter();
        if !self.files.ensure_folder_for_file(target) {
            return false;
        }
        info!(target = %target.display(), sources = sources.len(), "merging tables");

        let mut output = match File::create(target) {
            Ok(file) => file,
            Err(e) => {
                error!(target = %target.display(), error = %e, "unable to create merge target");
                return false;
            }
        };
        for source in sources {
            if !self.append_table_to(&mut output, source.as_ref()) {
                return false;
            }
        }
        if let Err(e) = output.sync_all() {
            error!(target = %target.display(), error = %e, "unable to flush merge target");
            return false;
        }
        drop(output);

        if !remove_sources {
            return true;
        }
        sources
            .iter()
            .fold(true, |ok, source| self.files.delete_file(source.as_ref()) && ok)
    }

    fn try_append_table(&self, target: &Path, source: &Path) -> Result<(), StorageError> {
        let Some(source_file) = open_source(source)? else {
            return Ok(());
        };
        let target_len = match fs::metadata(target) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => return Err(StorageError::io(target)(e)),
        };

        let mut output = OpenOptions::new()
            .create(true)
            .append(true)
            .open(target)
            .map_err(StorageError::io(target))?;
        let copied = self.copy_table(source_file, &mut output, target_len > 0, source)?;
        trace!(target = %target.display(), bytes = copied, "table appended");
        Ok(())
    }

    fn try_append_table_to<W>(&self, target: &mut W, source: &Path) -> Result<(), StorageError>
    where
        W: Write + Seek + ?Sized,
    {
        let Some(source_file) = open_source(source)? else {
            return Ok(());
        };
        // append-mode handles report position 0 until their first write
        let position = target.stream_position().map_err(StorageError::io(source))?;
        let end = target
            .seek(SeekFrom::End(0))
            .map_err(StorageError::io(source))?;
        self.copy_table(source_file, target, position > 0 || end > 0, source)?;
        Ok(())
    }

    fn copy_table<W: Write + ?Sized>(
        &self,
        source_file: File,
        output: &mut W,
        drop_header: bool,
        source: &Path,
    ) -> Result<u64, StorageError> {
        let mut reader = BufReader::new(source_file);
        if drop_header {
            let skip = skip_header(&mut reader).map_err(StorageError::io(source))?;
            if !skip.terminated {
                trace!(source = %source.display(), "source holds only a header line");
            }
        }
        copy_chunked(&mut reader, output, self.chunk_size).map_err(StorageError::io(source))
    }
}

/// Open a non-empty source table; `None` when missing or empty
fn open_source(source: &Path) -> Result<Option<File>, StorageError> {
    let file = match File::open(source) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StorageError::io(source)(e)),
    };
    let len = file.metadata().map_err(StorageError::io(source))?.len();
    Ok((len > 0).then_some(file))
}

fn try_write_file<T: Serialize>(
    records: &[T],
    map: &RecordMap<T>,
    path: &Path,
    mode: WriteMode,
) -> Result<(), StorageError> {
    let (file, include_header) = if mode.append && path.exists() {
        let file = OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(StorageError::io(path))?;
        (file, false)
    } else {
        let file = File::create(path).map_err(StorageError::io(path))?;
        (file, mode.include_header)
    };
    write_rows(file, records, map, include_header, path)?;
    Ok(())
}

fn write_rows<W: Write, T: Serialize>(
    output: W,
    records: &[T],
    map: &RecordMap<T>,
    include_header: bool,
    path: &Path,
) -> Result<W, StorageError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(output);

    if include_header {
        writer
            .write_record(map.columns())
            .map_err(StorageError::csv(path))?;
    }
    for record in records {
        let row = map.row(record).map_err(StorageError::json(path))?;
        writer.write_record(&row).map_err(StorageError::csv(path))?;
    }
    writer.flush().map_err(StorageError::io(path))?;
    writer
        .into_inner()
        .map_err(|e| StorageError::io(path)(e.into_error()))
}

fn try_read<T: DeserializeOwned>(
    path: &Path,
    map: &RecordMap<T>,
    skip_prefix: &str,
) -> Result<Vec<T>, StorageError> {
    let file = File::open(path).map_err(StorageError::io(path))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let header = reader.headers().map_err(StorageError::csv(path))?.clone();
    if !header.is_empty() && !map.header_matches(&header) {
        warn!(
            path = %path.display(),
            found = ?header,
            expected = ?map.columns(),
            "header does not match record map, binding columns by position"
        );
    }

    let fields = map.field_header();
    let mut records = Vec::new();
    let mut byte_record = ByteRecord::new();
    let mut index = 0u64;
    while reader
        .read_byte_record(&mut byte_record)
        .map_err(StorageError::csv(path))?
    {
        // header is line 1
        index += 1;
        let (line, offset) = byte_record
            .position()
            .map(|p| (p.line(), p.byte()))
            .unwrap_or((index + 1, 0));

        let marked = byte_record
            .get(0)
            .is_some_and(|cell| cell.starts_with(skip_prefix.as_bytes()));
        if !skip_prefix.is_empty() && marked {
            trace!(path = %path.display(), line, "skipping marked row");
            continue;
        }

        match parse_row(&byte_record, &fields) {
            Ok(record) => records.push(record),
            Err(e) => warn!(
                path = %path.display(),
                row = line,
                offset,
                raw = %raw_row(&byte_record),
                error = %e,
                "skipping malformed row"
            ),
        }
    }

    Ok(records)
}

/// Why a single row was rejected
#[derive(Debug, Error)]
enum RowError {
    #[error("row has {found} columns, expected {expected}")]
    ColumnCount { expected: usize, found: usize },
    #[error("invalid UTF-8: {0}")]
    Utf8(String),
    #[error(transparent)]
    Field(#[from] csv::Error),
}

fn parse_row<T: DeserializeOwned>(
    byte_record: &ByteRecord,
    fields: &StringRecord,
) -> Result<T, RowError> {
    if byte_record.len() != fields.len() {
        return Err(RowError::ColumnCount {
            expected: fields.len(),
            found: byte_record.len(),
        });
    }
    let record = StringRecord::from_byte_record(byte_record.clone())
        .map_err(|e| RowError::Utf8(e.utf8_error().to_string()))?;
    Ok(record.deserialize(Some(fields))?)
}

fn raw_row(record: &ByteRecord) -> String {
    record
        .iter()
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
#[path = "tabular_tests.rs"]
mod tests;
