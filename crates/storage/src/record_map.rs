// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative mapping between a record type's fields and table columns
//!
//! Writes emit the mapped columns in map order, whatever the field order of
//! the record type. Reads bind cells to fields by position, so a file must be
//! read with the same map it was written with.
//!
//! Null and empty strings share the empty cell, so an optional text field
//! holding `Some("")` reads back as `None`.

use csv::StringRecord;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use stowage_core::{Field, Rendering};

/// Ordered `field -> column` associations for records of type `T`
pub struct RecordMap<T> {
    fields: Vec<String>,
    columns: Vec<String>,
    _record: PhantomData<fn() -> T>,
}

impl<T> RecordMap<T> {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            columns: Vec::new(),
            _record: PhantomData,
        }
    }

    /// Map serde field `field` to a column titled `column`
    pub fn column(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self.columns.push(column.into());
        self
    }

    /// Map each field to a column of the same name
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        fields.into_iter().fold(Self::new(), |map, field| {
            let field = field.into();
            map.column(field.clone(), field)
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Field names in column order, used to bind cells on read
    pub(crate) fn field_header(&self) -> StringRecord {
        StringRecord::from(self.fields.clone())
    }

    pub(crate) fn header_matches(&self, header: &StringRecord) -> bool {
        header.len() == self.columns.len()
            && header.iter().zip(&self.columns).all(|(found, expected)| found == expected.as_str())
    }
}

impl<T: Serialize> RecordMap<T> {
    /// Cells of one record in column order.
    ///
    /// Missing and null fields become empty cells; nested values are written
    /// as compact JSON.
    pub(crate) fn row(&self, record: &T) -> Result<Vec<String>, serde_json::Error> {
        let value = serde_json::to_value(record)?;
        if !value.is_object() {
            return Err(<serde_json::Error as serde::ser::Error>::custom(
                "record must serialize to a struct or map",
            ));
        }
        Ok(self
            .fields
            .iter()
            .map(|field| cell(Field::lookup(Some(&value), field)))
            .collect())
    }
}

fn cell(field: Field<'_>) -> String {
    field
        .string()
        .or_else(|| field.render(Rendering::Compact))
        .unwrap_or_default()
}

impl<T> Default for RecordMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for RecordMap<T> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            columns: self.columns.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> fmt::Debug for RecordMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordMap")
            .field("record", &std::any::type_name::<T>())
            .field("fields", &self.fields)
            .field("columns", &self.columns)
            .finish()
    }
}

#[cfg(test)]
#[path = "record_map_tests.rs"]
mod tests;
