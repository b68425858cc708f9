// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Null-safe accessors over parsed JSON documents
//!
//! Every accessor takes an optional node and a field name and collapses any
//! missing piece of the chain (no node, Null node, missing field, Null field,
//! unconvertible value) into the zero value of the requested type.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// A parsed structured document (object, array or scalar)
pub type DocumentNode = Value;

/// How a subtree is rendered back to text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rendering {
    /// Single line, no insignificant whitespace
    Compact,
    /// Indented, one member per line
    #[default]
    Pretty,
}

/// Result of looking up a field on an optional node.
///
/// A field explicitly set to JSON `null` is `Absent`, same as a missing one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    Present(&'a Value),
    Absent,
}

impl<'a> Field<'a> {
    /// Look up `name` on `node`. Non-object and Null nodes have no fields.
    pub fn lookup(node: Option<&'a Value>, name: &str) -> Self {
        match node.and_then(|n| n.get(name)) {
            None | Some(Value::Null) => Field::Absent,
            Some(value) => Field::Present(value),
        }
    }

    /// Wrap a node itself, treating Null as absent
    pub fn of(node: Option<&'a Value>) -> Self {
        match node {
            None | Some(Value::Null) => Field::Absent,
            Some(value) => Field::Present(value),
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    pub fn node(self) -> Option<&'a Value> {
        match self {
            Field::Present(value) => Some(value),
            Field::Absent => None,
        }
    }

    /// Scalars as text. Objects and arrays have no text form.
    pub fn string(self) -> Option<String> {
        match self.node()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn bool(self) -> Option<bool> {
        match self.node()? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if s.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    None
                }
            }
            Value::Number(n) => n.as_f64().map(|f| f != 0.0),
            _ => None,
        }
    }

    pub fn long(self) -> Option<i64> {
        match self.node()? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_u64().and_then(|u| i64::try_from(u).ok()))
                .or_else(|| n.as_f64().and_then(float_to_long)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(float_to_long))
            }
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn int(self) -> Option<i32> {
        self.long().and_then(|l| i32::try_from(l).ok())
    }

    pub fn double(self) -> Option<f64> {
        match self.node()? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// RFC 3339 timestamps, normalized to UTC
    pub fn datetime(self) -> Option<DateTime<Utc>> {
        match self.node()? {
            Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            _ => None,
        }
    }

    pub fn render(self, rendering: Rendering) -> Option<String> {
        let node = self.node()?;
        let text = match rendering {
            Rendering::Compact => serde_json::to_string(node),
            Rendering::Pretty => serde_json::to_string_pretty(node),
        };
        text.ok()
    }
}

fn float_to_long(f: f64) -> Option<i64> {
    let rounded = f.round();
    // i64::MAX as f64 is 2^63, which is itself out of range
    if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
        Some(rounded as i64)
    } else {
        None
    }
}

/// True when there is no node or the node is JSON `null`
pub fn is_null(node: Option<&Value>) -> bool {
    !Field::of(node).is_present()
}

/// True unless `node` carries a non-null value under `name`
pub fn is_field_null(node: Option<&Value>, name: &str) -> bool {
    !has_field(node, name)
}

pub fn has_field(node: Option<&Value>, name: &str) -> bool {
    Field::lookup(node, name).is_present()
}

pub fn string_value(node: Option<&Value>, name: &str) -> String {
    Field::lookup(node, name).string().unwrap_or_default()
}

pub fn bool_value(node: Option<&Value>, name: &str) -> bool {
    Field::lookup(node, name).bool().unwrap_or_default()
}

pub fn long_value(node: Option<&Value>, name: &str) -> i64 {
    Field::lookup(node, name).long().unwrap_or_default()
}

pub fn int_value(node: Option<&Value>, name: &str) -> i32 {
    Field::lookup(node, name).int().unwrap_or_default()
}

pub fn double_value(node: Option<&Value>, name: &str) -> f64 {
    Field::lookup(node, name).double().unwrap_or_default()
}

/// Timestamp under `name`, or `DateTime::<Utc>::MIN_UTC`
pub fn datetime_value(node: Option<&Value>, name: &str) -> DateTime<Utc> {
    Field::lookup(node, name)
        .datetime()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Child node under `name`; `None` when missing or null
pub fn node_value<'a>(node: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    Field::lookup(node, name).node()
}

/// Subtree under `name` as JSON text, or `""`
pub fn render_value(node: Option<&Value>, name: &str, rendering: Rendering) -> String {
    Field::lookup(node, name)
        .render(rendering)
        .unwrap_or_default()
}

/// Sum nodes as integers. Null and unconvertible entries contribute zero.
pub fn sum_long_values<'a, I>(values: I) -> i64
where
    I: IntoIterator<Item = &'a Value>,
{
    values
        .into_iter()
        .filter_map(|v| Field::of(Some(v)).long())
        .fold(0i64, i64::saturating_add)
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
