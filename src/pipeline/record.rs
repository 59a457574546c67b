// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stepline contributors

//! Generic step records
//!
//! A `StepRecord` is one entry of the `steps` list before its type is known.
//! Typed step shapes pull their fields out of it with [`StepRecord::field`],
//! which reports the first field whose value has the wrong type.

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use crate::errors::DecodeError;

/// Untyped configuration of a single step
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    index: usize,
    fields: Mapping,
}

impl StepRecord {
    pub fn new(index: usize, fields: Mapping) -> Self {
        Self { index, fields }
    }

    /// Position of the record in the `steps` list
    pub fn index(&self) -> usize {
        self.index
    }

    /// Raw value for `key`; explicit nulls count as absent
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// Decode `key` into `T`
    ///
    /// Returns `Ok(None)` when the key is absent. Nulls nested inside the
    /// value decode as empty strings. Unknown keys are never looked at.
    pub fn field<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DecodeError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };

        serde_yaml::from_value(blank_nested_nulls(value.clone()))
            .map(Some)
            .map_err(|e| DecodeError::TypeMismatch {
                field: key.to_string(),
                reason: e.to_string(),
            })
    }

    /// Decode `key` into `T`, falling back to `T::default()` when absent
    pub fn field_or_default<T: DeserializeOwned + Default>(
        &self,
        key: &str,
    ) -> Result<T, DecodeError> {
        Ok(self.field(key)?.unwrap_or_default())
    }
}

/// Replace nulls inside mappings and sequences with `""`
///
/// A variable that substitutes to nothing leaves `KEY:` or `- ` behind,
/// which YAML reads as null.
fn blank_nested_nulls(value: Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| (k, blank_null(v)))
                .collect(),
        ),
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(blank_null).collect()),
        other => other,
    }
}

fn blank_null(value: Value) -> Value {
    match value {
        Value::Null => Value::String(String::new()),
        other => blank_nested_nulls(other),
    }
}

/// A typed step shape that can be decoded from a [`StepRecord`]
pub trait FromRecord: Sized {
    fn from_record(record: &StepRecord) -> Result<Self, DecodeError>;
}
