//! Raw Values
//!
//! Strategy-defined measurement data: scalars, ordered series and nested
//! mappings. Used both for raw run results and for report attachments.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// String-keyed mapping of raw values (an attachment body or nested field)
pub type ValueMap = BTreeMap<String, RawValue>;

/// A single raw datum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Boolean flag
    Bool(bool),
    /// Integer scalar (counts, sizes)
    Int(i64),
    /// Floating point scalar
    Float(f64),
    /// Text
    Text(String),
    /// Ordered numeric series
    Series(Vec<f64>),
    /// Nested mapping
    Map(ValueMap),
}

impl RawValue {
    /// Numeric view of a scalar
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Float(f) => Some(*f),
            RawValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Series view
    pub fn as_series(&self) -> Option<&[f64]> {
        match self {
            RawValue::Series(s) => Some(s),
            _ => None,
        }
    }

    /// Text view
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Mapping view
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            RawValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Look up a key in a nested mapping
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.as_map().and_then(|m| m.get(key))
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Float(v)
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Int(v)
    }
}

impl From<usize> for RawValue {
    fn from(v: usize) -> Self {
        RawValue::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<bool> for RawValue {
    fn from(v: bool) -> Self {
        RawValue::Bool(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

impl From<Vec<f64>> for RawValue {
    fn from(v: Vec<f64>) -> Self {
        RawValue::Series(v)
    }
}

impl From<ValueMap> for RawValue {
    fn from(v: ValueMap) -> Self {
        RawValue::Map(v)
    }
}
