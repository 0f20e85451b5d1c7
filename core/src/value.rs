//! Property values for VGraph nodes and edges.
//!
//! Values are the atomic data stored in element properties. VGraph supports
//! booleans, numbers, strings, and non-empty arrays holding a single one of
//! those scalar types. Anything else (null, objects, nested or mixed arrays)
//! is rejected at the API boundary.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ValidationError, ValidationResult};

/// A homogeneous array of scalar values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyArray {
    /// Array of booleans.
    Bool(Vec<bool>),
    /// Array of numbers.
    Number(Vec<f64>),
    /// Array of strings.
    String(Vec<String>),
}

impl PropertyArray {
    /// Number of items in the array.
    pub fn len(&self) -> usize {
        match self {
            PropertyArray::Bool(items) => items.len(),
            PropertyArray::Number(items) => items.len(),
            PropertyArray::String(items) => items.len(),
        }
    }

    /// Returns true if the array has no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A value that can be stored in a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Boolean value.
    Bool(bool),
    /// 64-bit floating point number.
    Number(f64),
    /// UTF-8 string.
    String(String),
    /// Homogeneous array of scalars.
    Array(PropertyArray),
}

impl PropertyValue {
    /// Returns true if this value satisfies the property value grammar:
    /// numbers must be finite and arrays must be non-empty.
    pub fn is_valid(&self) -> bool {
        match self {
            PropertyValue::Bool(_) | PropertyValue::String(_) => true,
            PropertyValue::Number(n) => n.is_finite(),
            PropertyValue::Array(PropertyArray::Number(items)) => {
                !items.is_empty() && items.iter().all(|n| n.is_finite())
            }
            PropertyValue::Array(array) => !array.is_empty(),
        }
    }

    /// Convert an arbitrary JSON value, failing with `Invalid Value` when it
    /// is outside the grammar.
    pub fn from_json(value: serde_json::Value) -> ValidationResult<Self> {
        let parsed: PropertyValue =
            serde_json::from_value(value).map_err(|_| ValidationError::InvalidValue)?;
        if parsed.is_valid() {
            Ok(parsed)
        } else {
            Err(ValidationError::InvalidValue)
        }
    }

    /// Encode as a plain JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Get as boolean if this is a Bool value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as number if this is a Number value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as string reference if this is a String value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as array if this is an Array value.
    pub fn as_array(&self) -> Option<&PropertyArray> {
        match self {
            PropertyValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "Bool",
            PropertyValue::Number(_) => "Number",
            PropertyValue::String(_) => "String",
            PropertyValue::Array(_) => "Array",
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // JSON rendering keeps strings quoted and arrays bracketed.
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}

// Convenient From implementations
impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Number(n)
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        PropertyValue::Number(n as f64)
    }
}

impl From<i32> for PropertyValue {
    fn from(n: i32) -> Self {
        PropertyValue::Number(n as f64)
    }
}

impl From<u32> for PropertyValue {
    fn from(n: u32) -> Self {
        PropertyValue::Number(n as f64)
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<Vec<bool>> for PropertyValue {
    fn from(items: Vec<bool>) -> Self {
        PropertyValue::Array(PropertyArray::Bool(items))
    }
}

impl From<Vec<f64>> for PropertyValue {
    fn from(items: Vec<f64>) -> Self {
        PropertyValue::Array(PropertyArray::Number(items))
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(items: Vec<String>) -> Self {
        PropertyValue::Array(PropertyArray::String(items))
    }
}

impl From<Vec<&str>> for PropertyValue {
    fn from(items: Vec<&str>) -> Self {
        PropertyValue::Array(PropertyArray::String(
            items.into_iter().map(str::to_string).collect(),
        ))
    }
}

/// Property storage. Keys are kept sorted so hashing and serialization are
/// deterministic.
pub type Properties = BTreeMap<String, PropertyValue>;

/// Helper macro to create property maps.
#[macro_export]
macro_rules! props {
    () => {
        $crate::Properties::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        {
            let mut map = $crate::Properties::new();
            $(
                map.insert($key.to_string(), $crate::PropertyValue::from($value));
            )+
            map
        }
    };
}
