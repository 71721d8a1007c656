// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core data types for regmap.
//!
//! This module provides the identity and value types shared by the plan
//! compiler, the block decoder, and the write batcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

// =============================================================================
// Identifiers
// =============================================================================

/// A unique identifier for a device instance.
///
/// Device IDs should be stable across restarts and unique within a site.
///
/// # Examples
///
/// ```
/// use regmap_core::types::DeviceId;
///
/// let id = DeviceId::new("pcs-001");
/// assert_eq!(id.as_str(), "pcs-001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates a new device ID.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the ID is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the ID and returns the inner string.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for DeviceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A unique identifier for a tag within a device.
///
/// Tags represent individual data points (registers, coils, character
/// windows) on a device.
///
/// # Examples
///
/// ```
/// use regmap_core::types::TagId;
///
/// let id = TagId::new("PCS.ACTIVE_POWER");
/// assert_eq!(id.as_str(), "PCS.ACTIVE_POWER");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(String);

impl TagId {
    /// Creates a new tag ID.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the ID and returns the inner string.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TagId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TagId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for TagId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Value Types
// =============================================================================

/// A decoded register value.
///
/// This enum covers every value shape the codec can produce from a register
/// window: the integer widths, IEEE-754 floats, booleans for the coil space,
/// and fixed-width character strings.
///
/// # Examples
///
/// ```
/// use regmap_core::types::Value;
///
/// let power = Value::Float64(25.5);
/// assert_eq!(power.as_f64(), Some(25.5));
///
/// let breaker = Value::Bool(true);
/// assert_eq!(breaker.as_bool(), Some(true));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// Boolean value (coil space)
    Bool(bool),

    /// Signed 16-bit integer
    Int16(i16),

    /// Signed 32-bit integer
    Int32(i32),

    /// Signed 64-bit integer
    Int64(i64),

    /// Unsigned 16-bit integer
    UInt16(u16),

    /// Unsigned 32-bit integer
    UInt32(u32),

    /// Unsigned 64-bit integer
    UInt64(u64),

    /// 32-bit floating point
    Float32(f32),

    /// 64-bit floating point
    Float64(f64),

    /// Fixed-width character string
    String(String),
}

impl Value {
    /// Returns the type name of this value.
    ///
    /// # Examples
    ///
    /// ```
    /// use regmap_core::types::Value;
    ///
    /// assert_eq!(Value::Float64(1.0).type_name(), "float64");
    /// assert_eq!(Value::Bool(true).type_name(), "bool");
    /// ```
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int16(_) => "int16",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::UInt16(_) => "uint16",
            Value::UInt32(_) => "uint32",
            Value::UInt64(_) => "uint64",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::String(_) => "string",
        }
    }

    /// Returns `true` if this is a numeric value (integer or float).
    #[inline]
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Value::Bool(_) | Value::String(_))
    }

    /// Attempts to convert this value to a boolean.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to convert this value to an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Bool(v) => Some(if *v { 1 } else { 0 }),
            Value::Int16(v) => Some(*v as i64),
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            Value::UInt16(v) => Some(*v as i64),
            Value::UInt32(v) => Some(*v as i64),
            Value::UInt64(v) => i64::try_from(*v).ok(),
            Value::Float32(v) => Some(*v as i64),
            Value::Float64(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Attempts to convert this value to a u64.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Bool(v) => Some(if *v { 1 } else { 0 }),
            Value::Int16(v) if *v >= 0 => Some(*v as u64),
            Value::Int32(v) if *v >= 0 => Some(*v as u64),
            Value::Int64(v) if *v >= 0 => Some(*v as u64),
            Value::UInt16(v) => Some(*v as u64),
            Value::UInt32(v) => Some(*v as u64),
            Value::UInt64(v) => Some(*v),
            Value::Float32(v) if *v >= 0.0 => Some(*v as u64),
            Value::Float64(v) if *v >= 0.0 => Some(*v as u64),
            _ => None,
        }
    }

    /// Attempts to convert this value to an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Value::Int16(v) => Some(*v as f64),
            Value::Int32(v) => Some(*v as f64),
            Value::Int64(v) => Some(*v as f64),
            Value::UInt16(v) => Some(*v as f64),
            Value::UInt32(v) => Some(*v as f64),
            Value::UInt64(v) => Some(*v as f64),
            Value::Float32(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to get this value as a string reference.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// Converts this value to a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Bool(v) => serde_json::Value::Bool(*v),
            Value::Int16(v) => serde_json::json!(*v),
            Value::Int32(v) => serde_json::json!(*v),
            Value::Int64(v) => serde_json::json!(*v),
            Value::UInt16(v) => serde_json::json!(*v),
            Value::UInt32(v) => serde_json::json!(*v),
            Value::UInt64(v) => serde_json::json!(*v),
            Value::Float32(v) => serde_json::json!(*v),
            Value::Float64(v) => serde_json::json!(*v),
            Value::String(v) => serde_json::Value::String(v.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::UInt16(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::UInt64(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
        }
    }
}

// Implement From for the underlying primitives
macro_rules! impl_from_for_value {
    ($variant:ident, $type:ty) => {
        impl From<$type> for Value {
            fn from(v: $type) -> Self {
                Value::$variant(v)
            }
        }
    };
}

impl_from_for_value!(Bool, bool);
impl_from_for_value!(Int16, i16);
impl_from_for_value!(Int32, i32);
impl_from_for_value!(Int64, i64);
impl_from_for_value!(UInt16, u16);
impl_from_for_value!(UInt32, u32);
impl_from_for_value!(UInt64, u64);
impl_from_for_value!(Float32, f32);
impl_from_for_value!(Float64, f64);
impl_from_for_value!(String, String);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

// =============================================================================
// Sample
// =============================================================================

/// A decoded, timestamped reading for one tag.
///
/// Samples are the decoder's output handed to telemetry/storage collaborators.
/// The alarm and supporting-point flags are carried through unchanged from the
/// tag definition.
///
/// # Examples
///
/// ```
/// use regmap_core::types::{Sample, TagId, Value};
///
/// let sample = Sample::new(TagId::new("BMS.SOC"), Value::Float64(72.5));
/// assert_eq!(sample.tag_id.as_str(), "BMS.SOC");
/// assert!(!sample.alarm);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// The tag this reading belongs to.
    pub tag_id: TagId,

    /// The decoded (and scaled) value.
    pub value: Value,

    /// Capture timestamp (when the reply was decoded).
    pub timestamp: DateTime<Utc>,

    /// Whether this tag participates in alarming.
    pub alarm: bool,

    /// Whether this is a supporting point rather than a primary measurement.
    pub supporting: bool,
}

impl Sample {
    /// Creates a new sample with the current timestamp and cleared flags.
    pub fn new(tag_id: TagId, value: Value) -> Self {
        Self {
            tag_id,
            value,
            timestamp: Utc::now(),
            alarm: false,
            supporting: false,
        }
    }

    /// Creates a new sample with explicit flags.
    pub fn with_flags(tag_id: TagId, value: Value, alarm: bool, supporting: bool) -> Self {
        Self {
            tag_id,
            value,
            timestamp: Utc::now(),
            alarm,
            supporting,
        }
    }

    /// Returns the age of this sample.
    #[inline]
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.timestamp
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} @ {}",
            self.tag_id,
            self.value,
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f")
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
