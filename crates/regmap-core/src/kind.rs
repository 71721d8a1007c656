// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Data kinds and address-space classification.
//!
//! This module defines the closed enumeration of tag data kinds and the total
//! mapping from a kind plus its access class to the function class (the
//! addressable-space category) a read or write must use. The mapping is
//! validated at configuration time; nothing here is derived from string
//! naming conventions.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// DataKind
// =============================================================================

/// The declared data kind of a tag.
///
/// The kind determines the default unit width of the tag (how many 16-bit
/// registers or coils it occupies) and which codec path decodes it.
///
/// # Examples
///
/// ```
/// use regmap_core::kind::DataKind;
///
/// assert_eq!(DataKind::Int16.unit_width(), 1);
/// assert_eq!(DataKind::Float32.unit_width(), 2);
/// assert_eq!(DataKind::UInt64.unit_width(), 4);
/// assert_eq!(DataKind::FixedString(10).unit_width(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    /// Signed 16-bit integer (1 unit).
    Int16,

    /// Unsigned 16-bit integer (1 unit).
    #[serde(rename = "uint16")]
    UInt16,

    /// Signed 32-bit integer (2 units).
    Int32,

    /// Unsigned 32-bit integer (2 units).
    #[serde(rename = "uint32")]
    UInt32,

    /// Signed 64-bit integer (4 units).
    Int64,

    /// Unsigned 64-bit integer (4 units).
    #[serde(rename = "uint64")]
    UInt64,

    /// IEEE-754 binary32 float (2 units).
    Float32,

    /// IEEE-754 binary64 float (4 units).
    Float64,

    /// Boolean, one coil per value (1 unit).
    Bool,

    /// Fixed-width character string, one character per unit.
    FixedString(u16),
}

impl DataKind {
    /// Returns the number of addressable units this kind occupies by default.
    #[inline]
    pub const fn unit_width(&self) -> u16 {
        match self {
            Self::Int16 | Self::UInt16 | Self::Bool => 1,
            Self::Int32 | Self::UInt32 | Self::Float32 => 2,
            Self::Int64 | Self::UInt64 | Self::Float64 => 4,
            Self::FixedString(n) => *n,
        }
    }

    /// Returns `true` if this kind decodes to a numeric value.
    #[inline]
    pub const fn is_numeric(&self) -> bool {
        !matches!(self, Self::Bool | Self::FixedString(_))
    }

    /// Returns `true` if this kind lives in the coil (boolean) space.
    #[inline]
    pub const fn is_bit(&self) -> bool {
        matches!(self, Self::Bool)
    }

    /// Returns the kind name used in diagnostics.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Bool => "bool",
            Self::FixedString(_) => "fixed_string",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixedString(n) => write!(f, "fixed_string({})", n),
            other => write!(f, "{}", other.name()),
        }
    }
}

// =============================================================================
// AccessClass
// =============================================================================

/// Read/write access class of a tag, derived from its source function family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessClass {
    /// The tag can only be read (input-register space).
    ReadOnly,

    /// The tag can be read and written (holding-register or coil space).
    #[default]
    ReadWrite,
}

impl AccessClass {
    /// Returns `true` if writes to this tag are permitted.
    #[inline]
    pub const fn is_writable(&self) -> bool {
        matches!(self, Self::ReadWrite)
    }
}

impl fmt::Display for AccessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly => write!(f, "read_only"),
            Self::ReadWrite => write!(f, "read_write"),
        }
    }
}

// =============================================================================
// FunctionClass
// =============================================================================

/// The addressable-space category a tag belongs to.
///
/// The function class determines which read operation variant the transport
/// must issue for a block, and which write variants apply. It is derived
/// totally from `(DataKind, AccessClass)`; tags only merge into the same read
/// block when they share a function class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionClass {
    /// Boolean read/write space (coils).
    Coil,

    /// Read-only numeric space (input registers).
    InputRegister,

    /// Read/write numeric space (holding registers).
    HoldingRegister,
}

impl FunctionClass {
    /// All function classes, in the order partitions are compiled.
    pub const ALL: [FunctionClass; 3] = [
        FunctionClass::Coil,
        FunctionClass::InputRegister,
        FunctionClass::HoldingRegister,
    ];

    /// Derives the function class for a kind and access class.
    ///
    /// Boolean kinds map to the coil space regardless of access class;
    /// everything else splits on read-only vs read/write.
    #[inline]
    pub const fn derive(kind: DataKind, access: AccessClass) -> Self {
        if kind.is_bit() {
            Self::Coil
        } else {
            match access {
                AccessClass::ReadOnly => Self::InputRegister,
                AccessClass::ReadWrite => Self::HoldingRegister,
            }
        }
    }

    /// Returns the protocol function code used to read this space.
    #[inline]
    pub const fn read_function_code(&self) -> u8 {
        match self {
            Self::Coil => 1,
            Self::InputRegister => 4,
            Self::HoldingRegister => 3,
        }
    }

    /// Returns `true` if writes into this space are possible.
    #[inline]
    pub const fn is_writable(&self) -> bool {
        matches!(self, Self::Coil | Self::HoldingRegister)
    }

    /// Returns `true` if this space addresses single bits.
    #[inline]
    pub const fn is_bit(&self) -> bool {
        matches!(self, Self::Coil)
    }
}

impl fmt::Display for FunctionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coil => write!(f, "coil"),
            Self::InputRegister => write!(f, "input_register"),
            Self::HoldingRegister => write!(f, "holding_register"),
        }
    }
}

// =============================================================================
// ByteOrder
// =============================================================================

/// Byte order for multi-unit values.
///
/// Big-endian places the more-significant unit first in the combined word;
/// little-endian reverses that placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    /// Most significant unit first (the fieldbus default).
    #[default]
    BigEndian,

    /// Least significant unit first.
    LittleEndian,
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BigEndian => write!(f, "big_endian"),
            Self::LittleEndian => write!(f, "little_endian"),
        }
    }
}

// =============================================================================
// WordOrder
// =============================================================================

/// Arrangement of a multi-unit value's constituent units.
///
/// `Abcd`/`Badc` keep the first unit as the more-significant half;
/// `Cdab`/`Dcba` swap the unit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WordOrder {
    /// First unit holds the more-significant bits.
    #[default]
    Abcd,

    /// Unit order swapped.
    Cdab,

    /// First unit holds the more-significant bits (byte-swapped family).
    Badc,

    /// Unit order swapped (byte-swapped family).
    Dcba,
}

impl WordOrder {
    /// Returns `true` if this order swaps the unit sequence of a value.
    #[inline]
    pub const fn swaps_words(&self) -> bool {
        matches!(self, Self::Cdab | Self::Dcba)
    }
}

impl fmt::Display for WordOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abcd => write!(f, "ABCD"),
            Self::Cdab => write!(f, "CDAB"),
            Self::Badc => write!(f, "BADC"),
            Self::Dcba => write!(f, "DCBA"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
