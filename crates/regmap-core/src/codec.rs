// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Multi-width register codec.
//!
//! This module converts a window of raw 16-bit units into typed values and
//! typed values back into unit sequences, per declared data kind, byte order,
//! and word order.
//!
//! Decoding is total: no path panics or returns an error. Units missing from
//! the input read as zero; the caller is responsible for detecting short
//! replies before trusting the result (the block decoder does exactly that).
//! Out-of-range bit patterns pass through arithmetically: a value that would
//! be negative under `Int32` simply appears as a large unsigned magnitude
//! when the kind is `UInt32`.
//!
//! Encoding is the exact inverse within float-rounding tolerance. Numeric
//! encode clamps the value to the representable range of the target width
//! before rounding; it never wraps and never fails.
//!
//! # Unit arrangement
//!
//! Multi-unit values are combined most-significant-unit-first after applying
//! at most one reversal of the unit sequence: word orders `CDAB`/`DCBA`
//! reverse, and little-endian byte order reverses again. The two reversals
//! cancel, so e.g. `CDAB` + little-endian reads the units as written.
//!
//! # Examples
//!
//! ```
//! use regmap_core::codec::{decode, encode, CodecOptions};
//! use regmap_core::kind::{ByteOrder, DataKind, WordOrder};
//! use regmap_core::types::Value;
//!
//! let opts = CodecOptions::default();
//! let units = encode(
//!     &Value::Float32(1.5),
//!     DataKind::Float32,
//!     ByteOrder::BigEndian,
//!     WordOrder::Abcd,
//!     &opts,
//! );
//! let back = decode(&units, 0, DataKind::Float32, ByteOrder::BigEndian, WordOrder::Abcd, &opts);
//! assert_eq!(back, Value::Float32(1.5));
//! ```

use serde::{Deserialize, Serialize};

use crate::kind::{ByteOrder, DataKind, WordOrder};
use crate::types::Value;

// =============================================================================
// CodecOptions
// =============================================================================

/// Options governing codec behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CodecOptions {
    /// Decode `Int64`/`UInt64` by reinterpreting the 64 combined bits as an
    /// IEEE-754 binary64 float, the way legacy profiles did.
    ///
    /// The default is `false`: 64-bit integer kinds use true integer
    /// arithmetic and are exact over the full width. The legacy mode exists
    /// only for compatibility with profiles written against the old behavior;
    /// it loses precision beyond 2^53 and blurs the signed/unsigned
    /// distinction.
    #[serde(default)]
    pub legacy_int64_float: bool,
}

impl CodecOptions {
    /// Options matching the legacy 64-bit float-reinterpretation profiles.
    pub const fn legacy() -> Self {
        Self {
            legacy_int64_float: true,
        }
    }
}

// =============================================================================
// Decode
// =============================================================================

/// Decodes a typed value from a window of raw units.
///
/// `offset` is the zero-based unit offset of the tag within `units`. Boolean
/// kinds read unit 0 of the window regardless of offset or word order: one
/// coil per single-unit read.
pub fn decode(
    units: &[u16],
    offset: usize,
    kind: DataKind,
    byte_order: ByteOrder,
    word_order: WordOrder,
    options: &CodecOptions,
) -> Value {
    match kind {
        DataKind::Bool => Value::Bool(units.first().copied().unwrap_or(0) != 0),
        DataKind::UInt16 => Value::UInt16(unit_at(units, offset)),
        DataKind::Int16 => Value::Int16(unit_at(units, offset) as i16),
        DataKind::UInt32 => {
            Value::UInt32(combine(units, offset, 2, byte_order, word_order) as u32)
        }
        DataKind::Int32 => Value::Int32(combine(units, offset, 2, byte_order, word_order) as i32),
        DataKind::Float32 => Value::Float32(f32::from_bits(
            combine(units, offset, 2, byte_order, word_order) as u32,
        )),
        DataKind::UInt64 => {
            let bits = combine(units, offset, 4, byte_order, word_order);
            if options.legacy_int64_float {
                Value::Float64(f64::from_bits(bits))
            } else {
                Value::UInt64(bits)
            }
        }
        DataKind::Int64 => {
            let bits = combine(units, offset, 4, byte_order, word_order);
            if options.legacy_int64_float {
                Value::Float64(f64::from_bits(bits))
            } else {
                Value::Int64(bits as i64)
            }
        }
        DataKind::Float64 => Value::Float64(f64::from_bits(combine(
            units, offset, 4, byte_order, word_order,
        ))),
        DataKind::FixedString(n) => {
            let mut s = String::with_capacity(n as usize);
            for i in 0..n as usize {
                let code = unit_at(units, offset + i);
                s.push(char::from_u32(code as u32).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            Value::String(s)
        }
    }
}

// =============================================================================
// Encode
// =============================================================================

/// Encodes a typed value into the unit sequence `decode` would map back to it.
///
/// Numeric values are clamped to the representable range of the target width
/// before rounding. Boolean input to a numeric kind encodes as 0/1; numeric
/// input to the boolean kind is truthy on nonzero. A non-string value for a
/// string kind encodes as an all-zero window.
pub fn encode(
    value: &Value,
    kind: DataKind,
    byte_order: ByteOrder,
    word_order: WordOrder,
    options: &CodecOptions,
) -> Vec<u16> {
    match kind {
        DataKind::Bool => {
            let on = match value {
                Value::Bool(b) => *b,
                other => other.as_f64().map(|v| v != 0.0).unwrap_or(false),
            };
            vec![u16::from(on)]
        }
        DataKind::UInt16 => vec![clamp_integer(value, 0, 0xFFFF) as u16],
        DataKind::Int16 => vec![clamp_integer(value, -32768, 32767) as i16 as u16],
        DataKind::UInt32 => split(
            clamp_integer(value, 0, u32::MAX as i128) as u64,
            2,
            byte_order,
            word_order,
        ),
        DataKind::Int32 => split(
            clamp_integer(value, i32::MIN as i128, i32::MAX as i128) as i32 as u32 as u64,
            2,
            byte_order,
            word_order,
        ),
        DataKind::Float32 => {
            let f = value.as_f64().unwrap_or(0.0) as f32;
            split(f.to_bits() as u64, 2, byte_order, word_order)
        }
        DataKind::UInt64 => {
            if options.legacy_int64_float {
                let f = value.as_f64().unwrap_or(0.0);
                split(f.to_bits(), 4, byte_order, word_order)
            } else {
                split(
                    clamp_integer(value, 0, u64::MAX as i128) as u64,
                    4,
                    byte_order,
                    word_order,
                )
            }
        }
        DataKind::Int64 => {
            if options.legacy_int64_float {
                let f = value.as_f64().unwrap_or(0.0);
                split(f.to_bits(), 4, byte_order, word_order)
            } else {
                split(
                    clamp_integer(value, i64::MIN as i128, i64::MAX as i128) as i64 as u64,
                    4,
                    byte_order,
                    word_order,
                )
            }
        }
        DataKind::Float64 => {
            let f = value.as_f64().unwrap_or(0.0);
            split(f.to_bits(), 4, byte_order, word_order)
        }
        DataKind::FixedString(n) => {
            let mut units: Vec<u16> = value
                .as_str()
                .map(|s| s.encode_utf16().take(n as usize).collect())
                .unwrap_or_default();
            units.resize(n as usize, 0);
            units
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Reads the unit at `index`, treating missing units as zero.
#[inline]
fn unit_at(units: &[u16], index: usize) -> u16 {
    units.get(index).copied().unwrap_or(0)
}

/// Returns `true` if the unit sequence must be reversed before the
/// most-significant-first combine.
#[inline]
const fn reversed(byte_order: ByteOrder, word_order: WordOrder) -> bool {
    word_order.swaps_words() ^ matches!(byte_order, ByteOrder::LittleEndian)
}

/// Combines `width` units starting at `offset` into one big word.
fn combine(
    units: &[u16],
    offset: usize,
    width: usize,
    byte_order: ByteOrder,
    word_order: WordOrder,
) -> u64 {
    let mut out = 0u64;
    if reversed(byte_order, word_order) {
        for i in (0..width).rev() {
            out = (out << 16) | unit_at(units, offset + i) as u64;
        }
    } else {
        for i in 0..width {
            out = (out << 16) | unit_at(units, offset + i) as u64;
        }
    }
    out
}

/// Splits a big word into `width` units, the exact inverse of `combine`.
fn split(bits: u64, width: usize, byte_order: ByteOrder, word_order: WordOrder) -> Vec<u16> {
    let mut units: Vec<u16> = (0..width)
        .map(|i| (bits >> (16 * (width - 1 - i))) as u16)
        .collect();
    if reversed(byte_order, word_order) {
        units.reverse();
    }
    units
}

/// Extracts a numeric value and clamps it into `[min, max]`.
///
/// Integer-variant inputs are clamped exactly; float inputs are rounded to
/// the nearest integer first. NaN clamps to zero.
fn clamp_integer(value: &Value, min: i128, max: i128) -> i128 {
    let exact = match value {
        Value::Bool(b) => Some(i128::from(*b)),
        Value::Int16(v) => Some(*v as i128),
        Value::Int32(v) => Some(*v as i128),
        Value::Int64(v) => Some(*v as i128),
        Value::UInt16(v) => Some(*v as i128),
        Value::UInt32(v) => Some(*v as i128),
        Value::UInt64(v) => Some(*v as i128),
        Value::Float32(_) | Value::Float64(_) | Value::String(_) => None,
    };
    match exact {
        Some(v) => v.clamp(min, max),
        None => {
            let f = value.as_f64().unwrap_or(0.0);
            if f.is_nan() {
                0i128.clamp(min, max)
            } else {
                // `as` saturates at the i128 bounds, so infinities are safe.
                (f.round() as i128).clamp(min, max)
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const OPTS: CodecOptions = CodecOptions {
        legacy_int64_float: false,
    };
    const LEGACY: CodecOptions = CodecOptions::legacy();

    fn decode_be(units: &[u16], kind: DataKind) -> Value {
        decode(
            units,
            0,
            kind,
            ByteOrder::BigEndian,
            WordOrder::Abcd,
            &OPTS,
        )
    }

    #[test]
    fn test_int16_sign_extension() {
        assert_eq!(decode_be(&[0xFFFE], DataKind::Int16), Value::Int16(-2));
        assert_eq!(decode_be(&[0x7FFF], DataKind::Int16), Value::Int16(32767));
        assert_eq!(decode_be(&[0x8000], DataKind::Int16), Value::Int16(-32768));
    }

    #[test]
    fn test_uint16_passthrough() {
        assert_eq!(decode_be(&[0xFFFF], DataKind::UInt16), Value::UInt16(65535));
        // A pattern negative under Int16 is a large magnitude under UInt16.
        assert_eq!(decode_be(&[0xFFFE], DataKind::UInt16), Value::UInt16(65534));
    }

    #[test]
    fn test_uint32_combine() {
        assert_eq!(
            decode_be(&[0x0001, 0x0002], DataKind::UInt32),
            Value::UInt32(0x0001_0002)
        );
    }

    #[test]
    fn test_int32_sign_bit() {
        let v = decode_be(&[0x8000, 0x0001], DataKind::Int32);
        assert_eq!(v, Value::Int32(i32::MIN + 1));
    }

    #[test]
    fn test_word_and_byte_order_variants() {
        let expect = 0x0001_0002u32;
        let cases = [
            (ByteOrder::BigEndian, WordOrder::Abcd, [0x0001, 0x0002]),
            (ByteOrder::BigEndian, WordOrder::Badc, [0x0001, 0x0002]),
            (ByteOrder::BigEndian, WordOrder::Cdab, [0x0002, 0x0001]),
            (ByteOrder::BigEndian, WordOrder::Dcba, [0x0002, 0x0001]),
            (ByteOrder::LittleEndian, WordOrder::Abcd, [0x0002, 0x0001]),
            (ByteOrder::LittleEndian, WordOrder::Cdab, [0x0001, 0x0002]),
        ];
        for (bo, wo, units) in cases {
            assert_eq!(
                decode(&units, 0, DataKind::UInt32, bo, wo, &OPTS),
                Value::UInt32(expect),
                "{bo}/{wo}"
            );
        }
    }

    #[test]
    fn test_float32_decode() {
        let bits = 1.5f32.to_bits();
        let units = [(bits >> 16) as u16, bits as u16];
        match decode_be(&units, DataKind::Float32) {
            Value::Float32(f) => assert!((f - 1.5).abs() < 1e-6),
            other => panic!("expected float32, got {:?}", other),
        }
    }

    #[test]
    fn test_int64_native_decode() {
        let v = -3_000_000_000i64;
        let bits = v as u64;
        let units = [
            (bits >> 48) as u16,
            (bits >> 32) as u16,
            (bits >> 16) as u16,
            bits as u16,
        ];
        assert_eq!(decode_be(&units, DataKind::Int64), Value::Int64(v));
        // Same pattern under UInt64 appears as a large unsigned magnitude.
        assert_eq!(decode_be(&units, DataKind::UInt64), Value::UInt64(bits));
    }

    #[test]
    fn test_int64_legacy_float_mode() {
        let bits = 123456.75f64.to_bits();
        let units = [
            (bits >> 48) as u16,
            (bits >> 32) as u16,
            (bits >> 16) as u16,
            bits as u16,
        ];
        let v = decode(
            &units,
            0,
            DataKind::UInt64,
            ByteOrder::BigEndian,
            WordOrder::Abcd,
            &LEGACY,
        );
        match v {
            Value::Float64(f) => assert!((f - 123456.75).abs() < 1e-6),
            other => panic!("expected float64, got {:?}", other),
        }
    }

    #[test]
    fn test_bool_reads_first_unit() {
        assert_eq!(decode_be(&[0], DataKind::Bool), Value::Bool(false));
        assert_eq!(decode_be(&[1], DataKind::Bool), Value::Bool(true));
        // Offset is ignored for the coil kind.
        let v = decode(
            &[1, 0],
            1,
            DataKind::Bool,
            ByteOrder::BigEndian,
            WordOrder::Abcd,
            &OPTS,
        );
        assert_eq!(v, Value::Bool(true));
    }

    #[test]
    fn test_fixed_string_decode() {
        let units: Vec<u16> = "HELLOWORLD".encode_utf16().collect();
        assert_eq!(
            decode_be(&units, DataKind::FixedString(10)),
            Value::String("HELLOWORLD".to_string())
        );
    }

    #[test]
    fn test_short_input_reads_zero() {
        // Missing units are treated as zero rather than failing.
        assert_eq!(decode_be(&[], DataKind::UInt16), Value::UInt16(0));
        assert_eq!(decode_be(&[0x0001], DataKind::UInt32), Value::UInt32(0x0001_0000));
    }

    #[test]
    fn test_encode_clamps_to_width() {
        assert_eq!(
            encode(
                &Value::Float64(40000.0),
                DataKind::Int16,
                ByteOrder::BigEndian,
                WordOrder::Abcd,
                &OPTS
            ),
            vec![0x7FFF]
        );
        assert_eq!(
            encode(
                &Value::Float64(-1.0),
                DataKind::UInt16,
                ByteOrder::BigEndian,
                WordOrder::Abcd,
                &OPTS
            ),
            vec![0]
        );
        assert_eq!(
            encode(
                &Value::Float64(1e12),
                DataKind::UInt32,
                ByteOrder::BigEndian,
                WordOrder::Abcd,
                &OPTS
            ),
            vec![0xFFFF, 0xFFFF]
        );
    }

    #[test]
    fn test_int16_round_trip_exhaustive_edges() {
        for v in [-32768i16, -1, 0, 1, 32767] {
            let units = encode(
                &Value::Int16(v),
                DataKind::Int16,
                ByteOrder::BigEndian,
                WordOrder::Abcd,
                &OPTS,
            );
            assert_eq!(decode_be(&units, DataKind::Int16), Value::Int16(v));
        }
    }

    #[test]
    fn test_uint32_round_trip_all_orders() {
        let orders = [
            WordOrder::Abcd,
            WordOrder::Cdab,
            WordOrder::Badc,
            WordOrder::Dcba,
        ];
        for v in [0u32, 1, 0xDEAD_BEEF, u32::MAX] {
            for wo in orders {
                for bo in [ByteOrder::BigEndian, ByteOrder::LittleEndian] {
                    let units = encode(&Value::UInt32(v), DataKind::UInt32, bo, wo, &OPTS);
                    assert_eq!(
                        decode(&units, 0, DataKind::UInt32, bo, wo, &OPTS),
                        Value::UInt32(v),
                        "{bo}/{wo}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_string_round_trip() {
        let units = encode(
            &Value::String("PCS".into()),
            DataKind::FixedString(6),
            ByteOrder::BigEndian,
            WordOrder::Abcd,
            &OPTS,
        );
        assert_eq!(units.len(), 6);
        assert_eq!(
            decode_be(&units, DataKind::FixedString(6)),
            Value::String("PCS\0\0\0".to_string())
        );
    }

    #[test]
    fn test_legacy_round_trip() {
        let units = encode(
            &Value::Float64(123456.75),
            DataKind::Int64,
            ByteOrder::BigEndian,
            WordOrder::Abcd,
            &LEGACY,
        );
        let v = decode(
            &units,
            0,
            DataKind::Int64,
            ByteOrder::BigEndian,
            WordOrder::Abcd,
            &LEGACY,
        );
        match v {
            Value::Float64(f) => assert!((f - 123456.75).abs() < 1e-9),
            other => panic!("expected float64, got {:?}", other),
        }
    }

    #[test]
    fn test_nan_encodes_to_zero_for_integer_kinds() {
        assert_eq!(
            encode(
                &Value::Float64(f64::NAN),
                DataKind::Int16,
                ByteOrder::BigEndian,
                WordOrder::Abcd,
                &OPTS
            ),
            vec![0]
        );
    }
}
