// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Block reply decoding.
//!
//! Once a transport collaborator has read a block, [`decode_block`] turns the
//! raw unit window into per-tag [`Sample`]s. Malformed reply data never
//! fails the whole batch: a short reply drops the straddling tags, records a
//! warning per casualty, and the surviving samples go through. The only hard
//! error is referencing a block the plan does not contain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use regmap_core::codec::{self, CodecOptions};
use regmap_core::error::{DecodeError, DecodeResult};
use regmap_core::scale::ClampPolicy;
use regmap_core::types::{DeviceId, Sample, TagId, Value};

use crate::compiler::ReadPlan;

// =============================================================================
// Options
// =============================================================================

/// Caller-level decode policy.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DecodeOptions {
    /// Clamping policy applied after engineering scaling.
    #[serde(default)]
    pub clamp: ClampPolicy,

    /// Codec compatibility options.
    #[serde(default)]
    pub codec: CodecOptions,

    /// When set, a reply accumulating at least this many warnings marks its
    /// diagnostics record with `alert = true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortfall_alert: Option<u32>,
}

// =============================================================================
// Diagnostics
// =============================================================================

/// A non-fatal problem observed while decoding one block reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeWarning {
    /// The reply did not carry the requested number of units.
    QuantityMismatch {
        /// Units the block requested.
        expected: u16,
        /// Units the reply carried.
        received: usize,
    },

    /// A tag's slice extends past the received data; its sample was dropped.
    ShortSlice {
        /// The affected tag.
        tag: TagId,
    },
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QuantityMismatch { expected, received } => {
                write!(f, "expected {} units, received {}", expected, received)
            }
            Self::ShortSlice { tag } => {
                write!(f, "tag '{}' extends past the received data", tag)
            }
        }
    }
}

/// Per-reply decode diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDiagnostics {
    /// Device the block belongs to.
    pub device: DeviceId,

    /// Index of the decoded block within the plan.
    pub block_index: usize,

    /// Units the block requested.
    pub expected: u16,

    /// Units the reply carried.
    pub received: usize,

    /// Warnings accumulated while decoding, empty on a clean reply.
    pub warnings: Vec<DecodeWarning>,

    /// Set when the warning count reached the configured alert threshold.
    pub alert: bool,

    /// Decode timestamp.
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Decoding
// =============================================================================

/// Decodes one block reply into samples.
///
/// Samples come back in block-entry (address) order. Numeric values with a
/// configured scale are transformed into the engineering domain and become
/// `Value::Float64`; booleans and strings pass through untouched.
///
/// # Errors
///
/// Returns [`DecodeError::UnknownBlock`] when `block_index` is out of range.
/// Malformed reply *data* is reported through the diagnostics record instead.
pub fn decode_block(
    plan: &ReadPlan,
    block_index: usize,
    units: &[u16],
    options: &DecodeOptions,
) -> DecodeResult<(Vec<Sample>, BlockDiagnostics)> {
    let block = plan
        .block(block_index)
        .ok_or_else(|| DecodeError::unknown_block(block_index, plan.len()))?;

    let mut warnings = Vec::new();
    if units.len() != block.quantity as usize {
        warn!(
            device = %plan.device,
            block_index,
            expected = block.quantity,
            received = units.len(),
            "block reply quantity mismatch"
        );
        warnings.push(DecodeWarning::QuantityMismatch {
            expected: block.quantity,
            received: units.len(),
        });
    }

    let mut samples = Vec::with_capacity(block.entries.len());
    for entry in &block.entries {
        let start = entry.offset as usize;
        let stop = start + entry.length as usize;
        if stop > units.len() {
            warnings.push(DecodeWarning::ShortSlice {
                tag: entry.tag.clone(),
            });
            continue;
        }

        let mut value = codec::decode(
            &units[start..stop],
            0,
            entry.kind,
            entry.byte_order,
            entry.word_order,
            &options.codec,
        );
        if let (Some(scale), true) = (&entry.scale, value.is_numeric()) {
            // as_f64 is total for numeric values.
            let raw = value.as_f64().unwrap_or(0.0);
            value = Value::Float64(scale.to_engineering(raw, &options.clamp));
        }

        samples.push(Sample::with_flags(
            entry.tag.clone(),
            value,
            entry.alarm,
            entry.supporting,
        ));
    }

    let alert = options
        .shortfall_alert
        .is_some_and(|threshold| warnings.len() as u32 >= threshold);
    if alert {
        warn!(
            device = %plan.device,
            block_index,
            warning_count = warnings.len(),
            "decode warning threshold reached"
        );
    }

    let diagnostics = BlockDiagnostics {
        device: plan.device.clone(),
        block_index,
        expected: block.quantity,
        received: units.len(),
        warnings,
        alert,
        timestamp: Utc::now(),
    };
    Ok((samples, diagnostics))
}

// =============================================================================
// Tests
// =============================================================================
