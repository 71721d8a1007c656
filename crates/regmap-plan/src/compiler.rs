// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Read-plan compilation.
//!
//! The compiler turns a flat tag list into the smallest reasonable set of
//! block reads. Tags are partitioned by function class, sorted by address,
//! and packed left to right: a tag joins the open window while the grown
//! span stays within `max_span` and the address gap to the previous tag
//! stays within `max_gap`. Closed windows are then split into chunks of at
//! most `max_quantity` units, with every cut landing on a tag boundary so
//! no tag is ever split across blocks or dropped.
//!
//! Compilation is deterministic: the produced plan depends only on the tag
//! set, never on the order tags were supplied in.

use serde::{Deserialize, Serialize};
use tracing::debug;

use regmap_core::error::{ConfigError, ConfigResult};
use regmap_core::kind::{ByteOrder, DataKind, FunctionClass, WordOrder};
use regmap_core::scale::LinearScale;
use regmap_core::types::{DeviceId, TagId};

use crate::tag::TagDefinition;

// =============================================================================
// Limits & Poll Defaults
// =============================================================================

/// Packing limits for the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerLimits {
    /// Maximum units a single block read may request.
    pub max_quantity: u16,

    /// Maximum span (first address to last covered address) of a merge window.
    pub max_span: u16,

    /// Maximum address gap bridged between two adjacent tags in a window.
    pub max_gap: u16,
}

impl Default for CompilerLimits {
    fn default() -> Self {
        Self {
            max_quantity: 120,
            max_span: 80,
            max_gap: 4,
        }
    }
}

impl CompilerLimits {
    /// Validates the limits.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_quantity == 0 {
            return Err(ConfigError::validation(
                "max_quantity",
                "must be at least 1",
            ));
        }
        if self.max_span == 0 {
            return Err(ConfigError::validation("max_span", "must be at least 1"));
        }
        Ok(())
    }
}

/// Concrete periods for the named polling classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollDefaults {
    /// Period for [`crate::tag::PollClass::Fast`] tags, in milliseconds.
    pub fast_ms: u64,

    /// Period for [`crate::tag::PollClass::Normal`] tags, in milliseconds.
    pub normal_ms: u64,

    /// Period for [`crate::tag::PollClass::Slow`] tags, in milliseconds.
    pub slow_ms: u64,
}

impl Default for PollDefaults {
    fn default() -> Self {
        Self {
            fast_ms: 250,
            normal_ms: 1000,
            slow_ms: 5000,
        }
    }
}

// =============================================================================
// Plan Types
// =============================================================================

/// One tag's slice inside a compiled block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockEntry {
    /// The tag this entry decodes into.
    pub tag: TagId,

    /// Unit offset of the tag within the block reply.
    pub offset: u16,

    /// Resolved unit length of the tag.
    pub length: u16,

    /// Data kind of the tag.
    pub kind: DataKind,

    /// Byte order of the tag.
    pub byte_order: ByteOrder,

    /// Word order of the tag.
    pub word_order: WordOrder,

    /// Optional engineering scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<LinearScale>,

    /// Alarm flag carried through to samples.
    pub alarm: bool,

    /// Supporting-point flag carried through to samples.
    pub supporting: bool,

    /// Resolved polling period of the tag, if it declared one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_ms: Option<u64>,
}

/// One compiled block read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadBlock {
    /// Function class the read targets.
    pub function: FunctionClass,

    /// 1-based start address of the block.
    pub start: u16,

    /// Number of units to request.
    pub quantity: u16,

    /// Polling period for the block, in milliseconds.
    pub period_ms: u64,

    /// Per-tag slice map, ordered by offset.
    pub entries: Vec<BlockEntry>,
}

impl ReadBlock {
    /// Builds the request description a transport collaborator should issue.
    pub fn request(&self, device: &DeviceId) -> ReadRequest {
        ReadRequest {
            device: device.clone(),
            function: self.function,
            start: self.start,
            quantity: self.quantity,
        }
    }
}

/// A transport-facing description of one block read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadRequest {
    /// Target device.
    pub device: DeviceId,

    /// Function class to read.
    pub function: FunctionClass,

    /// 1-based start address.
    pub start: u16,

    /// Number of units to request.
    pub quantity: u16,
}

/// A compiled, immutable read plan for one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadPlan {
    /// The device this plan polls.
    pub device: DeviceId,

    /// Compiled blocks, ordered by function class then start address.
    pub blocks: Vec<ReadBlock>,

    /// Poll defaults the plan was compiled against.
    pub poll: PollDefaults,
}

impl ReadPlan {
    /// Returns the block at `index`, if it exists.
    pub fn block(&self, index: usize) -> Option<&ReadBlock> {
        self.blocks.get(index)
    }

    /// Returns the number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if the plan has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterates the transport requests for every block.
    pub fn requests(&self) -> impl Iterator<Item = ReadRequest> + '_ {
        self.blocks.iter().map(|block| block.request(&self.device))
    }
}

// =============================================================================
// Compilation
// =============================================================================

/// Compiles a tag list into a read plan.
///
/// # Errors
///
/// - [`ConfigError::EmptyTagSet`] when `tags` is empty.
/// - [`ConfigError::InvalidDevice`] when the device ID is empty.
/// - [`ConfigError::DuplicateTag`] when two tags share an ID.
/// - [`ConfigError::TagTooLong`] when a tag is wider than `max_quantity`.
/// - [`ConfigError::Validation`] / [`ConfigError::InvalidScale`] for
///   per-tag or per-limit validation failures.
pub fn compile(
    device: DeviceId,
    tags: &[TagDefinition],
    limits: &CompilerLimits,
    poll: &PollDefaults,
) -> ConfigResult<ReadPlan> {
    limits.validate()?;
    if device.is_empty() {
        return Err(ConfigError::invalid_device("device", "must not be empty"));
    }
    if tags.is_empty() {
        return Err(ConfigError::EmptyTagSet);
    }

    let mut seen = std::collections::HashSet::new();
    for tag in tags {
        tag.validate()?;
        if !seen.insert(&tag.id) {
            return Err(ConfigError::duplicate_tag(tag.id.as_str()));
        }
        let length = tag.resolved_length();
        if length > limits.max_quantity {
            return Err(ConfigError::TagTooLong {
                tag_id: tag.id.as_str().to_string(),
                length,
                max_quantity: limits.max_quantity,
            });
        }
    }

    let mut blocks = Vec::new();
    for function in FunctionClass::ALL {
        let mut partition: Vec<&TagDefinition> = tags
            .iter()
            .filter(|tag| tag.function_class() == function)
            .collect();
        if partition.is_empty() {
            continue;
        }
        // Sort key includes the ID so equal addresses still compile
        // deterministically.
        partition.sort_by(|a, b| {
            a.address
                .cmp(&b.address)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });

        for window in sweep_windows(&partition, limits) {
            split_window(function, &window, limits, poll, &mut blocks);
        }
    }

    debug!(
        device = %device,
        tags = tags.len(),
        blocks = blocks.len(),
        "compiled read plan"
    );

    Ok(ReadPlan {
        device,
        blocks,
        poll: *poll,
    })
}

/// Left-to-right merge sweep over one sorted partition.
///
/// Returns windows of tags whose combined span stayed within `max_span`
/// with inter-tag gaps within `max_gap`.
fn sweep_windows<'a>(
    partition: &[&'a TagDefinition],
    limits: &CompilerLimits,
) -> Vec<Vec<&'a TagDefinition>> {
    let mut windows = Vec::new();
    let mut window: Vec<&TagDefinition> = Vec::new();
    let mut window_start: u32 = 0;
    let mut window_end: u32 = 0; // exclusive

    for &tag in partition {
        let start = tag.address as u32;
        let end = start + tag.resolved_length() as u32;

        if window.is_empty() {
            window_start = start;
            window_end = end;
            window.push(tag);
            continue;
        }

        let gap = start.saturating_sub(window_end);
        let new_end = window_end.max(end);
        let new_span = new_end - window_start;

        if gap <= limits.max_gap as u32 && new_span <= limits.max_span as u32 {
            window_end = new_end;
            window.push(tag);
        } else {
            debug!(
                start = window_start,
                span = window_end - window_start,
                tags = window.len(),
                "window closed"
            );
            windows.push(std::mem::take(&mut window));
            window_start = start;
            window_end = end;
            window.push(tag);
        }
    }
    if !window.is_empty() {
        windows.push(window);
    }
    windows
}

/// Splits one closed window into blocks of at most `max_quantity` units.
///
/// Cuts land only on tag end boundaries: a tag that would straddle the
/// quantity limit starts the next chunk instead. Every tag was verified to
/// fit within `max_quantity` on its own, so this always terminates with
/// every tag placed.
fn split_window(
    function: FunctionClass,
    window: &[&TagDefinition],
    limits: &CompilerLimits,
    poll: &PollDefaults,
    blocks: &mut Vec<ReadBlock>,
) {
    let mut chunk: Vec<&TagDefinition> = Vec::new();
    let mut base: u32 = 0;
    let mut end: u32 = 0; // exclusive

    let mut flush = |chunk: &mut Vec<&TagDefinition>, base: u32, end: u32| {
        if chunk.is_empty() {
            return;
        }
        let entries: Vec<BlockEntry> = chunk
            .iter()
            .map(|tag| BlockEntry {
                tag: tag.id.clone(),
                offset: (tag.address as u32 - base) as u16,
                length: tag.resolved_length(),
                kind: tag.kind,
                byte_order: tag.byte_order,
                word_order: tag.word_order,
                scale: tag.scale,
                alarm: tag.alarm,
                supporting: tag.supporting,
                poll_ms: tag.resolved_period(poll),
            })
            .collect();
        let period_ms = entries
            .iter()
            .filter_map(|entry| entry.poll_ms)
            .min()
            .unwrap_or(poll.normal_ms);
        blocks.push(ReadBlock {
            function,
            start: base as u16,
            quantity: (end - base) as u16,
            period_ms,
            entries,
        });
        chunk.clear();
    };

    for &tag in window {
        let start = tag.address as u32;
        let tag_end = start + tag.resolved_length() as u32;

        if chunk.is_empty() {
            base = start;
            end = tag_end;
            chunk.push(tag);
            continue;
        }

        if tag_end - base <= limits.max_quantity as u32 {
            end = end.max(tag_end);
            chunk.push(tag);
        } else {
            debug!(base, quantity = end - base, "chunk closed at tag boundary");
            flush(&mut chunk, base, end);
            base = start;
            end = tag_end;
            chunk.push(tag);
        }
    }
    flush(&mut chunk, base, end);
}

// =============================================================================
// Tests
// =============================================================================
