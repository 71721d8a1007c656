// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Write-plan batching.
//!
//! [`build_write_frames`] turns a batch of per-tag write commands into the
//! smallest set of protocol write frames the target device supports. The
//! register and coil spaces batch independently; device capabilities decide
//! whether contiguous values coalesce into multi-write frames or explode
//! into single-write frames.
//!
//! The batcher never fails: commands that cannot be honored (unknown tag,
//! read-only tag, string kind) are skipped with a warning so the rest of the
//! batch still goes out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use regmap_core::codec::{self, CodecOptions};
use regmap_core::kind::DataKind;
use regmap_core::types::{DeviceId, TagId, Value};

use crate::tag::{TagDefinition, TagDictionary};

// =============================================================================
// Commands
// =============================================================================

/// A caller-supplied value for one tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandValue {
    /// A boolean, for the coil space.
    Bool(bool),

    /// A number, for the register space (or coerced onto a coil).
    Number(f64),
}

impl CommandValue {
    /// Coerces the value onto a coil. Any nonzero number is true.
    #[inline]
    pub fn as_coil(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
        }
    }

    /// Coerces the value into the numeric domain. Booleans become 1 or 0.
    #[inline]
    pub fn as_number(&self) -> f64 {
        match self {
            Self::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Number(n) => *n,
        }
    }
}

impl From<bool> for CommandValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for CommandValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// One requested write: a tag and the engineering-domain value to set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteCommand {
    /// Target tag.
    pub tag: TagId,

    /// Value to write, in engineering units when the tag has a scale.
    pub value: CommandValue,
}

impl WriteCommand {
    /// Creates a new write command.
    pub fn new(tag: impl Into<TagId>, value: impl Into<CommandValue>) -> Self {
        Self {
            tag: tag.into(),
            value: value.into(),
        }
    }
}

// =============================================================================
// Capabilities & Limits
// =============================================================================

/// Whether a device accepts multi-value write frames in a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Only single-value writes are accepted.
    Single,

    /// Multi-value writes are accepted.
    #[default]
    Multiple,
}

/// Per-space write capabilities of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WriteCaps {
    /// Capability of the holding-register space.
    #[serde(default)]
    pub holding: WriteMode,

    /// Capability of the coil space.
    #[serde(default)]
    pub coil: WriteMode,
}

/// Frame size limits for multi-value writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteLimits {
    /// Maximum registers in one multi-register frame.
    pub max_registers_per_frame: u16,

    /// Maximum coils in one multi-coil frame.
    pub max_coils_per_frame: u16,
}

impl Default for WriteLimits {
    fn default() -> Self {
        Self {
            max_registers_per_frame: 120,
            max_coils_per_frame: 120,
        }
    }
}

// =============================================================================
// Frames
// =============================================================================

/// The protocol write operation a frame uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOp {
    /// Write one coil.
    WriteSingleCoil,

    /// Write a run of coils.
    WriteMultipleCoils,

    /// Write one register.
    WriteSingleRegister,

    /// Write a run of registers.
    WriteMultipleRegisters,
}

impl WriteOp {
    /// Returns the protocol function code of this operation.
    #[inline]
    pub const fn function_code(&self) -> u8 {
        match self {
            Self::WriteSingleCoil => 5,
            Self::WriteMultipleCoils => 15,
            Self::WriteSingleRegister => 6,
            Self::WriteMultipleRegisters => 16,
        }
    }
}

/// The payload of a write frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameValues {
    /// Register payload, one unit per address.
    Registers(Vec<u16>),

    /// Coil payload, one bit per address.
    Coils(Vec<bool>),
}

impl FrameValues {
    /// Number of addressable units the payload covers.
    pub fn len(&self) -> usize {
        match self {
            Self::Registers(v) => v.len(),
            Self::Coils(v) => v.len(),
        }
    }

    /// Returns `true` if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One ready-to-send write frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteFrame {
    /// Target device.
    pub device: DeviceId,

    /// Protocol operation to issue.
    pub op: WriteOp,

    /// 1-based start address.
    pub start: u16,

    /// Payload values, in address order.
    pub values: FrameValues,
}

// =============================================================================
// Batching
// =============================================================================

/// Builds write frames from a command batch.
///
/// Commands naming unknown tags, read-only tags, or string-kind tags are
/// skipped with a warning. Numeric values run through the tag's inverse
/// scale (engineering to raw) and are encoded with width clamping; booleans
/// coerce onto coils with any nonzero number reading as true.
///
/// Coil frames come first in address order, then register frames. A lone
/// coil is always written with the single-coil operation, even when the
/// device supports multi-coil frames.
pub fn build_write_frames(
    device: &DeviceId,
    commands: &[WriteCommand],
    dict: &TagDictionary,
    caps: &WriteCaps,
    limits: &WriteLimits,
    codec_options: &CodecOptions,
) -> Vec<WriteFrame> {
    // Address-keyed staging; a later command to the same address wins.
    let mut coils: BTreeMap<u16, bool> = BTreeMap::new();
    let mut registers: BTreeMap<u16, u16> = BTreeMap::new();

    for command in commands {
        let Some(tag) = dict.get(&command.tag) else {
            warn!(device = %device, tag = %command.tag, "write to unknown tag skipped");
            continue;
        };
        if !tag.access.is_writable() {
            warn!(device = %device, tag = %command.tag, "write to read-only tag skipped");
            continue;
        }
        if matches!(tag.kind, DataKind::FixedString(_)) {
            warn!(device = %device, tag = %command.tag, "write to string tag skipped");
            continue;
        }

        if tag.kind.is_bit() {
            coils.insert(tag.address, command.value.as_coil());
        } else {
            stage_register_write(tag, command.value, codec_options, &mut registers);
        }
    }

    let mut frames = Vec::new();
    emit_coil_frames(device, &coils, caps.coil, limits, &mut frames);
    emit_register_frames(device, &registers, caps.holding, limits, &mut frames);
    frames
}

/// Scales, encodes, and stages one register-space value unit by unit.
fn stage_register_write(
    tag: &TagDefinition,
    value: CommandValue,
    codec_options: &CodecOptions,
    registers: &mut BTreeMap<u16, u16>,
) {
    let mut raw = value.as_number();
    if let Some(scale) = &tag.scale {
        raw = scale.to_raw(raw);
    }
    let units = codec::encode(
        &Value::Float64(raw),
        tag.kind,
        tag.byte_order,
        tag.word_order,
        codec_options,
    );
    for (i, unit) in units.iter().enumerate() {
        registers.insert(tag.address.saturating_add(i as u16), *unit);
    }
}

fn emit_coil_frames(
    device: &DeviceId,
    coils: &BTreeMap<u16, bool>,
    mode: WriteMode,
    limits: &WriteLimits,
    frames: &mut Vec<WriteFrame>,
) {
    match mode {
        WriteMode::Single => {
            for (&address, &bit) in coils {
                frames.push(WriteFrame {
                    device: device.clone(),
                    op: WriteOp::WriteSingleCoil,
                    start: address,
                    values: FrameValues::Coils(vec![bit]),
                });
            }
        }
        WriteMode::Multiple => {
            let limit = limits.max_coils_per_frame.max(1) as usize;
            for (start, run) in contiguous_runs(coils, limit) {
                let op = if run.len() == 1 {
                    WriteOp::WriteSingleCoil
                } else {
                    WriteOp::WriteMultipleCoils
                };
                frames.push(WriteFrame {
                    device: device.clone(),
                    op,
                    start,
                    values: FrameValues::Coils(run),
                });
            }
        }
    }
}

fn emit_register_frames(
    device: &DeviceId,
    registers: &BTreeMap<u16, u16>,
    mode: WriteMode,
    limits: &WriteLimits,
    frames: &mut Vec<WriteFrame>,
) {
    match mode {
        WriteMode::Single => {
            for (&address, &unit) in registers {
                frames.push(WriteFrame {
                    device: device.clone(),
                    op: WriteOp::WriteSingleRegister,
                    start: address,
                    values: FrameValues::Registers(vec![unit]),
                });
            }
        }
        WriteMode::Multiple => {
            let limit = limits.max_registers_per_frame.max(1) as usize;
            for (start, run) in contiguous_runs(registers, limit) {
                frames.push(WriteFrame {
                    device: device.clone(),
                    op: WriteOp::WriteMultipleRegisters,
                    start,
                    values: FrameValues::Registers(run),
                });
            }
        }
    }
}

/// Splits an address-keyed map into contiguous runs of at most `limit` values.
fn contiguous_runs<T: Copy>(map: &BTreeMap<u16, T>, limit: usize) -> Vec<(u16, Vec<T>)> {
    let mut runs = Vec::new();
    let mut start: u16 = 0;
    let mut run: Vec<T> = Vec::new();

    for (&address, &value) in map {
        let contiguous = !run.is_empty() && address == start.wrapping_add(run.len() as u16);
        if contiguous && run.len() < limit {
            run.push(value);
        } else {
            if !run.is_empty() {
                runs.push((start, std::mem::take(&mut run)));
            }
            start = address;
            run.push(value);
        }
    }
    if !run.is_empty() {
        runs.push((start, run));
    }
    runs
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use regmap_core::kind::AccessClass;
    use regmap_core::scale::LinearScale;

    fn dict(tags: Vec<TagDefinition>) -> TagDictionary {
        TagDictionary::from_tags(tags).unwrap()
    }

    fn build(
        commands: &[WriteCommand],
        dict: &TagDictionary,
        caps: &WriteCaps,
    ) -> Vec<WriteFrame> {
        build_write_frames(
            &DeviceId::new("dev"),
            commands,
            dict,
            caps,
            &WriteLimits::default(),
            &CodecOptions::default(),
        )
    }

    #[test]
    fn test_contiguous_registers_merge_into_one_frame() {
        let dict = dict(vec![
            TagDefinition::new("A", DataKind::UInt16, 100),
            TagDefinition::new("B", DataKind::UInt16, 101),
            TagDefinition::new("C", DataKind::Int32, 102),
        ]);
        let commands = [
            WriteCommand::new("A", 1.0),
            WriteCommand::new("B", 2.0),
            WriteCommand::new("C", -3.0),
        ];
        let frames = build(&commands, &dict, &WriteCaps::default());

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].op, WriteOp::WriteMultipleRegisters);
        assert_eq!(frames[0].start, 100);
        assert_eq!(
            frames[0].values,
            FrameValues::Registers(vec![1, 2, 0xFFFF, 0xFFFD])
        );
    }

    #[test]
    fn test_single_mode_explodes_multi_unit_values() {
        let dict = dict(vec![TagDefinition::new("F", DataKind::Float32, 50)]);
        let caps = WriteCaps {
            holding: WriteMode::Single,
            coil: WriteMode::Single,
        };
        let frames = build(&[WriteCommand::new("F", 1.5)], &dict, &caps);

        // 1.5f32 = 0x3FC00000, split across two single-register frames.
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].op, WriteOp::WriteSingleRegister);
        assert_eq!(frames[0].start, 50);
        assert_eq!(frames[0].values, FrameValues::Registers(vec![0x3FC0]));
        assert_eq!(frames[1].start, 51);
        assert_eq!(frames[1].values, FrameValues::Registers(vec![0x0000]));
    }

    #[test]
    fn test_lone_coil_uses_single_op_even_in_multiple_mode() {
        let dict = dict(vec![TagDefinition::new("RUN", DataKind::Bool, 10)]);
        let frames = build(&[WriteCommand::new("RUN", true)], &dict, &WriteCaps::default());

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].op, WriteOp::WriteSingleCoil);
        assert_eq!(frames[0].values, FrameValues::Coils(vec![true]));
    }

    #[test]
    fn test_coil_run_merges_and_coerces_numbers() {
        let dict = dict(vec![
            TagDefinition::new("C0", DataKind::Bool, 10),
            TagDefinition::new("C1", DataKind::Bool, 11),
            TagDefinition::new("C2", DataKind::Bool, 12),
        ]);
        let commands = [
            WriteCommand::new("C0", true),
            WriteCommand::new("C1", 0.0),
            WriteCommand::new("C2", 7.0), // nonzero coerces to true
        ];
        let frames = build(&commands, &dict, &WriteCaps::default());

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].op, WriteOp::WriteMultipleCoils);
        assert_eq!(frames[0].start, 10);
        assert_eq!(
            frames[0].values,
            FrameValues::Coils(vec![true, false, true])
        );
    }

    #[test]
    fn test_noncontiguous_addresses_split_frames() {
        let dict = dict(vec![
            TagDefinition::new("A", DataKind::UInt16, 100),
            TagDefinition::new("B", DataKind::UInt16, 105),
        ]);
        let commands = [WriteCommand::new("A", 1.0), WriteCommand::new("B", 2.0)];
        let frames = build(&commands, &dict, &WriteCaps::default());

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].start, 100);
        assert_eq!(frames[1].start, 105);
        // Register runs of one still use the multi-register op.
        assert_eq!(frames[1].op, WriteOp::WriteMultipleRegisters);
    }

    #[test]
    fn test_inverse_scale_applies_before_encode() {
        let mut tag = TagDefinition::new("SOC", DataKind::UInt16, 1);
        tag.scale = Some(LinearScale::new(0.0, 1000.0, 0.0, 100.0, false));
        let dict = dict(vec![tag]);

        let frames = build(&[WriteCommand::new("SOC", 50.0)], &dict, &WriteCaps::default());
        assert_eq!(frames[0].values, FrameValues::Registers(vec![500]));
    }

    #[test]
    fn test_unwritable_commands_are_skipped() {
        let mut read_only = TagDefinition::new("RO", DataKind::UInt16, 1);
        read_only.access = AccessClass::ReadOnly;
        let dict = dict(vec![
            read_only,
            TagDefinition::new("NAME", DataKind::FixedString(4), 10),
            TagDefinition::new("OK", DataKind::UInt16, 20),
        ]);
        let commands = [
            WriteCommand::new("RO", 1.0),
            WriteCommand::new("NAME", 1.0),
            WriteCommand::new("MISSING", 1.0),
            WriteCommand::new("OK", 9.0),
        ];
        let frames = build(&commands, &dict, &WriteCaps::default());

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].start, 20);
        assert_eq!(frames[0].values, FrameValues::Registers(vec![9]));
    }

    #[test]
    fn test_frame_limit_splits_long_runs() {
        let tags: Vec<TagDefinition> = (1..=5u16)
            .map(|a| TagDefinition::new(format!("R{}", a), DataKind::UInt16, a))
            .collect();
        let dict = dict(tags);
        let commands: Vec<WriteCommand> = (1..=5u16)
            .map(|a| WriteCommand::new(format!("R{}", a), a as f64))
            .collect();

        let limits = WriteLimits {
            max_registers_per_frame: 2,
            max_coils_per_frame: 2,
        };
        let frames = build_write_frames(
            &DeviceId::new("dev"),
            &commands,
            &dict,
            &WriteCaps::default(),
            &limits,
            &CodecOptions::default(),
        );

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].values, FrameValues::Registers(vec![1, 2]));
        assert_eq!(frames[1].start, 3);
        assert_eq!(frames[2].values, FrameValues::Registers(vec![5]));
    }

    #[test]
    fn test_last_command_wins_per_address() {
        let dict = dict(vec![TagDefinition::new("A", DataKind::UInt16, 1)]);
        let commands = [WriteCommand::new("A", 1.0), WriteCommand::new("A", 2.0)];
        let frames = build(&commands, &dict, &WriteCaps::default());

        assert_eq!(frames[0].values, FrameValues::Registers(vec![2]));
    }
}
