// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Pre-built tag sets, plans, and reply builders for consistent and
//! reproducible testing.
//!
//! ## Design Principles
//!
//! - Fixtures are immutable and thread-safe
//! - Each fixture represents a realistic scenario
//! - Fixtures can be composed for complex test scenarios

use regmap_core::kind::{AccessClass, ByteOrder, DataKind, WordOrder};
use regmap_core::scale::LinearScale;
use regmap_core::types::DeviceId;
use regmap_plan::compiler::{compile, CompilerLimits, PollDefaults, ReadPlan};
use regmap_plan::tag::{PollClass, TagDefinition, TagDictionary};

// =============================================================================
// Device Fixtures
// =============================================================================

/// Fixture providing standard device identities.
pub struct DeviceFixtures;

impl DeviceFixtures {
    /// A standard power conversion system device.
    pub fn pcs() -> DeviceId {
        DeviceId::new("pcs-001")
    }

    /// A standard battery management system device.
    pub fn bms() -> DeviceId {
        DeviceId::new("bms-001")
    }
}

// =============================================================================
// Tag Fixtures
// =============================================================================

/// Fixture providing tag definitions across every data kind family.
pub struct TagFixtures;

impl TagFixtures {
    /// A bare unsigned 16-bit holding register tag.
    pub fn uint16(id: &str, address: u16) -> TagDefinition {
        TagDefinition::new(id, DataKind::UInt16, address)
    }

    /// A signed 16-bit holding register tag.
    pub fn int16(id: &str, address: u16) -> TagDefinition {
        TagDefinition::new(id, DataKind::Int16, address)
    }

    /// A read-only (input register) tag of the given kind.
    pub fn input(id: &str, kind: DataKind, address: u16) -> TagDefinition {
        let mut tag = TagDefinition::new(id, kind, address);
        tag.access = AccessClass::ReadOnly;
        tag
    }

    /// A coil tag.
    pub fn coil(id: &str, address: u16) -> TagDefinition {
        TagDefinition::new(id, DataKind::Bool, address)
    }

    /// A float32 tag with an explicit wire order.
    pub fn float32(
        id: &str,
        address: u16,
        byte_order: ByteOrder,
        word_order: WordOrder,
    ) -> TagDefinition {
        let mut tag = TagDefinition::new(id, DataKind::Float32, address);
        tag.byte_order = byte_order;
        tag.word_order = word_order;
        tag
    }

    /// A percent tag: 0..1000 raw counts map to 0..100 with clamping.
    pub fn scaled_percent(id: &str, address: u16) -> TagDefinition {
        let mut tag = TagDefinition::new(id, DataKind::UInt16, address);
        tag.scale = Some(LinearScale::new(0.0, 1000.0, 0.0, 100.0, true));
        tag
    }

    /// A fast-polled tag.
    pub fn fast(id: &str, address: u16) -> TagDefinition {
        let mut tag = TagDefinition::new(id, DataKind::UInt16, address);
        tag.poll = Some(PollClass::Fast);
        tag
    }

    /// A realistic mixed tag set covering all three function classes.
    pub fn mixed_set() -> Vec<TagDefinition> {
        vec![
            Self::coil("RUN", 1),
            Self::coil("FAULT", 2),
            Self::input("FREQ", DataKind::UInt16, 10),
            Self::input("TEMP", DataKind::Int16, 11),
            Self::uint16("SETPOINT", 100),
            Self::scaled_percent("SOC", 101),
            Self::float32("POWER", 103, ByteOrder::BigEndian, WordOrder::Abcd),
        ]
    }
}

// =============================================================================
// Plan Fixtures
// =============================================================================

/// Fixture providing compiled plans and dictionaries.
pub struct PlanFixtures;

impl PlanFixtures {
    /// Compiles a plan with default limits and poll periods.
    pub fn plan(device: DeviceId, tags: Vec<TagDefinition>) -> ReadPlan {
        compile(
            device,
            &tags,
            &CompilerLimits::default(),
            &PollDefaults::default(),
        )
        .expect("fixture tags compile")
    }

    /// Builds a dictionary over the same tags the plan was compiled from.
    pub fn dictionary(tags: Vec<TagDefinition>) -> TagDictionary {
        TagDictionary::from_tags(tags).expect("fixture tags are unique")
    }
}

// =============================================================================
// Reply Builders
// =============================================================================

/// Builders that pack typed values into raw unit windows.
pub struct ReplyBuilder;

impl ReplyBuilder {
    /// Packs an f32 into two units, first-unit-high.
    pub fn f32_units(value: f32) -> [u16; 2] {
        let bits = value.to_bits();
        [(bits >> 16) as u16, bits as u16]
    }

    /// Packs an f64 into four units, first-unit-high.
    pub fn f64_units(value: f64) -> [u16; 4] {
        let bits = value.to_bits();
        [
            (bits >> 48) as u16,
            (bits >> 32) as u16,
            (bits >> 16) as u16,
            bits as u16,
        ]
    }

    /// Packs a u32 into two units, first-unit-high.
    pub fn u32_units(value: u32) -> [u16; 2] {
        [(value >> 16) as u16, value as u16]
    }

    /// Packs an i32 into two units, first-unit-high.
    pub fn i32_units(value: i32) -> [u16; 2] {
        Self::u32_units(value as u32)
    }

    /// Packs an ASCII string into one unit per character.
    pub fn string_units(text: &str) -> Vec<u16> {
        text.chars().map(|c| c as u16).collect()
    }
}
