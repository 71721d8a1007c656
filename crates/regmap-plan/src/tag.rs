// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Tag definitions and the tag dictionary.
//!
//! A [`TagDefinition`] describes one named point on a device: where it lives
//! in the register space, how wide it is, how its bytes are ordered on the
//! wire, and how raw counts map to engineering units. The read-plan compiler
//! consumes a flat list of definitions; the write batcher looks tags up by
//! name through a [`TagDictionary`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use regmap_core::error::{ConfigError, ConfigResult};
use regmap_core::kind::{AccessClass, ByteOrder, DataKind, FunctionClass, WordOrder};
use regmap_core::scale::LinearScale;
use regmap_core::types::TagId;

use crate::compiler::PollDefaults;

// =============================================================================
// PollClass
// =============================================================================

/// Named polling rate class.
///
/// A tag may name a class instead of an explicit period; the class resolves
/// against [`PollDefaults`] at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollClass {
    /// High-rate polling.
    Fast,
    /// Default polling rate.
    Normal,
    /// Background polling.
    Slow,
}

impl PollClass {
    /// Resolves the class to a concrete period in milliseconds.
    pub fn period_ms(&self, defaults: &PollDefaults) -> u64 {
        match self {
            PollClass::Fast => defaults.fast_ms,
            PollClass::Normal => defaults.normal_ms,
            PollClass::Slow => defaults.slow_ms,
        }
    }
}

// =============================================================================
// TagDefinition
// =============================================================================

/// One named register-space point on a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagDefinition {
    /// Tag identifier, unique within a device.
    pub id: TagId,
    /// Data kind stored at the address.
    pub kind: DataKind,
    /// Access class, decides the function class together with the kind.
    #[serde(default)]
    pub access: AccessClass,
    /// 1-based register or coil address.
    pub address: u16,
    /// Optional length override in units. Values below 1 are ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u16>,
    /// Byte order within each 16-bit unit.
    #[serde(default)]
    pub byte_order: ByteOrder,
    /// Unit order for multi-unit values.
    #[serde(default)]
    pub word_order: WordOrder,
    /// Optional linear raw-to-engineering scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<LinearScale>,
    /// Named polling rate class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll: Option<PollClass>,
    /// Explicit polling period in milliseconds. Wins over `poll`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_ms: Option<u64>,
    /// Marks the tag as alarm-relevant; carried through to samples.
    #[serde(default)]
    pub alarm: bool,
    /// Marks the tag as a supporting point; carried through to samples.
    #[serde(default)]
    pub supporting: bool,
}

impl TagDefinition {
    /// Creates a minimal read-write tag with default wire orders.
    pub fn new(id: impl Into<TagId>, kind: DataKind, address: u16) -> Self {
        Self {
            id: id.into(),
            kind,
            access: AccessClass::default(),
            address,
            length: None,
            byte_order: ByteOrder::default(),
            word_order: WordOrder::default(),
            scale: None,
            poll: None,
            poll_ms: None,
            alarm: false,
            supporting: false,
        }
    }

    /// Returns the tag's footprint in 16-bit units (or coils).
    ///
    /// An explicit length override of at least 1 wins; otherwise the data
    /// kind's natural width applies.
    pub fn resolved_length(&self) -> u16 {
        match self.length {
            Some(length) if length >= 1 => length,
            _ => self.kind.unit_width(),
        }
    }

    /// Returns the function class derived from kind and access.
    pub fn function_class(&self) -> FunctionClass {
        FunctionClass::derive(self.kind, self.access)
    }

    /// Resolves the tag's polling period, if it declares one.
    ///
    /// An explicit `poll_ms` wins over the named class.
    pub fn resolved_period(&self, defaults: &PollDefaults) -> Option<u64> {
        self.poll_ms
            .or_else(|| self.poll.map(|class| class.period_ms(defaults)))
    }

    /// Validates the definition.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.id.as_str().is_empty() {
            return Err(ConfigError::validation("id", "tag ID must not be empty"));
        }
        if self.address == 0 {
            return Err(ConfigError::validation(
                "address",
                format!("tag '{}' has address 0; addresses are 1-based", self.id),
            ));
        }
        if let DataKind::FixedString(0) = self.kind {
            return Err(ConfigError::validation(
                "kind",
                format!("tag '{}' declares a zero-length string", self.id),
            ));
        }
        if let Some(scale) = &self.scale {
            scale.validate(self.id.as_str())?;
        }
        Ok(())
    }
}

// =============================================================================
// TagDictionary
// =============================================================================

/// Name-indexed tag lookup for the write path.
#[derive(Debug, Clone, Default)]
pub struct TagDictionary {
    tags: HashMap<TagId, TagDefinition>,
}

impl TagDictionary {
    /// Builds a dictionary from a tag list, validating each definition.
    ///
    /// Duplicate IDs are rejected with [`ConfigError::DuplicateTag`].
    pub fn from_tags(tags: impl IntoIterator<Item = TagDefinition>) -> ConfigResult<Self> {
        let mut map = HashMap::new();
        for tag in tags {
            tag.validate()?;
            if map.contains_key(&tag.id) {
                return Err(ConfigError::duplicate_tag(tag.id.as_str()));
            }
            map.insert(tag.id.clone(), tag);
        }
        Ok(Self { tags: map })
    }

    /// Looks a tag up by ID.
    pub fn get(&self, id: &TagId) -> Option<&TagDefinition> {
        self.tags.get(id)
    }

    /// Returns the number of tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns true if the dictionary holds no tags.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterates over all definitions in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &TagDefinition> {
        self.tags.values()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_length() {
        let mut tag = TagDefinition::new("T", DataKind::Int32, 100);
        assert_eq!(tag.resolved_length(), 2);

        tag.length = Some(6);
        assert_eq!(tag.resolved_length(), 6);

        // Zero override falls back to the kind's width.
        tag.length = Some(0);
        assert_eq!(tag.resolved_length(), 2);

        let tag = TagDefinition::new("S", DataKind::FixedString(10), 200);
        assert_eq!(tag.resolved_length(), 10);
    }

    #[test]
    fn test_function_class() {
        let tag = TagDefinition::new("C", DataKind::Bool, 1);
        assert_eq!(tag.function_class(), FunctionClass::Coil);

        let mut tag = TagDefinition::new("H", DataKind::UInt16, 1);
        assert_eq!(tag.function_class(), FunctionClass::HoldingRegister);

        tag.access = AccessClass::ReadOnly;
        assert_eq!(tag.function_class(), FunctionClass::InputRegister);
    }

    #[test]
    fn test_resolved_period_precedence() {
        let defaults = PollDefaults::default();

        let mut tag = TagDefinition::new("P", DataKind::UInt16, 1);
        assert_eq!(tag.resolved_period(&defaults), None);

        tag.poll = Some(PollClass::Slow);
        assert_eq!(tag.resolved_period(&defaults), Some(5000));

        tag.poll_ms = Some(333);
        assert_eq!(tag.resolved_period(&defaults), Some(333));
    }

    #[test]
    fn test_validate_rejects_bad_definitions() {
        let tag = TagDefinition::new("", DataKind::UInt16, 1);
        assert!(tag.validate().is_err());

        let tag = TagDefinition::new("Z", DataKind::UInt16, 0);
        assert!(tag.validate().is_err());

        let tag = TagDefinition::new("S0", DataKind::FixedString(0), 1);
        assert!(tag.validate().is_err());

        let mut tag = TagDefinition::new("BAD_SCALE", DataKind::UInt16, 1);
        tag.scale = Some(LinearScale::new(0.0, f64::NAN, 0.0, 100.0, false));
        assert!(tag.validate().is_err());
    }

    #[test]
    fn test_dictionary_rejects_duplicates() {
        let tags = vec![
            TagDefinition::new("A", DataKind::UInt16, 1),
            TagDefinition::new("A", DataKind::Int16, 2),
        ];
        let error = TagDictionary::from_tags(tags).unwrap_err();
        assert_eq!(error, ConfigError::duplicate_tag("A"));
    }

    #[test]
    fn test_dictionary_lookup() {
        let dict = TagDictionary::from_tags(vec![
            TagDefinition::new("A", DataKind::UInt16, 1),
            TagDefinition::new("B", DataKind::Float32, 10),
        ])
        .unwrap();

        assert_eq!(dict.len(), 2);
        assert!(dict.get(&TagId::new("A")).is_some());
        assert!(dict.get(&TagId::new("MISSING")).is_none());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut tag = TagDefinition::new("BMS.SOC", DataKind::UInt16, 40001);
        tag.poll = Some(PollClass::Fast);
        tag.scale = Some(LinearScale::new(0.0, 1000.0, 0.0, 100.0, true));

        let json = serde_json::to_string(&tag).unwrap();
        assert!(json.contains("\"fast\""));
        let back: TagDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tag);
    }
}
