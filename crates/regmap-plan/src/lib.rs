// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # regmap-plan
//!
//! Tag model, read-plan compilation, block decoding, and write batching.
//!
//! This crate turns a declarative tag list into the block reads a polling
//! loop should issue, decodes block replies back into per-tag samples, and
//! batches write commands into protocol frames:
//!
//! - **Tag**: `TagDefinition`, `TagDictionary`, polling classes
//! - **Compiler**: interval packing into `ReadPlan` blocks
//! - **Decode**: block replies into `Sample`s with diagnostics
//! - **Writer**: write commands into coalesced `WriteFrame`s
//!
//! Everything here is pure and synchronous; the transport that actually
//! moves bytes is a collaborator, not a concern of this crate.
//!
//! ## Example
//!
//! ```rust
//! use regmap_core::kind::DataKind;
//! use regmap_core::types::DeviceId;
//! use regmap_plan::compiler::{compile, CompilerLimits, PollDefaults};
//! use regmap_plan::decode::{decode_block, DecodeOptions};
//! use regmap_plan::tag::TagDefinition;
//!
//! let tags = vec![
//!     TagDefinition::new("VOLTAGE", DataKind::UInt16, 100),
//!     TagDefinition::new("CURRENT", DataKind::UInt16, 101),
//! ];
//! let plan = compile(
//!     DeviceId::new("pcs-001"),
//!     &tags,
//!     &CompilerLimits::default(),
//!     &PollDefaults::default(),
//! )?;
//! assert_eq!(plan.len(), 1);
//!
//! let (samples, diagnostics) =
//!     decode_block(&plan, 0, &[230, 12], &DecodeOptions::default())?;
//! assert_eq!(samples.len(), 2);
//! assert!(diagnostics.warnings.is_empty());
//! # Ok::<(), regmap_core::error::RegmapError>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod compiler;
pub mod decode;
pub mod tag;
pub mod writer;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use compiler::{
    compile, BlockEntry, CompilerLimits, PollDefaults, ReadBlock, ReadPlan, ReadRequest,
};
pub use decode::{decode_block, BlockDiagnostics, DecodeOptions, DecodeWarning};
pub use tag::{PollClass, TagDefinition, TagDictionary};
pub use writer::{
    build_write_frames, CommandValue, FrameValues, WriteCaps, WriteCommand, WriteFrame,
    WriteLimits, WriteMode, WriteOp,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
