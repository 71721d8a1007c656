// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Unified error hierarchy for regmap.
//!
//! Two things can actually fail in this core, and both indicate caller-side
//! problems rather than device or environment failures:
//!
//! - **ConfigError**: plan construction rejected the tag set or limits.
//!   Fatal to compilation, surfaced immediately, never retried internally.
//! - **DecodeError**: a decode call referenced a block the plan does not
//!   contain. Malformed reply *data* is never an error; it degrades into
//!   per-block diagnostics instead.
//!
//! # Examples
//!
//! ```
//! use regmap_core::error::{ConfigError, RegmapError};
//!
//! let error = ConfigError::EmptyTagSet;
//! let root: RegmapError = error.into();
//! assert_eq!(root.error_type(), "config");
//! ```

use thiserror::Error;

// =============================================================================
// RegmapError - Root Error Type
// =============================================================================

/// The root error type for regmap.
#[derive(Debug, Error)]
pub enum RegmapError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Decode error.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl RegmapError {
    /// Returns the error type as a string for logging/metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            RegmapError::Config(_) => "config",
            RegmapError::Decode(_) => "decode",
        }
    }
}

// =============================================================================
// ConfigError
// =============================================================================

/// Errors raised while validating tags or compiling a read plan.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// The tag collection is empty.
    #[error("Tag set is empty")]
    EmptyTagSet,

    /// Device identity field is missing or invalid.
    #[error("Invalid device identity ({field}): {message}")]
    InvalidDevice {
        /// The offending field.
        field: String,
        /// Error message.
        message: String,
    },

    /// Two tags share an ID.
    #[error("Duplicate tag ID: {tag_id}")]
    DuplicateTag {
        /// The duplicated tag ID.
        tag_id: String,
    },

    /// A tag's scale bounds are malformed.
    #[error("Invalid scale for tag '{tag_id}': {message}")]
    InvalidScale {
        /// The tag with the bad scale.
        tag_id: String,
        /// Error message.
        message: String,
    },

    /// A single tag is wider than any block is allowed to be.
    #[error("Tag '{tag_id}' is {length} units long but blocks are limited to {max_quantity}")]
    TagTooLong {
        /// The oversized tag.
        tag_id: String,
        /// The tag's resolved unit length.
        length: u16,
        /// The configured per-block quantity limit.
        max_quantity: u16,
    },

    /// Generic field validation failure.
    #[error("Validation failed for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },
}

impl ConfigError {
    /// Creates an invalid device identity error.
    pub fn invalid_device(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDevice {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a duplicate tag error.
    pub fn duplicate_tag(tag_id: impl Into<String>) -> Self {
        Self::DuplicateTag {
            tag_id: tag_id.into(),
        }
    }

    /// Creates an invalid scale error.
    pub fn invalid_scale(tag_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidScale {
            tag_id: tag_id.into(),
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the error type for logging/metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            ConfigError::EmptyTagSet => "empty_tag_set",
            ConfigError::InvalidDevice { .. } => "invalid_device",
            ConfigError::DuplicateTag { .. } => "duplicate_tag",
            ConfigError::InvalidScale { .. } => "invalid_scale",
            ConfigError::TagTooLong { .. } => "tag_too_long",
            ConfigError::Validation { .. } => "validation",
        }
    }
}

// =============================================================================
// DecodeError
// =============================================================================

/// Errors raised by the block decoder.
///
/// The only decode-time error is a missing block reference, which indicates
/// caller misuse. Short or malformed reply data never errors; it produces
/// diagnostics alongside whatever samples survive.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The referenced block index does not exist in the plan.
    #[error("Unknown block index {index} (plan has {block_count} blocks)")]
    UnknownBlock {
        /// The out-of-range index.
        index: usize,
        /// Number of blocks in the plan.
        block_count: usize,
    },
}

impl DecodeError {
    /// Creates an unknown block error.
    pub fn unknown_block(index: usize, block_count: usize) -> Self {
        Self::UnknownBlock { index, block_count }
    }

    /// Returns the error type for logging/metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            DecodeError::UnknownBlock { .. } => "unknown_block",
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// A Result type with RegmapError.
pub type RegmapResult<T> = Result<T, RegmapError>;

/// A Result type with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// A Result type with DecodeError.
pub type DecodeResult<T> = Result<T, DecodeError>;

// =============================================================================
// Tests
// =============================================================================
