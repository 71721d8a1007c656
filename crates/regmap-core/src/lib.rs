// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # regmap-core
//!
//! Core types and register-data primitives for the regmap polling toolkit.
//!
//! This crate provides the foundational pieces shared by every regmap
//! component:
//!
//! - **Types**: Core data types like `DeviceId`, `TagId`, `Value`, `Sample`
//! - **Kind**: Data kinds, access classes, function classes, and wire orders
//! - **Codec**: Multi-register value encoding and decoding
//! - **Scale**: Linear raw-to-engineering conversion with clamping policy
//! - **Error**: Unified error hierarchy
//!
//! ## Example
//!
//! ```rust
//! use regmap_core::codec::{decode, CodecOptions};
//! use regmap_core::kind::{ByteOrder, DataKind, WordOrder};
//! use regmap_core::types::Value;
//!
//! let units = [0x0001, 0x86A0];
//! let value = decode(
//!     &units,
//!     0,
//!     DataKind::UInt32,
//!     ByteOrder::BigEndian,
//!     WordOrder::Abcd,
//!     &CodecOptions::default(),
//! );
//! assert_eq!(value, Value::UInt32(100_000));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Core Modules
// =============================================================================

pub mod codec;
pub mod error;
pub mod kind;
pub mod scale;
pub mod types;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use error::*;
pub use kind::*;
pub use types::*;

// Re-export codec entry points
pub use codec::{decode, encode, CodecOptions};

// Re-export scaling types
pub use scale::{ClampPolicy, LinearScale};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
