// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # regmap Integration Tests
//!
//! Shared fixtures and helpers for the regmap integration test suites.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: Pre-built tag sets, plans, and reply builders
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test -p regmap-tests
//!
//! # Run specific test suite
//! cargo test -p regmap-tests --test integration_plan
//! cargo test -p regmap-tests --test integration_pipeline
//! ```
//!
//! ## Test Categories
//!
//! ### Plan Tests (`integration_plan.rs`)
//! - Window merge and gap rules
//! - Quantity chunking at tag boundaries
//! - Determinism under input permutation
//! - Polling period resolution
//!
//! ### Pipeline Tests (`integration_pipeline.rs`)
//! - Compile, decode, and sample flow per data kind
//! - Wire-order variants and legacy 64-bit mode
//! - Engineering scaling with clamp policies
//! - Write batching and frame coalescing

pub mod common;
