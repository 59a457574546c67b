// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stepline contributors

//! Utility modules
//!
//! Common utilities for the stepline CLI.

pub mod colors;

pub use colors::*;
