// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Storage Infrastructure Module
//!
//! Concrete implementations of the DocumentStorage trait.

pub mod multipart;

pub use multipart::MultipartObjectStorage;
