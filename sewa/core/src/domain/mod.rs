// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Mod
//!
//! Domain types and ports for the application wizard.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements mod

pub mod target;
pub mod form;
pub mod fee;
pub mod document;
pub mod wizard;
pub mod submission;
pub mod events;
pub mod gateway;
pub mod storage;
pub mod client_config;
