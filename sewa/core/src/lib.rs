// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Sewa Core
//!
//! Client-side engine for the job and service application wizards: form
//! schema resolution, fee calculation, document uploads and the guarded
//! submission state machine.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain model, application services and REST adapters

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
