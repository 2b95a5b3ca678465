// Copyright (c) 2026 Watershed Contributors
// SPDX-License-Identifier: MIT
//! Watershed orchestrator core.
//!
//! Implements the activity message protocol shared by every Watershed
//! agent: typed message envelopes, structural and plugin-level
//! validation, the transfer plugin capability contract, and the
//! campaign activity lifecycle.
//!
//! # Architecture
//!
//! - **domain** — entities, value types and capability traits
//! - **application** — message factory, campaign and dispatch services
//! - **infrastructure** — concrete plugins, registry and local queue

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
