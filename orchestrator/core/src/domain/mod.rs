// Copyright (c) 2026 Watershed Contributors
// SPDX-License-Identifier: MIT

pub mod activity;
pub mod message;
pub mod validation;
pub mod plugin;
pub mod transport;
pub mod config;
