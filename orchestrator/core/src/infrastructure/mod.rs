// Copyright (c) 2026 Watershed Contributors
// SPDX-License-Identifier: MIT

pub mod plugins;
pub mod queue;
