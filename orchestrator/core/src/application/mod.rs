// Copyright (c) 2026 Watershed Contributors
// SPDX-License-Identifier: MIT

pub mod message_factory;
pub mod dispatch;
pub mod campaign;
