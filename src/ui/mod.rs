// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the Spotter application.

pub mod batch_panel;
pub mod dropzone;
pub mod preview;
pub mod toolbar;
