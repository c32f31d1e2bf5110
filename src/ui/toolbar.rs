// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Run control toolbar.
//!
//! This module provides the toolbar with the detection run controls and a
//! short status hint.

use crate::worker::RunState;

/// Result of toolbar interaction.
pub enum ToolbarAction {
    None,
    StartRun,
    ClearBatch,
}

/// Display the toolbar with run controls.
pub fn show(ui: &mut egui::Ui, run_state: RunState, batch_len: usize) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let running = run_state == RunState::Running;
        let can_start = batch_len > 0 && !running;

        if ui
            .add_enabled(can_start, egui::Button::new("▶ Start Detection"))
            .clicked()
        {
            action = ToolbarAction::StartRun;
        }

        if ui
            .add_enabled(batch_len > 0 && !running, egui::Button::new("Clear Batch"))
            .clicked()
        {
            action = ToolbarAction::ClearBatch;
        }

        ui.separator();

        if running {
            ui.spinner();
        }

        let hint = match run_state {
            RunState::Idle if batch_len == 0 => {
                "Drop files or use File -> Add Files... to build a batch"
            }
            RunState::Idle => "Ready to run",
            RunState::Running => "Detecting... the batch runs to completion",
            RunState::Completed => "Run complete",
        };
        ui.label(egui::RichText::new(hint).italics().weak());
    });

    action
}
