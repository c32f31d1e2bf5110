// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Batch file list panel.
//!
//! This module lists the files queued for the next detection run and lets
//! the user remove entries while no run is active.

use std::path::PathBuf;

/// Result of batch panel interaction.
pub enum BatchAction {
    None,
    RemoveFile(usize),
}

/// Display the batch list.
pub fn show(ui: &mut egui::Ui, batch: &[PathBuf], locked: bool) -> BatchAction {
    let mut action = BatchAction::None;

    ui.heading("Batch");
    ui.label(format!("{} file(s)", batch.len()));
    ui.separator();

    if batch.is_empty() {
        ui.label(
            egui::RichText::new("No files yet. Drag files onto the window\nor use File -> Add Files...")
                .weak(),
        );
        return action;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for (idx, path) in batch.iter().enumerate() {
            ui.horizontal(|ui| {
                if ui.add_enabled(!locked, egui::Button::new("✕").small()).clicked() {
                    action = BatchAction::RemoveFile(idx);
                }

                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                ui.label(name).on_hover_text(path.display().to_string());
            });
        }
    });

    action
}
