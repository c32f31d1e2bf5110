// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drag-and-drop overlay.
//!
//! This module paints a full-window hint while the user is hovering files
//! over the window. The actual drop handling lives in the app, which reads
//! the dropped paths from the frame input.

/// Paint the drop hint overlay when files are being hovered.
pub fn show(ctx: &egui::Context) {
    let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());
    if !hovering {
        return;
    }

    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("dropzone_overlay"),
    ));

    let rect = ctx.screen_rect();
    painter.rect_filled(rect, 0.0, egui::Color32::from_black_alpha(160));
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "Drop image or video files here",
        egui::FontId::proportional(24.0),
        egui::Color32::WHITE,
    );
}
