// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotated frame preview.
//!
//! This module displays the most recently annotated frame, scaled to fit
//! the available space, with a status strip underneath.

use crate::worker::RunState;

/// Display the preview area.
pub fn show(
    ui: &mut egui::Ui,
    texture: &Option<egui::TextureHandle>,
    frame_size: Option<(u32, u32)>,
    run_state: RunState,
    status: &str,
) {
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        if let (Some(texture), Some((img_width, img_height))) = (texture, frame_size) {
            // Scale the frame to fit the available space, preserving aspect.
            let available = ui.available_size();
            let img_aspect = img_width as f32 / img_height as f32;
            let available_aspect = available.x / available.y;

            let (display_width, display_height) = if img_aspect > available_aspect {
                let width = available.x;
                (width, width / img_aspect)
            } else {
                let height = available.y;
                (height * img_aspect, height)
            };

            let x_offset = (available.x - display_width) / 2.0;
            let y_offset = (available.y - display_height) / 2.0;

            let image_rect = egui::Rect::from_min_size(
                ui.min_rect().min + egui::vec2(x_offset, y_offset),
                egui::vec2(display_width, display_height),
            );

            ui.painter().image(
                texture.id(),
                image_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        } else if run_state == RunState::Running {
            ui.centered_and_justified(|ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(20.0);
                    ui.spinner();
                    ui.add_space(10.0);
                    ui.label(
                        egui::RichText::new("Waiting for the first annotated frame...")
                            .size(16.0)
                            .color(egui::Color32::from_gray(200)),
                    );
                });
            });
        } else {
            // Welcome message when nothing has been processed yet.
            ui.centered_and_justified(|ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(20.0);
                    ui.heading(
                        egui::RichText::new("SPOTTER")
                            .size(32.0)
                            .color(egui::Color32::from_gray(200)),
                    );
                    ui.label(
                        egui::RichText::new("Batch object detection with annotation recording")
                            .size(14.0)
                            .color(egui::Color32::from_gray(150)),
                    );
                    ui.add_space(20.0);
                    ui.label(
                        egui::RichText::new("Add images or videos, then start a detection run")
                            .color(egui::Color32::from_gray(180)),
                    );
                    ui.add_space(10.0);
                    ui.label(
                        egui::RichText::new("File -> Add Files... or drag-and-drop")
                            .weak()
                            .color(egui::Color32::from_gray(130)),
                    );
                });
            });
        }
    });

    ui.separator();
    ui.horizontal(|ui| {
        ui.label(format!("State: {:?}", run_state));
        ui.separator();
        ui.label(status);
    });
}
