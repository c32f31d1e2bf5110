// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Spotter
//!
//! A cross-platform desktop application that runs an object-detection
//! model over batches of images and videos, previews the annotated frames,
//! and records the resulting bounding boxes to a JSON file.

mod app;
mod detect;
mod io;
mod models;
mod ui;
mod util;
mod worker;

use anyhow::Result;
use app::SpotterApp;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Spotter - Batch Object Detection"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Spotter",
        options,
        Box::new(|_cc| Ok(Box::new(SpotterApp::new()))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
