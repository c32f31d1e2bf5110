// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It owns the batch, the detection session, and the
//! worker event channel, and coordinates between the UI panels and the
//! background worker.

use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};

use crate::detect::DetectionSession;
use crate::io::serialization;
use crate::ui::{batch_panel, dropzone, preview, toolbar};
use crate::worker::{self, RunState, RunSummary, WorkerEvent};

/// Main application state.
pub struct SpotterApp {
    /// Files queued for the next run, in selection order
    batch: Vec<PathBuf>,

    /// Detector session, loaded lazily on the first run and reused after
    session: Option<Arc<Mutex<DetectionSession>>>,

    /// Event channel of the active worker, if a run is in flight
    events: Option<Receiver<WorkerEvent>>,

    /// Lifecycle of the current/most recent run
    run_state: RunState,

    /// Texture of the most recently annotated frame
    preview_texture: Option<egui::TextureHandle>,

    /// Dimensions of the previewed frame
    preview_size: Option<(u32, u32)>,

    /// Source file of the previewed frame
    current_source: Option<PathBuf>,

    /// Frames processed so far in the current run
    frames_processed: usize,

    /// Outcome of the last completed run
    last_summary: Option<RunSummary>,

    /// Last error worth surfacing in the status strip
    last_error: Option<String>,
}

impl Default for SpotterApp {
    fn default() -> Self {
        Self::new()
    }
}

impl SpotterApp {
    /// Create a new Spotter application instance.
    pub fn new() -> Self {
        Self {
            batch: Vec::new(),
            session: None,
            events: None,
            run_state: RunState::Idle,
            preview_texture: None,
            preview_size: None,
            current_source: None,
            frames_processed: 0,
            last_summary: None,
            last_error: None,
        }
    }

    /// Append existing files to the batch. The batch is only mutable while
    /// no run is active.
    fn add_files(&mut self, files: impl IntoIterator<Item = PathBuf>) {
        if self.run_state == RunState::Running {
            log::warn!("Ignoring new files while a run is active");
            return;
        }

        for path in files {
            if path.is_file() {
                log::info!("Added {} to batch", path.display());
                self.batch.push(path);
            } else {
                log::debug!("Ignoring non-file path {}", path.display());
            }
        }
    }

    /// Add every file directly inside `dir` to the batch.
    fn add_directory(&mut self, dir: PathBuf) {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::error!("Failed to read directory {}: {}", dir.display(), e);
                return;
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        self.add_files(files);
    }

    /// Start a detection run over the current batch.
    ///
    /// Rejected while a run is already active or while the batch is empty;
    /// the batch is fixed once the worker starts.
    fn start_detection(&mut self) {
        if self.run_state == RunState::Running {
            log::warn!("Run request rejected: a run is already active");
            return;
        }
        if self.batch.is_empty() {
            log::warn!("Run request rejected: the batch is empty");
            return;
        }

        // Load the detector once; later runs reuse the same session.
        let session = match &self.session {
            Some(session) => session.clone(),
            None => match DetectionSession::load() {
                Ok(session) => {
                    let session = Arc::new(Mutex::new(session));
                    self.session = Some(session.clone());
                    session
                }
                Err(e) => {
                    log::error!("Failed to load detector: {:#}", e);
                    self.last_error = Some(format!("Failed to load detector: {}", e));
                    return;
                }
            },
        };

        log::info!("Starting detection run over {} file(s)", self.batch.len());
        self.events = Some(worker::spawn(
            session,
            self.batch.clone(),
            PathBuf::from(serialization::ANNOTATIONS_FILE),
        ));
        self.run_state = RunState::Running;
        self.frames_processed = 0;
        self.last_summary = None;
        self.last_error = None;
    }

    /// Re-export the last run's records to a user-chosen path.
    fn export_annotations(&mut self, path: PathBuf) {
        let records =
            match serialization::import_json(std::path::Path::new(serialization::ANNOTATIONS_FILE))
            {
                Ok(records) => records,
                Err(e) => {
                    log::error!("No annotations to export: {}", e);
                    self.last_error = Some("No annotations to export yet".to_string());
                    return;
                }
            };

        let extension = path.extension().and_then(|s| s.to_str());
        let result = match extension {
            Some("yaml") | Some("yml") => serialization::export_yaml(&records, &path),
            Some("json") => serialization::export_json(&records, &path),
            _ => {
                log::error!("Unsupported file extension: {:?}", extension);
                return;
            }
        };

        match result {
            Ok(_) => log::info!("Exported annotations to {}", path.display()),
            Err(e) => log::error!("Failed to export annotations: {}", e),
        }
    }

    /// Drain pending worker events, uploading annotated frames as textures.
    fn handle_worker_events(&mut self, ctx: &egui::Context) {
        let Some(receiver) = &self.events else {
            return;
        };

        let mut completed = false;
        while let Ok(event) = receiver.try_recv() {
            match event {
                WorkerEvent::FrameAnnotated {
                    source,
                    frame,
                    detections,
                } => {
                    let size = [frame.width as usize, frame.height as usize];
                    let color_image = egui::ColorImage::from_rgb(size, &frame.pixels);
                    let texture =
                        ctx.load_texture("annotated_frame", color_image, egui::TextureOptions::LINEAR);

                    self.preview_texture = Some(texture);
                    self.preview_size = Some((frame.width, frame.height));
                    self.current_source = Some(source);
                    self.frames_processed += 1;
                    log::debug!(
                        "Frame {} annotated with {} detection(s)",
                        self.frames_processed,
                        detections.len()
                    );
                }
                WorkerEvent::Completed(result) => {
                    completed = true;
                    match result {
                        Ok(summary) => {
                            log::info!(
                                "Run completed with {} record(s)",
                                summary.record_count
                            );
                            self.last_summary = Some(summary);
                        }
                        Err(e) => {
                            log::error!("Run failed: {}", e);
                            self.last_error = Some(e);
                        }
                    }
                }
            }
        }

        if completed {
            self.events = None;
            self.run_state = RunState::Completed;
        }
    }

    /// Status line for the preview strip.
    fn status_text(&self) -> String {
        if let Some(error) = &self.last_error {
            return error.clone();
        }
        match self.run_state {
            RunState::Idle => format!("{} file(s) queued", self.batch.len()),
            RunState::Running => {
                let source = self
                    .current_source
                    .as_ref()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!("{} frame(s) processed ({})", self.frames_processed, source)
            }
            RunState::Completed => match &self.last_summary {
                Some(summary) => format!(
                    "Wrote {} record(s) to {}",
                    summary.record_count,
                    summary.output_path.display()
                ),
                None => "Run complete".to_string(),
            },
        }
    }
}

impl eframe::App for SpotterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_worker_events(ctx);

        // Collect files dropped onto the window.
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if !dropped.is_empty() {
            self.add_files(dropped);
        }

        // Keep draining events while a run is active.
        if self.run_state == RunState::Running {
            ctx.request_repaint();
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Add Files...").clicked() {
                        if let Some(paths) = rfd::FileDialog::new()
                            .add_filter(
                                "Media",
                                &["png", "jpg", "jpeg", "mp4", "avi", "mov"],
                            )
                            .pick_files()
                        {
                            self.add_files(paths);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Add Directory...").clicked() {
                        if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                            self.add_directory(dir);
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    ui.menu_button("Export Annotations", |ui| {
                        if ui.button("Export as JSON...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("JSON", &["json"])
                                .set_file_name("annotations.json")
                                .save_file()
                            {
                                self.export_annotations(path);
                            }
                            ui.close_menu();
                        }
                        if ui.button("Export as YAML...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("YAML", &["yaml", "yml"])
                                .set_file_name("annotations.yaml")
                                .save_file()
                            {
                                self.export_annotations(path);
                            }
                            ui.close_menu();
                        }
                    });
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, self.run_state, self.batch.len()))
            .inner;

        match toolbar_action {
            toolbar::ToolbarAction::StartRun => self.start_detection(),
            toolbar::ToolbarAction::ClearBatch => {
                if self.run_state != RunState::Running {
                    self.batch.clear();
                    log::info!("Batch cleared");
                }
            }
            toolbar::ToolbarAction::None => {}
        }

        // Batch list (right side)
        let batch_action = egui::SidePanel::right("batch")
            .default_width(250.0)
            .show(ctx, |ui| {
                batch_panel::show(ui, &self.batch, self.run_state == RunState::Running)
            })
            .inner;

        match batch_action {
            batch_panel::BatchAction::RemoveFile(idx) => {
                if self.run_state != RunState::Running && idx < self.batch.len() {
                    let removed = self.batch.remove(idx);
                    log::info!("Removed {} from batch", removed.display());
                }
            }
            batch_panel::BatchAction::None => {}
        }

        // Preview (center)
        let status = self.status_text();
        egui::CentralPanel::default().show(ctx, |ui| {
            preview::show(
                ui,
                &self.preview_texture,
                self.preview_size,
                self.run_state,
                &status,
            );
        });

        // Drop hint overlay on top of everything
        dropzone::show(ctx);
    }
}
