// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Detector boundary and session management.
//!
//! The detector is an opaque collaborator: given a decoded frame it returns
//! the objects it found. Concrete backends are feature-gated; the rest of
//! the application only depends on the [`Detector`] trait.

#[cfg(feature = "detector-onnx")]
pub mod onnx;

use anyhow::Result;
use image::RgbImage;

use crate::models::annotation::LabelTable;
use crate::models::detection::Detection;

/// Fixed weights file consumed by the compiled-in backend.
pub const DEFAULT_MODEL_FILE: &str = "yolov8x.onnx";

/// Common interface for object detectors.
///
/// Implementations are synchronous and deterministic per call, and are
/// invoked once per frame for every frame of every file in a run.
pub trait Detector: Send {
    /// Detect objects in a single frame.
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>>;

    /// Backend name, for logging.
    fn name(&self) -> &str;
}

/// Owns the loaded detector and the label table for the life of the
/// application. Created once, before the first run, and reused across every
/// frame of every subsequent run.
pub struct DetectionSession {
    detector: Box<dyn Detector>,
    labels: LabelTable,
}

impl DetectionSession {
    /// Wrap an already-constructed detector.
    pub fn new(detector: Box<dyn Detector>, labels: LabelTable) -> Self {
        Self { detector, labels }
    }

    /// Load the compiled-in detector backend with the default weights file.
    pub fn load() -> Result<Self> {
        #[cfg(feature = "detector-onnx")]
        {
            let detector = onnx::OnnxDetector::load(DEFAULT_MODEL_FILE)?;
            log::info!("Loaded detector backend: {}", detector.name());
            Ok(Self::new(Box::new(detector), LabelTable::new()))
        }
        #[cfg(not(feature = "detector-onnx"))]
        {
            Err(anyhow::anyhow!(
                "built without a detector backend (enable the detector-onnx feature)"
            ))
        }
    }

    /// Run the detector over one frame.
    pub fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>> {
        self.detector.detect(frame)
    }

    /// Backend name, for logging and status display.
    pub fn detector_name(&self) -> &str {
        self.detector.name()
    }

    /// The class-id-to-label table used when recording annotations.
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }
}
