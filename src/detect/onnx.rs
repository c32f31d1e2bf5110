// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! ONNX Runtime detector backend.
//!
//! Runs a YOLO-family single-output model (`[1, 4 + nc, anchors]` layout)
//! exported to ONNX. The model is loaded once and reused for every frame of
//! every run.

use anyhow::{Context, Result};
use image::{imageops, RgbImage};
use ndarray::{s, Array4};
use ort::{GraphOptimizationLevel, Session};
use std::path::Path;

use crate::models::detection::{BoundingBox, Detection};

use super::Detector;

/// Model input size (square).
const INPUT_SIZE: u32 = 640;
/// Candidate floor; proposals below this are not reported as detections.
const CONF_THRESHOLD: f32 = 0.25;
/// IoU threshold for non-maximum suppression.
const IOU_THRESHOLD: f32 = 0.45;

pub struct OnnxDetector {
    session: Session,
    name: String,
}

impl OnnxDetector {
    /// Load a YOLO ONNX model from `model_path`.
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let name = model_path
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "onnx".to_string());

        let session = Session::builder()
            .context("failed to create ONNX Runtime session builder")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("failed to set optimization level")?
            .commit_from_file(model_path)
            .context("failed to load ONNX model")?;

        Ok(Self { session, name })
    }

    /// Resize `frame` to the model input size and lay it out as NCHW floats
    /// in `[0, 1]`.
    fn preprocess(frame: &RgbImage) -> Array4<f32> {
        let resized = imageops::resize(
            frame,
            INPUT_SIZE,
            INPUT_SIZE,
            imageops::FilterType::Triangle,
        );

        let mut input = Array4::<f32>::zeros((1, 3, INPUT_SIZE as usize, INPUT_SIZE as usize));
        for (x, y, pixel) in resized.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            input[[0, 0, y, x]] = pixel.0[0] as f32 / 255.0;
            input[[0, 1, y, x]] = pixel.0[1] as f32 / 255.0;
            input[[0, 2, y, x]] = pixel.0[2] as f32 / 255.0;
        }
        input
    }
}

impl Detector for OnnxDetector {
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>> {
        let input = Self::preprocess(frame);

        let outputs = self
            .session
            .run(ort::inputs!["images" => input.view()]?)
            .context("inference failed")?;

        // Output layout: [1, 4 + nc, anchors], boxes as (cx, cy, w, h) in
        // input-size coordinates.
        let output = outputs["output0"]
            .try_extract_tensor::<f32>()
            .context("failed to extract output tensor")?;
        let preds = output.slice(s![0, .., ..]);
        let num_classes = preds.shape()[0] - 4;
        let num_anchors = preds.shape()[1];

        let scale_x = frame.width() as f32 / INPUT_SIZE as f32;
        let scale_y = frame.height() as f32 / INPUT_SIZE as f32;

        let mut candidates = Vec::new();
        for i in 0..num_anchors {
            let mut class_id = 0usize;
            let mut score = 0f32;
            for c in 0..num_classes {
                let s = preds[[4 + c, i]];
                if s > score {
                    score = s;
                    class_id = c;
                }
            }
            if score < CONF_THRESHOLD {
                continue;
            }

            let cx = preds[[0, i]] * scale_x;
            let cy = preds[[1, i]] * scale_y;
            let w = preds[[2, i]] * scale_x;
            let h = preds[[3, i]] * scale_y;

            let x1 = (cx - w / 2.0).max(0.0);
            let y1 = (cy - h / 2.0).max(0.0);
            let x2 = (cx + w / 2.0).min(frame.width() as f32);
            let y2 = (cy + h / 2.0).min(frame.height() as f32);

            candidates.push(Detection::new(
                BoundingBox::from_corners(x1, y1, x2, y2),
                score,
                class_id as u32,
            ));
        }

        Ok(nms(candidates, IOU_THRESHOLD))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Greedy NMS: sort by score descending, suppress overlapping boxes.
fn nms(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    detections.sort_unstable_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<Detection> = Vec::new();
    for det in detections {
        if kept.iter().all(|k| iou(&k.bbox, &det.bbox) <= iou_threshold) {
            kept.push(det);
        }
    }
    kept
}

fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let ix1 = a.x.max(b.x);
    let iy1 = a.y.max(b.y);
    let ix2 = (a.x + a.width).min(b.x + b.width);
    let iy2 = (a.y + a.height).min(b.y + b.height);
    let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let union = a.width * a.height + b.width * b.height - inter;
    inter / union
}
