// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation records and their accumulation.
//!
//! This module defines the flat record format persisted at the end of a
//! detection run, the injectable class-id-to-label table, and the recorder
//! that flattens each frame's detections into records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::detection::Detection;

/// The persisted, flattened representation of a detection plus its source
/// filename. Field names match the output file keys exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Base name of the source file (no directory component).
    pub filename: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Human-readable class label. Empty unless a label table supplies one.
    pub class: String,
}

/// Optional mapping from model class indices to human-readable labels.
///
/// Empty by default: class ids are recorded as empty strings, which is what
/// downstream consumers of the output file already expect.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    labels: HashMap<u32, String>,
}

impl LabelTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(class id, label)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u32, String)>) -> Self {
        Self {
            labels: pairs.into_iter().collect(),
        }
    }

    /// Look up the label for a class id, or the empty string.
    pub fn label_for(&self, class_id: u32) -> &str {
        self.labels.get(&class_id).map(String::as_str).unwrap_or("")
    }
}

/// Accumulates annotation records across one detection run.
///
/// Owned exclusively by the worker for the life of a run; records are
/// appended per frame and never removed.
#[derive(Debug, Default)]
pub struct AnnotationRecorder {
    labels: LabelTable,
    records: Vec<AnnotationRecord>,
}

impl AnnotationRecorder {
    /// Create a recorder with the given label table.
    pub fn new(labels: LabelTable) -> Self {
        Self {
            labels,
            records: Vec::new(),
        }
    }

    /// Append one record per detection, regardless of confidence score.
    /// The display threshold does not gate recording.
    pub fn record(&mut self, filename: &str, detections: &[Detection]) {
        for det in detections {
            self.records.push(AnnotationRecord {
                filename: filename.to_string(),
                x: det.bbox.x,
                y: det.bbox.y,
                width: det.bbox.width,
                height: det.bbox.height,
                class: self.labels.label_for(det.class_id).to_string(),
            });
        }
    }

    /// Number of records accumulated so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume the recorder, yielding the ordered record sequence.
    pub fn into_records(self) -> Vec<AnnotationRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::detection::BoundingBox;

    #[test]
    fn test_records_every_detection_regardless_of_score() {
        let mut recorder = AnnotationRecorder::new(LabelTable::new());
        let detections = vec![
            Detection::new(BoundingBox::from_corners(10.0, 10.0, 50.0, 40.0), 0.9, 0),
            Detection::new(BoundingBox::from_corners(0.0, 0.0, 5.0, 5.0), 0.3, 1),
        ];

        recorder.record("photo.jpg", &detections);

        let records = recorder.into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].filename, "photo.jpg");
        assert_eq!(records[0].x, 10.0);
        assert_eq!(records[0].y, 10.0);
        assert_eq!(records[0].width, 40.0);
        assert_eq!(records[0].height, 30.0);
        assert_eq!(records[0].class, "");
        assert_eq!(records[1].width, 5.0);
        assert_eq!(records[1].height, 5.0);
        assert_eq!(records[1].class, "");
    }

    #[test]
    fn test_label_table_lookup() {
        let labels = LabelTable::from_pairs([(0, "person".to_string())]);
        assert_eq!(labels.label_for(0), "person");
        assert_eq!(labels.label_for(7), "");

        let mut recorder = AnnotationRecorder::new(labels);
        let detections = vec![
            Detection::new(BoundingBox::new(1.0, 2.0, 3.0, 4.0), 0.8, 0),
            Detection::new(BoundingBox::new(5.0, 6.0, 7.0, 8.0), 0.8, 7),
        ];
        recorder.record("a.png", &detections);

        let records = recorder.into_records();
        assert_eq!(records[0].class, "person");
        assert_eq!(records[1].class, "");
    }

    #[test]
    fn test_records_accumulate_across_frames() {
        let mut recorder = AnnotationRecorder::new(LabelTable::new());
        let det = Detection::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0), 0.5, 0);

        recorder.record("clip.mp4", &[det]);
        recorder.record("clip.mp4", &[det, det]);

        assert_eq!(recorder.len(), 3);
        let records = recorder.into_records();
        assert!(records.iter().all(|r| r.filename == "clip.mp4"));
    }
}
