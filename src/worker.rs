// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Background detection worker.
//!
//! One worker thread runs per detection run. It walks the batch in order,
//! decodes each file's frames, runs the detector, draws the display copy,
//! records annotations, and emits one `FrameAnnotated` event per frame back
//! to the UI thread. When the last frame of the last file has been
//! processed it flushes the accumulated records to disk and emits a single
//! terminal `Completed` event. There is no cancellation: once running, the
//! batch runs to completion.

use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

use image::RgbImage;

use crate::detect::DetectionSession;
use crate::io::{media, serialization};
use crate::models::annotation::AnnotationRecorder;
use crate::models::detection::Detection;
use crate::util::drawing;

/// Lifecycle of a detection run, as observed by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
}

/// Raw RGB pixels of an annotated frame, ready for texture upload.
#[derive(Debug, Clone)]
pub struct AnnotatedFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl From<RgbImage> for AnnotatedFrame {
    fn from(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            pixels: image.into_raw(),
        }
    }
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub record_count: usize,
    pub output_path: PathBuf,
}

/// Events emitted by the worker, delivered in emission order.
///
/// The payload is uniform for images and videos: the source path, the
/// annotated frame, and that frame's detections.
pub enum WorkerEvent {
    FrameAnnotated {
        source: PathBuf,
        frame: AnnotatedFrame,
        detections: Vec<Detection>,
    },
    Completed(Result<RunSummary, String>),
}

/// Spawn the worker thread for one run and return its event channel.
pub fn spawn(
    session: Arc<Mutex<DetectionSession>>,
    batch: Vec<PathBuf>,
    output_path: PathBuf,
) -> Receiver<WorkerEvent> {
    let (sender, receiver) = channel();
    std::thread::spawn(move || run(session, batch, output_path, sender));
    receiver
}

/// Process the batch to completion. Individual file and frame errors are
/// swallowed and iteration continues; only a persistence failure is fatal,
/// surfacing in the terminal event.
fn run(
    session: Arc<Mutex<DetectionSession>>,
    batch: Vec<PathBuf>,
    output_path: PathBuf,
    sender: Sender<WorkerEvent>,
) {
    let mut session = match session.lock() {
        Ok(session) => session,
        Err(_) => {
            let _ = sender.send(WorkerEvent::Completed(Err(
                "detector session lock poisoned".to_string(),
            )));
            return;
        }
    };

    let mut recorder = AnnotationRecorder::new(session.labels().clone());

    for path in &batch {
        if !path.is_file() {
            log::debug!("Skipping non-file batch entry {}", path.display());
            continue;
        }

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        for frame in media::open_frames(path) {
            let detections = match session.detect(&frame) {
                Ok(detections) => detections,
                Err(e) => {
                    log::warn!("Detector failed on a frame of {}: {}", path.display(), e);
                    continue;
                }
            };

            let annotated = drawing::annotate(&frame, &detections);
            recorder.record(&filename, &detections);

            let event = WorkerEvent::FrameAnnotated {
                source: path.clone(),
                frame: AnnotatedFrame::from(annotated),
                detections,
            };
            // A dropped receiver is not a cancellation signal; the run still
            // finishes and flushes.
            if sender.send(event).is_err() {
                log::warn!("Event receiver dropped; run continues to completion");
            }
        }
    }

    log::debug!("Batch processed; {} record(s) accumulated", recorder.len());

    let records = recorder.into_records();
    let result = match serialization::export_json(&records, &output_path) {
        Ok(()) => {
            log::info!(
                "Run completed: {} record(s) written to {}",
                records.len(),
                output_path.display()
            );
            Ok(RunSummary {
                record_count: records.len(),
                output_path,
            })
        }
        Err(e) => {
            log::error!("Failed to write {}: {}", output_path.display(), e);
            Err(e.to_string())
        }
    };

    let _ = sender.send(WorkerEvent::Completed(result));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::Detector;
    use crate::models::annotation::LabelTable;
    use crate::models::detection::BoundingBox;
    use anyhow::anyhow;
    use std::path::Path;

    struct StubDetector {
        detections: Vec<Detection>,
    }

    impl Detector for StubDetector {
        fn detect(&mut self, _frame: &RgbImage) -> anyhow::Result<Vec<Detection>> {
            Ok(self.detections.clone())
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    struct FailingDetector;

    impl Detector for FailingDetector {
        fn detect(&mut self, _frame: &RgbImage) -> anyhow::Result<Vec<Detection>> {
            Err(anyhow!("model exploded"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn session_with(detector: Box<dyn Detector>) -> Arc<Mutex<DetectionSession>> {
        Arc::new(Mutex::new(DetectionSession::new(
            detector,
            LabelTable::new(),
        )))
    }

    fn write_test_image(path: &Path) {
        let img = RgbImage::from_pixel(64, 64, image::Rgb([40, 40, 40]));
        img.save(path).unwrap();
    }

    fn run_to_completion(
        session: Arc<Mutex<DetectionSession>>,
        batch: Vec<PathBuf>,
        output_path: PathBuf,
    ) -> Vec<WorkerEvent> {
        let receiver = spawn(session, batch, output_path);
        receiver.iter().collect()
    }

    #[test]
    fn test_single_image_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("photo.png");
        write_test_image(&image_path);
        let output = dir.path().join("annotations.json");

        let detections = vec![
            Detection::new(BoundingBox::from_corners(10.0, 10.0, 50.0, 40.0), 0.9, 0),
            Detection::new(BoundingBox::from_corners(0.0, 0.0, 5.0, 5.0), 0.3, 1),
        ];
        let session = session_with(Box::new(StubDetector {
            detections: detections.clone(),
        }));

        let events = run_to_completion(session, vec![image_path.clone()], output.clone());

        // One frame event, then the terminal event.
        assert_eq!(events.len(), 2);
        match &events[0] {
            WorkerEvent::FrameAnnotated {
                source,
                frame,
                detections: per_frame,
            } => {
                assert_eq!(source, &image_path);
                assert_eq!((frame.width, frame.height), (64, 64));
                assert_eq!(per_frame, &detections);
            }
            _ => panic!("expected FrameAnnotated first"),
        }
        match &events[1] {
            WorkerEvent::Completed(Ok(summary)) => {
                assert_eq!(summary.record_count, 2);
                assert_eq!(summary.output_path, output);
            }
            _ => panic!("expected successful Completed"),
        }

        // Both detections are recorded, independent of the display cutoff.
        let records = serialization::import_json(&output).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].filename, "photo.png");
        assert_eq!(records[0].x, 10.0);
        assert_eq!(records[0].y, 10.0);
        assert_eq!(records[0].width, 40.0);
        assert_eq!(records[0].height, 30.0);
        assert_eq!(records[0].class, "");
        assert_eq!(records[1].x, 0.0);
        assert_eq!(records[1].y, 0.0);
        assert_eq!(records[1].width, 5.0);
        assert_eq!(records[1].height, 5.0);
        assert_eq!(records[1].class, "");
    }

    #[test]
    fn test_records_all_detections_regardless_of_score() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("low.png");
        write_test_image(&image_path);
        let output = dir.path().join("annotations.json");

        // All below the display threshold; every one must still be recorded.
        let session = session_with(Box::new(StubDetector {
            detections: vec![
                Detection::new(BoundingBox::new(1.0, 1.0, 2.0, 2.0), 0.1, 0),
                Detection::new(BoundingBox::new(3.0, 3.0, 4.0, 4.0), 0.2, 1),
            ],
        }));

        run_to_completion(session, vec![image_path], output.clone());

        let records = serialization::import_json(&output).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_unsupported_files_are_skipped_silently() {
        let dir = tempfile::tempdir().unwrap();
        let text_path = dir.path().join("notes.txt");
        std::fs::write(&text_path, "not media").unwrap();
        let image_path = dir.path().join("photo.jpg");
        write_test_image(&image_path);
        let output = dir.path().join("annotations.json");

        let session = session_with(Box::new(StubDetector {
            detections: vec![Detection::new(BoundingBox::new(0.0, 0.0, 8.0, 8.0), 0.8, 0)],
        }));

        let events = run_to_completion(
            session,
            vec![text_path, image_path.clone()],
            output.clone(),
        );

        let frames: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                WorkerEvent::FrameAnnotated { source, .. } => Some(source.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(frames, vec![image_path]);

        let records = serialization::import_json(&output).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].filename, "photo.jpg");
    }

    #[test]
    fn test_empty_batch_completes_immediately_with_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("annotations.json");

        let session = session_with(Box::new(StubDetector { detections: vec![] }));
        let events = run_to_completion(session, vec![], output.clone());

        assert_eq!(events.len(), 1);
        match &events[0] {
            WorkerEvent::Completed(Ok(summary)) => assert_eq!(summary.record_count, 0),
            _ => panic!("expected successful Completed"),
        }
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "[]\n");
    }

    #[test]
    fn test_detector_failure_skips_frame_and_run_continues() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("photo.png");
        write_test_image(&image_path);
        let output = dir.path().join("annotations.json");

        let session = session_with(Box::new(FailingDetector));
        let events = run_to_completion(session, vec![image_path], output.clone());

        // No frame event for the failed frame; the run still completes and
        // flushes an empty record set.
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], WorkerEvent::Completed(Ok(_))));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "[]\n");
    }

    #[test]
    fn test_events_follow_batch_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.png");
        let second = dir.path().join("b.png");
        write_test_image(&first);
        write_test_image(&second);
        let output = dir.path().join("annotations.json");

        let session = session_with(Box::new(StubDetector { detections: vec![] }));
        let events = run_to_completion(
            session,
            vec![first.clone(), second.clone()],
            output,
        );

        let sources: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                WorkerEvent::FrameAnnotated { source, .. } => Some(source.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(sources, vec![first, second]);
    }

    #[test]
    fn test_persistence_failure_surfaces_in_terminal_event() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("annotations.json");

        let session = session_with(Box::new(StubDetector { detections: vec![] }));
        let events = run_to_completion(session, vec![], output);

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], WorkerEvent::Completed(Err(_))));
    }
}
