// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file loading (images and videos).
//!
//! This module classifies input files by extension and produces a lazy,
//! finite sequence of decoded frames: exactly one frame for still images,
//! successive frames in file order for videos. Unsupported files yield an
//! empty sequence, and a frame that fails to decode ends the sequence for
//! that file.

use std::path::Path;

use image::RgbImage;

/// Kind of media a path refers to, judged by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

impl MediaKind {
    /// Classify a path by its extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("png") | Some("jpg") | Some("jpeg") => MediaKind::Image,
            Some("mp4") | Some("avi") | Some("mov") => MediaKind::Video,
            _ => MediaKind::Other,
        }
    }
}

/// A lazy, finite, non-restartable sequence of decoded frames.
pub struct FrameStream {
    inner: StreamInner,
}

enum StreamInner {
    /// A single decoded still image, yielded once.
    Image(Option<RgbImage>),
    #[cfg(feature = "video-opencv")]
    Video(video::VideoStream),
    Empty,
}

impl Iterator for FrameStream {
    type Item = RgbImage;

    fn next(&mut self) -> Option<RgbImage> {
        match &mut self.inner {
            StreamInner::Image(frame) => frame.take(),
            #[cfg(feature = "video-opencv")]
            StreamInner::Video(stream) => stream.next_frame(),
            StreamInner::Empty => None,
        }
    }
}

/// Open the frame sequence for `path`.
///
/// Decode failures are not errors at this boundary: an unreadable image or
/// an unopenable video produces an empty stream, logged at warn level.
pub fn open_frames(path: &Path) -> FrameStream {
    let inner = match MediaKind::from_path(path) {
        MediaKind::Image => match image::open(path) {
            Ok(img) => StreamInner::Image(Some(img.to_rgb8())),
            Err(e) => {
                log::warn!("Failed to decode image {}: {}", path.display(), e);
                StreamInner::Empty
            }
        },
        MediaKind::Video => {
            #[cfg(feature = "video-opencv")]
            {
                match video::VideoStream::open(path) {
                    Ok(stream) => StreamInner::Video(stream),
                    Err(e) => {
                        log::warn!("Failed to open video {}: {}", path.display(), e);
                        StreamInner::Empty
                    }
                }
            }
            #[cfg(not(feature = "video-opencv"))]
            {
                log::warn!(
                    "Skipping video {}: built without video support (enable video-opencv)",
                    path.display()
                );
                StreamInner::Empty
            }
        }
        MediaKind::Other => {
            log::debug!("Skipping unsupported file {}", path.display());
            StreamInner::Empty
        }
    };

    FrameStream { inner }
}

#[cfg(feature = "video-opencv")]
mod video {
    use anyhow::{anyhow, Result};
    use image::RgbImage;
    use opencv::core::Mat;
    use opencv::prelude::*;
    use opencv::{imgproc, videoio};
    use std::path::Path;

    /// Frames of one video file, decoded on demand through OpenCV.
    pub(super) struct VideoStream {
        capture: videoio::VideoCapture,
    }

    impl VideoStream {
        pub(super) fn open(path: &Path) -> Result<Self> {
            let path_str = path
                .to_str()
                .ok_or_else(|| anyhow!("non-UTF-8 video path"))?;
            let capture = videoio::VideoCapture::from_file(path_str, videoio::CAP_ANY)?;
            if !capture.is_opened()? {
                return Err(anyhow!("could not open video stream"));
            }
            Ok(Self { capture })
        }

        /// Read and convert the next frame, or end the stream on any
        /// failure.
        pub(super) fn next_frame(&mut self) -> Option<RgbImage> {
            let mut bgr = Mat::default();
            match self.capture.read(&mut bgr) {
                Ok(true) if !bgr.empty() => {}
                _ => return None,
            }

            let mut rgb = Mat::default();
            if imgproc::cvt_color(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0).is_err() {
                return None;
            }

            let width = rgb.cols() as u32;
            let height = rgb.rows() as u32;
            let data = rgb.data_bytes().ok()?.to_vec();
            RgbImage::from_vec(width, height, data)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_media_kind_classification() {
        assert_eq!(MediaKind::from_path(Path::new("a.png")), MediaKind::Image);
        assert_eq!(MediaKind::from_path(Path::new("a.jpg")), MediaKind::Image);
        assert_eq!(MediaKind::from_path(Path::new("a.JPEG")), MediaKind::Image);
        assert_eq!(MediaKind::from_path(Path::new("a.mp4")), MediaKind::Video);
        assert_eq!(MediaKind::from_path(Path::new("a.MOV")), MediaKind::Video);
        assert_eq!(MediaKind::from_path(Path::new("a.avi")), MediaKind::Video);
        assert_eq!(MediaKind::from_path(Path::new("a.txt")), MediaKind::Other);
        assert_eq!(MediaKind::from_path(Path::new("noext")), MediaKind::Other);
    }

    #[test]
    fn test_image_yields_exactly_one_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let img = RgbImage::from_pixel(8, 6, image::Rgb([10, 20, 30]));
        img.save(&path).unwrap();

        let frames: Vec<RgbImage> = open_frames(&path).collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].dimensions(), (8, 6));
    }

    #[test]
    fn test_unsupported_extension_yields_no_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "not an image").unwrap();

        assert_eq!(open_frames(&path).count(), 0);
    }

    #[test]
    fn test_corrupt_image_yields_no_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"\x89PNG but not really").unwrap();

        assert_eq!(open_frames(&path).count(), 0);
    }

    #[test]
    fn test_missing_file_yields_no_frames() {
        let path = PathBuf::from("does/not/exist.png");
        assert_eq!(open_frames(&path).count(), 0);
    }
}
