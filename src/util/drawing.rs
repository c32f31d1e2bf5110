// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Bounding box rendering.
//!
//! This module draws detection boxes onto display frames. The visual
//! convention (color, thickness, confidence cutoff) is fixed, not
//! user-configurable.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::models::detection::{BoundingBox, Detection};

/// Rectangle color for drawn detections.
const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
/// Rectangle border thickness in pixels.
const BOX_THICKNESS: u32 = 2;
/// Only detections scoring strictly above this are drawn. Recording is
/// independent of this cutoff.
const DISPLAY_THRESHOLD: f32 = 0.5;

/// Produce a copy of `frame` with a rectangle drawn for every detection
/// whose score strictly exceeds the display threshold. The input frame is
/// never mutated.
pub fn annotate(frame: &RgbImage, detections: &[Detection]) -> RgbImage {
    let mut annotated = frame.clone();
    for det in detections {
        if det.score > DISPLAY_THRESHOLD {
            draw_box(&mut annotated, &det.bbox);
        }
    }
    annotated
}

fn draw_box(image: &mut RgbImage, bbox: &BoundingBox) {
    let x = bbox.x.round() as i32;
    let y = bbox.y.round() as i32;
    let width = bbox.width.round().max(1.0) as u32;
    let height = bbox.height.round().max(1.0) as u32;

    // Nested hollow rects, shrinking inward, give the border its thickness.
    for inset in 0..BOX_THICKNESS {
        let w = width.saturating_sub(2 * inset);
        let h = height.saturating_sub(2 * inset);
        if w == 0 || h == 0 {
            break;
        }
        let rect = Rect::at(x + inset as i32, y + inset as i32).of_size(w, h);
        draw_hollow_rect_mut(image, rect, BOX_COLOR);
    }
}
