//! Drawing of track state: annotations on the live frame and paths on the
//! cumulative trajectory canvas.

mod annotate;
mod trajectory;

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::tracker::{Point, ShapeTracker, Track};

/// Colors and sizes used when drawing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Absent frames bridged inside one path segment
    pub gap_threshold: usize,
    pub outline_color: [u8; 3],
    pub centroid_color: [u8; 3],
    pub label_color: [u8; 3],
    pub line_thickness: u32,
    pub centroid_radius: i32,
    /// Pixel height of the id label on the frame
    pub label_scale: f32,
    /// Pixel height of the id label on the trajectory canvas
    pub path_label_scale: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            gap_threshold: crate::tracker::DEFAULT_GAP_THRESHOLD,
            outline_color: [0, 255, 0],
            centroid_color: [255, 0, 0],
            label_color: [255, 255, 255],
            line_thickness: 2,
            centroid_radius: 3,
            label_scale: 26.0,
            path_label_scale: 20.0,
        }
    }
}

/// Draws tracks onto RGB images.
///
/// Labels need a font; without one only geometry is drawn.
#[derive(Clone, Default)]
pub struct Renderer {
    config: RenderConfig,
    font: Option<FontArc>,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config, font: None }
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    /// Load the label font from TrueType/OpenType bytes.
    pub fn with_font_bytes(self, bytes: Vec<u8>) -> Result<Self> {
        let font = FontArc::try_from_vec(bytes)?;
        Ok(self.with_font(font))
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draw the outcome of the tracker's last frame.
    ///
    /// Every track matched or created in the frame is annotated on `frame`;
    /// tracks that continued an existing identity also get their path
    /// redrawn on `trajectory`.
    pub fn render_frame(
        &self,
        tracker: &ShapeTracker,
        frame: &mut RgbImage,
        trajectory: &mut RgbImage,
    ) {
        let report = tracker.last_report();
        for &id in &report.seen {
            if let Some(track) = tracker.track(id) {
                self.annotate(frame, track);
            }
        }
        for &id in &report.matched {
            if let Some(track) = tracker.track(id) {
                self.draw_path(trajectory, track);
            }
        }
        debug!(
            frame_index = report.frame_index,
            annotated = report.seen.len(),
            paths = report.matched.len(),
            "frame rendered"
        );
    }

    /// Draw the track's bounding geometry, centroid and id on `frame`.
    pub fn annotate(&self, frame: &mut RgbImage, track: &Track) {
        annotate::draw_annotation(self, frame, track);
    }

    /// Draw every segment of the track's history on `canvas`.
    pub fn draw_path(&self, canvas: &mut RgbImage, track: &Track) {
        trajectory::draw_track_path(self, canvas, track);
    }

    fn thick_line(&self, canvas: &mut RgbImage, from: Point, to: Point, color: Rgb<u8>) {
        let thickness = self.config.line_thickness.max(1) as i32;
        let offsets = -(thickness / 2)..=(thickness - 1) / 2;
        for dx in offsets.clone() {
            for dy in offsets.clone() {
                draw_line_segment_mut(
                    canvas,
                    ((from.x + dx) as f32, (from.y + dy) as f32),
                    ((to.x + dx) as f32, (to.y + dy) as f32),
                    color,
                );
            }
        }
    }

    /// Draw `text` with its baseline at `origin`. No-op without a font.
    fn label(&self, canvas: &mut RgbImage, origin: Point, scale: f32, color: Rgb<u8>, text: &str) {
        let Some(font) = &self.font else {
            return;
        };
        let top = origin.y - scale.round() as i32;
        draw_text_mut(canvas, color, origin.x, top, PxScale::from(scale), font, text);
    }
}
