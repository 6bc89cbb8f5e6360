use image::RgbImage;

use super::Renderer;
use crate::tracker::{Point, Track, split_history_with};

pub(super) fn draw_track_path(renderer: &Renderer, canvas: &mut RgbImage, track: &Track) {
    let config = renderer.config();
    let color = track.color();

    for segment in split_history_with(track.history(), config.gap_threshold) {
        if !segment.is_drawable() {
            continue;
        }

        if let Some(first) = segment.first_point() {
            renderer.label(
                canvas,
                Point::new(first.x + 5, first.y - 5),
                config.path_label_scale,
                color,
                &track.id().to_string(),
            );
        }

        for (from, to) in segment.edges() {
            renderer.thick_line(canvas, from, to, color);
        }
    }
}
