use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use super::Renderer;
use crate::tracker::{Bounding, Point, Track};

pub(super) fn draw_annotation(renderer: &Renderer, frame: &mut RgbImage, track: &Track) {
    let config = renderer.config();
    let outline = Rgb(config.outline_color);
    let thickness = config.line_thickness.max(1) as i32;

    let label_origin = match track.bounding() {
        Bounding::Circle { center, radius } => {
            for inset in 0..thickness {
                let r = radius - inset;
                if r > 0 {
                    draw_hollow_circle_mut(frame, (center.x, center.y), r, outline);
                }
            }
            Point::new(center.x + radius + 5, center.y)
        }
        Bounding::Rectangle { a, b } => {
            let (left, right) = (a.x.min(b.x), a.x.max(b.x));
            let (top, bottom) = (a.y.min(b.y), a.y.max(b.y));
            for inset in 0..thickness {
                let width = right - left - 2 * inset;
                let height = bottom - top - 2 * inset;
                if width <= 0 || height <= 0 {
                    break;
                }
                let rect = Rect::at(left + inset, top + inset)
                    .of_size(width as u32 + 1, height as u32 + 1);
                draw_hollow_rect_mut(frame, rect, outline);
            }
            Point::new(a.x, a.y - 10)
        }
    };

    let center = track.center();
    draw_filled_circle_mut(
        frame,
        (center.x, center.y),
        config.centroid_radius,
        Rgb(config.centroid_color),
    );

    renderer.label(
        frame,
        label_origin,
        config.label_scale,
        Rgb(config.label_color),
        &format!("ID: {}", track.id()),
    );
}

#[cfg(test)]
mod tests {
    use crate::render::{RenderConfig, Renderer};
    use crate::tracker::{DetectionCandidate, Track};
    use image::{Rgb, RgbImage};
    use std::ops::Range;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const FONT: &[u8] = include_bytes!("../../testdata/DejaVuSansMono.ttf");

    fn has_ink(frame: &RgbImage, mut xs: Range<u32>, ys: Range<u32>) -> bool {
        xs.any(|x| ys.clone().any(|y| *frame.get_pixel(x, y) != BLACK))
    }

    fn labelled() -> Renderer {
        Renderer::new(RenderConfig::default())
            .with_font_bytes(FONT.to_vec())
            .unwrap()
    }

    #[test]
    fn test_circle_annotation() {
        let renderer = Renderer::new(RenderConfig::default());
        let track = Track::new(1, &DetectionCandidate::circle(50, 50, 20, Rgb([9, 9, 9])), 0);
        let mut frame = RgbImage::new(100, 100);

        renderer.annotate(&mut frame, &track);

        assert_eq!(*frame.get_pixel(70, 50), Rgb([0, 255, 0]));
        assert_eq!(*frame.get_pixel(50, 50), Rgb([255, 0, 0]));
        assert_eq!(*frame.get_pixel(60, 50), BLACK);
    }

    #[test]
    fn test_rectangle_annotation() {
        let renderer = Renderer::new(RenderConfig::default());
        let track = Track::new(
            2,
            &DetectionCandidate::rectangle(20, 20, 60, 50, Rgb([9, 9, 9])),
            0,
        );
        let mut frame = RgbImage::new(100, 100);

        renderer.annotate(&mut frame, &track);

        assert_eq!(*frame.get_pixel(20, 30), Rgb([0, 255, 0]));
        assert_eq!(*frame.get_pixel(21, 30), Rgb([0, 255, 0]));
        assert_eq!(*frame.get_pixel(60, 50), Rgb([0, 255, 0]));
        assert_eq!(*frame.get_pixel(40, 35), Rgb([255, 0, 0]));
        assert_eq!(*frame.get_pixel(30, 30), BLACK);
    }

    #[test]
    fn test_annotation_outside_frame_is_clipped() {
        let renderer = Renderer::new(RenderConfig::default());
        let track = Track::new(3, &DetectionCandidate::circle(-30, 500, 40, Rgb([9, 9, 9])), 0);
        let mut frame = RgbImage::new(64, 64);

        renderer.annotate(&mut frame, &track);

        assert!(frame.pixels().all(|p| *p == BLACK));
    }

    #[test]
    fn test_circle_label_right_of_outline() {
        let track = Track::new(1, &DetectionCandidate::circle(50, 60, 20, Rgb([9, 9, 9])), 0);

        let mut plain = RgbImage::new(200, 120);
        Renderer::new(RenderConfig::default()).annotate(&mut plain, &track);
        let mut frame = RgbImage::new(200, 120);
        labelled().annotate(&mut frame, &track);

        // Baseline at (x + r + 5, y) = (75, 60).
        assert!(!has_ink(&plain, 75..160, 30..62));
        assert!(has_ink(&frame, 75..160, 30..62));
        assert!(!has_ink(&frame, 75..160, 64..120));
    }

    #[test]
    fn test_rectangle_label_above_corner() {
        let track = Track::new(
            7,
            &DetectionCandidate::rectangle(20, 50, 60, 80, Rgb([9, 9, 9])),
            0,
        );

        let mut frame = RgbImage::new(200, 120);
        labelled().annotate(&mut frame, &track);

        // Baseline at (x1, y1 - 10) = (20, 40).
        assert!(has_ink(&frame, 20..120, 10..42));
        assert!(!has_ink(&frame, 0..20, 0..50));
    }
}
