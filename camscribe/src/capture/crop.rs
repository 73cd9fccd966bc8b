use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

/// Largest margin that still leaves at least one pixel in the middle.
const MAX_MARGIN: f64 = 0.499;

/// Centered scan area of a frame, as half-open pixel ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub start_x: u32,
    pub end_x: u32,
    pub start_y: u32,
    pub end_y: u32,
}

fn inset(dimension: u32, margin: f64) -> (u32, u32) {
    let margin = if margin.is_finite() {
        margin.clamp(0.0, MAX_MARGIN)
    } else {
        0.0
    };
    let start = (dimension as f64 * margin).floor() as u32;
    let end = (dimension as f64 * (1.0 - margin)).floor() as u32;
    let start = start.min(dimension.saturating_sub(1));
    (start, end.clamp(start + 1, dimension))
}

impl CropRegion {
    /// Inset every side of a `width` x `height` frame by `margin` of the
    /// corresponding dimension.
    pub fn centered(width: u32, height: u32, margin: f64) -> Self {
        let (start_x, end_x) = inset(width, margin);
        let (start_y, end_y) = inset(height, margin);
        Self {
            start_x,
            end_x,
            start_y,
            end_y,
        }
    }

    pub fn width(&self) -> u32 {
        self.end_x - self.start_x
    }

    pub fn height(&self) -> u32 {
        self.end_y - self.start_y
    }

    pub fn crop(&self, frame: &RgbImage) -> RgbImage {
        imageops::crop_imm(frame, self.start_x, self.start_y, self.width(), self.height())
            .to_image()
    }

    /// Outline the region on `frame`, growing the border inwards.
    pub fn draw_guide(&self, frame: &mut RgbImage, color: Rgb<u8>, thickness: u32) {
        for i in 0..thickness {
            let (w, h) = (self.width(), self.height());
            if w <= 2 * i || h <= 2 * i {
                break;
            }
            let rect = Rect::at((self.start_x + i) as i32, (self.start_y + i) as i32)
                .of_size(w - 2 * i, h - 2 * i);
            draw_hollow_rect_mut(frame, rect, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_region_for_hd_frame() {
        let region = CropRegion::centered(1280, 720, 0.15);
        assert_eq!(
            region,
            CropRegion {
                start_x: 192,
                end_x: 1088,
                start_y: 108,
                end_y: 612,
            }
        );
    }

    #[test]
    fn test_wider_margin() {
        let region = CropRegion::centered(1280, 720, 0.2);
        assert_eq!((region.start_x, region.end_x), (256, 1024));
        assert_eq!((region.start_y, region.end_y), (144, 576));
    }

    #[test]
    fn test_end_is_floored_independently_of_start() {
        // 1366 * 0.15 = 204.9 and 1366 * 0.85 = 1161.1
        let region = CropRegion::centered(1366, 768, 0.15);
        assert_eq!((region.start_x, region.end_x), (204, 1161));
        assert_eq!((region.start_y, region.end_y), (115, 652));

        let region = CropRegion::centered(10, 10, 0.15);
        assert_eq!((region.start_x, region.end_x), (1, 8));

        let region = CropRegion::centered(1279, 720, 0.2);
        assert_eq!((region.start_x, region.end_x), (255, 1023));
    }

    #[test]
    fn test_tiny_frames_keep_one_pixel() {
        assert_eq!(CropRegion::centered(1, 1, 0.45).width(), 1);
        assert_eq!(CropRegion::centered(2, 3, 0.499).height(), 1);
    }

    #[test]
    fn test_region_bounds_hold_for_all_sizes() {
        let margins = [0.0, 0.05, 0.15, 0.2, 0.33, 0.45, 0.4999];
        for &margin in &margins {
            for w in (1..=64).chain([127, 640, 1279, 1920, 4096]) {
                for h in [1, 2, 3, 7, 10, 99, 480, 721] {
                    let r = CropRegion::centered(w, h, margin);
                    assert!(r.start_x < r.end_x && r.end_x <= w, "{w}x{h} @ {margin}: {r:?}");
                    assert!(r.start_y < r.end_y && r.end_y <= h, "{w}x{h} @ {margin}: {r:?}");
                }
            }
        }
    }

    #[test]
    fn test_out_of_range_margin_is_clamped() {
        let r = CropRegion::centered(10, 10, 0.9);
        assert!(r.start_x < r.end_x);
        let r = CropRegion::centered(10, 10, f64::NAN);
        assert_eq!((r.start_x, r.end_x), (0, 10));
    }

    #[test]
    fn test_crop_dimensions_match_region() {
        let frame = RgbImage::from_fn(100, 50, |x, y| Rgb([x as u8, y as u8, 0]));
        let region = CropRegion::centered(100, 50, 0.2);
        let cropped = region.crop(&frame);
        assert_eq!(cropped.dimensions(), (60, 30));
        assert_eq!(cropped.get_pixel(0, 0), &Rgb([20, 10, 0]));
    }

    #[test]
    fn test_draw_guide_outlines_region() {
        let mut frame = RgbImage::new(100, 100);
        let region = CropRegion::centered(100, 100, 0.2);
        let green = Rgb([0, 255, 0]);
        region.draw_guide(&mut frame, green, 2);

        assert_eq!(frame.get_pixel(20, 20), &green);
        assert_eq!(frame.get_pixel(21, 50), &green);
        assert_eq!(frame.get_pixel(79, 79), &green);
        assert_eq!(frame.get_pixel(50, 50), &Rgb([0, 0, 0]));
        assert_eq!(frame.get_pixel(10, 10), &Rgb([0, 0, 0]));
    }
}
