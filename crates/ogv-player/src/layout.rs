//! Placement of the video quad on the host's screen.

/// An axis-aligned rectangle in host screen units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// How the video is fitted to the target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ScreenAspect {
    /// Scale to fit, letterboxing or pillarboxing the remainder.
    #[default]
    MaintainAspectRatio,
    /// Stretch over the whole target.
    FillScreen,
    /// Use the given rectangle as-is.
    Fixed(Rect),
}

/// Compute where to draw a `video_w`×`video_h` frame on a
/// `target_w`×`target_h` screen.
pub fn screen_rect(
    video_w: u32,
    video_h: u32,
    target_w: f32,
    target_h: f32,
    aspect: ScreenAspect,
) -> Rect {
    let full = Rect::new(0.0, 0.0, target_w, target_h);

    match aspect {
        ScreenAspect::Fixed(rect) => rect,
        ScreenAspect::FillScreen => full,
        ScreenAspect::MaintainAspectRatio => {
            if video_w == 0 || video_h == 0 || target_h <= 0.0 {
                return full;
            }

            let video_ratio = video_w as f32 / video_h as f32;
            let screen_ratio = target_w / target_h;

            if video_ratio > screen_ratio {
                let h = target_w / video_ratio;
                Rect::new(0.0, (target_h - h) / 2.0, target_w, h)
            } else {
                let w = target_h * video_ratio;
                Rect::new((target_w - w) / 2.0, 0.0, w, target_h)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Rect, expected: Rect) {
        let parts = [
            (actual.x, expected.x),
            (actual.y, expected.y),
            (actual.w, expected.w),
            (actual.h, expected.h),
        ];
        for (a, e) in parts {
            assert!((a - e).abs() < 1e-2, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_wide_video_letterboxed() {
        let rect = screen_rect(1920, 1080, 800.0, 600.0, ScreenAspect::MaintainAspectRatio);
        assert_close(rect, Rect::new(0.0, 75.0, 800.0, 450.0));
    }

    #[test]
    fn test_tall_video_pillarboxed() {
        let rect = screen_rect(640, 480, 1600.0, 900.0, ScreenAspect::MaintainAspectRatio);
        assert_close(rect, Rect::new(200.0, 0.0, 1200.0, 900.0));
    }

    #[test]
    fn test_fill_and_fixed() {
        assert_eq!(
            screen_rect(640, 480, 1600.0, 900.0, ScreenAspect::FillScreen),
            Rect::new(0.0, 0.0, 1600.0, 900.0)
        );

        let fixed = Rect::new(10.0, 20.0, 320.0, 240.0);
        assert_eq!(
            screen_rect(640, 480, 1600.0, 900.0, ScreenAspect::Fixed(fixed)),
            fixed
        );
    }

    #[test]
    fn test_unknown_geometry_fills() {
        let rect = screen_rect(0, 0, 640.0, 480.0, ScreenAspect::MaintainAspectRatio);
        assert_eq!(rect, Rect::new(0.0, 0.0, 640.0, 480.0));
    }
}
