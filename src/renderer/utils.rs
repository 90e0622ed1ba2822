// ── Letterbox viewport math ───────────────────────────────────────────────────
//
// Largest uniformly scaled rectangle of the logical (game) resolution that fits
// the physical (window) resolution, centred on both axes.

/// Rectangle in physical pixels that holds the game view (letterbox /
/// pillarbox). Ready for a GPU viewport call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const ZERO: Viewport = Viewport { x: 0.0, y: 0.0, width: 0.0, height: 0.0 };

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Map a physical window position to logical game pixels.
    pub fn to_logical(&self, x: f32, y: f32, logical: (u32, u32)) -> (f32, f32) {
        if self.is_empty() {
            return (0.0, 0.0);
        }
        (
            (x - self.x) * logical.0 as f32 / self.width,
            (y - self.y) * logical.1 as f32 / self.height,
        )
    }
}

/// Letterbox `logical` inside `physical` (both `(width, height)`).
///
/// ```text
/// scale = min(pw / lw, ph / lh)
/// x = (pw - lw * scale) / 2,  y = (ph - lh * scale) / 2
/// ```
///
/// A zero logical dimension yields [`Viewport::ZERO`].
pub fn letterbox_viewport(physical: (u32, u32), logical: (u32, u32)) -> Viewport {
    if logical.0 == 0 || logical.1 == 0 {
        return Viewport::ZERO;
    }

    let (pw, ph) = (physical.0 as f32, physical.1 as f32);
    let (lw, lh) = (logical.0 as f32, logical.1 as f32);
    let scale = (pw / lw).min(ph / lh);

    let width = lw * scale;
    let height = lh * scale;
    Viewport { x: (pw - width) / 2.0, y: (ph - height) / 2.0, width, height }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_fit_no_offset() {
        let v = letterbox_viewport((1280, 720), (1280, 720));
        assert_eq!(v, Viewport { x: 0.0, y: 0.0, width: 1280.0, height: 720.0 });
    }

    #[test]
    fn letterbox_4x3_in_16x9() {
        // scale = min(1.6, 1.2) = 1.2 → 960×720, 160px bars left and right.
        let v = letterbox_viewport((1280, 720), (800, 600));
        assert!((v.x - 160.0).abs() < 1e-3, "x={}", v.x);
        assert!(v.y.abs() < 1e-3, "y={}", v.y);
        assert!((v.width - 960.0).abs() < 1e-3, "w={}", v.width);
    }

    #[test]
    fn pillarbox_16x9_in_4x3() {
        // scale = 0.625 → 800×450, 75px bars top and bottom.
        let v = letterbox_viewport((800, 600), (1280, 720));
        assert!((v.y - 75.0).abs() < 1e-3, "y={}", v.y);
        assert!((v.height - 450.0).abs() < 1e-3, "h={}", v.height);
    }

    #[test]
    fn zero_logical_size_returns_zero_viewport() {
        assert_eq!(letterbox_viewport((1280, 720), (0, 720)), Viewport::ZERO);
        assert_eq!(letterbox_viewport((1280, 720), (1280, 0)), Viewport::ZERO);
    }

    #[test]
    fn physical_to_logical_undoes_letterbox() {
        let v = letterbox_viewport((1280, 720), (800, 600));
        let (x, y) = v.to_logical(160.0 + 480.0, 360.0, (800, 600));
        assert!((x - 400.0).abs() < 1e-3, "x={x}");
        assert!((y - 300.0).abs() < 1e-3, "y={y}");
    }
}
