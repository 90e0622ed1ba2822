use glam::Vec2;

use crate::geometry::Rect;

/// Camera uniform uploaded to the GPU: the combined view-projection matrix.
///
/// Layout (column-major, matching WGSL `mat4x4<f32>`):
/// ```text
/// col0: [sx,  0,   0,  0]
/// col1: [0,   sy,  0,  0]
/// col2: [0,   0,   1,  0]
/// col3: [tx,  ty,  0,  1]
/// ```
/// where `sx = 2z/w`, `sy = -2z/h`, `tx = -sx*cx`, `ty = -sy*cy`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    /// Plain orthographic projection mapping pixel coords [0..w] × [0..h] to clip space.
    pub fn identity_ortho(width: f32, height: f32) -> Self {
        let sx = 2.0 / width;
        let sy = -2.0 / height;
        Self {
            view_proj: [
                [sx,   0.0,  0.0, 0.0],
                [0.0,  sy,   0.0, 0.0],
                [0.0,  0.0,  1.0, 0.0],
                [-1.0, 1.0,  0.0, 1.0],
            ],
        }
    }
}

/// Duration of a camera shake in seconds.
const SHAKE_DURATION: f32 = 0.5;

/// 2D camera: tracks a world-space position with smooth zoom, follow and screen-shake.
#[derive(Clone, Debug)]
pub struct Camera {
    /// World-space pixel position the camera is centered on.
    pub position: Vec2,
    /// Current zoom level (1.0 = 1:1, >1 zooms in, <1 zooms out).
    pub zoom: f32,
    pub(crate) target_zoom: f32,
    /// Follow stiffness per second; 0 snaps instantly.
    pub follow_speed: f32,
    pub(crate) shake_timer: f32,
    pub(crate) shake_intensity: f32,
    pub(crate) shake_offset: Vec2,
}

impl Camera {
    pub fn new(center_x: f32, center_y: f32) -> Self {
        Self {
            position: Vec2::new(center_x, center_y),
            zoom: 1.0,
            target_zoom: 1.0,
            follow_speed: 0.0,
            shake_timer: 0.0,
            shake_intensity: 0.0,
            shake_offset: Vec2::ZERO,
        }
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.target_zoom = zoom.max(0.01);
    }

    pub fn target_zoom(&self) -> f32 {
        self.target_zoom
    }

    /// Move toward `target`, exponentially smoothed by `follow_speed`.
    pub fn follow(&mut self, target: Vec2, dt: f32) {
        if self.follow_speed <= 0.0 {
            self.position = target;
        } else {
            let t = (self.follow_speed * dt).min(1.0);
            self.position += (target - self.position) * t;
        }
    }

    /// Advance smooth zoom and shake by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        // Smooth zoom interpolation (converges at ~8× per second).
        let speed = 8.0_f32;
        self.zoom += (self.target_zoom - self.zoom) * (speed * dt).min(1.0);

        if self.shake_timer > 0.0 {
            self.shake_timer -= dt;
            let decay = (self.shake_timer / SHAKE_DURATION).max(0.0);
            let t = self.shake_timer;
            use std::f32::consts::TAU;
            self.shake_offset = Vec2::new(
                (t * 47.0 * TAU).sin() * self.shake_intensity * decay,
                (t * 37.0 * TAU + 1.1).sin() * self.shake_intensity * decay,
            );
            if self.shake_timer <= 0.0 {
                self.shake_timer = 0.0;
                self.shake_offset = Vec2::ZERO;
            }
        }
    }

    /// Trigger a camera shake. `intensity` is the peak displacement in pixels.
    pub fn shake(&mut self, intensity: f32) {
        self.shake_timer = SHAKE_DURATION;
        self.shake_intensity = intensity;
    }

    fn center(&self) -> Vec2 {
        self.position + self.shake_offset
    }

    /// Build the GPU-ready `CameraUniform` for the given viewport dimensions.
    ///
    /// Derivation (y-down pixel space → NDC):
    /// ```text
    /// x_ndc = sx * world_x + tx    (sx = 2z/w,  tx = -sx*cx)
    /// y_ndc = sy * world_y + ty    (sy = -2z/h, ty = -sy*cy)
    /// ```
    pub fn view_proj(&self, width: f32, height: f32) -> CameraUniform {
        let c = self.center();
        let z = self.zoom.max(0.01);

        let sx = 2.0 * z / width;
        let sy = -2.0 * z / height;
        let tx = -sx * c.x;
        let ty = -sy * c.y;

        CameraUniform {
            view_proj: [
                [sx,  0.0, 0.0, 0.0],
                [0.0, sy,  0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [tx,  ty,  0.0, 1.0],
            ],
        }
    }

    /// World-space rectangle covered by a `width × height` viewport.
    pub fn visible_rect(&self, width: f32, height: f32) -> Rect {
        let z = self.zoom.max(0.01);
        let half = Vec2::new(width, height) / (2.0 * z);
        Rect::from_center(self.center(), half)
    }

    pub fn world_to_screen(&self, world: Vec2, width: f32, height: f32) -> Vec2 {
        let z = self.zoom.max(0.01);
        (world - self.center()) * z + Vec2::new(width, height) * 0.5
    }

    pub fn screen_to_world(&self, screen: Vec2, width: f32, height: f32) -> Vec2 {
        let z = self.zoom.max(0.01);
        (screen - Vec2::new(width, height) * 0.5) / z + self.center()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_maps_to_ndc_origin() {
        let cam = Camera::new(100.0, 40.0);
        let u = cam.view_proj(800.0, 600.0);
        let m = u.view_proj;
        let x = m[0][0] * 100.0 + m[3][0];
        let y = m[1][1] * 40.0 + m[3][1];
        assert!(x.abs() < 1e-5 && y.abs() < 1e-5);
    }

    #[test]
    fn screen_world_round_trip() {
        let mut cam = Camera::new(50.0, 50.0);
        cam.zoom = 2.0;
        let w = Vec2::new(73.0, 12.0);
        let s = cam.world_to_screen(w, 320.0, 240.0);
        let back = cam.screen_to_world(s, 320.0, 240.0);
        assert!((back - w).length() < 1e-4);
    }

    #[test]
    fn shake_expires() {
        let mut cam = Camera::new(0.0, 0.0);
        cam.shake(4.0);
        for _ in 0..40 {
            cam.tick(1.0 / 60.0);
        }
        assert_eq!(cam.shake_offset, Vec2::ZERO);
    }
}
