use egui::{Pos2, Vec2, pos2};
use serde::{Deserialize, Serialize};

pub const ZOOM_SENSITIVITY: f32 = 0.001;
pub const MIN_SCALE: f32 = 0.2;
pub const MAX_SCALE: f32 = 3.0;

/// Affine map between world space (where node positions live) and screen
/// space (where pointer input arrives). `(x, y)` is the screen position of
/// the world origin.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

impl ViewTransform {
    /// Fixed overview used after a timeline layout.
    pub fn overview() -> Self {
        Self {
            x: 50.0,
            y: 50.0,
            scale: 0.8,
        }
    }

    pub fn world_to_screen(&self, p: Pos2) -> Pos2 {
        pos2(p.x * self.scale + self.x, p.y * self.scale + self.y)
    }

    pub fn screen_to_world(&self, p: Pos2) -> Pos2 {
        pos2((p.x - self.x) / self.scale, (p.y - self.y) / self.scale)
    }

    /// Convert an incremental screen motion to world units.
    pub fn screen_delta_to_world(&self, delta: Vec2) -> Vec2 {
        delta / self.scale
    }

    /// Wheel zoom anchored at `cursor` (screen space). The offset is rescaled
    /// so the world point under the cursor stays under the cursor; anything
    /// else drifts visibly while zooming.
    pub fn zoom_about(&mut self, cursor: Pos2, scroll: f32) {
        let new_scale = (self.scale + scroll * ZOOM_SENSITIVITY).clamp(MIN_SCALE, MAX_SCALE);
        let ratio = new_scale / self.scale;
        self.x = cursor.x - (cursor.x - self.x) * ratio;
        self.y = cursor.y - (cursor.y - self.y) * ratio;
        self.scale = new_scale;
    }

    /// Toolbar step zoom. Scale only; the offset is left alone.
    pub fn zoom_step(&mut self, factor: f32) {
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
    }

    /// Pan by a screen-space delta (unscaled).
    pub fn pan_by(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// The "100%" control: identity, exactly.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_is_identity() {
        let t = ViewTransform {
            x: 37.5,
            y: -12.0,
            scale: 1.7,
        };
        let p = pos2(123.0, -45.0);
        let back = t.screen_to_world(t.world_to_screen(p));
        assert!((back.x - p.x).abs() < 1e-4);
        assert!((back.y - p.y).abs() < 1e-4);
    }

    #[test]
    fn zoom_keeps_cursor_anchor() {
        let mut t = ViewTransform {
            x: 80.0,
            y: 20.0,
            scale: 1.0,
        };
        let cursor = pos2(400.0, 300.0);
        let anchor = t.screen_to_world(cursor);
        t.zoom_about(cursor, 240.0);
        let after = t.screen_to_world(cursor);
        assert!((anchor.x - after.x).abs() < 1e-3);
        assert!((anchor.y - after.y).abs() < 1e-3);
    }
}
