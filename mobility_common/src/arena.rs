//! Arena zones: one rotated rectangle per subject.
//!
//! Zone geometry is stored as the axis-aligned corner pair plus a rotation
//! in degrees about the rectangle centre, matching the layout used by the
//! zone editor and `config.json`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArenaZone {
    pub name: String,
    pub top_left: [i32; 2],
    pub bottom_right: [i32; 2],
    #[serde(default)]
    pub rotation: f32,
    /// RGB; auto-assigned from the palette when absent.
    #[serde(default)]
    pub color: Option<[u8; 3]>,
}

/// Axis-aligned pixel bounds of a zone, clamped to the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBounds {
    pub x0: u32,
    pub y0: u32,
    /// Exclusive.
    pub x1: u32,
    /// Exclusive.
    pub y1: u32,
}

impl PixelBounds {
    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }
}

impl ArenaZone {
    pub fn new(name: impl Into<String>, top_left: [i32; 2], bottom_right: [i32; 2]) -> Self {
        Self {
            name: name.into(),
            top_left,
            bottom_right,
            rotation: 0.0,
            color: None,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.top_left[0] + self.bottom_right[0]) as f32 / 2.0,
            (self.top_left[1] + self.bottom_right[1]) as f32 / 2.0,
        )
    }

    pub fn diagonal(&self) -> f32 {
        let w = (self.bottom_right[0] - self.top_left[0]) as f32;
        let h = (self.bottom_right[1] - self.top_left[1]) as f32;
        (w * w + h * h).sqrt()
    }

    /// The four corners after rotation about the centre, in drawing order
    /// (top-left, top-right, bottom-right, bottom-left for zero rotation).
    pub fn corners(&self) -> [(f32, f32); 4] {
        let (cx, cy) = self.center();
        let (x1, y1) = (self.top_left[0] as f32, self.top_left[1] as f32);
        let (x2, y2) = (self.bottom_right[0] as f32, self.bottom_right[1] as f32);

        let rad = self.rotation.to_radians();
        let (sin, cos) = rad.sin_cos();

        let rotate = |x: f32, y: f32| {
            let (dx, dy) = (x - cx, y - cy);
            (cx + dx * cos - dy * sin, cy + dx * sin + dy * cos)
        };

        [
            rotate(x1, y1),
            rotate(x2, y1),
            rotate(x2, y2),
            rotate(x1, y2),
        ]
    }

    /// Point-in-zone test via inverse rotation of the query point.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let (cx, cy) = self.center();
        let rad = (-self.rotation).to_radians();
        let (sin, cos) = rad.sin_cos();
        let (dx, dy) = (x - cx, y - cy);
        let ux = cx + dx * cos - dy * sin;
        let uy = cy + dx * sin + dy * cos;

        ux >= self.top_left[0] as f32
            && ux <= self.bottom_right[0] as f32
            && uy >= self.top_left[1] as f32
            && uy <= self.bottom_right[1] as f32
    }

    /// Axis-aligned bounds of the rotated zone, clamped to the frame.
    pub fn bounds(&self, frame_w: u32, frame_h: u32) -> PixelBounds {
        let corners = self.corners();
        let min_x = corners.iter().map(|c| c.0).fold(f32::INFINITY, f32::min);
        let min_y = corners.iter().map(|c| c.1).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|c| c.0).fold(f32::NEG_INFINITY, f32::max);
        let max_y = corners.iter().map(|c| c.1).fold(f32::NEG_INFINITY, f32::max);

        PixelBounds {
            x0: min_x.floor().max(0.0) as u32,
            y0: min_y.floor().max(0.0) as u32,
            x1: (max_x.ceil().max(0.0) as u32 + 1).min(frame_w),
            y1: (max_y.ceil().max(0.0) as u32 + 1).min(frame_h),
        }
    }

    /// Order corners, clamp to the frame and fold the rotation into
    /// (-180, 180].
    pub fn normalise(&mut self, frame_w: u32, frame_h: u32) {
        if self.top_left[0] > self.bottom_right[0] {
            std::mem::swap(&mut self.top_left[0], &mut self.bottom_right[0]);
        }
        if self.top_left[1] > self.bottom_right[1] {
            std::mem::swap(&mut self.top_left[1], &mut self.bottom_right[1]);
        }
        for c in [&mut self.top_left, &mut self.bottom_right] {
            c[0] = c[0].clamp(0, frame_w as i32);
            c[1] = c[1].clamp(0, frame_h as i32);
        }

        let mut rot = self.rotation.rem_euclid(360.0);
        if rot > 180.0 {
            rot -= 360.0;
        }
        self.rotation = rot;
    }
}

/// Precomputed per-pixel membership over a zone's bounds, built once per
/// zone per video so the per-frame loops are plain array walks.
#[derive(Debug, Clone)]
pub struct ZoneMask {
    pub bounds: PixelBounds,
    inside: Vec<bool>,
    area: u32,
}

impl ZoneMask {
    pub fn build(zone: &ArenaZone, frame_w: u32, frame_h: u32) -> Self {
        let bounds = zone.bounds(frame_w, frame_h);
        let (w, h) = (bounds.width(), bounds.height());
        let mut inside = vec![false; (w * h) as usize];
        let mut area = 0u32;

        for y in 0..h {
            for x in 0..w {
                // Sample at the pixel centre.
                let fx = (bounds.x0 + x) as f32 + 0.5;
                let fy = (bounds.y0 + y) as f32 + 0.5;
                if zone.contains(fx, fy) {
                    inside[(y * w + x) as usize] = true;
                    area += 1;
                }
            }
        }

        Self {
            bounds,
            inside,
            area,
        }
    }

    /// Membership test in bounds-local coordinates.
    pub fn get(&self, x: u32, y: u32) -> bool {
        let w = self.bounds.width();
        if x >= w || y >= self.bounds.height() {
            return false;
        }
        self.inside[(y * w + x) as usize]
    }

    pub fn area(&self) -> u32 {
        self.area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(rotation: f32) -> ArenaZone {
        let mut z = ArenaZone::new("z", [100, 100], [200, 200]);
        z.rotation = rotation;
        z
    }

    #[test]
    fn test_corners_unrotated() {
        let z = square(0.0);
        let c = z.corners();
        assert_eq!(c[0], (100.0, 100.0));
        assert_eq!(c[1], (200.0, 100.0));
        assert_eq!(c[2], (200.0, 200.0));
        assert_eq!(c[3], (100.0, 200.0));
    }

    #[test]
    fn test_corners_quarter_turn() {
        // A square rotated 90 degrees about its centre still covers the
        // same corner set, shifted along in drawing order.
        let z = square(90.0);
        let c = z.corners();
        let eps = 1e-3;
        assert!((c[0].0 - 200.0).abs() < eps && (c[0].1 - 100.0).abs() < eps);
        assert!((c[1].0 - 200.0).abs() < eps && (c[1].1 - 200.0).abs() < eps);
    }

    #[test]
    fn test_contains_unrotated() {
        let z = square(0.0);
        assert!(z.contains(150.0, 150.0));
        assert!(z.contains(100.0, 100.0));
        assert!(!z.contains(99.0, 150.0));
        assert!(!z.contains(150.0, 201.0));
    }

    #[test]
    fn test_contains_rotated() {
        let z = square(45.0);
        // Centre is always inside.
        assert!(z.contains(150.0, 150.0));
        // The unrotated corner is outside once the square is tilted.
        assert!(!z.contains(101.0, 101.0));
        // The rotated square extends past the old left edge at mid-height.
        assert!(z.contains(85.0, 150.0));
    }

    #[test]
    fn test_bounds_clamped_to_frame() {
        let z = ArenaZone::new("edge", [-50, -50], [100, 100]);
        let b = z.bounds(640, 480);
        assert_eq!(b.x0, 0);
        assert_eq!(b.y0, 0);
        assert!(b.x1 <= 640);
        assert!(b.y1 <= 480);
    }

    #[test]
    fn test_normalise_swaps_inverted_corners() {
        let mut z = ArenaZone::new("inv", [200, 300], [100, 150]);
        z.normalise(640, 480);
        assert_eq!(z.top_left, [100, 150]);
        assert_eq!(z.bottom_right, [200, 300]);
    }

    #[test]
    fn test_normalise_clamps_and_folds_rotation() {
        let mut z = ArenaZone::new("big", [-10, -10], [9999, 9999]);
        z.rotation = 270.0;
        z.normalise(640, 480);
        assert_eq!(z.top_left, [0, 0]);
        assert_eq!(z.bottom_right, [640, 480]);
        assert_eq!(z.rotation, -90.0);
    }

    #[test]
    fn test_mask_area_matches_rectangle() {
        let z = square(0.0);
        let mask = ZoneMask::build(&z, 640, 480);
        // 101x101 pixel centres fall inside the closed [100, 200] range,
        // minus the half-open sampling at the far edge.
        let area = mask.area();
        assert!(area >= 100 * 100 && area <= 101 * 101, "area = {area}");
        assert!(mask.get(10, 10));
    }

    #[test]
    fn test_mask_rotated_square_keeps_area() {
        let z0 = square(0.0);
        let z45 = square(45.0);
        let a0 = ZoneMask::build(&z0, 640, 480).area() as f32;
        let a45 = ZoneMask::build(&z45, 640, 480).area() as f32;
        // Rotation preserves area up to rasterisation error.
        assert!((a0 - a45).abs() / a0 < 0.05);
    }
}
