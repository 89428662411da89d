//! Deterministic colour assignment for arena zones.

/// Golden-ratio hue step, gives well separated hues for any zone count.
const GOLDEN_RATIO: f32 = 0.618_034;

/// Convert HSV (all components in 0.0..=1.0) to RGB bytes.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [u8; 3] {
    let h = (h.rem_euclid(1.0)) * 6.0;
    let i = h.floor() as i32 % 6;
    let f = h - h.floor();
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match i {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    [
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    ]
}

/// Colour for the zone at `index`, stable across runs.
pub fn zone_color(index: usize) -> [u8; 3] {
    let hue = (index as f32 * GOLDEN_RATIO).rem_euclid(1.0);
    hsv_to_rgb(hue, 0.8, 0.9)
}

/// A batch of `n` distinct colours, hues spread evenly with alternating
/// saturation/value so neighbouring zones stay tellable apart.
pub fn generate_colors(n: usize) -> Vec<[u8; 3]> {
    (0..n)
        .map(|i| {
            let hue = i as f32 / n.max(1) as f32;
            let saturation = 0.8 + (i % 2) as f32 * 0.2;
            let value = (0.9 + (i % 3) as f32 * 0.1).min(1.0);
            hsv_to_rgb(hue, saturation, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), [255, 0, 0]);
        assert_eq!(hsv_to_rgb(1.0 / 3.0, 1.0, 1.0), [0, 255, 0]);
        assert_eq!(hsv_to_rgb(2.0 / 3.0, 1.0, 1.0), [0, 0, 255]);
    }

    #[test]
    fn test_hsv_grayscale() {
        // Zero saturation collapses to the value channel.
        assert_eq!(hsv_to_rgb(0.42, 0.0, 1.0), [255, 255, 255]);
        assert_eq!(hsv_to_rgb(0.42, 0.0, 0.0), [0, 0, 0]);
    }

    #[test]
    fn test_zone_color_deterministic() {
        for i in 0..16 {
            assert_eq!(zone_color(i), zone_color(i));
        }
    }

    #[test]
    fn test_zone_colors_distinct() {
        let colors: Vec<_> = (0..8).map(zone_color).collect();
        for (i, a) in colors.iter().enumerate() {
            for b in colors.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_generate_colors_count() {
        assert_eq!(generate_colors(5).len(), 5);
        assert!(generate_colors(0).is_empty());
    }
}
