//! Per-zone subject tracking.
//!
//! Each zone holds at most one subject, so tracking reduces to following a
//! single centroid. The only subtlety is gating: segmentation glitches can
//! teleport the centroid across the arena in one frame, and that jump must
//! not count as swim distance.

#[derive(Debug, Clone)]
pub struct SubjectTrack {
    last_centroid: Option<(f32, f32)>,
    path_length_px: f32,
    missing_frames: u64,
    gate_px: f32,
}

impl SubjectTrack {
    /// `gate_px` is the largest centroid step accepted as real motion.
    pub fn new(gate_px: f32) -> Self {
        Self {
            last_centroid: None,
            path_length_px: 0.0,
            missing_frames: 0,
            gate_px,
        }
    }

    /// Advance the track by one frame. Returns the accepted displacement
    /// in pixels, or `None` when the subject is missing or the step was
    /// gated out as a re-detection.
    pub fn update(&mut self, centroid: Option<(f32, f32)>) -> Option<f32> {
        match centroid {
            None => {
                self.missing_frames += 1;
                None
            }
            Some(current) => {
                let step = self.last_centroid.map(|prev| {
                    let (dx, dy) = (current.0 - prev.0, current.1 - prev.1);
                    (dx * dx + dy * dy).sqrt()
                });
                self.last_centroid = Some(current);

                match step {
                    Some(d) if d <= self.gate_px => {
                        self.path_length_px += d;
                        Some(d)
                    }
                    // First sighting, or a jump too large to be swimming.
                    _ => None,
                }
            }
        }
    }

    pub fn last_centroid(&self) -> Option<(f32, f32)> {
        self.last_centroid
    }

    pub fn path_length_px(&self) -> f32 {
        self.path_length_px
    }

    pub fn missing_frames(&self) -> u64 {
        self.missing_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sighting_accrues_nothing() {
        let mut track = SubjectTrack::new(100.0);
        assert_eq!(track.update(Some((10.0, 10.0))), None);
        assert_eq!(track.path_length_px(), 0.0);
    }

    #[test]
    fn test_path_accumulates() {
        let mut track = SubjectTrack::new(100.0);
        track.update(Some((0.0, 0.0)));
        assert_eq!(track.update(Some((3.0, 4.0))), Some(5.0));
        assert_eq!(track.update(Some((6.0, 8.0))), Some(5.0));
        assert!((track.path_length_px() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_teleport_is_gated() {
        let mut track = SubjectTrack::new(20.0);
        track.update(Some((0.0, 0.0)));
        assert_eq!(track.update(Some((300.0, 0.0))), None);
        assert_eq!(track.path_length_px(), 0.0);
        // Track re-anchors at the new position.
        assert_eq!(track.update(Some((303.0, 4.0))), Some(5.0));
    }

    #[test]
    fn test_missing_frames_counted() {
        let mut track = SubjectTrack::new(20.0);
        track.update(Some((0.0, 0.0)));
        track.update(None);
        track.update(None);
        assert_eq!(track.missing_frames(), 2);
        // Last known position survives the gap.
        assert_eq!(track.last_centroid(), Some((0.0, 0.0)));
    }

    #[test]
    fn test_path_monotonic() {
        let mut track = SubjectTrack::new(50.0);
        let mut prev = 0.0;
        for i in 0..50 {
            let x = (i as f32 * 0.7).sin() * 30.0;
            let y = (i as f32 * 0.3).cos() * 30.0;
            track.update(Some((x, y)));
            assert!(track.path_length_px() >= prev);
            prev = track.path_length_px();
        }
    }
}
