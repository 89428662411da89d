use serde::{Deserialize, Serialize};

/// One zone's measurement on one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectSample {
    pub zone: String,
    pub present: bool,
    /// Full-frame coordinates.
    pub centroid: Option<(f32, f32)>,
    /// Subject pixel area.
    pub area: u32,
    /// Changed subject pixels over subject area, 0.0 when absent.
    pub motion_ratio: f32,
    pub mobile: bool,
}

impl SubjectSample {
    pub fn absent(zone: impl Into<String>) -> Self {
        Self {
            zone: zone.into(),
            present: false,
            centroid: None,
            area: 0,
            motion_ratio: 0.0,
            mobile: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FrameMeta {
    pub frame: u64,
    pub pts_ms: u64,
    pub samples: Vec<SubjectSample>,
}
