//! `config.json` loading and validation.
//!
//! The schema stays compatible with the original tool's config: earlier
//! configs without the `analysis` section still parse, picking up default
//! thresholds.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::arena::ArenaZone;
use crate::palette;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Default input when the CLI is not given one.
    #[serde(default)]
    pub video_path: Option<PathBuf>,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_true")]
    pub fps_display: bool,
    #[serde(default = "default_true")]
    pub draw_frames: bool,
    /// Arena zones, one per subject.
    #[serde(default)]
    pub frames: Vec<ArenaZone>,
    #[serde(default)]
    pub analysis: AnalysisParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisParams {
    /// Frames that only feed the background model before scoring starts.
    #[serde(default = "default_warmup_frames")]
    pub warmup_frames: u32,
    /// Running-average learning rate for the background model.
    #[serde(default = "default_learning_rate")]
    pub background_learning_rate: f32,
    /// |luma - background| above this is foreground.
    #[serde(default = "default_foreground_threshold")]
    pub foreground_threshold: f32,
    /// |luma(t) - luma(t-1)| above this counts as a changed pixel.
    #[serde(default = "default_motion_threshold")]
    pub motion_threshold: f32,
    /// Motion ratio at or above this marks the frame as mobile.
    #[serde(default = "default_mobility_threshold")]
    pub mobility_threshold: f32,
    /// Blobs smaller than this are noise, not a subject.
    #[serde(default = "default_min_subject_area")]
    pub min_subject_area: u32,
    /// Immobile runs shorter than this are not counted as bouts.
    #[serde(default = "default_min_bout_ms")]
    pub min_bout_ms: u64,
    /// Centroid jumps beyond this fraction of the zone diagonal are
    /// treated as re-detections rather than travelled distance.
    #[serde(default = "default_teleport_gate")]
    pub teleport_gate: f32,
    /// TTF/OTF file for overlay labels; labels are skipped when unset.
    #[serde(default)]
    pub label_font: Option<PathBuf>,
}

fn default_window_width() -> u32 {
    800
}

fn default_window_height() -> u32 {
    600
}

fn default_true() -> bool {
    true
}

fn default_warmup_frames() -> u32 {
    30
}

fn default_learning_rate() -> f32 {
    0.02
}

fn default_foreground_threshold() -> f32 {
    25.0
}

fn default_motion_threshold() -> f32 {
    15.0
}

fn default_mobility_threshold() -> f32 {
    0.05
}

fn default_min_subject_area() -> u32 {
    120
}

fn default_min_bout_ms() -> u64 {
    1000
}

fn default_teleport_gate() -> f32 {
    0.5
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            warmup_frames: default_warmup_frames(),
            background_learning_rate: default_learning_rate(),
            foreground_threshold: default_foreground_threshold(),
            motion_threshold: default_motion_threshold(),
            mobility_threshold: default_mobility_threshold(),
            min_subject_area: default_min_subject_area(),
            min_bout_ms: default_min_bout_ms(),
            teleport_gate: default_teleport_gate(),
            label_font: None,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            video_path: None,
            window_width: default_window_width(),
            window_height: default_window_height(),
            fps_display: true,
            draw_frames: true,
            frames: Vec::new(),
            analysis: AnalysisParams::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path:?}"))?;
        let mut config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {path:?}"))?;
        config.assign_colors();
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = fs::File::create(path)
            .with_context(|| format!("Failed to create config file {path:?}"))?;
        serde_json::to_writer_pretty(file, self)
            .with_context(|| format!("Failed to write config file {path:?}"))?;
        Ok(())
    }

    /// Fill in palette colours for zones that do not carry one.
    pub fn assign_colors(&mut self) {
        for (idx, zone) in self.frames.iter_mut().enumerate() {
            if zone.color.is_none() {
                zone.color = Some(palette::zone_color(idx));
            }
        }
    }

    /// Check the config is usable for an analysis run against a video of
    /// the given dimensions.
    pub fn validate_for_analysis(&self, frame_w: u32, frame_h: u32) -> Result<()> {
        if self.frames.is_empty() {
            bail!("No arena zones configured; add zones with the `zones` editor first");
        }

        for zone in &self.frames {
            if zone.name.trim().is_empty() {
                bail!("Arena zone with empty name");
            }
            if zone.top_left[0] >= zone.bottom_right[0]
                || zone.top_left[1] >= zone.bottom_right[1]
            {
                bail!("Arena zone {:?} has degenerate corners", zone.name);
            }
            let b = zone.bounds(frame_w, frame_h);
            if b.width() == 0 || b.height() == 0 {
                bail!(
                    "Arena zone {:?} lies outside the {}x{} frame",
                    zone.name,
                    frame_w,
                    frame_h
                );
            }
        }

        let p = &self.analysis;
        if p.warmup_frames == 0 {
            bail!("warmup_frames must be at least 1, the background model needs a seed frame");
        }
        if !(0.0..=1.0).contains(&p.mobility_threshold) {
            bail!("mobility_threshold must be within 0..=1");
        }
        if !(0.0..1.0).contains(&p.background_learning_rate) {
            bail!("background_learning_rate must be within 0..1");
        }
        if p.foreground_threshold <= 0.0 || p.motion_threshold <= 0.0 {
            bail!("foreground_threshold and motion_threshold must be positive");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A config the original tool would have written: no analysis section,
    // one zone without a colour.
    const LEGACY_CONFIG: &str = r#"{
        "video_path": "swim_test.mp4",
        "window_width": 800,
        "window_height": 600,
        "fps_display": true,
        "draw_frames": true,
        "frames": [
            {
                "name": "Cylinder_A",
                "top_left": [120, 80],
                "bottom_right": [440, 560],
                "rotation": 0
            },
            {
                "name": "Cylinder_B",
                "top_left": [500, 80],
                "bottom_right": [820, 560],
                "rotation": 0,
                "color": [10, 20, 30]
            }
        ]
    }"#;

    #[test]
    fn test_legacy_config_parses_with_defaults() {
        let mut config: AnalysisConfig = serde_json::from_str(LEGACY_CONFIG).unwrap();
        config.assign_colors();
        assert_eq!(config.frames.len(), 2);
        assert_eq!(config.analysis.warmup_frames, default_warmup_frames());
        assert_eq!(config.analysis.min_bout_ms, 1000);
    }

    #[test]
    fn test_color_backfill_only_fills_missing() {
        let mut config: AnalysisConfig = serde_json::from_str(LEGACY_CONFIG).unwrap();
        config.assign_colors();
        assert_eq!(config.frames[0].color, Some(palette::zone_color(0)));
        assert_eq!(config.frames[1].color, Some([10, 20, 30]));
    }

    #[test]
    fn test_validate_rejects_empty_zones() {
        let config = AnalysisConfig::default();
        assert!(config.validate_for_analysis(1280, 720).is_err());
    }

    #[test]
    fn test_validate_rejects_degenerate_zone() {
        let mut config = AnalysisConfig::default();
        config
            .frames
            .push(ArenaZone::new("bad", [100, 100], [100, 300]));
        assert!(config.validate_for_analysis(1280, 720).is_err());
    }

    #[test]
    fn test_validate_rejects_offscreen_zone() {
        let mut config = AnalysisConfig::default();
        config
            .frames
            .push(ArenaZone::new("gone", [2000, 100], [2400, 300]));
        assert!(config.validate_for_analysis(1280, 720).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_warmup() {
        let mut config: AnalysisConfig = serde_json::from_str(LEGACY_CONFIG).unwrap();
        config.analysis.warmup_frames = 0;
        assert!(config.validate_for_analysis(1280, 720).is_err());
    }

    #[test]
    fn test_validate_accepts_good_config() {
        let mut config: AnalysisConfig = serde_json::from_str(LEGACY_CONFIG).unwrap();
        config.assign_colors();
        assert!(config.validate_for_analysis(1280, 720).is_ok());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut config: AnalysisConfig = serde_json::from_str(LEGACY_CONFIG).unwrap();
        config.assign_colors();

        let path = std::env::temp_dir().join("mobility_config_roundtrip.json");
        config.save(&path).unwrap();
        let loaded = AnalysisConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.frames, config.frames);
        assert_eq!(loaded.window_width, config.window_width);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let result = AnalysisConfig::load(Path::new("/definitely/not/here.json"));
        assert!(result.is_err());
    }
}
