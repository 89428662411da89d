//! Per-subject and per-session analysis reports.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::mobility::BoutSpan;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectReport {
    pub zone: String,
    pub frames_present: u64,
    pub frames_missing: u64,
    pub mobile_frames: u64,
    pub immobile_frames: u64,
    /// Of scored (present) frames.
    pub mobility_percent: f32,
    pub immobility_percent: f32,
    pub immobility_bouts: usize,
    pub longest_bout_ms: u64,
    pub total_immobile_ms: u64,
    pub mean_motion_ratio: f32,
    pub path_length_px: f32,
    pub bouts: Vec<BoutSpan>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionReport {
    pub input_file: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub duration_ms: u64,
    pub frames_analysed: u64,
    pub subjects: Vec<SubjectReport>,
}

impl SessionReport {
    pub fn export_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create report file {path:?}"))?;
        serde_json::to_writer_pretty(file, self)
            .with_context(|| format!("Failed to write report file {path:?}"))?;
        Ok(())
    }

    /// One summary line per subject through the logger.
    pub fn log_summary(&self) {
        log::info!(
            "Session: {:?} | {}x{} @ {:.2} fps | {} frames analysed",
            self.input_file,
            self.width,
            self.height,
            self.fps,
            self.frames_analysed
        );
        for s in &self.subjects {
            log::info!(
                "{}: immobility {:.1}% ({} bouts, longest {} ms, total {} ms) | \
                 mobility {:.1}% | path {:.0} px | missing {} frames",
                s.zone,
                s.immobility_percent,
                s.immobility_bouts,
                s.longest_bout_ms,
                s.total_immobile_ms,
                s.mobility_percent,
                s.path_length_px,
                s.frames_missing
            );
        }
    }
}
