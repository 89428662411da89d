//! Mobility scoring: motion ratios, mobile/immobile classification and
//! immobility bouts.
//!
//! The per-frame measure is classic forced-swim frame differencing: the
//! fraction of subject pixels that changed since the previous frame. An
//! immobility bout is a maximal run of immobile frames spanning at least
//! `min_bout_ms` of video time, measured between the timestamps of the
//! first and last immobile frame of the run.

use serde::{Deserialize, Serialize};

use crate::frame_meta::SubjectSample;
use crate::report::SubjectReport;

#[derive(Debug, Clone, Copy)]
pub struct MobilityParams {
    pub mobility_threshold: f32,
    pub min_bout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoutSpan {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl BoutSpan {
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

/// Per-zone accumulator fed one sample per processed frame.
#[derive(Debug, Clone)]
pub struct MobilityAccumulator {
    params: MobilityParams,
    frames_present: u64,
    frames_missing: u64,
    mobile_frames: u64,
    immobile_frames: u64,
    motion_ratio_sum: f64,
    bouts: Vec<BoutSpan>,
    open_run: Option<BoutSpan>,
}

impl MobilityAccumulator {
    pub fn new(params: MobilityParams) -> Self {
        Self {
            params,
            frames_present: 0,
            frames_missing: 0,
            mobile_frames: 0,
            immobile_frames: 0,
            motion_ratio_sum: 0.0,
            bouts: Vec::new(),
            open_run: None,
        }
    }

    /// Classify a raw motion ratio.
    pub fn is_mobile(&self, motion_ratio: f32) -> bool {
        motion_ratio >= self.params.mobility_threshold
    }

    pub fn record(&mut self, pts_ms: u64, sample: &SubjectSample) {
        if !sample.present {
            self.frames_missing += 1;
            // A lost subject breaks the run; we cannot attest immobility
            // while the segmentation has no subject.
            self.close_run();
            return;
        }

        self.frames_present += 1;
        self.motion_ratio_sum += sample.motion_ratio as f64;

        if sample.mobile {
            self.mobile_frames += 1;
            self.close_run();
        } else {
            self.immobile_frames += 1;
            match self.open_run.as_mut() {
                Some(run) => run.end_ms = pts_ms,
                None => {
                    self.open_run = Some(BoutSpan {
                        start_ms: pts_ms,
                        end_ms: pts_ms,
                    });
                }
            }
        }
    }

    fn close_run(&mut self) {
        if let Some(run) = self.open_run.take() {
            if run.duration_ms() >= self.params.min_bout_ms {
                self.bouts.push(run);
            }
        }
    }

    /// Finalised bouts plus any open run, closed at its last immobile
    /// frame, without consuming the accumulator (the pipeline callback
    /// still owns it while the report is written).
    pub fn bouts(&self) -> Vec<BoutSpan> {
        let mut bouts = self.bouts.clone();
        if let Some(run) = &self.open_run {
            if run.duration_ms() >= self.params.min_bout_ms {
                bouts.push(run.clone());
            }
        }
        bouts
    }

    pub fn report(&self, zone: &str, path_length_px: f32) -> SubjectReport {
        let bouts = self.bouts();
        let scored = self.mobile_frames + self.immobile_frames;
        let pct = |n: u64| {
            if scored == 0 {
                0.0
            } else {
                n as f32 / scored as f32 * 100.0
            }
        };

        SubjectReport {
            zone: zone.to_string(),
            frames_present: self.frames_present,
            frames_missing: self.frames_missing,
            mobile_frames: self.mobile_frames,
            immobile_frames: self.immobile_frames,
            mobility_percent: pct(self.mobile_frames),
            immobility_percent: pct(self.immobile_frames),
            immobility_bouts: bouts.len(),
            longest_bout_ms: bouts.iter().map(BoutSpan::duration_ms).max().unwrap_or(0),
            total_immobile_ms: bouts.iter().map(BoutSpan::duration_ms).sum(),
            mean_motion_ratio: if self.frames_present == 0 {
                0.0
            } else {
                (self.motion_ratio_sum / self.frames_present as f64) as f32
            },
            path_length_px,
            bouts,
        }
    }
}
