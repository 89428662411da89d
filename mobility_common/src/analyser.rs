//! Session orchestration: feeds each decoded frame through segmentation,
//! blob extraction, tracking and scoring for every arena zone.

use std::time::Instant;

use anyhow::{bail, Result};
use image::GrayImage;

use crate::arena::{ArenaZone, ZoneMask};
use crate::blob;
use crate::config::AnalysisParams;
use crate::frame_meta::{FrameMeta, SubjectSample};
use crate::frame_times::FrameTimes;
use crate::mobility::{MobilityAccumulator, MobilityParams};
use crate::report::SubjectReport;
use crate::segmentation::BackgroundModel;
use crate::tracker::SubjectTrack;

struct ZoneState {
    zone: ArenaZone,
    mask: ZoneMask,
    track: SubjectTrack,
    score: MobilityAccumulator,
    prev_fg: Option<GrayImage>,
}

pub struct MobilityAnalyser {
    params: AnalysisParams,
    width: u32,
    height: u32,
    zones: Vec<ZoneState>,
    background: BackgroundModel,
    prev_luma: Option<GrayImage>,
    frame_index: u64,
}

impl MobilityAnalyser {
    pub fn new(
        zones: &[ArenaZone],
        width: u32,
        height: u32,
        params: AnalysisParams,
    ) -> Result<Self> {
        if zones.is_empty() {
            bail!("No arena zones configured");
        }

        let mut states = Vec::with_capacity(zones.len());
        for zone in zones {
            let mask = ZoneMask::build(zone, width, height);
            if mask.area() == 0 {
                bail!("Arena zone {:?} covers no pixels of the frame", zone.name);
            }
            let gate_px = zone.diagonal() * params.teleport_gate;
            states.push(ZoneState {
                zone: zone.clone(),
                mask,
                track: SubjectTrack::new(gate_px),
                score: MobilityAccumulator::new(MobilityParams {
                    mobility_threshold: params.mobility_threshold,
                    min_bout_ms: params.min_bout_ms,
                }),
                prev_fg: None,
            });
        }

        let background = BackgroundModel::new(width, height, params.background_learning_rate);

        Ok(Self {
            params,
            width,
            height,
            zones: states,
            background,
            prev_luma: None,
            frame_index: 0,
        })
    }

    pub fn zones(&self) -> impl Iterator<Item = &ArenaZone> {
        self.zones.iter().map(|s| &s.zone)
    }

    pub fn frames_analysed(&self) -> u64 {
        self.frame_index.saturating_sub(self.params.warmup_frames as u64)
    }

    pub fn is_warming_up(&self) -> bool {
        self.frame_index < self.params.warmup_frames as u64
    }

    /// Advance the session by one grayscale frame.
    pub fn process_frame(
        &mut self,
        luma: &GrayImage,
        pts_ms: u64,
        times: &mut FrameTimes,
    ) -> FrameMeta {
        debug_assert_eq!(luma.width(), self.width);
        debug_assert_eq!(luma.height(), self.height);

        let frame = self.frame_index;
        let warming_up = self.is_warming_up();
        self.frame_index += 1;

        if warming_up {
            let start = Instant::now();
            self.background.observe(luma, &[]);
            times.segmentation += start.elapsed();
            self.prev_luma = Some(luma.clone());

            let samples = self
                .zones
                .iter()
                .map(|s| SubjectSample::absent(&s.zone.name))
                .collect();
            return FrameMeta {
                frame,
                pts_ms,
                samples,
            };
        }

        let mut fg_global = vec![false; (self.width * self.height) as usize];
        let mut samples = Vec::with_capacity(self.zones.len());

        for state in &mut self.zones {
            let start = Instant::now();
            let fg = self.background.foreground_mask(
                luma,
                &state.mask,
                self.params.foreground_threshold,
            );
            times.segmentation += start.elapsed();

            let start = Instant::now();
            let blobs = blob::extract_blobs(&fg);
            let subject = blob::largest_blob(&blobs, self.params.min_subject_area).cloned();
            times.blob_extraction += start.elapsed();

            let start = Instant::now();
            let b = state.mask.bounds;

            // Union the zone foreground into the full-frame mask so the
            // background model keeps adapting slowly under the subject.
            for y in 0..b.height() {
                for x in 0..b.width() {
                    if fg.get_pixel(x, y).0[0] != 0 {
                        let idx = ((b.y0 + y) * self.width + (b.x0 + x)) as usize;
                        fg_global[idx] = true;
                    }
                }
            }

            let sample = match subject {
                None => {
                    state.track.update(None);
                    SubjectSample::absent(&state.zone.name)
                }
                Some(subject) => {
                    let motion_ratio = match (&self.prev_luma, &state.prev_fg) {
                        (Some(prev_luma), prev_fg) => motion_ratio(
                            luma,
                            prev_luma,
                            &fg,
                            prev_fg.as_ref(),
                            &state.mask,
                            subject.area,
                            self.params.motion_threshold,
                        ),
                        (None, _) => 0.0,
                    };

                    let centroid = (
                        b.x0 as f32 + subject.centroid.0,
                        b.y0 as f32 + subject.centroid.1,
                    );
                    state.track.update(Some(centroid));

                    SubjectSample {
                        zone: state.zone.name.clone(),
                        present: true,
                        centroid: Some(centroid),
                        area: subject.area,
                        motion_ratio,
                        mobile: state.score.is_mobile(motion_ratio),
                    }
                }
            };

            state.score.record(pts_ms, &sample);
            state.prev_fg = Some(fg);
            times.scoring += start.elapsed();

            samples.push(sample);
        }

        let start = Instant::now();
        self.background.observe(luma, &fg_global);
        times.segmentation += start.elapsed();
        self.prev_luma = Some(luma.clone());

        FrameMeta {
            frame,
            pts_ms,
            samples,
        }
    }

    /// Per-subject reports with any open immobility run closed at its
    /// last immobile frame.
    pub fn reports(&self) -> Vec<SubjectReport> {
        self.zones
            .iter()
            .map(|s| s.score.report(&s.zone.name, s.track.path_length_px()))
            .collect()
    }
}

/// Changed pixels over the subject blob's area. Change is measured
/// against the previous frame within the union of the current and previous
/// foreground, so water ripples outside the subject do not count; sub-floor
/// noise blobs in the zone do not dilute the ratio either.
fn motion_ratio(
    luma: &GrayImage,
    prev_luma: &GrayImage,
    fg: &GrayImage,
    prev_fg: Option<&GrayImage>,
    mask: &ZoneMask,
    subject_area: u32,
    motion_threshold: f32,
) -> f32 {
    let b = mask.bounds;
    let mut changed = 0u32;

    for y in 0..b.height() {
        for x in 0..b.width() {
            if !mask.get(x, y) {
                continue;
            }
            let in_fg = fg.get_pixel(x, y).0[0] != 0;
            let in_prev = prev_fg.map(|m| m.get_pixel(x, y).0[0] != 0).unwrap_or(false);
            if !(in_fg || in_prev) {
                continue;
            }
            let (fx, fy) = (b.x0 + x, b.y0 + y);
            let now = luma.get_pixel(fx, fy).0[0] as f32;
            let before = prev_luma.get_pixel(fx, fy).0[0] as f32;
            if (now - before).abs() > motion_threshold {
                changed += 1;
            }
        }
    }

    changed as f32 / subject_area.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_meta::FrameMeta;

    const W: u32 = 80;
    const H: u32 = 60;

    fn params() -> AnalysisParams {
        AnalysisParams {
            warmup_frames: 2,
            min_subject_area: 20,
            min_bout_ms: 300,
            ..Default::default()
        }
    }

    fn zone() -> ArenaZone {
        ArenaZone::new("tank", [0, 0], [79, 59])
    }

    fn frame_with_square(x0: u32, y0: u32) -> GrayImage {
        let mut img = GrayImage::from_pixel(W, H, image::Luma([200]));
        for y in y0..y0 + 8 {
            for x in x0..x0 + 8 {
                img.put_pixel(x, y, image::Luma([30]));
            }
        }
        img
    }

    fn step(analyser: &mut MobilityAnalyser, img: &GrayImage, pts: u64) -> FrameMeta {
        let mut times = FrameTimes::default();
        analyser.process_frame(img, pts, &mut times)
    }

    #[test]
    fn test_rejects_empty_zone_list() {
        assert!(MobilityAnalyser::new(&[], W, H, params()).is_err());
    }

    #[test]
    fn test_rejects_offscreen_zone() {
        let z = ArenaZone::new("off", [500, 500], [600, 600]);
        assert!(MobilityAnalyser::new(&[z], W, H, params()).is_err());
    }

    #[test]
    fn test_warmup_frames_report_absent() {
        let mut a = MobilityAnalyser::new(&[zone()], W, H, params()).unwrap();
        let bg = GrayImage::from_pixel(W, H, image::Luma([200]));
        let meta = step(&mut a, &bg, 0);
        assert!(a.is_warming_up());
        assert!(!meta.samples[0].present);
    }

    #[test]
    fn test_subject_detected_after_warmup() {
        let mut a = MobilityAnalyser::new(&[zone()], W, H, params()).unwrap();
        let bg = GrayImage::from_pixel(W, H, image::Luma([200]));
        step(&mut a, &bg, 0);
        step(&mut a, &bg, 33);

        let meta = step(&mut a, &frame_with_square(20, 20), 66);
        let s = &meta.samples[0];
        assert!(s.present);
        assert_eq!(s.area, 64);
        let c = s.centroid.unwrap();
        assert!((c.0 - 23.5).abs() < 0.6 && (c.1 - 23.5).abs() < 0.6);
    }

    #[test]
    fn test_moving_subject_is_mobile() {
        let mut a = MobilityAnalyser::new(&[zone()], W, H, params()).unwrap();
        let bg = GrayImage::from_pixel(W, H, image::Luma([200]));
        step(&mut a, &bg, 0);
        step(&mut a, &bg, 33);

        step(&mut a, &frame_with_square(20, 20), 66);
        let meta = step(&mut a, &frame_with_square(24, 20), 99);
        let s = &meta.samples[0];
        assert!(s.present);
        assert!(s.motion_ratio > 0.3);
        assert!(s.mobile);
    }

    #[test]
    fn test_noise_blob_does_not_dilute_motion_ratio() {
        let mut a = MobilityAnalyser::new(&[zone()], W, H, params()).unwrap();
        let bg = GrayImage::from_pixel(W, H, image::Luma([200]));
        step(&mut a, &bg, 0);
        step(&mut a, &bg, 33);

        // A static 3x3 speck below the subject area floor shares the zone
        // with the subject.
        let with_speck = |x0: u32| {
            let mut img = frame_with_square(x0, 20);
            for y in 50..53 {
                for x in 60..63 {
                    img.put_pixel(x, y, image::Luma([30]));
                }
            }
            img
        };

        step(&mut a, &with_speck(20), 66);
        let meta = step(&mut a, &with_speck(28), 99);
        let s = &meta.samples[0];
        assert!(s.present);
        assert_eq!(s.area, 64);
        // Full displacement: 64 vacated + 64 occupied pixels over the 8x8
        // subject. The speck's foreground pixels must not pad the
        // denominator.
        assert!(
            (s.motion_ratio - 2.0).abs() < 0.05,
            "motion_ratio = {}",
            s.motion_ratio
        );
    }

    #[test]
    fn test_static_subject_is_immobile_and_bouts() {
        let mut a = MobilityAnalyser::new(&[zone()], W, H, params()).unwrap();
        let bg = GrayImage::from_pixel(W, H, image::Luma([200]));
        step(&mut a, &bg, 0);
        step(&mut a, &bg, 33);

        // Same position for half a second of video time.
        let mut pts = 66;
        for _ in 0..15 {
            let meta = step(&mut a, &frame_with_square(30, 20), pts);
            pts += 33;
            let s = &meta.samples[0];
            assert!(s.present);
        }

        let reports = a.reports();
        assert_eq!(reports.len(), 1);
        let r = &reports[0];
        assert!(r.immobile_frames >= 13, "immobile = {}", r.immobile_frames);
        assert_eq!(r.immobility_bouts, 1);
        assert!(r.longest_bout_ms >= 300);
    }

    #[test]
    fn test_two_zones_scored_independently() {
        let left = ArenaZone::new("left", [0, 0], [39, 59]);
        let right = ArenaZone::new("right", [40, 0], [79, 59]);
        let mut a = MobilityAnalyser::new(&[left, right], W, H, params()).unwrap();
        let bg = GrayImage::from_pixel(W, H, image::Luma([200]));
        step(&mut a, &bg, 0);
        step(&mut a, &bg, 33);

        // Subject only in the left zone.
        let meta = step(&mut a, &frame_with_square(10, 20), 66);
        assert!(meta.samples[0].present);
        assert!(!meta.samples[1].present);
    }

    #[test]
    fn test_path_length_tracks_movement() {
        let mut a = MobilityAnalyser::new(&[zone()], W, H, params()).unwrap();
        let bg = GrayImage::from_pixel(W, H, image::Luma([200]));
        step(&mut a, &bg, 0);
        step(&mut a, &bg, 33);

        step(&mut a, &frame_with_square(20, 20), 66);
        step(&mut a, &frame_with_square(24, 20), 99);
        step(&mut a, &frame_with_square(28, 20), 132);

        let reports = a.reports();
        assert!((reports[0].path_length_px - 8.0).abs() < 0.5);
    }
}
