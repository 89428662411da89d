//! Overlay rendering for annotated output video.
//!
//! Zones are drawn as rotated outlines with a translucent fill, the way
//! the zone editor presents them, plus a centroid marker and a
//! mobile/immobile status patch per subject.

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_cross_mut, draw_line_segment_mut, draw_text_mut};
use imageproc::rect::Rect;

use crate::arena::ArenaZone;
use crate::frame_meta::FrameMeta;

const FILL_ALPHA: f32 = 0.3;
const STATUS_PATCH: u32 = 8;

const MOBILE_COLOR: Rgb<u8> = Rgb([40, 230, 70]);
const IMMOBILE_COLOR: Rgb<u8> = Rgb([230, 60, 40]);
const ABSENT_COLOR: Rgb<u8> = Rgb([140, 140, 140]);

pub struct Annotator {
    font: Option<FontVec>,
}

impl Annotator {
    pub fn new(font: Option<FontVec>) -> Self {
        Self { font }
    }

    /// Build from an optional font path; a missing or invalid font only
    /// disables labels.
    pub fn from_font_path(path: Option<&Path>) -> Self {
        let font = path.and_then(|p| match load_label_font(p) {
            Ok(font) => Some(font),
            Err(err) => {
                log::warn!("Label font unusable, drawing without labels: {err:#}");
                None
            }
        });
        Self { font }
    }

    pub fn annotate(&self, img: &mut RgbImage, zones: &[ArenaZone], meta: &FrameMeta) {
        for (zone, sample) in zones.iter().zip(&meta.samples) {
            let color = Rgb(zone.color.unwrap_or([255, 255, 255]));

            fill_zone(img, zone, color);
            outline_zone(img, zone, color);

            let status = if !sample.present {
                ABSENT_COLOR
            } else if sample.mobile {
                MOBILE_COLOR
            } else {
                IMMOBILE_COLOR
            };
            status_patch(img, zone, status);

            if let Some((cx, cy)) = sample.centroid {
                draw_cross_mut(img, Rgb([255, 255, 255]), cx as i32, cy as i32);
                draw_cross_mut(img, status, cx as i32 + 1, cy as i32);
            }

            if let Some(font) = &self.font {
                let (lx, ly) = zone.center();
                draw_text_mut(
                    img,
                    Rgb([255, 255, 255]),
                    lx as i32,
                    ly as i32,
                    PxScale::from(18.0),
                    font,
                    &zone.name,
                );
            }
        }
    }
}

pub fn load_label_font(path: &Path) -> Result<FontVec> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read label font {path:?}"))?;
    FontVec::try_from_vec(bytes).with_context(|| format!("Failed to parse label font {path:?}"))
}

fn outline_zone(img: &mut RgbImage, zone: &ArenaZone, color: Rgb<u8>) {
    let corners = zone.corners();
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        draw_line_segment_mut(img, a, b, color);
    }
}

fn fill_zone(img: &mut RgbImage, zone: &ArenaZone, color: Rgb<u8>) {
    let b = zone.bounds(img.width(), img.height());
    for y in b.y0..b.y1 {
        for x in b.x0..b.x1 {
            if !zone.contains(x as f32 + 0.5, y as f32 + 0.5) {
                continue;
            }
            let px = img.get_pixel_mut(x, y);
            for c in 0..3 {
                px.0[c] = ((1.0 - FILL_ALPHA) * px.0[c] as f32
                    + FILL_ALPHA * color.0[c] as f32) as u8;
            }
        }
    }
}

fn status_patch(img: &mut RgbImage, zone: &ArenaZone, color: Rgb<u8>) {
    let b = zone.bounds(img.width(), img.height());
    if b.width() < STATUS_PATCH || b.height() < STATUS_PATCH {
        return;
    }
    let rect = Rect::at(b.x0 as i32, b.y0 as i32).of_size(STATUS_PATCH, STATUS_PATCH);
    imageproc::drawing::draw_filled_rect_mut(img, rect, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_meta::SubjectSample;

    fn zone() -> ArenaZone {
        let mut z = ArenaZone::new("tank", [20, 20], [60, 60]);
        z.color = Some([0, 200, 255]);
        z
    }

    fn meta(sample: SubjectSample) -> FrameMeta {
        FrameMeta {
            frame: 0,
            pts_ms: 0,
            samples: vec![sample],
        }
    }

    #[test]
    fn test_fill_blends_interior() {
        let mut img = RgbImage::from_pixel(100, 100, Rgb([100, 100, 100]));
        let annotator = Annotator::new(None);
        annotator.annotate(&mut img, &[zone()], &meta(SubjectSample::absent("tank")));

        // Interior pixel moved toward the zone colour.
        let inside = img.get_pixel(40, 40);
        assert_ne!(inside, &Rgb([100, 100, 100]));
        // Far outside pixel untouched.
        assert_eq!(img.get_pixel(90, 90), &Rgb([100, 100, 100]));
    }

    #[test]
    fn test_status_patch_reflects_mobility() {
        let sample = SubjectSample {
            zone: "tank".into(),
            present: true,
            centroid: Some((40.0, 40.0)),
            area: 50,
            motion_ratio: 0.2,
            mobile: true,
        };
        let mut img = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        Annotator::new(None).annotate(&mut img, &[zone()], &meta(sample));
        assert_eq!(img.get_pixel(22, 22), &MOBILE_COLOR);
    }

    #[test]
    fn test_absent_subject_has_no_centroid_marker() {
        let mut img = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        Annotator::new(None).annotate(&mut img, &[zone()], &meta(SubjectSample::absent("tank")));
        assert_eq!(img.get_pixel(22, 22), &ABSENT_COLOR);
    }

    #[test]
    fn test_missing_font_is_not_fatal() {
        let annotator = Annotator::from_font_path(Some(Path::new("/no/such/font.ttf")));
        let mut img = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        annotator.annotate(&mut img, &[zone()], &meta(SubjectSample::absent("tank")));
    }
}
