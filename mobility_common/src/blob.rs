//! Connected-component extraction over a zone's foreground mask.

use image::GrayImage;
use imageproc::region_labelling::{connected_components, Connectivity};

/// A connected foreground region, coordinates local to the zone bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub area: u32,
    pub centroid: (f32, f32),
    /// (x0, y0, x1, y1), exclusive upper corner.
    pub bbox: (u32, u32, u32, u32),
}

/// Label a binary mask (0/255) and collect per-component stats.
pub fn extract_blobs(mask: &GrayImage) -> Vec<Blob> {
    let labelled = connected_components(mask, Connectivity::Eight, image::Luma([0u8]));

    #[derive(Clone)]
    struct Accum {
        area: u32,
        sum_x: u64,
        sum_y: u64,
        min_x: u32,
        min_y: u32,
        max_x: u32,
        max_y: u32,
    }

    let mut accums: Vec<Option<Accum>> = Vec::new();

    for (x, y, px) in labelled.enumerate_pixels() {
        let label = px.0[0] as usize;
        if label == 0 {
            continue;
        }
        if accums.len() < label {
            accums.resize(label, None);
        }
        let entry = accums[label - 1].get_or_insert(Accum {
            area: 0,
            sum_x: 0,
            sum_y: 0,
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        });
        entry.area += 1;
        entry.sum_x += x as u64;
        entry.sum_y += y as u64;
        entry.min_x = entry.min_x.min(x);
        entry.min_y = entry.min_y.min(y);
        entry.max_x = entry.max_x.max(x);
        entry.max_y = entry.max_y.max(y);
    }

    accums
        .into_iter()
        .flatten()
        .map(|a| Blob {
            area: a.area,
            centroid: (
                a.sum_x as f32 / a.area as f32,
                a.sum_y as f32 / a.area as f32,
            ),
            bbox: (a.min_x, a.min_y, a.max_x + 1, a.max_y + 1),
        })
        .collect()
}

/// The subject candidate: largest blob at or above the area floor.
pub fn largest_blob(blobs: &[Blob], min_area: u32) -> Option<&Blob> {
    blobs
        .iter()
        .filter(|b| b.area >= min_area)
        .max_by_key(|b| b.area)
}
