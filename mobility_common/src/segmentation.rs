//! Background modelling and per-zone foreground extraction.
//!
//! The background is a per-pixel running average of the grayscale frames.
//! Foreground pixels are updated with a much smaller weight so a floating,
//! immobile subject is not absorbed into the water background.

use image::GrayImage;

use crate::arena::ZoneMask;

pub struct BackgroundModel {
    width: u32,
    height: u32,
    acc: Vec<f32>,
    learning_rate: f32,
    frames_seen: u64,
}

impl BackgroundModel {
    pub fn new(width: u32, height: u32, learning_rate: f32) -> Self {
        Self {
            width,
            height,
            acc: vec![0.0; (width * height) as usize],
            learning_rate,
            frames_seen: 0,
        }
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    /// Fold a frame into the model. `foreground` marks full-frame pixel
    /// indices that should adapt slowly; pass an empty slice during warmup.
    pub fn observe(&mut self, luma: &GrayImage, foreground: &[bool]) {
        debug_assert_eq!(luma.width(), self.width);
        debug_assert_eq!(luma.height(), self.height);

        let samples = luma.as_raw();
        if self.frames_seen == 0 {
            for (dst, &src) in self.acc.iter_mut().zip(samples.iter()) {
                *dst = src as f32;
            }
        } else {
            let alpha = self.learning_rate;
            // Foreground pixels adapt an order of magnitude slower.
            let fg_alpha = alpha * 0.1;
            for (idx, (dst, &src)) in self.acc.iter_mut().zip(samples.iter()).enumerate() {
                let a = if foreground.get(idx).copied().unwrap_or(false) {
                    fg_alpha
                } else {
                    alpha
                };
                *dst += a * (src as f32 - *dst);
            }
        }
        self.frames_seen += 1;
    }

    pub fn value(&self, x: u32, y: u32) -> f32 {
        self.acc[(y * self.width + x) as usize]
    }

    /// Binary foreground mask over a zone's bounds (255 = subject pixel).
    pub fn foreground_mask(
        &self,
        luma: &GrayImage,
        mask: &ZoneMask,
        threshold: f32,
    ) -> GrayImage {
        let b = mask.bounds;
        let (w, h) = (b.width(), b.height());
        let mut out = GrayImage::new(w, h);

        // Until the model has seen a frame the accumulator is all zeros
        // and would mark the whole zone as subject.
        if self.frames_seen == 0 {
            return out;
        }

        for y in 0..h {
            for x in 0..w {
                if !mask.get(x, y) {
                    continue;
                }
                let (fx, fy) = (b.x0 + x, b.y0 + y);
                let sample = luma.get_pixel(fx, fy).0[0] as f32;
                if (sample - self.value(fx, fy)).abs() > threshold {
                    out.put_pixel(x, y, image::Luma([255]));
                }
            }
        }

        out
    }
}
