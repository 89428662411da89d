//! Per-frame stage timings and their aggregation.

use std::time::Duration;

#[derive(Debug, Default, Clone, Copy)]
pub struct FrameTimes {
    pub buffer_to_image: Duration,
    pub segmentation: Duration,
    pub blob_extraction: Duration,
    pub scoring: Duration,
    pub annotation: Duration,
    pub image_to_buffer: Duration,
}

impl FrameTimes {
    pub fn total(&self) -> Duration {
        self.buffer_to_image
            + self.segmentation
            + self.blob_extraction
            + self.scoring
            + self.annotation
            + self.image_to_buffer
    }
}

#[derive(Debug, Default)]
pub struct AggregatedTimes {
    frames: Vec<FrameTimes>,
}

impl AggregatedTimes {
    pub fn push(&mut self, times: FrameTimes) {
        self.frames.push(times);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn window(&self, skip_first: bool) -> &[FrameTimes] {
        if skip_first && self.frames.len() > 1 {
            &self.frames[1..]
        } else {
            &self.frames
        }
    }

    /// Average stage times. `skip_first` drops the first frame, which pays
    /// one-off allocation and model-init costs.
    pub fn avg(&self, skip_first: bool) -> FrameTimes {
        let window = self.window(skip_first);
        if window.is_empty() {
            return FrameTimes::default();
        }
        let n = window.len() as u32;
        let mut sum = FrameTimes::default();
        for ft in window {
            sum.buffer_to_image += ft.buffer_to_image;
            sum.segmentation += ft.segmentation;
            sum.blob_extraction += ft.blob_extraction;
            sum.scoring += ft.scoring;
            sum.annotation += ft.annotation;
            sum.image_to_buffer += ft.image_to_buffer;
        }
        FrameTimes {
            buffer_to_image: sum.buffer_to_image / n,
            segmentation: sum.segmentation / n,
            blob_extraction: sum.blob_extraction / n,
            scoring: sum.scoring / n,
            annotation: sum.annotation / n,
            image_to_buffer: sum.image_to_buffer / n,
        }
    }

    pub fn min(&self, skip_first: bool) -> FrameTimes {
        self.fold(skip_first, Duration::MAX, |a, b| a.min(b))
    }

    pub fn max(&self, skip_first: bool) -> FrameTimes {
        self.fold(skip_first, Duration::ZERO, |a, b| a.max(b))
    }

    fn fold(
        &self,
        skip_first: bool,
        init: Duration,
        pick: fn(Duration, Duration) -> Duration,
    ) -> FrameTimes {
        let window = self.window(skip_first);
        if window.is_empty() {
            return FrameTimes::default();
        }
        let mut out = FrameTimes {
            buffer_to_image: init,
            segmentation: init,
            blob_extraction: init,
            scoring: init,
            annotation: init,
            image_to_buffer: init,
        };
        for ft in window {
            out.buffer_to_image = pick(out.buffer_to_image, ft.buffer_to_image);
            out.segmentation = pick(out.segmentation, ft.segmentation);
            out.blob_extraction = pick(out.blob_extraction, ft.blob_extraction);
            out.scoring = pick(out.scoring, ft.scoring);
            out.annotation = pick(out.annotation, ft.annotation);
            out.image_to_buffer = pick(out.image_to_buffer, ft.image_to_buffer);
        }
        out
    }
}
