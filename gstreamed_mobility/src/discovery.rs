//! Media discovery via gstreamer-pbutils.

use std::path::Path;

use anyhow::{bail, Context, Result};
use gstreamer as gst;
use gstreamer_pbutils::prelude::*;
use gstreamer_pbutils::Discoverer;

/// Properties of an input video file.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub duration_ms: u64,
}

impl FileInfo {
    pub fn estimated_frames(&self) -> u64 {
        (self.duration_ms as f64 / 1000.0 * self.fps).round() as u64
    }
}

/// Discover resolution, framerate and duration of a local video file.
pub fn discover(input: &Path) -> Result<FileInfo> {
    if !input.exists() {
        bail!("Video file not found: {input:?}");
    }

    let path = input
        .canonicalize()
        .with_context(|| format!("Failed to resolve path {input:?}"))?;
    let uri = format!("file://{}", path.display());

    let discoverer = Discoverer::new(gst::ClockTime::from_seconds(10))
        .context("Failed to create media discoverer")?;
    let info = discoverer
        .discover_uri(&uri)
        .with_context(|| format!("Failed to discover media properties of {input:?}"))?;

    let video_streams = info.video_streams();
    let video = video_streams
        .first()
        .with_context(|| format!("No video stream in {input:?}"))?;

    let framerate = video.framerate();
    let fps = if framerate.denom() > 0 {
        framerate.numer() as f64 / framerate.denom() as f64
    } else {
        0.0
    };

    Ok(FileInfo {
        width: video.width(),
        height: video.height(),
        fps,
        duration_ms: info.duration().map(|d| d.mseconds()).unwrap_or(0),
    })
}
