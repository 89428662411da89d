//! gstreamer pipeline construction.
//!
//! Decodes the input into raw RGB frames, hands every buffer to the
//! analysis callback through a pad probe (which overwrites the buffer
//! with the annotated image), then encodes the result and/or plays it
//! back live.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use gstreamer as gst;
use gstreamer::prelude::*;

fn make_element(factory: &str) -> Result<gst::Element> {
    gst::ElementFactory::make(factory)
        .build()
        .with_context(|| format!("Failed to create gstreamer element {factory:?}"))
}

/// Build the analysis pipeline.
///
/// `callback` runs once per decoded frame with a mutable RGB buffer;
/// whatever it writes back is what gets encoded/played downstream.
pub fn build_pipeline<F>(
    input: &Path,
    output: Option<&Path>,
    live_playback: bool,
    callback: F,
) -> Result<gst::Pipeline>
where
    F: FnMut(&mut gst::Buffer) + Send + 'static,
{
    let pipeline = gst::Pipeline::new();

    let filesrc = gst::ElementFactory::make("filesrc")
        .property("location", input.to_str().context("Non-UTF8 input path")?)
        .build()
        .context("Failed to create filesrc")?;
    let decodebin = make_element("decodebin")?;
    let convert_in = make_element("videoconvert")?;
    let capsfilter = gst::ElementFactory::make("capsfilter")
        .property(
            "caps",
            gstreamer_video::VideoCapsBuilder::new()
                .format(gstreamer_video::VideoFormat::Rgb)
                .build(),
        )
        .build()
        .context("Failed to create capsfilter")?;

    pipeline.add_many([&filesrc, &decodebin, &convert_in, &capsfilter])?;
    gst::Element::link_many([&filesrc, &decodebin])?;
    gst::Element::link_many([&convert_in, &capsfilter])?;

    // decodebin exposes its source pads only once the stream is typed.
    let convert_sink = convert_in
        .static_pad("sink")
        .context("videoconvert has no sink pad")?;
    decodebin.connect_pad_added(move |_, src_pad| {
        let is_video = src_pad
            .current_caps()
            .and_then(|caps| caps.structure(0).map(|s| s.name().starts_with("video/")))
            .unwrap_or(false);
        if is_video && !convert_sink.is_linked() {
            if let Err(err) = src_pad.link(&convert_sink) {
                log::error!("Failed to link decoded video pad: {err:?}");
            }
        }
    });

    // Per-frame analysis hook: a buffer probe that rewrites the frame
    // in place with the annotated image.
    let probe_pad = capsfilter
        .static_pad("src")
        .context("capsfilter has no src pad")?;
    let callback = Mutex::new(callback);
    let _probe_id = probe_pad.add_probe(gst::PadProbeType::BUFFER, move |_, probe_info| {
        if let Some(gst::PadProbeData::Buffer(ref mut buffer)) = probe_info.data {
            match callback.lock() {
                Ok(mut cb) => (cb)(buffer),
                Err(_) => log::error!("Frame callback mutex poisoned, skipping buffer"),
            }
        }
        gst::PadProbeReturn::Ok
    });

    // Tail of the pipeline: encode branch, playback branch, or both.
    let mut tail = capsfilter.clone();
    if live_playback {
        let tee = make_element("tee")?;
        let play_queue = make_element("queue")?;
        let play_convert = make_element("videoconvert")?;
        let play_sink = make_element("autovideosink")?;

        pipeline.add_many([&tee, &play_queue, &play_convert, &play_sink])?;
        gst::Element::link_many([&tail, &tee])?;
        gst::Element::link_many([&tee, &play_queue, &play_convert, &play_sink])?;
        tail = tee;
    }

    match output {
        Some(output) => {
            let enc_queue = make_element("queue")?;
            let enc_convert = make_element("videoconvert")?;
            let encoder = make_element("x264enc")?;
            let muxer = make_element("matroskamux")?;
            let filesink = gst::ElementFactory::make("filesink")
                .property(
                    "location",
                    output.to_str().context("Non-UTF8 output path")?,
                )
                .build()
                .context("Failed to create filesink")?;

            pipeline.add_many([&enc_queue, &enc_convert, &encoder, &muxer, &filesink])?;
            gst::Element::link_many([
                &tail,
                &enc_queue,
                &enc_convert,
                &encoder,
                &muxer,
                &filesink,
            ])?;
        }
        None if !live_playback => {
            let fakesink = make_element("fakesink")?;
            pipeline.add(&fakesink)?;
            gst::Element::link_many([&tail, &fakesink])?;
        }
        None => {}
    }

    Ok(pipeline)
}
