use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use gstreamer::{self as gst};
use gstreamer::{prelude::*, MessageView};
use image::RgbImage;
use mobility_common::analyser::MobilityAnalyser;
use mobility_common::arena::ArenaZone;
use mobility_common::config::AnalysisConfig;
use mobility_common::frame_times::{AggregatedTimes, FrameTimes};
use mobility_common::overlay::Annotator;
use mobility_common::report::SessionReport;
use mobility_common::video_meta::VideoMeta;

use crate::discovery;
use crate::pipeline::build_pipeline;

fn process_buffer(
    frame_width: u32,
    frame_height: u32,
    zones: &[ArenaZone],
    draw_zones: bool,
    analyser: &mut MobilityAnalyser,
    annotator: &Annotator,
    agg_times: &mut AggregatedTimes,
    video_meta: &mut VideoMeta,
    buffer: &mut gst::Buffer,
) {
    let mut frame_times = FrameTimes::default();

    let start = Instant::now();
    // Read the raw RGB buffer into an image.
    let mut image = {
        let readable = buffer.map_readable().unwrap();
        let readable_vec = readable.to_vec();

        // buffer size is: width x height x 3
        RgbImage::from_vec(frame_width, frame_height, readable_vec).unwrap()
    };
    let luma = image::DynamicImage::ImageRgb8(image.clone()).to_luma8();
    frame_times.buffer_to_image = start.elapsed();

    let pts_ms = buffer.pts().unwrap_or_default().mseconds();
    let frame_meta = analyser.process_frame(&luma, pts_ms, &mut frame_times);

    // Draw zones + subject state on top of the frame.
    if draw_zones {
        let start = Instant::now();
        annotator.annotate(&mut image, zones, &frame_meta);
        frame_times.annotation = start.elapsed();
    }

    video_meta.push(frame_meta);

    // Overwrite the buffer with the annotated image.
    if draw_zones {
        let start = Instant::now();
        let buffer_mut = buffer.get_mut().unwrap();
        let mut writable = buffer_mut.map_writable().unwrap();
        let mut dst = writable.as_mut_slice();
        dst.write_all(image.as_raw()).unwrap();
        frame_times.image_to_buffer = start.elapsed();
    }

    log::debug!("{frame_times:?}");
    agg_times.push(frame_times);
}

/// Analyses mobility in a video file, using a gstreamer pipeline.
pub fn process_video(
    input: &Path,
    config: &AnalysisConfig,
    live_playback: bool,
    write_video: bool,
) -> anyhow::Result<()> {
    gst::init()?;

    // First, find out resolution of input file.
    log::info!("Discovering media properties of {input:?}");
    let file_info = discovery::discover(input)?;
    log::info!("{file_info:?}");

    let mut config = config.clone();
    config.assign_colors();
    config.validate_for_analysis(file_info.width, file_info.height)?;

    let output_path = write_video.then(|| input.with_extension("out.mkv"));

    let zones: Vec<_> = config.frames.clone();
    let analyser = Arc::new(Mutex::new(MobilityAnalyser::new(
        &zones,
        file_info.width,
        file_info.height,
        config.analysis.clone(),
    )?));
    let annotator = Annotator::from_font_path(config.analysis.label_font.as_deref());

    let agg_times = Arc::new(Mutex::new(AggregatedTimes::default()));
    let video_meta = Arc::new(Mutex::new(VideoMeta::new(
        input.to_path_buf(),
        output_path.clone(),
        file_info.width,
        file_info.height,
        file_info.fps,
    )));

    // Build gst pipeline which scores every decoded frame.
    let scoped_analyser = Arc::clone(&analyser);
    let scoped_agg = Arc::clone(&agg_times);
    let scoped_meta = Arc::clone(&video_meta);
    let (width, height) = (file_info.width, file_info.height);
    let draw_zones = config.draw_frames;
    let pipeline = build_pipeline(input, output_path.as_deref(), live_playback, move |buf| {
        let mut analyser = scoped_analyser.lock().unwrap();
        let mut agg_times = scoped_agg.lock().unwrap();
        let mut video_meta = scoped_meta.lock().unwrap();
        process_buffer(
            width,
            height,
            &zones,
            draw_zones,
            &mut analyser,
            &annotator,
            &mut agg_times,
            &mut video_meta,
            buf,
        );
    })?;
    log::info!("Starting gst pipeline");

    // Make it play and listen to events to know when it's done.
    pipeline.set_state(gst::State::Playing)?;

    let bus = pipeline.bus().expect("Pipeline has no bus");
    for msg in bus.iter_timed(gst::ClockTime::NONE) {
        match msg.view() {
            MessageView::Error(err) => {
                pipeline.debug_to_dot_file(gst::DebugGraphDetails::all(), "pipeline.error");
                let name = err.src().map(|e| e.name().to_string());
                log::error!("Error from element {name:?}: {}", err.error());
                break;
            }
            MessageView::Eos(..) => {
                log::info!("Pipeline reached end of stream.");
                break;
            }
            _ => (),
        }
    }

    let video_meta = video_meta.lock().unwrap();
    let frames_json_path = input.with_extension("json");
    log::info!(
        "Writing per-frame json, {} frames: {frames_json_path:?}",
        video_meta.frames.len()
    );
    serde_json::to_writer(std::fs::File::create(&frames_json_path)?, &*video_meta)?;

    // Session report with per-subject mobility stats.
    let analyser = analyser.lock().unwrap();
    let report = SessionReport {
        input_file: input.to_path_buf(),
        width: file_info.width,
        height: file_info.height,
        fps: file_info.fps,
        duration_ms: file_info.duration_ms,
        frames_analysed: analyser.frames_analysed(),
        subjects: analyser.reports(),
    };
    let report_path = input.with_extension("report.json");
    log::info!("Writing session report: {report_path:?}");
    report.export_json(&report_path)?;
    report.log_summary();

    pipeline.set_state(gst::State::Null)?;

    // Print perf stats, ignoring first (outlier) frame.
    let agg = agg_times.lock().unwrap();
    let avg = agg.avg(true);
    log::info!("Average frame times: {avg:?}");

    let min = agg.min(true);
    log::info!("Min frame times: {min:?}");

    let max = agg.max(true);
    log::info!("Max frame times: {max:?}");

    Ok(())
}
