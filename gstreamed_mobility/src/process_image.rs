use std::path::Path;

use image::GenericImageView;
use mobility_common::config::AnalysisConfig;
use mobility_common::frame_meta::{FrameMeta, SubjectSample};
use mobility_common::overlay::Annotator;

/// Draws the configured arena zones on a single image file, for checking
/// zone placement against a frame grab of the recording setup.
pub fn process_image(path: &Path, config: &AnalysisConfig) -> anyhow::Result<()> {
    // Read image.
    let og_image = image::open(path)?;
    let (img_width, img_height) = og_image.dimensions();

    let mut config = config.clone();
    config.assign_colors();
    config.validate_for_analysis(img_width, img_height)?;

    // No motion can be scored off a single frame; every zone renders as
    // subject-absent, which still shows outline, fill and label.
    let frame_meta = FrameMeta {
        frame: 0,
        pts_ms: 0,
        samples: config
            .frames
            .iter()
            .map(|zone| SubjectSample::absent(&zone.name))
            .collect(),
    };

    let annotator = Annotator::from_font_path(config.analysis.label_font.as_deref());
    let mut img = og_image.to_rgb8();
    annotator.annotate(&mut img, &config.frames, &frame_meta);

    println!("Drew {} zones on {path:?}:", config.frames.len());
    for zone in &config.frames {
        println!(
            "  {} @ ({}, {})..({}, {}) rot {:.1}°",
            zone.name,
            zone.top_left[0],
            zone.top_left[1],
            zone.bottom_right[0],
            zone.bottom_right[1],
            zone.rotation
        );
    }

    // Save output: image & zone layout.
    let img_output_path = path.with_extension("out.png");
    img.save(&img_output_path)?;
    println!("Annotated image saved to: {img_output_path:?}");

    let zones_output_path = path.with_extension("out.json");
    serde_json::to_writer(std::fs::File::create(zones_output_path)?, &config.frames)?;

    Ok(())
}
