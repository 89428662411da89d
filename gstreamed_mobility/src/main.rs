mod discovery;
mod pipeline;
mod process_image;
mod process_video;
mod tui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "mobility", about = "Mice mobility analyser for forced swim test videos")]
pub struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyse a swim test video and write per-subject mobility reports.
    Analyse {
        /// Video file (.mp4/.mkv). Falls back to `video_path` from the
        /// config when omitted.
        input: Option<PathBuf>,
        /// Config with arena zones and analysis thresholds.
        #[arg(long, short, default_value = "config.json")]
        config: PathBuf,
        /// Whether to live playback the annotated frames.
        #[arg(long, action, default_value = "false")]
        live: bool,
        /// Skip writing the annotated output video.
        #[arg(long, action, default_value = "false")]
        no_video: bool,
    },
    /// Run the zone overlay on a single still image, for checking zone
    /// placement against a frame grab.
    Image {
        /// Image file (.jpeg/.png).
        input: PathBuf,
        #[arg(long, short, default_value = "config.json")]
        config: PathBuf,
    },
    /// Print discovered media properties of a video file.
    Probe { input: PathBuf },
    /// Edit arena zones in the terminal.
    Zones {
        #[arg(long, short, default_value = "config.json")]
        config: PathBuf,
        /// Video whose dimensions bound the zone coordinates.
        #[arg(long)]
        video: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,gstreamed_mobility=info,mobility_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    match args.command {
        Command::Analyse {
            input,
            config,
            live,
            no_video,
        } => {
            let config = mobility_common::config::AnalysisConfig::load(&config)?;
            let input = match input.or_else(|| config.video_path.clone()) {
                Some(path) => path,
                None => anyhow::bail!("No input video given and config has no video_path"),
            };
            match input.extension().and_then(|os_str| os_str.to_str()) {
                Some("mp4" | "mkv" | "avi" | "mov") => {
                    process_video::process_video(&input, &config, live, !no_video)?
                }
                Some(unk) => log::error!("Unhandled file extension: {unk}"),
                None => log::error!("Input path does not have valid file extension: {input:?}"),
            }
        }
        Command::Image { input, config } => {
            let config = mobility_common::config::AnalysisConfig::load(&config)?;
            process_image::process_image(&input, &config)?;
        }
        Command::Probe { input } => {
            gstreamer::init()?;
            let info = discovery::discover(&input)?;
            log::info!("{info:?}");
            println!(
                "{}x{} @ {:.3} fps, {} ms, {} frames (estimated)",
                info.width,
                info.height,
                info.fps,
                info.duration_ms,
                info.estimated_frames()
            );
        }
        Command::Zones { config, video } => {
            let dims = match video {
                Some(path) => {
                    gstreamer::init()?;
                    let info = discovery::discover(&path)?;
                    Some((info.width, info.height))
                }
                None => None,
            };
            tui::run_zone_editor(&config, dims)?;
        }
    }

    Ok(())
}
