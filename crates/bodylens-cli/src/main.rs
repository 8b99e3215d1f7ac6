use std::fs;
use std::path::{Path, PathBuf};

use bodylens_core::{
    AnalysisInput, AnalyzerConfig, BodyAnalyzer, FaceBox, Frame, LandmarkSet, SegmentationMask,
};
use clap::{Parser, Subcommand};
use serde::Deserialize;

#[derive(Parser)]
#[command(name = "bodylens", version, about = "Body measurements, skin tone and body shape from pose landmarks")]
struct Cli {
    /// TOML configuration file; BODYLENS_* environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one photo and print the result as JSON
    Analyze {
        /// Landmark JSON: {"imageWidth", "imageHeight", "landmarks": [{x, y, z, visibility}, ...]}
        #[arg(long)]
        landmarks: PathBuf,
        /// Photo to sample skin tone from (mid-gray frame when omitted)
        #[arg(long)]
        image: Option<PathBuf>,
        /// Segmentation mask JSON: {"width", "height", "data": [f32, ...]}
        #[arg(long)]
        mask: Option<PathBuf>,
        /// Normalized face box as x,y,width,height
        #[arg(long, value_parser = parse_face_box)]
        face: Option<FaceBox>,
        /// Include intermediate readings in the output
        #[arg(long)]
        diagnostics: bool,
        #[arg(long)]
        pretty: bool,
    },
    /// Print the effective configuration as TOML
    Config {},
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LandmarkFile {
    image_width: Option<u32>,
    image_height: Option<u32>,
    landmarks: Option<LandmarkSet>,
}

#[derive(Debug, Deserialize)]
struct MaskFile {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

const PLACEHOLDER_GRAY: [u8; 3] = [128, 128, 128];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.cmd {
        Commands::Analyze {
            landmarks,
            image,
            mask,
            face,
            diagnostics,
            pretty,
        } => {
            let landmark_file: LandmarkFile = serde_json::from_str(&fs::read_to_string(&landmarks)?)?;
            let frame = load_frame(image.as_deref(), &landmark_file)?;

            let segmentation_mask = match mask {
                Some(path) => {
                    let m: MaskFile = serde_json::from_str(&fs::read_to_string(path)?)?;
                    Some(SegmentationMask::new(m.data, m.width, m.height)?)
                }
                None => None,
            };

            let input = AnalysisInput {
                frame,
                landmarks: landmark_file.landmarks,
                segmentation_mask,
                face_bbox: face,
            };

            let result = BodyAnalyzer::with_config(config).analyze(&input)?;
            for degradation in &result.degradations {
                log::warn!("{degradation:?}");
            }

            let mut value = serde_json::to_value(&result)?;
            if diagnostics {
                if let Some(obj) = value.as_object_mut() {
                    obj.insert("diagnostics".to_string(), serde_json::to_value(&result.diagnostics)?);
                }
            }
            let out = if pretty {
                serde_json::to_string_pretty(&value)?
            } else {
                serde_json::to_string(&value)?
            };
            println!("{out}");
        }
        Commands::Config {} => {
            print!("{}", config.to_toml_string()?);
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig, bodylens_core::ConfigError> {
    match path {
        Some(path) => AnalyzerConfig::from_file_with_env(path),
        None => AnalyzerConfig::load_layered(None, None),
    }
}

fn load_frame(image: Option<&Path>, file: &LandmarkFile) -> Result<Frame, Box<dyn std::error::Error>> {
    match image {
        Some(path) => {
            let frame = Frame::from_file(path)?;
            if let (Some(w), Some(h)) = (file.image_width, file.image_height) {
                if (w, h) != (frame.width(), frame.height()) {
                    log::warn!(
                        "Landmark file declares {}x{} but image is {}x{}; using the image",
                        w,
                        h,
                        frame.width(),
                        frame.height()
                    );
                }
            }
            Ok(frame)
        }
        None => {
            let (w, h) = file
                .image_width
                .zip(file.image_height)
                .ok_or("imageWidth and imageHeight are required when --image is not given")?;
            log::info!("No image given, using a {w}x{h} placeholder frame");
            Ok(Frame::filled(w, h, PLACEHOLDER_GRAY)?)
        }
    }
}

fn parse_face_box(s: &str) -> Result<FaceBox, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid face box {s:?}: {e}"))?;
    match parts.as_slice() {
        [x, y, w, h] => Ok(FaceBox::new(*x, *y, *w, *h)),
        _ => Err(format!("face box needs 4 comma-separated values, got {}", parts.len())),
    }
}
