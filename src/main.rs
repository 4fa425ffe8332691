use clap::Parser;
use ocr_autoselect::config::Config;
use ocr_autoselect::selector::Thresholds;
use ocr_autoselect::{engines, runner};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "ocr-autoselect")]
#[command(about = "OCR a folder of images, picking the best preprocessing pipeline per image")]
#[command(version)]
pub struct Args {
    /// Directory containing the images to process
    #[arg(long, env = "OCR_INPUT_DIR", default_value = "data/sample_images")]
    pub input_dir: PathBuf,

    /// Directory receiving text/, viz/ and metrics/
    #[arg(long, env = "OCR_OUTPUT_DIR", default_value = "outputs")]
    pub output_dir: PathBuf,

    /// OCR engine to use ("cli" or "leptess", depending on build features)
    #[arg(long, env = "OCR_ENGINE", default_value = "cli")]
    pub engine: String,

    /// Tesseract binary used by the cli engine
    #[arg(long, env = "TESSERACT_CMD", default_value = "tesseract")]
    pub tesseract_cmd: String,

    /// Path to tessdata directory (uses TESSDATA_PREFIX env var if not set)
    #[arg(long, env = "TESSDATA_PREFIX")]
    pub tessdata_path: Option<String>,

    /// Minimum mean word confidence before a result is marked unreliable
    #[arg(long, env = "OCR_MIN_MEAN_CONF", default_value = "15.0")]
    pub min_mean_conf: f64,

    /// Minimum word count before a result is marked unreliable
    #[arg(long, env = "OCR_MIN_WORDS", default_value = "3")]
    pub min_words: usize,

    /// Do not write the box visualization images
    #[arg(long)]
    pub no_viz: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            input_dir: args.input_dir,
            output_dir: args.output_dir,
            engine: args.engine,
            tesseract_cmd: args.tesseract_cmd,
            tessdata_path: args.tessdata_path,
            thresholds: Thresholds {
                min_mean_conf: args.min_mean_conf,
                min_words: args.min_words,
            },
            no_viz: args.no_viz,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from(args);

    tracing::info!("Starting ocr-autoselect v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Reading {} -> writing {}",
        config.input_dir.display(),
        config.output_dir.display()
    );

    let detector = engines::build(&config)?;
    let summary = runner::run(&config, detector.as_ref())?;

    tracing::info!(
        processed = summary.processed,
        skipped = summary.skipped,
        unreliable = summary.unreliable,
        words = summary.words,
        "Batch complete. Outputs folder: {}",
        config.output_dir.display()
    );

    Ok(())
}
