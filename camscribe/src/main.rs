use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use camscribe::capture::CameraSource;
use camscribe::config::{Config, Preset};
use camscribe::db;
use camscribe::display::MinifbDisplay;
use camscribe::error::ScanError;
use camscribe::narrator::CommandNarrator;
use camscribe::ocr::OcrProvider;
use camscribe::pipeline::ScanPipeline;
use camscribe::session::ScanSession;

#[derive(Parser)]
#[command(name = "camscribe")]
#[command(about = "Scan printed text from a webcam into a document store")]
struct Args {
    /// Starting configuration; environment variables override single settings
    #[arg(long, value_enum, default_value_t = Preset::Document)]
    preset: Preset,

    /// Camera device index
    #[arg(long)]
    camera: Option<u32>,

    /// Store URL: mongodb://..., file:<path> or :memory:
    #[arg(long)]
    store_url: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "camscribe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env_with_preset(args.preset);
    if let Some(index) = args.camera {
        config.camera.index = index;
    }
    if let Some(url) = args.store_url {
        config.store.url = url;
    }
    config.validate()?;

    tracing::info!(
        preset = ?args.preset,
        denoise = %config.preprocess.denoise,
        threshold = %config.preprocess.threshold,
        min_length = config.scan.min_length,
        speak = config.scan.speak,
        "Configuration loaded"
    );

    tracing::info!("Connecting to store: {}...", config.store.url);
    let store = db::connect(&config.store).await?;

    tracing::info!("Initializing OCR provider...");
    let ocr = OcrProvider::new(&config.ocr)?;
    if !ocr.is_available() {
        store.close().await?;
        return Err(anyhow::anyhow!(
            "OCR unavailable - install Tesseract with '{}' language data",
            ocr.languages()
        ));
    }

    let mut pipeline = ScanPipeline::new(&config, Box::new(ocr), store.clone());
    if config.scan.speak {
        tracing::info!("Narration enabled via '{}'", config.narrator.command);
        pipeline = pipeline.with_narrator(Box::new(CommandNarrator::new(&config.narrator)));
    }

    let display = MinifbDisplay::new(&config.camera.window_title);
    let session = match ScanSession::start(
        || CameraSource::open(&config.camera),
        display,
        pipeline,
        config.crop.margin,
    ) {
        Ok(session) => session,
        Err(e) => {
            if matches!(e, ScanError::DeviceUnavailable(_)) {
                eprintln!("Error: Could not open camera.");
            }
            store.close().await?;
            return Err(e.into());
        }
    };

    let interrupt = CancellationToken::new();
    tokio::spawn(interrupt_signal(interrupt.clone()));

    let outcome = session.with_interrupt(interrupt).run().await;
    println!("Camera closed.");
    store.close().await?;

    let summary = outcome?;
    tracing::info!(
        frames = summary.frames,
        saved = summary.saved,
        rejected = summary.rejected,
        interrupted = summary.interrupted,
        "Session finished"
    );

    Ok(())
}

/// Cancel `token` on Ctrl-C so the session can stop and clean up.
async fn interrupt_signal(token: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => token.cancel(),
        Err(e) => tracing::warn!("Failed to install Ctrl+C handler: {}", e),
    }
}
