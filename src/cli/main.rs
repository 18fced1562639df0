//! Background removal CLI
//!
//! Command-line interface for removing image backgrounds through the
//! Gemini image model.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::client::{GeminiClient, API_KEY_ENV, DEFAULT_MODEL};
use crate::services::OutputService;
use crate::session::{RemovalSession, SessionState};
use crate::tracing_config::TracingConfig;

/// Background removal CLI tool
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "gemini-bgremove")]
pub struct Cli {
    /// Input image files (PNG, JPEG, WebP)
    #[arg(value_name = "INPUT", required = true)]
    pub input: Vec<PathBuf>,

    /// Output file (single input) or directory (multiple inputs)
    /// [default: `<input>-no-bg.png` next to each input]
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Gemini API key [default: $GEMINI_API_KEY]
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Model name to send requests to
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose).context("Failed to initialize tracing")?;

    // Missing credential is fatal before any file is touched
    let client = match &cli.api_key {
        Some(key) => GeminiClient::new(key.clone()),
        None => GeminiClient::from_env(),
    }
    .with_context(|| format!("Failed to initialize Gemini client (set {API_KEY_ENV} or pass --api-key)"))?
    .with_model(cli.model.clone());

    info!("Starting background removal");
    info!("Model: {}", client.model());

    let start_time = Instant::now();
    let mut failures = 0_usize;

    for input in &cli.input {
        let output = resolve_output_path(input, cli.output.as_deref(), cli.input.len());
        if let Err(e) = process_input(input, &output, &client).await {
            eprintln!("{}: {e}", input.display());
            failures += 1;
        }
    }

    let total_time = start_time.elapsed();
    info!(
        "Processed {} image(s) in {:.2}s",
        cli.input.len() - failures,
        total_time.as_secs_f64()
    );

    if failures > 0 {
        anyhow::bail!("{failures} of {} image(s) failed", cli.input.len());
    }
    Ok(())
}

/// Run one image through a removal session and write the result.
async fn process_input(input: &Path, output: &Path, client: &GeminiClient) -> Result<()> {
    let mut session = RemovalSession::new();

    if session.load_file(input).await != SessionState::Ready {
        let message = session.error_message().unwrap_or("failed to load image");
        anyhow::bail!("{message}");
    }

    let spinner = removal_spinner(input);
    let state = session.remove_background(client).await;
    spinner.finish_and_clear();

    match state {
        SessionState::Done => {
            let processed = session
                .processed()
                .context("session in Done state without a result")?;
            OutputService::save_png(processed, output)
                .with_context(|| format!("Failed to write '{}'", output.display()))?;
            println!("{} -> {}", input.display(), output.display());
            Ok(())
        },
        _ => {
            let message = session
                .error_message()
                .unwrap_or("background removal failed");
            anyhow::bail!("{message}");
        },
    }
}

/// Output path rules: explicit file for a single input, directory for a
/// batch, `<base>-no-bg.png` next to the input otherwise.
fn resolve_output_path(input: &Path, output: Option<&Path>, input_count: usize) -> PathBuf {
    match output {
        Some(out) if input_count == 1 && !out.is_dir() => out.to_path_buf(),
        Some(dir) => dir.join(
            OutputService::output_path_for(input)
                .file_name()
                .map(std::ffi::OsStr::to_os_string)
                .unwrap_or_default(),
        ),
        None => OutputService::output_path_for(input),
    }
}

fn removal_spinner(input: &Path) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Removing background: {}", input.display()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));
    spinner
}

/// Initialize tracing based on verbosity level
fn init_tracing(verbose_count: u8) -> Result<()> {
    TracingConfig::new()
        .with_verbosity(verbose_count)
        .init()
        .context("Failed to initialize tracing subscriber")?;

    debug!(verbosity = verbose_count, "Tracing initialized");
    Ok(())
}
