use clap::{Parser, Subcommand};
use reframe::config::AppConfig;
use reframe::imaging::{Dimensions, ExtensionStrategy, OutputFormat, ProcessingOptions, Quality};
use reframe::optimize::HttpCompressionClient;
use reframe::outpaint::HttpOutpaintClient;
use reframe::pipeline::{ProcessRequest, ProcessedImage};
use reframe::{envelope, output, pipeline};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reframe")]
#[command(version)]
#[command(about = "Reframe images to a target canvas with AI outpainting or edge-extend")]
#[command(long_about = "\
Reframe images to a target canvas with AI outpainting or edge-extend

Each axis is handled independently: axes where the target is smaller are
center-cropped, axes where it is larger are extended. Extension uses the
configured generative backend when the strategy is \"ai\", and always falls
back to deterministic edge-extension when that backend is unavailable or
fails — a run only errors on undecodable input.

Backends are configured via --config (TOML) and environment variables:
  REFRAME_OUTPAINT_ENDPOINT / REFRAME_OUTPAINT_API_KEY
  REFRAME_COMPRESSION_ENDPOINT

With no outpaint backend configured, \"ai\" requests complete through the
edge-extend fallback and are flagged as such.")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Clone)]
struct EncodeArgs {
    /// Output format
    #[arg(long, default_value = "png")]
    format: OutputFormat,

    /// Encoding quality (1-100)
    #[arg(long, default_value_t = 90)]
    quality: u32,

    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Print a JSON response envelope per file instead of writing output files
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print dimensions and format for each input
    Analyze {
        /// Input images
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Convert inputs to another format without reframing
    Convert {
        #[command(flatten)]
        encode: EncodeArgs,

        /// Input images
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Reframe inputs onto a target canvas
    Fit {
        /// Target canvas, e.g. 1920x1080
        #[arg(long, value_parser = parse_dimensions)]
        target: Dimensions,

        /// Extension strategy for growing axes
        #[arg(long, default_value = "ai")]
        strategy: ExtensionStrategy,

        #[command(flatten)]
        encode: EncodeArgs,

        /// Input images
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn parse_dimensions(s: &str) -> Result<Dimensions, String> {
    let (w, h) = s.split_once(['x', 'X']).ok_or("expected WIDTHxHEIGHT")?;
    let width: u32 = w.trim().parse().map_err(|_| "invalid width")?;
    let height: u32 = h.trim().parse().map_err(|_| "invalid height")?;
    Dimensions::new(width, height).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    let outpaint = match &config.outpaint {
        // validate() already guaranteed the key is present
        Some(c) => Some(HttpOutpaintClient::new(
            &c.endpoint,
            c.api_key.as_deref().unwrap_or_default(),
            c.timeout(),
        )?),
        None => None,
    };
    let compression = match &config.compression {
        Some(c) => Some(HttpCompressionClient::new(&c.endpoint, c.timeout())?),
        None => None,
    };

    let mut failures = 0usize;

    match cli.command {
        Command::Analyze { files } => {
            for file in &files {
                let name = display_name(file);
                match std::fs::read(file)
                    .map_err(|e| e.to_string())
                    .and_then(|bytes| reframe::get_image_dimensions(&bytes).map_err(|e| e.to_string()))
                {
                    Ok(probe) => println!("{}", output::format_probe(&name, &probe)),
                    Err(e) => {
                        eprintln!("{} → FAILED: {}", name, e);
                        failures += 1;
                    }
                }
            }
        }
        Command::Convert { encode, files } => {
            let quality = Quality::new(encode.quality)?;
            for file in &files {
                let name = display_name(file);
                let bytes = match std::fs::read(file) {
                    Ok(b) => b,
                    Err(e) => {
                        eprintln!("{} → FAILED: {}", name, e);
                        failures += 1;
                        continue;
                    }
                };
                let result = tokio::time::timeout(
                    config.limits.request_budget(),
                    pipeline::convert_format(
                        &bytes,
                        encode.format,
                        quality,
                        &name,
                        compression.as_ref(),
                        config.limits.max_input_bytes,
                    ),
                )
                .await;
                failures += handle_result(file, result, &encode);
            }
        }
        Command::Fit {
            target,
            strategy,
            encode,
            files,
        } => {
            let options = ProcessingOptions {
                target,
                quality: Quality::new(encode.quality)?,
                format: encode.format,
            };
            for file in &files {
                let name = display_name(file);
                let bytes = match std::fs::read(file) {
                    Ok(b) => b,
                    Err(e) => {
                        eprintln!("{} → FAILED: {}", name, e);
                        failures += 1;
                        continue;
                    }
                };
                let request = ProcessRequest {
                    image: &bytes,
                    filename: &name,
                    options,
                    strategy,
                };
                let result = tokio::time::timeout(
                    config.limits.request_budget(),
                    pipeline::process(
                        &request,
                        outpaint.as_ref(),
                        compression.as_ref(),
                        config.limits.max_input_bytes,
                        None,
                    ),
                )
                .await;
                failures += handle_result(file, result, &encode);
            }
        }
    }

    if failures > 0 {
        Err(format!("{failures} file(s) failed").into())
    } else {
        Ok(())
    }
}

type TimedResult = Result<Result<ProcessedImage, pipeline::PipelineError>, tokio::time::error::Elapsed>;

/// Report one file's outcome and write its output. Returns 1 on failure.
fn handle_result(file: &Path, result: TimedResult, encode: &EncodeArgs) -> usize {
    let name = display_name(file);
    match result {
        Ok(Ok(processed)) => {
            if encode.json {
                let envelope = envelope::ResponseEnvelope::from_result(&stem(file), &processed);
                match serde_json::to_string(&envelope) {
                    Ok(json) => println!("{json}"),
                    Err(e) => eprintln!("{} → FAILED: {}", name, e),
                }
            } else {
                let out_path = encode.out.join(format!(
                    "{}-{}x{}.{}",
                    stem(file),
                    processed.metadata.width,
                    processed.metadata.height,
                    processed.metadata.format.extension(),
                ));
                if let Err(e) = std::fs::write(&out_path, &processed.buffer) {
                    eprintln!("{} → FAILED: {}", name, e);
                    return 1;
                }
                println!("{}", output::format_result(&name, &processed));
            }
            0
        }
        Ok(Err(e)) => {
            if encode.json {
                let envelope = envelope::ResponseEnvelope::from_error(&e);
                let status = envelope::status_code(&e);
                match serde_json::to_string(&envelope) {
                    Ok(json) => println!("{json}"),
                    Err(err) => eprintln!("{} → FAILED: {}", name, err),
                }
                tracing::debug!(status, "request failed");
            } else {
                eprintln!("{}", output::format_failure(&name, &e));
            }
            1
        }
        Err(_elapsed) => {
            eprintln!("{} → FAILED: request budget exceeded", name);
            1
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}
