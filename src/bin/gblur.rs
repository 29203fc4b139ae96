use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{CommandFactory as _, Parser, error::ErrorKind};
use gblur::{Effect as _, EngineSettings, FilterKind, KernelSize, PixelBuffer, Stopwatch};

/// Gaussian-blur an image using a fixed pool of column-band workers.
#[derive(Parser, Debug)]
#[command(name = "gblur", version, allow_negative_numbers = true)]
struct Cli {
    /// Input image (any format the decoder recognises).
    input: PathBuf,

    /// Output PNG path.
    output: PathBuf,

    /// Kernel size; must be an odd positive integer.
    kernel_size: String,

    /// Worker threads (one column band each). Overrides `--config`.
    #[arg(long)]
    threads: Option<usize>,

    /// Engine settings JSON, e.g. `{"threads": 4}`.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    // Usage problems are reported but do not fail the process.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            eprintln!("{e}");
            println!("{}", Cli::command().render_usage());
            return Ok(());
        }
    };

    let kernel_size: KernelSize = match cli.kernel_size.parse() {
        Ok(k) => k,
        Err(e) => {
            tracing::debug!(error = %e, "rejected kernel size");
            println!("Kernel size must be odd positive integer");
            return Ok(());
        }
    };

    let settings = resolve_settings(&cli)?;
    let input = gblur::io::load(&cli.input)
        .with_context(|| format!("load input image '{}'", cli.input.display()))?;

    run(&input, kernel_size, &settings, &cli.output)
}

fn resolve_settings(cli: &Cli) -> anyhow::Result<EngineSettings> {
    let mut settings = match &cli.config {
        Some(path) => EngineSettings::from_path(path)?,
        None => EngineSettings::default(),
    };
    if let Some(n) = cli.threads {
        settings.threads = n;
    }
    settings.validate()?;
    Ok(settings)
}

fn run(
    input: &PixelBuffer,
    kernel_size: KernelSize,
    settings: &EngineSettings,
    output: &Path,
) -> anyhow::Result<()> {
    let kind = FilterKind::GaussianBlur { kernel_size };
    let mut effect = gblur::create_effect(kind, input, settings)?;

    let timer = Stopwatch::start();
    let applied = effect.apply();
    if applied.is_ok() {
        println!("calculation took {:.3}ms", timer.elapsed_ms());
    }

    // Written even if the blur failed, so the output always reflects the
    // buffer's final state.
    save_output(output, effect.get());
    applied.context("apply gaussian blur")?;
    Ok(())
}

fn save_output(path: &Path, buf: &PixelBuffer) {
    match gblur::io::save_png(path, buf) {
        Ok(()) => eprintln!("wrote {}", path.display()),
        Err(e) => {
            tracing::error!(error = %e, "failed to save output");
            eprintln!("{e}");
        }
    }
}
