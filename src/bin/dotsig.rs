use clap::{Parser, Subcommand};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dot_signature::annotate::annotate;
use dot_signature::batch::{image_paths, rank};
use dot_signature::pipeline::{PipelineConfig, analyze, load_image, load_or_extract};
use dot_signature::shape::resize_to_fit;
use dot_signature::{Tolerance, compare};

#[derive(Parser, Debug)]
#[command(
    name = "dotsig",
    about = "Extract and compare rotation/scale tolerant dot-pattern signatures",
    version
)]
struct Cli {
    /// JSON file with pipeline settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Longest image side before processing
    #[arg(long, global = true)]
    size: Option<u32>,

    /// Skip the denoising pass
    #[arg(long = "no-damp", global = true)]
    no_damp: bool,

    /// Also write resized images under this directory
    #[arg(long = "resize-dir", global = true)]
    resize_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the signature of one image.
    Extract {
        /// Input image
        #[arg(short = 'i', long)]
        image: PathBuf,

        /// Write the signature JSON here instead of stdout
        #[arg(short = 'o', long)]
        out: Option<PathBuf>,

        /// Write a PNG with the detected dots and reference pair drawn
        #[arg(long)]
        annotate: Option<PathBuf>,

        /// Print the denoised black/white grid
        #[arg(long = "show-grid")]
        show_grid: bool,
    },

    /// Score a subject against a reference (images or saved signature JSON).
    Compare {
        #[arg(short = 's', long)]
        subject: PathBuf,

        #[arg(short = 'r', long)]
        reference: PathBuf,

        /// Angle tolerance in degrees
        #[arg(long = "angle-tol")]
        angle_tol: Option<i32>,

        /// Length tolerance in percent
        #[arg(long = "length-tol")]
        length_tol: Option<i32>,
    },

    /// Rank every image in a directory against a reference.
    Rank {
        #[arg(short = 'r', long)]
        reference: PathBuf,

        /// Directory containing candidate images
        #[arg(short = 'd', long = "dir")]
        dir: PathBuf,

        /// Only print the best N candidates
        #[arg(long)]
        top: Option<usize>,

        /// Concurrent extractions
        #[arg(long)]
        workers: Option<usize>,
    },
}

fn ensure_parent_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn write_text_file(path: &Path, contents: &str) -> Result<(), Box<dyn Error>> {
    ensure_parent_dir(path)?;
    fs::write(path, contents)?;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<PipelineConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(size) = cli.size {
        config.max_dimension = size;
    }
    if cli.no_damp {
        config.damp = false;
    }
    if cli.resize_dir.is_some() {
        config.resize_dir = cli.resize_dir.clone();
    }
    Ok(config)
}

fn run_extract(
    config: &PipelineConfig,
    image_path: &Path,
    out: Option<&Path>,
    annotate_path: Option<&Path>,
    show_grid: bool,
) -> Result<(), Box<dyn Error>> {
    tracing::info!(path = %image_path.display(), "loading image");
    let image = load_image(image_path)?;
    let analysis = analyze(&image, config)?;

    if show_grid {
        print!("{}", analysis.grid);
    }
    if let Some(path) = &analysis.resized_path {
        tracing::info!(path = %path.display(), "resized image written");
    }

    if let Some(path) = annotate_path {
        let resized = resize_to_fit(&image, config.max_dimension);
        let canvas = annotate(&resized, &analysis.dots, analysis.reference);
        ensure_parent_dir(path)?;
        canvas.save(path)?;
        tracing::info!(path = %path.display(), "annotated image written");
    }

    let json = serde_json::to_string_pretty(&analysis.signature)?;
    match out {
        Some(path) => {
            write_text_file(path, &json)?;
            tracing::info!(path = %path.display(), "signature written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

async fn run_rank(
    config: PipelineConfig,
    reference: &Path,
    dir: &Path,
    top: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    if !dir.is_dir() {
        return Err(format!("Not a directory: {}", dir.display()).into());
    }
    let reference = load_or_extract(reference, &config)?;
    let images = image_paths(dir).await?;
    if images.is_empty() {
        tracing::warn!(dir = %dir.display(), "no images found");
        return Ok(());
    }

    let ranked = rank(&reference, images, Arc::new(config)).await;
    for entry in ranked.iter().take(top.unwrap_or(usize::MAX)) {
        println!("{:.4}\t{}", entry.score, entry.path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    match cli.command {
        Command::Extract {
            image,
            out,
            annotate,
            show_grid,
        } => run_extract(&config, &image, out.as_deref(), annotate.as_deref(), show_grid),
        Command::Compare {
            subject,
            reference,
            angle_tol,
            length_tol,
        } => {
            config.tolerance = Tolerance::new(
                angle_tol.unwrap_or(config.tolerance.angle),
                length_tol.unwrap_or(config.tolerance.length),
            );
            let s = load_or_extract(&subject, &config)?;
            let c = load_or_extract(&reference, &config)?;
            if s.len() != c.len() {
                tracing::warn!(
                    subject = s.len(),
                    reference = c.len(),
                    "signatures differ in size; no comparison possible"
                );
            }
            println!("{:.4}", compare(&s, &c, config.tolerance));
            Ok(())
        }
        Command::Rank {
            reference,
            dir,
            top,
            workers,
        } => {
            if let Some(workers) = workers {
                config.workers = workers;
            }
            run_rank(config, &reference, &dir, top).await
        }
    }
}
