//! Product tag generator CLI.
//!
//! Commands: render (one tag from flags), batch (one tag per CSV row).
//! Settings come from the environment / .env and can be overridden per run.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tag_core::{
    BatchOptions, ExportFormat, LayoutMode, ProductRecord, TagError, Theme, export_tag, read_csv,
    run_batch, sanitize_filename,
};
use tag_generator_lib::assets::load_assets;
use tag_generator_lib::config::validation::parse_output_size;
use tag_generator_lib::config::{AppConfig, validate_setting};
use tag_generator_lib::report::BatchReport;

#[derive(Parser)]
#[command(name = "tag-generator")]
#[command(about = "Product tag generator - printable PNG/JPEG/PDF tags with QR codes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the configured look and size of a tag.
#[derive(Args)]
struct StyleArgs {
    /// Layout: Vertical or Horizontal
    #[arg(long)]
    layout: Option<String>,

    /// Theme: Light, Dark or Industrial
    #[arg(long)]
    theme: Option<String>,

    /// Physical size in inches, e.g. "4,3"
    #[arg(long)]
    size: Option<String>,

    /// Output resolution
    #[arg(long)]
    dpi: Option<u32>,

    /// General logo image
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Logo placed in the centre of the QR code
    #[arg(long)]
    qr_logo: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a single tag
    Render {
        /// Product name
        #[arg(long)]
        name: String,

        /// Part number
        #[arg(long)]
        part: String,

        /// QC status: Approved, Not Approved or Prototype
        #[arg(long, default_value = "Approved")]
        status: String,

        /// Country of origin
        #[arg(long, default_value = "")]
        made_in: String,

        /// Catalog / product information link
        #[arg(long, default_value = "")]
        url: String,

        /// Output file; defaults to {part}_{name}.{ext} in the output folder
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// png, jpg or pdf; defaults to the output extension, then the configured format
        #[arg(short, long)]
        format: Option<String>,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Render one tag per row of a CSV file
    Batch {
        /// CSV with product_name, part_number, qc_status columns
        csv: PathBuf,

        /// Output folder; defaults to the configured folder
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// png, jpg or pdf
        #[arg(short, long)]
        format: Option<String>,

        #[command(flatten)]
        style: StyleArgs,
    },
}

fn apply_style(config: &mut AppConfig, style: &StyleArgs) -> anyhow::Result<()> {
    if let Some(size) = &style.size {
        if let Err(e) = validate_setting("TAG_OUTPUT_SIZE", size) {
            bail!("--size {size}: {e}");
        }
        if let Some(inches) = parse_output_size(size) {
            config.output_inches = inches;
        }
    }
    if let Some(dpi) = style.dpi {
        if let Err(e) = validate_setting("TAG_DPI", &dpi.to_string()) {
            bail!("--dpi {dpi}: {e}");
        }
        config.dpi = dpi;
    }
    if let Some(layout) = &style.layout {
        config.layout = LayoutMode::from_name(layout);
    }
    if let Some(theme) = &style.theme {
        config.theme = Theme::from_name(theme);
    }
    if let Some(logo) = &style.logo {
        config.logo_path = logo.clone();
    }
    if let Some(qr_logo) = &style.qr_logo {
        config.qr_logo_path = qr_logo.clone();
    }
    Ok(())
}

fn resolve_format(
    explicit: Option<&str>,
    output: Option<&Path>,
    config: &AppConfig,
) -> anyhow::Result<ExportFormat> {
    if let Some(name) = explicit {
        return Ok(name.parse::<ExportFormat>()?);
    }
    let from_ext = output
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .and_then(ExportFormat::parse);
    Ok(from_ext.unwrap_or(config.default_format))
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = tag_generator_lib::init_config();

    match cli.command {
        Commands::Render {
            name,
            part,
            status,
            made_in,
            url,
            output,
            format,
            style,
        } => {
            apply_style(&mut config, &style)?;
            let format = resolve_format(format.as_deref(), output.as_deref(), &config)?;
            let product = ProductRecord::new(&name, &part, &status, &made_in, &url);
            let path = output.unwrap_or_else(|| {
                let stem = sanitize_filename(&format!("{}_{}", product.part_number, product.product_name));
                config.output_folder.join(format!("{stem}.{}", format.extension()))
            });

            let assets = load_assets(&config);
            match export_tag(&product, format, &path, &config.render_options(), &assets) {
                Ok(written) => {
                    println!("{}", written.display());
                    Ok(ExitCode::SUCCESS)
                }
                Err(TagError::Validation(msg)) => {
                    eprintln!("Invalid input: {msg}");
                    Ok(ExitCode::from(2))
                }
                Err(e) => Err(e.into()),
            }
        }

        Commands::Batch {
            csv,
            out,
            format,
            style,
        } => {
            apply_style(&mut config, &style)?;
            let format = format.unwrap_or_else(|| config.default_format.to_string());
            let output_folder = out.unwrap_or_else(|| config.output_folder.clone());

            let import = read_csv(&csv).with_context(|| format!("reading {}", csv.display()))?;
            for diag in &import.errors {
                eprintln!("{diag}");
            }

            let options = BatchOptions {
                output_folder: output_folder.clone(),
                format: format.clone(),
                layout: config.layout,
                theme: config.theme,
                canvas: config.canvas_spec(),
            };
            let assets = load_assets(&config);
            let results = run_batch(&import.rows, &options, &assets, |p| {
                tracing::info!("Batch progress: {}% ({}/{})", p.percent(), p.completed, p.total);
            });

            let report = BatchReport::new(&csv, &format, import.errors, results);
            for r in report.results.iter().filter(|r| !r.success) {
                eprintln!("FAILED {}: {}", r.output_path.display(), r.message);
            }
            match report.write_to(&output_folder) {
                Ok(path) => tracing::info!("Wrote {}", path.display()),
                Err(e) => tracing::error!("Failed to write batch report: {e}"),
            }

            let s = report.summary;
            println!("{} of {} tags exported to {}", s.succeeded, s.total, output_folder.display());
            if s.failed > 0 || !report.skipped_rows.is_empty() {
                Ok(ExitCode::from(2))
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}
