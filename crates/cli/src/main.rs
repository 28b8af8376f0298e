//! CLI tool for converting PowerPoint files to text-only PDF.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use clap::{Parser, ValueEnum};
use deck_core::{LayoutConfig, Orientation, PageSize};
use deck_pdf::{ComposedDocument, ComposerOptions, MalformedSlidePolicy};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Convert PowerPoint (.pptx) files into readable, text-only PDF documents.
#[derive(Parser, Debug)]
#[command(name = "pptx2pdf")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input PowerPoint file(s) (.pptx)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the document to stdout instead of a file
    #[arg(short, long)]
    print: bool,

    /// Emit Base64 text instead of binary PDF
    #[arg(short, long)]
    base64: bool,

    /// Print a JSON summary of each conversion
    #[arg(long, conflicts_with = "print")]
    json: bool,

    /// Reject inputs larger than this many megabytes
    #[arg(long, default_value = "100")]
    max_size_mb: u64,

    /// Render a placeholder page for unreadable slides instead of failing
    #[arg(long)]
    continue_on_error: bool,

    /// Paper size of the generated pages
    #[arg(long, value_enum, default_value = "a4")]
    page_size: PaperArg,

    /// Use portrait instead of landscape pages
    #[arg(long)]
    portrait: bool,

    /// Footer text printed on every page
    #[arg(long)]
    footer: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PaperArg {
    A4,
    Letter,
}

/// Summary printed with `--json`.
#[derive(Debug, Serialize)]
struct ConversionReport {
    input: String,
    output: Option<String>,
    slides: usize,
    pages: usize,
    unreadable_slides: Vec<usize>,
    bytes: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    if args.print && args.input.len() > 1 {
        anyhow::bail!("--print accepts a single input file");
    }

    let options = composer_options(&args);
    let mut failures = 0;

    for input_path in &args.input {
        if args.verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        let composed = match process_file(input_path, &args, &options) {
            Ok(composed) => composed,
            Err(e) => {
                eprintln!("Error processing {}: {}", input_path.display(), describe(&e));
                log::debug!("{}: {:?}", input_path.display(), e);
                failures += 1;
                continue;
            }
        };

        if args.verbose {
            eprintln!(
                "  {} slides -> {} pages",
                composed.slide_count,
                composed.page_count()
            );
        }

        let payload = encode_output(&composed.bytes, args.base64);
        let output_path = if args.print {
            io::stdout()
                .write_all(&payload)
                .context("Failed to write to stdout")?;
            None
        } else {
            let path = get_output_path(input_path, args.output.as_ref(), args.base64)?;
            write_output(&path, &payload)?;
            if args.verbose {
                eprintln!("Written to: {}", path.display());
            }
            Some(path)
        };

        if args.json {
            let report = ConversionReport {
                input: input_path.display().to_string(),
                output: output_path.map(|p| p.display().to_string()),
                slides: composed.slide_count,
                pages: composed.page_count(),
                unreadable_slides: composed.unreadable_slides.clone(),
                bytes: composed.bytes.len(),
            };
            println!("{}", serde_json::to_string(&report)?);
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} file(s) failed to convert", failures, args.input.len());
    }

    Ok(())
}

/// Build composer options from command-line flags.
fn composer_options(args: &Args) -> ComposerOptions {
    let mut layout = LayoutConfig::new()
        .with_page_size(match args.page_size {
            PaperArg::A4 => PageSize::A4,
            PaperArg::Letter => PageSize::Letter,
        })
        .with_orientation(if args.portrait {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        });
    if let Some(footer) = &args.footer {
        layout = layout.with_footer_text(footer.clone());
    }

    let policy = if args.continue_on_error {
        MalformedSlidePolicy::Placeholder
    } else {
        MalformedSlidePolicy::Abort
    };

    ComposerOptions::new()
        .with_layout(layout)
        .with_malformed_policy(policy)
}

/// Read and convert a single PowerPoint file.
fn process_file(
    input_path: &Path,
    args: &Args,
    options: &ComposerOptions,
) -> deck_core::Result<ComposedDocument> {
    let size = std::fs::metadata(input_path)?.len();
    let limit = args.max_size_mb.saturating_mul(1024 * 1024);
    if size > limit {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("file is {} bytes, limit is {} MB", size, args.max_size_mb),
        )
        .into());
    }

    let is_pptx = input_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pptx"))
        .unwrap_or(false);
    if !is_pptx {
        log::warn!(
            "{} does not have a .pptx extension; checking its signature anyway",
            input_path.display()
        );
    }

    let bytes = std::fs::read(input_path)?;
    log::debug!("read {} bytes from {}", bytes.len(), input_path.display());

    deck_pdf::convert(&bytes, options)
}

/// User-facing description of a failed conversion.
fn describe(err: &deck_core::Error) -> String {
    match err {
        deck_core::Error::Io(io) => format!("{} ({})", err.user_message(), io),
        _ => err.user_message(),
    }
}

fn encode_output(pdf: &[u8], base64: bool) -> Vec<u8> {
    if base64 {
        BASE64_STANDARD.encode(pdf).into_bytes()
    } else {
        pdf.to_vec()
    }
}

/// Determine the output path for a processed file.
fn get_output_path(input_path: &Path, output_dir: Option<&PathBuf>, base64: bool) -> Result<PathBuf> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_filename = if base64 {
        format!("{}.pdf.b64", stem)
    } else {
        format!("{}.pdf", stem)
    };

    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(output_filename)
        }
        None => {
            if let Some(parent) = input_path.parent() {
                parent.join(output_filename)
            } else {
                PathBuf::from(output_filename)
            }
        }
    };

    Ok(output_path)
}

/// Write output to a file.
fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content)
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
