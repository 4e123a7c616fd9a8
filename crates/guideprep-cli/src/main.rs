use clap::Parser;
use guideprep_core::config::Config;
use guideprep_core::{parser, transform_document, writer, FsImageLoader};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "guideprep",
    about = "Build the table of contents, collapsible controls and inline images of a user guide"
)]
struct Cli {
    /// Built user guide (XHTML) to read.
    source: PathBuf,

    /// File to write the processed guide to. Replaced if it exists.
    destination: PathBuf,

    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log each pass.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load(path).unwrap_or_else(|e| {
            log::error!("Error loading config {}: {e}", path.display());
            std::process::exit(1);
        }),
        None => Config::default(),
    };

    if !cli.source.is_file() {
        log::error!(
            "The given User Guide file ({}) does not exist.",
            absolute(&cli.source).display()
        );
        std::process::exit(1);
    }

    let input = std::fs::read_to_string(&cli.source).unwrap_or_else(|e| {
        log::error!("Error reading {}: {e}", cli.source.display());
        std::process::exit(1);
    });

    let mut doc = parser::parse(&input).unwrap_or_else(|e| {
        log::error!("Error parsing {}: {e}", cli.source.display());
        std::process::exit(1);
    });

    let loader = FsImageLoader::new(config.images.base_dir.clone());
    let report = transform_document(&mut doc, &config, &loader).unwrap_or_else(|e| {
        log::error!("{e} in {}", cli.source.display());
        std::process::exit(1);
    });

    let output = writer::serialize(&doc).unwrap_or_else(|e| {
        log::error!("Error serializing {}: {e}", cli.source.display());
        std::process::exit(1);
    });
    write_output(&output, &cli.destination);

    log::info!(
        "{} -> {} ({} ToC entries, {} collapsible controls, {} images inlined, {} failed)",
        cli.source.display(),
        cli.destination.display(),
        report.toc_entries,
        report.collapsible_controls,
        report.images_inlined,
        report.images_failed
    );
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = SimpleLogger::new().with_level(level).init();
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Delete any existing file first so a shorter output never keeps a tail of
/// the previous one.
fn write_output(content: &str, path: &Path) {
    if path.exists() {
        std::fs::remove_file(path).unwrap_or_else(|e| {
            log::error!("Error removing existing {}: {e}", path.display());
            std::process::exit(1);
        });
    }
    std::fs::write(path, content).unwrap_or_else(|e| {
        log::error!("Error writing {}: {e}", path.display());
        std::process::exit(1);
    });
}
