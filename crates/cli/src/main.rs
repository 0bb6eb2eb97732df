//! html2xlsx CLI - HTML regions to floating-image workbooks
//!
//! Runs the same pipeline as the API server against local files.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use html2xlsx_common::config::{load_config, load_from_env};
use html2xlsx_common::{Config, ConversionConfig};
use html2xlsx_extract::{decode_upload, extract_regions_from_str, write_document, RegionOptions};
use html2xlsx_pipeline::{convert_html_to_workbook, Converter};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "html2xlsx",
    about = "Screenshot marked HTML regions into an Excel workbook",
    version
)]
struct Args {
    /// Show detailed processing information
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML config file (default: $HTML2XLSX_CONFIG)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract marked regions, capture them and write the workbook
    Convert {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output workbook (default: <input stem>_processed.xlsx)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Phrase a region must contain to be kept
        #[arg(long)]
        marker: Option<String>,

        /// Tag that opens and closes regions
        #[arg(long)]
        heading: Option<String>,

        /// Append Table_N, Text and Meta sheets
        #[arg(long)]
        summaries: bool,
    },

    /// Capture every selector match of an HTML file into a workbook
    Snapshot {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[arg(short, long, value_name = "OUTPUT", default_value = "html_boxes_floating_output.xlsx")]
        output: PathBuf,

        #[arg(long, default_value = ".box")]
        selector: String,
    },

    /// Write only the rebuilt document of marked regions
    Extract {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output HTML (default: temporaryHTML.html)
        #[arg(short, long, value_name = "OUTPUT", default_value = "temporaryHTML.html")]
        output: PathBuf,

        #[arg(long)]
        marker: Option<String>,

        #[arg(long)]
        heading: Option<String>,
    },
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "html2xlsx=debug,html2xlsx_pipeline=debug,html2xlsx_extract=debug,\
         html2xlsx_render=debug,html2xlsx_workbook=debug"
    } else {
        "html2xlsx=info,html2xlsx_pipeline=info,html2xlsx_extract=info,\
         html2xlsx_render=info,html2xlsx_workbook=info"
    }
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn with_overrides(
    mut conversion: ConversionConfig,
    marker: Option<String>,
    heading: Option<String>,
) -> ConversionConfig {
    if let Some(marker) = marker {
        conversion.marker_phrase = marker;
    }
    if let Some(heading) = heading {
        conversion.heading_tag = heading.to_ascii_lowercase();
    }
    conversion
}

/// `report.html` → `report_processed.xlsx`, next to the input
fn default_workbook_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    input.with_file_name(format!("{stem}_processed.xlsx"))
}

fn read_html(input: &Path) -> Result<String> {
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    Ok(decode_upload(&bytes)?)
}

fn run(args: Args) -> Result<()> {
    let config: Config = match &args.config {
        Some(path) => load_config(path)?,
        None => load_from_env()?,
    };

    match args.command {
        Commands::Convert {
            input,
            output,
            marker,
            heading,
            summaries,
        } => {
            let mut conversion = with_overrides(config.conversion, marker, heading);
            conversion.include_summaries |= summaries;

            let html = read_html(&input)?;
            let filename = input.file_name().unwrap_or_default().to_string_lossy();
            let result = Converter::with_chrome(conversion).process(&html, &filename)?;

            let output = output.unwrap_or_else(|| default_workbook_path(&input));
            std::fs::write(&output, &result.workbook)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("{}", serde_json::to_string_pretty(&result.stats)?);
            println!("Excel file created: {}", output.display());
        }
        Commands::Snapshot {
            input,
            output,
            selector,
        } => {
            let Some(path) = convert_html_to_workbook(&input, &output, &selector, &config.conversion)
            else {
                bail!("Failed to create Excel file from {}", input.display());
            };
            println!("Excel file created: {}", path.display());
        }
        Commands::Extract {
            input,
            output,
            marker,
            heading,
        } => {
            let conversion = with_overrides(config.conversion, marker, heading);
            let html = read_html(&input)?;
            let regions = extract_regions_from_str(&html, &RegionOptions::from(&conversion));
            let containers = write_document(&output, &regions, &conversion.container_class)
                .with_context(|| format!("Failed to write {}", output.display()))?;

            for container in &containers {
                println!(
                    "Added {} {}: {} ({} bytes)",
                    conversion.container_class, container.index, container.heading, container.markup_len
                );
            }
            println!("{} region(s) written to {}", containers.len(), output.display());
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    run(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn test_default_filter_covers_library_crates() {
        for verbose in [false, true] {
            let filter = default_filter(verbose);
            for target in [
                "html2xlsx_pipeline",
                "html2xlsx_extract",
                "html2xlsx_render",
                "html2xlsx_workbook",
            ] {
                assert!(filter.contains(target), "{target} missing from {filter}");
            }
            assert!(tracing_subscriber::EnvFilter::try_new(filter).is_ok());
        }
    }

    #[test]
    fn test_default_workbook_path() {
        assert_eq!(
            default_workbook_path(Path::new("/data/report.html")),
            PathBuf::from("/data/report_processed.xlsx")
        );
    }

    #[test]
    fn test_parse_convert() {
        let args = Args::try_parse_from([
            "html2xlsx", "convert", "in.html", "--marker", "KEEP", "--heading", "H2", "--summaries",
        ])
        .unwrap();
        let Commands::Convert {
            marker,
            heading,
            summaries,
            output,
            ..
        } = args.command
        else {
            panic!("expected convert");
        };
        assert_eq!(marker.as_deref(), Some("KEEP"));
        assert_eq!(heading.as_deref(), Some("H2"));
        assert!(summaries);
        assert!(output.is_none());
    }

    #[test]
    fn test_snapshot_defaults() {
        let args = Args::try_parse_from(["html2xlsx", "snapshot", "page.html"]).unwrap();
        let Commands::Snapshot { selector, output, .. } = args.command else {
            panic!("expected snapshot");
        };
        assert_eq!(selector, ".box");
        assert_eq!(output, PathBuf::from("html_boxes_floating_output.xlsx"));
    }

    #[test]
    fn test_overrides_lowercase_heading() {
        let conversion = with_overrides(ConversionConfig::default(), None, Some("H2".to_string()));
        assert_eq!(conversion.heading_tag, "h2");
        assert_eq!(conversion.marker_phrase, "Uncovered Link");
    }

    #[test]
    fn test_extract_writes_rebuilt_document() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.html");
        let output = dir.path().join("out.html");
        std::fs::write(&input, "<h4>A</h4><p>Uncovered Link</p><h4>B</h4><p>no</p>").unwrap();

        let args = Args::try_parse_from([
            OsStr::new("html2xlsx"),
            OsStr::new("extract"),
            input.as_os_str(),
            OsStr::new("-o"),
            output.as_os_str(),
        ])
        .unwrap();
        run(args).unwrap();

        let rebuilt = std::fs::read_to_string(&output).unwrap();
        assert_eq!(rebuilt.matches("<div class=\"image-box\">").count(), 1);
    }
}
