//! extractkit CLI - multi-modal PDF extraction tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use extractkit::{
    render, DocumentHandle, ElementKind, ExtractFlags, ExtractOptions, Extractor,
    FallbackLayoutProvider, LayoutProvider, OutputFormat, StrategySelector,
    StrategyState,
};

#[derive(Parser)]
#[command(name = "extractkit")]
#[command(version)]
#[command(about = "Extract text, tables, formulas and images from PDF documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a document and render it
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json", env = "EXTRACTKIT_FORMAT")]
        format: FormatArg,

        /// Skip text regions
        #[arg(long)]
        no_text: bool,

        /// Skip table regions
        #[arg(long)]
        no_tables: bool,

        /// Skip image regions
        #[arg(long)]
        no_images: bool,

        /// Skip formula regions
        #[arg(long)]
        no_formulas: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Per-document deadline in seconds
        #[arg(long, value_name = "SECS", env = "EXTRACTKIT_TIMEOUT")]
        timeout: Option<u64>,

        /// Worker threads for page processing (0 = one per CPU)
        #[arg(long, value_name = "N", default_value = "0", env = "EXTRACTKIT_WORKERS")]
        workers: usize,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show extraction strategy and capability availability
    Status {
        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// Structured JSON
    Json,
    /// Standalone HTML page
    Html,
    /// Markdown
    #[value(alias = "md")]
    Markdown,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Html => OutputFormat::Html,
            FormatArg::Markdown => OutputFormat::Markdown,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            format,
            no_text,
            no_tables,
            no_images,
            no_formulas,
            compact,
            timeout,
            workers,
        } => {
            let flags = ExtractFlags {
                text: !no_text,
                tables: !no_tables,
                images: !no_images,
                formulas: !no_formulas,
            };
            let mut options = ExtractOptions::new()
                .with_flags(flags)
                .with_format(format.into())
                .with_max_workers(workers);
            if compact {
                options = options.compact();
            }
            if let Some(secs) = timeout {
                options = options.with_timeout(Duration::from_secs(secs));
            }
            cmd_extract(&input, output.as_deref(), options)
        }
        Commands::Info { input } => cmd_info(&input),
        Commands::Status { json } => cmd_status(json),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    options: ExtractOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Opening PDF...");
    let handle = DocumentHandle::open(input)?;
    pb.inc(1);

    pb.set_message(format!("Extracting {} pages...", handle.page_count()));
    let extractor = Extractor::new().with_options(options.clone());
    let doc = extractor.extract_document(&handle)?;
    pb.inc(1);

    pb.set_message(format!("Rendering {}...", options.output_format));
    let rendered = render::render_with(&doc, options.output_format, options.json_format)?;
    pb.inc(1);
    pb.finish_and_clear();

    if doc.metadata.timed_out {
        eprintln!(
            "{} deadline expired, output is partial",
            "Warning:".yellow().bold()
        );
    }

    if let Some(path) = output {
        fs::write(path, &rendered)?;
        println!("{} {}", "Saved to".green(), path.display());
        println!(
            "  {} pages, {} tables, {} images, {} formulas ({})",
            doc.metadata.total_pages,
            doc.metadata.total_tables,
            doc.metadata.total_images,
            doc.metadata.total_formulas,
            doc.metadata.extraction_method
        );
    } else {
        println!("{}", rendered);
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let handle = DocumentHandle::open(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), handle.version());
    println!("{}: {}", "Pages".bold(), handle.page_count());

    println!();
    println!("{}", "Layout".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let pages = FallbackLayoutProvider::new().detect(&handle)?;
    for page in &pages {
        let (width, height) = page.dimensions();
        println!(
            "{} {:>3}: {:.0} x {:.0} pt, {} text, {} tables, {} images",
            "Page".bold(),
            page.page_number,
            width,
            height,
            page.count_of(ElementKind::Text),
            page.count_of(ElementKind::Table),
            page.count_of(ElementKind::Image)
        );
    }

    let total: usize = pages.iter().map(|p| p.elements.len()).sum();
    println!();
    println!("{}: {}", "Regions".bold(), total);

    Ok(())
}

fn cmd_status(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let selector = StrategySelector::default();
    let status = selector.status();

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let state = selector.state();
    let state_label = match &state {
        StrategyState::Ready => state.to_string().green(),
        _ => state.to_string().yellow(),
    };

    println!("{}", "Extraction Strategy".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "State".bold(), state_label);
    println!("{}: {}", "Method".bold(), status.method);

    println!();
    println!("{}", "Capabilities".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (name, available) in [
        ("Layout model", status.layout),
        ("Text recognition", status.text),
        ("Table recognition", status.table),
        ("Formula recognition", status.formula),
        ("Image extraction", status.image),
    ] {
        let mark = if available {
            "available".green()
        } else {
            "unavailable".red()
        };
        println!("  {:<20} {}", name, mark);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "extractkit".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Multi-modal PDF extraction tool");
    println!();
    println!("License: MIT");
}
