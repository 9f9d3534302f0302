//! paper-chunker command line
//!
//! Run with: cargo run -p paper-chunker -- process papers -o pdf_chunks.json

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paper_chunker::{load_chunks, DocumentChunker, OutputFormat, PreprocessConfig};

#[derive(Debug, Parser)]
#[command(name = "paper-chunker", version, about = "Split PDF papers into overlapping token chunks")]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract, chunk and save every document in a directory
    Process(ProcessArgs),

    /// Summarize an existing chunk file
    Inspect {
        /// Chunk file to read
        file: PathBuf,

        /// File format (inferred from the extension when omitted)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Write the default configuration as TOML
    InitConfig {
        /// Destination file (prints to stdout when omitted)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Args)]
struct ProcessArgs {
    /// Directory containing the documents
    dir: Option<PathBuf>,

    /// Output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum tokens per chunk
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Tokens shared by consecutive chunks
    #[arg(long)]
    overlap: Option<usize>,

    /// Output format (inferred from the output extension when omitted)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Document extensions to pick up (repeatable)
    #[arg(long = "ext")]
    extensions: Vec<String>,

    /// Descend into subdirectories
    #[arg(long)]
    recursive: bool,

    /// Extract documents in parallel
    #[arg(long)]
    parallel: bool,

    /// Worker threads for parallel extraction
    #[arg(long, requires = "parallel")]
    threads: Option<usize>,

    /// Keep text after the References / Bibliography heading
    #[arg(long)]
    keep_references: bool,

    /// Skip documents whose text duplicates an earlier one
    #[arg(long)]
    skip_duplicates: bool,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

impl ProcessArgs {
    /// Load the config file (or defaults) and apply command-line overrides
    fn resolve_config(&self) -> Result<PreprocessConfig> {
        let mut config = match &self.config {
            Some(path) => PreprocessConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => PreprocessConfig::default(),
        };

        if let Some(dir) = &self.dir {
            config.chunking.source_directory = dir.clone();
        }
        if let Some(size) = self.chunk_size {
            config.chunking.chunk_size_tokens = size;
        }
        if let Some(overlap) = self.overlap {
            config.chunking.overlap_tokens = overlap;
        }
        if !self.extensions.is_empty() {
            config.extraction.extensions = self
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect();
        }
        if self.recursive {
            config.extraction.recursive = true;
        }
        if self.keep_references {
            config.extraction.truncate_at_references = false;
        }
        if self.parallel {
            config.processing.parallel = true;
        }
        if self.threads.is_some() {
            config.processing.threads = self.threads;
        }
        if self.skip_duplicates {
            config.processing.skip_duplicates = true;
        }
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
        if self.format.is_some() {
            config.output.format = self.format;
        }

        Ok(config)
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_filter = match (quiet, verbose) {
        (true, _) => "paper_chunker=error",
        (false, 0) => "paper_chunker=info",
        (false, 1) => "paper_chunker=debug",
        (false, _) => "paper_chunker=trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_process(args: ProcessArgs) -> Result<()> {
    let config = args.resolve_config()?;
    let output_path = config.output.path.clone();

    let chunker = DocumentChunker::new(config)?;
    let documents: Vec<_> = chunker.discover()?.collect();

    let progress = if args.no_progress {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(documents.len() as u64);
        let bar_style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(bar_style);
        bar
    };

    let outcome = chunker.process_documents(&documents, |doc| {
        progress.set_message(doc.name.clone());
        progress.inc(1);
    })?;
    progress.finish_and_clear();

    chunker
        .persist(&output_path, &outcome.chunks)
        .with_context(|| format!("saving chunks to {}", output_path.display()))?;

    for failure in &outcome.summary.failures {
        eprintln!(
            "{} {}: {}",
            style("failed").red().for_stderr(),
            failure.path.display(),
            failure.message
        );
    }
    for skipped in &outcome.summary.skipped_duplicates {
        eprintln!(
            "{} {} (duplicate of {})",
            style("skipped").yellow().for_stderr(),
            skipped.path.display(),
            skipped.duplicate_of
        );
    }

    println!(
        "Processed {} PDFs and saved {} chunks to '{}'.",
        outcome.summary.documents_processed,
        outcome.summary.chunks_produced,
        output_path.display()
    );
    Ok(())
}

fn run_inspect(file: PathBuf, format: Option<OutputFormat>) -> Result<()> {
    let format = format.unwrap_or_else(|| OutputFormat::from_path(&file));
    let chunks = load_chunks(&file, format)
        .with_context(|| format!("reading chunk file {}", file.display()))?;

    let counts = chunks.document_counts();
    println!("{} chunks from {} documents", chunks.len(), counts.len());
    for (name, count) in counts {
        println!("  {}: {} chunks", name, count);
    }
    Ok(())
}

fn run_init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let rendered = PreprocessConfig::default().to_toml_string()?;

    match path {
        None => print!("{}", rendered),
        Some(path) => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            std::fs::write(&path, rendered)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote default configuration to {}", path.display());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Process(args) => run_process(args),
        Commands::Inspect { file, format } => run_inspect(file, format),
        Commands::InitConfig { path, force } => run_init_config(path, force),
    }
}
