//! langx CLI
//!
//! Command-line tool for extracting message keys from sources and merging them
//! into a CSV translation table.

use clap::{Parser, Subcommand};
use langx_core::{
    parse_table, replace_in_files, CrawlPattern, CsvFormat, Extractor, Job, RegexScanner,
    ScanFlags,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "langx")]
#[command(about = "Extract message keys and maintain translation tables", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a job and merge the results into its translation table
    Extract {
        /// Path to job file (JSON)
        #[arg(short, long)]
        job: PathBuf,
    },

    /// Run a job and report conflicts and negatives without writing
    Check {
        /// Path to job file (JSON)
        #[arg(short, long)]
        job: PathBuf,
    },

    /// Rewrite matches in source files into an output directory
    Replace {
        /// Directory to crawl
        #[arg(short, long, default_value = ".")]
        base_dir: PathBuf,

        /// Glob patterns of files to include
        #[arg(short, long)]
        include: Vec<String>,

        /// Glob patterns of files to skip
        #[arg(short = 'x', long)]
        exclude: Vec<String>,

        /// Pattern with at least one capture group
        #[arg(short, long)]
        regex: String,

        /// Skip matches whose first group fully matches this pattern
        #[arg(long)]
        ignore: Option<String>,

        /// Replacement, may reference groups as $1 or ${name}
        #[arg(short = 'w', long)]
        with: String,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Source encoding
        #[arg(short, long, default_value = "utf-8")]
        encoding: String,

        /// Keep matches with an empty first group
        #[arg(long)]
        allow_empty: bool,

        /// Trim captured groups
        #[arg(long)]
        trim: bool,
    },

    /// Create a job file template
    Init {
        /// Output path for the job file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Summarize a translation table
    Show {
        /// Path to the table
        #[arg(short, long)]
        table: PathBuf,

        /// Table encoding
        #[arg(short, long, default_value = "utf-8")]
        encoding: String,

        /// Field delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: String,

        /// Maximum number of rows to display
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Commands) -> langx_core::Result<()> {
    match command {
        Commands::Extract { job } => cmd_extract(&job, true),
        Commands::Check { job } => cmd_extract(&job, false),
        Commands::Replace {
            base_dir,
            include,
            exclude,
            regex,
            ignore,
            with,
            output,
            encoding,
            allow_empty,
            trim,
        } => {
            let pattern = CrawlPattern {
                base_dir,
                includes: include,
                excludes: exclude,
                encoding: encoding.parse()?,
            };
            let scanner = RegexScanner::new(&regex, ignore.as_deref(), ScanFlags::new(allow_empty, trim))?;
            cmd_replace(&pattern, &scanner, &with, &output)
        }
        Commands::Init { output } => cmd_init(&output),
        Commands::Show {
            table,
            encoding,
            delimiter,
            limit,
        } => {
            let format = CsvFormat::new(encoding.parse()?, CsvFormat::parse_delimiter(&delimiter)?);
            cmd_show(&table, format, limit)
        }
    }
}

fn cmd_extract(job_path: &Path, write: bool) -> langx_core::Result<()> {
    let job = Job::load(job_path)?;
    tracing::info!(job = %job_path.display(), "running job");

    let mut extractor = job.run()?;
    report(&mut extractor);

    if write {
        let merged = extractor.persist(&job.output, job.csv_format()?)?;
        let (found, not_found, manual) = merged.status_counts();
        println!();
        println!("Wrote {} rows to {}", merged.messages.len(), job.output.display());
        println!("  {} found, {} not found, {} manual", found, not_found, manual);
    }

    Ok(())
}

fn report(extractor: &mut Extractor) {
    println!("Extracted {} messages", extractor.messages().len());

    let same_key = extractor.same_key_conflicts();
    if !same_key.is_empty() {
        println!();
        println!("Same key with different values ({}):", same_key.len());
        for pair in same_key {
            println!(
                "  {}: '{}' at {} vs '{}' at {}",
                pair.first.key(),
                pair.first.value().unwrap_or_default(),
                pair.first.location(),
                pair.second.value().unwrap_or_default(),
                pair.second.location()
            );
        }
    }

    let same_value = extractor.same_value_conflicts();
    if !same_value.is_empty() {
        println!();
        println!("Same value with different keys ({}):", same_value.len());
        for pair in same_value {
            println!(
                "  '{}': {} at {} vs {} at {}",
                pair.first.value().unwrap_or_default(),
                pair.first.key(),
                pair.first.location(),
                pair.second.key(),
                pair.second.location()
            );
        }
    }

    let negatives = extractor.negatives();
    if !negatives.is_empty() {
        println!();
        println!("Possibly untranslated ({}):", negatives.len());
        for negative in &negatives {
            println!("  {}: '{}'", negative.location(), negative.key());
        }
    }
}

fn cmd_replace(
    pattern: &CrawlPattern,
    scanner: &RegexScanner,
    template: &str,
    output: &Path,
) -> langx_core::Result<()> {
    let result = replace_in_files(pattern, scanner, output, |caps| {
        let mut replacement = String::new();
        caps.expand(template, &mut replacement);
        replacement
    })?;

    println!("Replace complete:");
    println!("  {} files written to {}", result.files_written.len(), output.display());
    println!("  {} replacements", result.replacements);

    Ok(())
}

fn cmd_init(output: &Path) -> langx_core::Result<()> {
    Job::template().save(output)?;
    println!("Created job file: {}", output.display());
    println!();
    println!("Edit the file to configure your scans, then run:");
    println!("  langx extract --job {}", output.display());

    Ok(())
}

fn cmd_show(path: &Path, format: CsvFormat, limit: Option<usize>) -> langx_core::Result<()> {
    let table = parse_table(path, format)?;

    let languages: Vec<&str> = table.languages().iter().map(|c| c.name.as_str()).collect();
    println!("File: {}", table.source_path.display());
    println!("Encoding: {}", format.encoding);
    println!("Languages: {}", languages.join(", "));
    println!("Rows: {}", table.row_count());
    println!();

    // Print header
    let header: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    println!("{}", header.join("\t"));
    println!("{}", "-".repeat(header.len() * 12));

    let row_limit = limit.unwrap_or(table.row_count());
    for row in table.rows.iter().take(row_limit) {
        let values: Vec<String> = row.cells.iter().map(|c| c.replace(['\r', '\n'], " ")).collect();
        println!("{}", values.join("\t"));
    }

    if table.row_count() > row_limit {
        println!("... ({} more rows)", table.row_count() - row_limit);
    }

    Ok(())
}
