use anyhow::{bail, Result};
use clap::Parser;
use rummage_core::config;
use rummage_core::pipeline::{self, RunSummary};
use std::path::PathBuf;
use storage::{Category, Index};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rummage")]
#[command(about = "Classify media files by the reliability of their capture dates", long_about = None)]
struct Cli {
    /// Directory to scan
    directory: PathBuf,

    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    /// Output JSON summary
    #[arg(long)]
    json: bool,

    /// Print the records of one category (ok, big_diff, no_dates, ...)
    #[arg(long)]
    list: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    let list = match cli.list.as_deref() {
        Some(name) => match Category::parse(name) {
            Some(category) => Some(category),
            None => bail!("unknown category: {name}"),
        },
        None => None,
    };

    let (index, summary) = pipeline::run(&cfg, &cli.directory)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    if let Some(category) = list {
        print_records(&index, category);
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("{}", summary.root.display());
    println!(
        "discovered {}, cached {}, classified {}, skipped {}, pruned {}",
        summary.discovered, summary.cached, summary.stored, summary.skipped, summary.pruned
    );
    for (category, count) in &summary.categories {
        println!("---------------------------- {category:<20} {count:>8}");
    }
    println!("index: {}", summary.index_file.display());
}

fn print_records(index: &Index, category: Category) {
    for record in index.records(category) {
        match (&record.name_date, category) {
            (
                Some(name_date),
                Category::NoDates | Category::NoAttributes | Category::UnrecognizedEntry,
            ) => println!(
                "{}\t{}\t(name suggests {})",
                record.path.display(),
                record.detail,
                name_date
            ),
            _ => println!("{}\t{}", record.path.display(), record.detail),
        }
    }
}
