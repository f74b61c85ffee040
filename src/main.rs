use clap::Parser;
use tracing_subscriber::EnvFilter;

use arxiv_collector::{Collector, OutputMode, Result};

/// Retrieve arXiv search-result metadata into a BibTeX or CSV file.
#[derive(Parser, Debug)]
#[command(name = "arxiv-collector", version, about)]
struct Args {
    /// The search-results URL to scrape
    url: String,

    /// The title for the output file ({title}.bib or {title}.csv)
    title: String,

    /// Output format: bibtex or csv
    #[arg(short, long, default_value = "bibtex")]
    mode: String,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over the verbosity flag.
    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("arxiv_collector={default_level}")));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mode: OutputMode = args.mode.parse()?;
    let mut collector = Collector::new(mode)?;
    collector.set_title(&args.title);
    collector.run(&args.url).await?;

    Ok(())
}
