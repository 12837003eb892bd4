use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use storyidx::{debug_report, load_documents, load_queries, run_queries, write_debug, write_trecrun};
use storyidx_core::{Bm25Params, InvertedIndex, QlParams, SearchConfig, Searcher};
use tracing_subscriber::{fmt, EnvFilter};

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "storyidx")]
#[command(about = "Positional inverted index with boolean, phrase and ranked queries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a collection, run a query file and write a trec run file
    Run {
        /// Documents: a .json/.jsonl(.gz) file or a directory of them
        #[arg(long)]
        docs: PathBuf,
        /// Tab-separated query file
        #[arg(long)]
        queries: PathBuf,
        /// Output run file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Run tag written in the last column
        #[arg(long, default_value = "storyidx")]
        run_tag: String,
        /// Dirichlet prior for query likelihood
        #[arg(long, default_value_t = 300.0)]
        mu: f64,
        #[arg(long, default_value_t = 1.8)]
        k1: f64,
        #[arg(long, default_value_t = 5.0)]
        k2: f64,
        #[arg(long, default_value_t = 0.75)]
        b: f64,
        /// Result-set size for ql and bm25 queries
        #[arg(long, default_value_t = 100)]
        max_results: usize,
        /// Evaluate queries concurrently
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },
    /// Print collection totals and the posting lists of some terms
    Debug {
        #[arg(long)]
        docs: PathBuf,
        /// Terms to look up
        terms: Vec<String>,
        /// Print full posting lists
        #[arg(long, default_value_t = false)]
        postings: bool,
        /// Emit JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { docs, queries, output, run_tag, mu, k1, k2, b, max_results, parallel } => {
            let config = SearchConfig { ql: QlParams { mu }, bm25: Bm25Params { k1, k2, b }, max_results };
            run(&docs, &queries, output, &run_tag, config, parallel)
        }
        Commands::Debug { docs, terms, postings, json } => debug(&docs, &terms, postings, json),
    }
}

fn run(
    docs: &Path,
    queries: &Path,
    output: Option<PathBuf>,
    run_tag: &str,
    config: SearchConfig,
    parallel: bool,
) -> Result<()> {
    let index = InvertedIndex::from_documents(load_documents(docs)?);
    let queries = load_queries(queries)?;
    let searcher = Searcher::with_config(&index, config);
    let results = run_queries(&searcher, &queries, parallel);

    let mut out: Box<dyn Write> = match &output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    for (query, rows) in &results {
        write_trecrun(&mut out, &query.name, rows, run_tag)?;
    }
    out.flush()?;

    tracing::info!(queries = results.len(), "run complete");
    Ok(())
}

fn debug(docs: &Path, terms: &[String], postings: bool, json: bool) -> Result<()> {
    let index = InvertedIndex::from_documents(load_documents(docs)?);
    let report = debug_report(&index, terms, postings);
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        write_debug(&mut out, &report)?;
    }
    Ok(())
}
