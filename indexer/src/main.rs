use anyhow::Result;
use clap::{Parser, Subcommand};
use search_core::persist::{save_index, IndexPaths};
use search_core::{IndexBuilder, StopWords, StopwordLanguage, Tokenizer};
use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt as log_fmt, EnvFilter};

mod corpus;

use corpus::read_corpus;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a boolean-searchable inverted index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from JSON/JSONL/HTML/text files or a directory
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
        /// Built-in stopword list: english, spanish or none
        #[arg(long, default_value_t = StopwordLanguage::English)]
        language: StopwordLanguage,
        /// Stopword file with one word per line; overrides --language
        #[arg(long)]
        stopwords: Option<String>,
        /// Number of partial indexes built in parallel and merged
        #[arg(long, default_value_t = 1)]
        shards: usize,
    },
}

struct BuildOptions {
    stopwords: StopWords,
    shards: usize,
}

#[derive(Debug)]
struct IndexStats {
    num_docs: u32,
    num_terms: usize,
    skipped: usize,
    elapsed: Duration,
}

impl fmt::Display for IndexStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Words: {}", self.num_terms)?;
        writeln!(f, "Docs: {}", self.num_docs)?;
        writeln!(f, "Skipped: {}", self.skipped)?;
        write!(f, "Time: {:.3}s", self.elapsed.as_secs_f64())
    }
}

fn main() -> Result<()> {
    log_fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, language, stopwords, shards } => {
            let stopwords = match stopwords {
                Some(path) => StopWords::from_file(path)?,
                None => StopWords::for_language(language),
            };
            let stats = build_index(Path::new(&input), Path::new(&output), BuildOptions { stopwords, shards })?;
            println!("{stats}");
            Ok(())
        }
    }
}

fn build_index(input: &Path, output: &Path, options: BuildOptions) -> Result<IndexStats> {
    let started = Instant::now();
    let corpus = read_corpus(input)?;
    for failure in &corpus.failures {
        tracing::warn!(%failure, "skipping unreadable record");
    }
    let read = corpus.records.len();
    tracing::info!(records = read, failures = corpus.failures.len(), "corpus read");

    let tokenizer = Tokenizer::new(options.stopwords);
    let index = if options.shards > 1 {
        IndexBuilder::build_sharded(&tokenizer, corpus.records, options.shards)
    } else {
        IndexBuilder::new(tokenizer).build(corpus.records)
    };
    tracing::info!(num_docs = index.num_docs(), num_terms = index.num_terms(), "ingested documents");

    let created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "".into());
    save_index(&IndexPaths::new(output), &index, &created_at)?;
    tracing::info!(output = %output.display(), "index build complete");

    Ok(IndexStats {
        num_docs: index.num_docs(),
        num_terms: index.num_terms(),
        skipped: corpus.failures.len() + (read - index.num_docs() as usize),
        elapsed: started.elapsed(),
    })
}
