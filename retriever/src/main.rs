use clap::Parser;
use retriever::{answer_batch, answer_query, Status};
use search_core::persist::IndexPaths;
use search_core::{Searcher, DEFAULT_SNIPPET_CHARS};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "retriever")]
#[command(about = "Answer boolean AND/OR/NOT queries against a built index", long_about = None)]
#[command(group(clap::ArgGroup::new("mode").required(true).args(["query", "queries"])))]
struct Args {
    /// Index directory path
    #[arg(long, default_value = "./index")]
    index: String,
    /// A single query, e.g. "grado AND NOT master"
    #[arg(long)]
    query: Option<String>,
    /// File with one query per line
    #[arg(long)]
    queries: Option<String>,
    /// Write results as JSON to this file instead of printing them
    #[arg(long)]
    output: Option<String>,
    /// Maximum snippet length in characters
    #[arg(long, default_value_t = DEFAULT_SNIPPET_CHARS)]
    snippet_chars: usize,
}

fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let searcher = match Searcher::open(&IndexPaths::new(&args.index)) {
        Ok(searcher) => searcher.with_snippet_chars(args.snippet_chars),
        Err(err) => {
            tracing::error!(%err, "cannot load index");
            eprintln!("error: {err}");
            return Status::IndexLoadFailed.into();
        }
    };

    let output = args.output.as_deref().map(Path::new);
    let result = match &args.queries {
        Some(queries) => answer_batch(&searcher, Path::new(queries), output),
        None => answer_query(&searcher, args.query.as_deref().unwrap_or_default(), output),
    };
    match result {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
