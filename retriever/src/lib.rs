use anyhow::{Context, Result};
use search_core::{QueryOutcome, SearchHit, Searcher};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;

/// How a retrieval run ended, mapped onto the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    IndexLoadFailed,
    MalformedQuery,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => ExitCode::SUCCESS,
            Status::IndexLoadFailed => ExitCode::from(2),
            Status::MalformedQuery => ExitCode::from(3),
        }
    }
}

/// Per-query entry of a batch report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Results(Vec<SearchHit>),
    Error(String),
}

impl From<QueryOutcome> for Outcome {
    fn from(outcome: QueryOutcome) -> Self {
        match outcome {
            Ok(hits) => Outcome::Results(hits),
            Err(err) => Outcome::Error(err.to_string()),
        }
    }
}

/// Batch results keyed by query, ordered for stable output.
pub fn batch_report(results: HashMap<String, QueryOutcome>) -> BTreeMap<String, Outcome> {
    results.into_iter().map(|(query, outcome)| (query, outcome.into())).collect()
}

pub fn render_hits(hits: &[SearchHit]) -> String {
    hits.iter().map(|hit| format!("{hit}\n")).collect()
}

pub fn render_batch(report: &BTreeMap<String, Outcome>) -> String {
    let mut out = String::new();
    for (query, outcome) in report {
        out.push_str(&format!("# {query}\n"));
        match outcome {
            Outcome::Results(hits) if hits.is_empty() => out.push_str("(no results)\n"),
            Outcome::Results(hits) => out.push_str(&render_hits(hits)),
            Outcome::Error(err) => out.push_str(&format!("error: {err}\n")),
        }
    }
    out
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Answer one query, printing hits or writing them as JSON to `output`.
pub fn answer_query(searcher: &Searcher, query: &str, output: Option<&Path>) -> Result<Status> {
    let hits = match searcher.search(query) {
        Ok(hits) => hits,
        Err(err) => {
            tracing::warn!(query, %err, "malformed query");
            eprintln!("malformed query: {err}");
            return Ok(Status::MalformedQuery);
        }
    };
    tracing::info!(query, hits = hits.len(), "query answered");
    match output {
        Some(path) => write_json(path, &hits)?,
        None => print!("{}", render_hits(&hits)),
    }
    Ok(Status::Success)
}

/// Answer every query in `queries`. Malformed queries are reported in their
/// own entries; the batch as a whole still succeeds.
pub fn answer_batch(searcher: &Searcher, queries: &Path, output: Option<&Path>) -> Result<Status> {
    let report = batch_report(searcher.search_from_file(queries)?);
    match output {
        Some(path) => write_json(path, &report)?,
        None => print!("{}", render_batch(&report)),
    }
    Ok(Status::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_core::MalformedQuery;

    fn hit(id: u32) -> SearchHit {
        SearchHit { doc_id: id, title: String::new(), url: format!("https://u/{id}"), snippet: format!("text {id}") }
    }

    #[test]
    fn renders_hits_one_per_line() {
        assert_eq!(render_hits(&[hit(1), hit(3)]), "https://u/1 -> text 1\nhttps://u/3 -> text 3\n");
    }

    #[test]
    fn batch_report_keeps_errors_distinct_from_empty_results() {
        let mut results: HashMap<String, QueryOutcome> = HashMap::new();
        results.insert("b".into(), Ok(vec![]));
        results.insert("a".into(), Err(MalformedQuery::UnmatchedOpenParen));
        results.insert("c".into(), Ok(vec![hit(2)]));
        let report = batch_report(results);

        assert_eq!(report["b"], Outcome::Results(vec![]));
        assert!(matches!(report["a"], Outcome::Error(_)));
        assert_eq!(
            render_batch(&report),
            "# a\nerror: unmatched '(' in query\n# b\n(no results)\n# c\nhttps://u/2 -> text 2\n"
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["a"]["error"], "unmatched '(' in query");
        assert_eq!(json["b"]["results"], serde_json::json!([]));
        assert_eq!(json["c"]["results"][0]["url"], "https://u/2");
    }
}
