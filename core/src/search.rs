use crate::error::{IndexLoadError, MalformedQuery};
use crate::normalize::clean;
use crate::persist::{load_index, IndexPaths};
use crate::query::{evaluate, parse, Token};
use crate::results::{assemble, SearchHit, DEFAULT_SNIPPET_CHARS};
use crate::{DocId, Index};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Outcome of one query in a batch. A malformed query is an `Err`, never an
/// empty hit list.
pub type QueryOutcome = std::result::Result<Vec<SearchHit>, MalformedQuery>;

/// Read-only query session over a loaded index.
///
/// Holds no mutable state, so one `Searcher` can serve any number of
/// concurrent queries.
#[derive(Debug, Clone)]
pub struct Searcher {
    index: Index,
    snippet_chars: usize,
}

impl Searcher {
    pub fn new(index: Index) -> Self {
        Self { index, snippet_chars: DEFAULT_SNIPPET_CHARS }
    }

    pub fn open(paths: &IndexPaths) -> std::result::Result<Self, IndexLoadError> {
        Ok(Self::new(load_index(paths)?))
    }

    pub fn with_snippet_chars(mut self, snippet_chars: usize) -> Self {
        self.snippet_chars = snippet_chars;
        self
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Parse `query` to postfix, normalizing terms the way documents were.
    pub fn compile(&self, query: &str) -> std::result::Result<Vec<Token>, MalformedQuery> {
        let postfix = parse(query)?;
        Ok(postfix
            .into_iter()
            .map(|token| match token {
                Token::Term(term) => Token::Term(clean(&term)),
                other => other,
            })
            .collect())
    }

    /// Matching document ids, ascending.
    pub fn resolve(&self, query: &str) -> std::result::Result<Vec<DocId>, MalformedQuery> {
        let postfix = self.compile(query)?;
        evaluate(&postfix, &self.index)
    }

    pub fn search(&self, query: &str) -> QueryOutcome {
        let ids = self.resolve(query)?;
        Ok(assemble(&ids, &self.index, self.snippet_chars))
    }

    /// Answer every non-blank line of `path` as an independent query.
    ///
    /// Only failing to read the file is an error; a malformed query is
    /// reported in its own entry and does not affect the others. Lines that
    /// are not valid UTF-8 are decoded lossily and answered like any other.
    pub fn search_from_file<P: AsRef<Path>>(&self, path: P) -> Result<HashMap<String, QueryOutcome>> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("opening query file {}", path.display()))?;
        let started = std::time::Instant::now();
        let mut results: HashMap<String, QueryOutcome> = HashMap::new();
        for line in BufReader::new(file).split(b'\n') {
            let line = line.with_context(|| format!("reading query file {}", path.display()))?;
            let line = String::from_utf8_lossy(&line);
            let query = line.trim();
            if query.is_empty() || results.contains_key(query) {
                continue;
            }
            let outcome = self.search(query);
            if let Err(err) = &outcome {
                tracing::warn!(query, %err, "malformed query");
            }
            results.insert(query.to_string(), outcome);
        }
        tracing::info!(queries = results.len(), took_s = started.elapsed().as_secs_f64(), "batch answered");
        Ok(results)
    }
}
