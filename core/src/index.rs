use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type DocId = u32;

/// Raw input handed over by the fetcher. Consumed once by the builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Raw page markup or extracted document text.
    #[serde(rename = "text", alias = "raw_text", alias = "body")]
    pub raw_text: String,
}

impl DocumentRecord {
    pub fn new(url: impl Into<String>, title: Option<String>, raw_text: impl Into<String>) -> Self {
        Self { url: url.into(), title, raw_text: raw_text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// 1-based, equal to the document's position in the index plus one.
    pub id: DocId,
    pub title: String,
    pub url: String,
    pub normalized_text: String,
    /// First heading found in the markup, kept for snippets.
    pub heading: Option<String>,
}

/// Inverted index: term -> ascending ids of the documents containing it.
///
/// Built once, then read-only. Every id in a posting list dereferences a
/// document and appears at most once in that list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    documents: Vec<Document>,
    postings: HashMap<String, Vec<DocId>>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(documents: Vec<Document>, postings: HashMap<String, Vec<DocId>>) -> Self {
        Self { documents, postings }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, id: DocId) -> Option<&Document> {
        let pos = id.checked_sub(1)?;
        self.documents.get(pos as usize)
    }

    /// Posting list for `term`. Unknown terms resolve to an empty list.
    pub fn postings(&self, term: &str) -> &[DocId] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Size of the universe `{1..N}` used for complements.
    pub fn num_docs(&self) -> DocId {
        self.documents.len() as DocId
    }

    pub fn num_terms(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Postings ordered by term, for persistence and deterministic comparison.
    pub fn sorted_postings(&self) -> Vec<(&str, &[DocId])> {
        let mut out: Vec<(&str, &[DocId])> = self
            .postings
            .iter()
            .map(|(term, ids)| (term.as_str(), ids.as_slice()))
            .collect();
        out.sort_unstable_by(|a, b| a.0.cmp(b.0));
        out
    }

    /// Concatenate shard indexes in order, shifting each shard's ids past the
    /// documents that precede it.
    pub fn merge<I: IntoIterator<Item = Index>>(shards: I) -> Index {
        let mut documents: Vec<Document> = Vec::new();
        let mut postings: HashMap<String, Vec<DocId>> = HashMap::new();
        for shard in shards {
            let offset = documents.len() as DocId;
            for (term, ids) in shard.postings {
                postings.entry(term).or_default().extend(ids.into_iter().map(|id| id + offset));
            }
            documents.extend(shard.documents.into_iter().map(|mut doc| {
                doc.id += offset;
                doc
            }));
        }
        for ids in postings.values_mut() {
            ids.sort_unstable();
            ids.dedup();
        }
        Index { documents, postings }
    }

    /// Check the structural invariants a loaded index must satisfy.
    pub(crate) fn check_invariants(&self) -> Result<(), String> {
        for (pos, doc) in self.documents.iter().enumerate() {
            if doc.id as usize != pos + 1 {
                return Err(format!("document at position {pos} has id {}", doc.id));
            }
        }
        let n = self.num_docs();
        for (term, ids) in &self.postings {
            if ids.is_empty() {
                return Err(format!("posting list for {term:?} is empty"));
            }
            if ids.windows(2).any(|w| w[0] >= w[1]) {
                return Err(format!("posting list for {term:?} is not strictly ascending"));
            }
            if let Some(bad) = ids.iter().find(|&&id| id == 0 || id > n) {
                return Err(format!("posting list for {term:?} references unknown document {bad}"));
            }
        }
        Ok(())
    }
}
