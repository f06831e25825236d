use crate::error::IngestionError;
use crate::index::{DocId, Document, DocumentRecord, Index};
use crate::normalize::{clean, extract};
use crate::tokenizer::Tokenizer;
use rayon::prelude::*;
use std::collections::HashMap;

/// Single-pass batch builder.
///
/// Ids are handed out only when a document is actually appended, so a skipped
/// record leaves no gap in the id sequence.
pub struct IndexBuilder {
    tokenizer: Tokenizer,
    documents: Vec<Document>,
    postings: HashMap<String, Vec<DocId>>,
    skipped: usize,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new(Tokenizer::default())
    }
}

impl IndexBuilder {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer, documents: Vec::new(), postings: HashMap::new(), skipped: 0 }
    }

    /// Ingest one record and return the id it was given.
    ///
    /// A record whose text cleans down to nothing still becomes a document; it
    /// just contributes no postings.
    pub fn add(&mut self, record: DocumentRecord) -> Result<DocId, IngestionError> {
        if record.raw_text.contains('\0') {
            self.skipped += 1;
            return Err(IngestionError::Undecodable { url: record.url });
        }
        let Ok(doc_id) = DocId::try_from(self.documents.len() + 1) else {
            self.skipped += 1;
            return Err(IngestionError::IdSpaceExhausted(self.documents.len()));
        };

        let extracted = extract(&record.raw_text);
        let normalized_text = clean(&extracted.text);

        // ids are appended in increasing order, so lists stay sorted
        for term in self.tokenizer.terms(&normalized_text) {
            match self.postings.get_mut(term) {
                Some(ids) => ids.push(doc_id),
                None => {
                    self.postings.insert(term.to_string(), vec![doc_id]);
                }
            }
        }

        let title = record
            .title
            .filter(|t| !t.trim().is_empty())
            .or(extracted.title)
            .unwrap_or_default();
        self.documents.push(Document {
            id: doc_id,
            title,
            url: record.url,
            normalized_text,
            heading: extracted.heading,
        });
        Ok(doc_id)
    }

    /// Records rejected so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn finish(self) -> Index {
        Index::from_parts(self.documents, self.postings)
    }

    /// Ingest every record in order. Failing records are logged and skipped.
    pub fn build<I: IntoIterator<Item = DocumentRecord>>(mut self, records: I) -> Index {
        for record in records {
            if let Err(err) = self.add(record) {
                tracing::warn!(%err, "skipping record");
            }
        }
        tracing::debug!(docs = self.documents.len(), terms = self.postings.len(), skipped = self.skipped, "batch ingested");
        self.finish()
    }

    /// Build `shards` partial indexes in parallel and merge them.
    ///
    /// Produces the same index as [`IndexBuilder::build`] over the same records.
    pub fn build_sharded(tokenizer: &Tokenizer, records: Vec<DocumentRecord>, shards: usize) -> Index {
        if records.is_empty() {
            return Index::new();
        }
        let chunk_len = records.len().div_ceil(shards.max(1));
        let partials: Vec<Index> = records
            .par_chunks(chunk_len)
            .map(|chunk| IndexBuilder::new(tokenizer.clone()).build(chunk.iter().cloned()))
            .collect();
        Index::merge(partials)
    }
}
