//! Boolean keyword search over an inverted index.
//!
//! Raw records flow through [`normalize`] and [`tokenizer`] into an
//! [`IndexBuilder`]; the resulting [`Index`] is persisted with [`persist`] and
//! queried through a [`Searcher`].

pub mod builder;
pub mod error;
pub mod index;
pub mod normalize;
pub mod persist;
pub mod query;
pub mod results;
pub mod search;
pub mod tokenizer;

pub use builder::IndexBuilder;
pub use error::{IndexLoadError, IngestionError, MalformedQuery};
pub use index::{DocId, Document, DocumentRecord, Index};
pub use results::{SearchHit, DEFAULT_SNIPPET_CHARS};
pub use search::{QueryOutcome, Searcher};
pub use tokenizer::{StopWords, StopwordLanguage, Tokenizer};
