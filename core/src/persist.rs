use crate::error::IndexLoadError;
use crate::{DocId, Document, Index};
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Bumped whenever the on-disk layout changes.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u64,
    pub created_at: String,
    pub version: u32,
}

impl MetaFile {
    pub fn for_index(index: &Index, created_at: impl Into<String>) -> Self {
        Self {
            num_docs: index.num_docs(),
            num_terms: index.num_terms() as u64,
            created_at: created_at.into(),
            version: FORMAT_VERSION,
        }
    }
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn documents(&self) -> PathBuf { self.root.join("documents.bin") }
    fn postings(&self) -> PathBuf { self.root.join("postings.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

/// Persist `index` under `paths.root`. Terms and posting lists are written in
/// sorted order so the same corpus always produces the same bytes.
pub fn save_index(paths: &IndexPaths, index: &Index, created_at: &str) -> Result<MetaFile> {
    create_dir_all(&paths.root)?;

    let bytes = bincode::serialize(index.documents())?;
    File::create(paths.documents())?.write_all(&bytes)?;

    let bytes = bincode::serialize(&index.sorted_postings())?;
    File::create(paths.postings())?.write_all(&bytes)?;

    let meta = MetaFile::for_index(index, created_at);
    save_meta(paths, &meta)?;
    Ok(meta)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile, IndexLoadError> {
    let path = paths.meta();
    let bytes = read_file(&path)?;
    serde_json::from_slice(&bytes).map_err(|e| IndexLoadError::Corrupt { path, reason: e.to_string() })
}

/// Load and validate a persisted index.
pub fn load_index(paths: &IndexPaths) -> Result<Index, IndexLoadError> {
    if !paths.root.is_dir() {
        return Err(IndexLoadError::Missing(paths.root.clone()));
    }
    let schema = |reason: String| IndexLoadError::SchemaMismatch { path: paths.root.clone(), reason };

    let meta = load_meta(paths)?;
    if meta.version != FORMAT_VERSION {
        return Err(schema(format!("format version {} (expected {FORMAT_VERSION})", meta.version)));
    }

    let documents: Vec<Document> = read_bincode(&paths.documents())?;
    let entries: Vec<(String, Vec<DocId>)> = read_bincode(&paths.postings())?;

    if documents.len() != meta.num_docs as usize {
        return Err(schema(format!("meta lists {} documents, found {}", meta.num_docs, documents.len())));
    }
    let num_entries = entries.len();
    let postings: HashMap<String, Vec<DocId>> = entries.into_iter().collect();
    if postings.len() != num_entries {
        return Err(schema("duplicate term in postings".to_string()));
    }

    let index = Index::from_parts(documents, postings);
    index.check_invariants().map_err(schema)?;
    tracing::debug!(root = %paths.root.display(), num_docs = index.num_docs(), num_terms = index.num_terms(), "index loaded");
    Ok(index)
}

fn read_file(path: &Path) -> Result<Vec<u8>, IndexLoadError> {
    std::fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => IndexLoadError::Missing(path.to_path_buf()),
        _ => IndexLoadError::Io { path: path.to_path_buf(), source },
    })
}

fn read_bincode<T: DeserializeOwned>(path: &Path) -> Result<T, IndexLoadError> {
    let bytes = read_file(path)?;
    bincode::deserialize(&bytes).map_err(|e| IndexLoadError::Corrupt { path: path.to_path_buf(), reason: e.to_string() })
}
