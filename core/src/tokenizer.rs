use crate::normalize::clean;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const ENGLISH: &str = include_str!("../stopwords/english.txt");
const SPANISH: &str = include_str!("../stopwords/spanish.txt");

/// Built-in stopword lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopwordLanguage {
    #[default]
    English,
    Spanish,
    None,
}

impl FromStr for StopwordLanguage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(Self::English),
            "spanish" | "es" => Ok(Self::Spanish),
            "none" => Ok(Self::None),
            other => Err(format!("unknown stopword language {other:?} (expected english, spanish or none)")),
        }
    }
}

impl fmt::Display for StopwordLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::English => "english",
            Self::Spanish => "spanish",
            Self::None => "none",
        })
    }
}

/// A set of stopwords, stored in the same folded form the index uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn for_language(language: StopwordLanguage) -> Self {
        match language {
            StopwordLanguage::English => Self::from_list(ENGLISH),
            StopwordLanguage::Spanish => Self::from_list(SPANISH),
            StopwordLanguage::None => Self::empty(),
        }
    }

    /// Parse a list with one word per line. Blank lines and `#` comments are ignored.
    pub fn from_list(list: &str) -> Self {
        let words = list
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(clean)
            .filter(|word| !word.is_empty())
            .collect();
        Self { words }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let list = std::fs::read_to_string(path)
            .with_context(|| format!("reading stopword list {}", path.display()))?;
        Ok(Self::from_list(&list))
    }

    /// Lookup of an already cleaned term; entries are stored in cleaned form.
    pub fn contains(&self, term: &str) -> bool {
        self.words.contains(term)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Splits normalized text into terms and drops stopwords.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stopwords: StopWords,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(StopWords::for_language(StopwordLanguage::default()))
    }
}

impl Tokenizer {
    pub fn new(stopwords: StopWords) -> Self {
        Self { stopwords }
    }

    pub fn stopwords(&self) -> &StopWords {
        &self.stopwords
    }

    /// Terms of `normalized` in their original order, stopwords removed.
    pub fn tokenize<'a>(&self, normalized: &'a str) -> Vec<&'a str> {
        normalized
            .split_whitespace()
            .filter(|term| !self.stopwords.contains(term))
            .collect()
    }

    /// Distinct terms of `normalized`, as the index builder consumes them.
    pub fn terms<'a>(&self, normalized: &'a str) -> HashSet<&'a str> {
        self.tokenize(normalized).into_iter().collect()
    }
}
