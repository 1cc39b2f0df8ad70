//! Quote store loaded once at startup.

use std::fmt;
use std::path::{Path, PathBuf};

use rand::seq::IndexedRandom;
use serde::Deserialize;
use tracing::{info, warn};

/// A single canned quote.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Quote {
    #[serde(rename = "quote")]
    pub text: String,
}

#[derive(Debug)]
pub enum QuoteError {
    /// Failed to read the quote file.
    Read { path: PathBuf, source: std::io::Error },
    /// The file is not a JSON array of `{"quote": ...}` records.
    Parse { path: PathBuf, source: serde_json::Error },
    /// No quotes to pick from.
    Empty,
}

impl fmt::Display for QuoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read quote file '{}': {}", path.display(), source)
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse quote file '{}': {}", path.display(), source)
            }
            Self::Empty => write!(f, "quote store is empty"),
        }
    }
}

impl std::error::Error for QuoteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Empty => None,
        }
    }
}

/// Immutable collection of quotes.
#[derive(Debug, Clone, Default)]
pub struct QuoteStore {
    quotes: Vec<Quote>,
}

impl QuoteStore {
    /// Load quotes from a JSON file.
    ///
    /// An empty array loads fine but is logged, since every pick will fail.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, QuoteError> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| QuoteError::Read { path: path.clone(), source: e })?;
        let quotes: Vec<Quote> = serde_json::from_str(&content)
            .map_err(|e| QuoteError::Parse { path: path.clone(), source: e })?;

        if quotes.is_empty() {
            warn!("Quote file {} contains no quotes", path.display());
        } else {
            info!("Loaded {} quotes from {}", quotes.len(), path.display());
        }

        Ok(Self { quotes })
    }

    pub fn from_quotes(quotes: Vec<Quote>) -> Self {
        Self { quotes }
    }

    /// Text of one uniformly chosen quote.
    pub fn random_quote(&self) -> Result<&str, QuoteError> {
        self.quotes
            .choose(&mut rand::rng())
            .map(|q| q.text.as_str())
            .ok_or(QuoteError::Empty)
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Quote> {
        self.quotes.iter()
    }
}

impl FromIterator<String> for QuoteStore {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            quotes: iter.into_iter().map(|text| Quote { text }).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_quotes(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_file() {
        let file = write_quotes(r#"[
            {"quote": "Patience is a key."},
            {"quote": "Knowledge is light.", "source": "ignored"}
        ]"#);
        let store = QuoteStore::load(file.path()).expect("should load");
        assert_eq!(store.len(), 2);
        assert_eq!(store.iter().next().unwrap().text, "Patience is a key.");
    }

    #[test]
    fn test_load_missing_file() {
        let err = QuoteStore::load("/nonexistent/quotes.json").unwrap_err();
        assert!(matches!(err, QuoteError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/quotes.json"));
    }

    #[test]
    fn test_load_malformed_json() {
        let file = write_quotes("[{ not json");
        let err = QuoteStore::load(file.path()).unwrap_err();
        assert!(matches!(err, QuoteError::Parse { .. }));
    }

    #[test]
    fn test_load_wrong_record_shape() {
        let file = write_quotes(r#"[{"text": "missing quote field"}]"#);
        let err = QuoteStore::load(file.path()).unwrap_err();
        assert!(matches!(err, QuoteError::Parse { .. }));
    }

    #[test]
    fn test_load_empty_array_is_allowed() {
        let file = write_quotes("[]");
        let store = QuoteStore::load(file.path()).expect("empty array loads");
        assert!(store.is_empty());
        assert!(matches!(store.random_quote(), Err(QuoteError::Empty)));
    }

    #[test]
    fn test_random_quote_is_from_store() {
        let texts = ["one", "two", "three"];
        let store: QuoteStore = texts.iter().map(|t| t.to_string()).collect();
        for _ in 0..100 {
            let picked = store.random_quote().unwrap();
            assert!(texts.contains(&picked), "unexpected quote {picked:?}");
        }
    }

    #[test]
    fn test_single_quote_always_picked() {
        let store: QuoteStore = std::iter::once("only".to_string()).collect();
        assert_eq!(store.random_quote().unwrap(), "only");
    }
}
