use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Dense 0-based document number, assigned in first-seen order during ingestion
pub type DocNum = u32;

/// Posting entry - one term's occurrence count in one document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub doc: DocNum,
    pub tf: u32,
}

impl Posting {
    pub fn new(doc: DocNum) -> Self {
        Self { doc, tf: 1 }
    }
}

/// Document entry in the document table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// External identifier taken from the corpus
    pub doc_id: String,
    /// 0-based line of the document-open marker in the raw corpus
    pub start_line: u64,
}

/// Dictionary entry mapping a term to its postings block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictEntry {
    pub term: String,
    pub doc_freq: u32,
    /// Start of this term's block in the postings array (prefix sum of doc_freq)
    pub offset: usize,
}

impl DictEntry {
    /// Range of this term's postings in the flat postings array
    pub fn block(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.doc_freq as usize
    }
}

/// The three persisted artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Dictionary,
    Postings,
    Documents,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::Dictionary => "dictionary",
            ArtifactKind::Postings => "postings",
            ArtifactKind::Documents => "documents",
        };
        f.write_str(name)
    }
}

/// Locations of the three artifacts of one index
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub dictionary: PathBuf,
    pub postings: PathBuf,
    pub documents: PathBuf,
}

impl ArtifactPaths {
    /// Resolve artifact locations inside an index directory
    pub fn in_dir(dir: &Path, config: &IndexConfig) -> Self {
        Self {
            dictionary: dir.join(&config.dictionary_file),
            postings: dir.join(&config.postings_file),
            documents: dir.join(&config.documents_file),
        }
    }

    pub fn get(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Dictionary => &self.dictionary,
            ArtifactKind::Postings => &self.postings,
            ArtifactKind::Documents => &self.documents,
        }
    }
}

/// Counts reported after a successful ingestion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    pub term_count: usize,
    pub document_count: usize,
    pub posting_count: usize,
}

/// Configuration for the corpus scanner and artifact layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Prefix that makes a token a control marker
    pub marker_prefix: String,
    /// Marker opening a new document; the next token is its id
    pub doc_marker: String,
    /// Header (title) marker
    pub header_marker: String,
    /// Body marker
    pub body_marker: String,
    pub dictionary_file: String,
    pub postings_file: String,
    pub documents_file: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            marker_prefix: "$".to_string(),
            doc_marker: "$DOC".to_string(),
            header_marker: "$TITLE".to_string(),
            body_marker: "$BODY".to_string(),
            dictionary_file: "dictionary.txt".to_string(),
            postings_file: "postings.txt".to_string(),
            documents_file: "docids.txt".to_string(),
        }
    }
}

impl IndexConfig {
    #[inline]
    pub fn is_marker(&self, token: &str) -> bool {
        !self.marker_prefix.is_empty() && token.starts_with(&self.marker_prefix)
    }

    #[inline]
    pub fn is_doc_marker(&self, token: &str) -> bool {
        token == self.doc_marker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dict_entry_block() {
        let entry = DictEntry {
            term: "dog".to_string(),
            doc_freq: 2,
            offset: 1,
        };
        assert_eq!(entry.block(), 1..3);
    }

    #[test]
    fn test_marker_detection() {
        let config = IndexConfig::default();
        assert!(config.is_marker("$DOC"));
        assert!(config.is_marker("$ANYTHING"));
        assert!(!config.is_marker("DOC"));
        assert!(config.is_doc_marker("$DOC"));
        assert!(!config.is_doc_marker("$BODY"));
    }

    #[test]
    fn test_index_config_partial_json() {
        let config: IndexConfig = serde_json::from_str(r#"{"doc_marker": "<DOC>"}"#).unwrap();
        assert_eq!(config.doc_marker, "<DOC>");
        assert_eq!(config.marker_prefix, "$");
        assert_eq!(config.postings_file, "postings.txt");
    }

    #[test]
    fn test_artifact_paths() {
        let paths = ArtifactPaths::in_dir(Path::new("/idx"), &IndexConfig::default());
        assert_eq!(paths.get(ArtifactKind::Documents), Path::new("/idx/docids.txt"));
    }
}
