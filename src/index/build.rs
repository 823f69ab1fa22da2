use crate::error::{IndexError, Result};
use crate::index::scanner::{ScanEvent, Scanner};
use crate::index::tree::TermTree;
use crate::index::types::{ArtifactPaths, BuildStats, DocNum, Document, IndexConfig};
use crate::index::writer::IndexWriter;
use crate::utils::fold_term;
use crate::utils::progress::spinner;
use log::{info, warn};
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

/// Document table with explicit dense numbering in first-seen order
#[derive(Debug, Default)]
pub struct DocTable {
    documents: Vec<Document>,
    by_id: FxHashMap<String, DocNum>,
}

impl DocTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document and return its number. A repeated id maps back to
    /// the number (and starting line) it was first seen with.
    pub fn open(&mut self, doc_id: String, start_line: u64) -> Result<DocNum> {
        if let Some(&num) = self.by_id.get(&doc_id) {
            warn!(
                "document '{}' at line {} repeats an earlier id, merging into document {}",
                doc_id,
                start_line + 1,
                num
            );
            return Ok(num);
        }

        let num = DocNum::try_from(self.documents.len()).map_err(|_| {
            IndexError::Integrity("document count exceeds the document number range".into())
        })?;
        self.by_id.insert(doc_id.clone(), num);
        self.documents.push(Document { doc_id, start_line });
        Ok(num)
    }

    pub fn get(&self, num: DocNum) -> Option<&Document> {
        self.documents.get(num as usize)
    }

    /// Look up the dense number of an external id
    pub fn number_of(&self, doc_id: &str) -> Option<DocNum> {
        self.by_id.get(doc_id).copied()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// In-memory index accumulated during one ingestion run
#[derive(Debug, Default)]
pub struct IndexBuilder {
    tree: TermTree,
    docs: DocTable,
    current: Option<DocNum>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one scanner event
    pub fn add_event(&mut self, event: ScanEvent) -> Result<()> {
        match event {
            ScanEvent::DocumentOpen { doc_id, start_line } => {
                self.current = Some(self.docs.open(doc_id, start_line)?);
            }
            ScanEvent::Term(term) => {
                // The scanner only emits terms after a document has been opened
                let doc = self.current.ok_or_else(|| {
                    IndexError::Integrity(format!("term '{}' outside of any document", term))
                })?;
                self.tree.update(&fold_term(&term), doc);
            }
        }
        Ok(())
    }

    /// Drain a scanner into the index
    pub fn ingest<R: BufRead>(&mut self, scanner: Scanner<'_, R>) -> Result<()> {
        for event in scanner {
            self.add_event(event?)?;
        }
        Ok(())
    }

    pub fn tree(&self) -> &TermTree {
        &self.tree
    }

    pub fn docs(&self) -> &DocTable {
        &self.docs
    }

    pub fn stats(&self) -> BuildStats {
        BuildStats {
            term_count: self.tree.len(),
            document_count: self.docs.len(),
            posting_count: self.tree.posting_count(),
        }
    }
}

/// Build the index for `corpus_path` and write its artifacts into `out_dir`
pub fn build_index(corpus_path: &Path, out_dir: &Path, config: &IndexConfig) -> Result<BuildStats> {
    build_index_with_progress(corpus_path, out_dir, config, false)
}

/// Build the index with an optional progress spinner
pub fn build_index_with_progress(
    corpus_path: &Path,
    out_dir: &Path,
    config: &IndexConfig,
    silent: bool,
) -> Result<BuildStats> {
    let started = Instant::now();
    let file = File::open(corpus_path).map_err(|e| IndexError::io(corpus_path, e))?;

    let spinner = spinner(format!("Indexing {}...", corpus_path.display()), silent);

    // A failed scan drops the partial builder; nothing is written
    let mut builder = IndexBuilder::new();
    let scanner = Scanner::new(BufReader::new(file), config).with_source(corpus_path);
    let scanned = builder.ingest(scanner);
    if let Err(e) = scanned {
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        return Err(e);
    }
    builder.tree().verify()?;

    if let Some(ref spinner) = spinner {
        spinner.set_message("Writing artifacts...");
    }
    let paths = ArtifactPaths::in_dir(out_dir, config);
    IndexWriter::new(paths).write(builder.tree(), builder.docs().documents())?;

    let stats = builder.stats();
    if let Some(spinner) = spinner {
        spinner.finish_with_message(format!(
            "Indexed {} documents, {} terms",
            stats.document_count, stats.term_count
        ));
    }

    info!(
        "built index from {}: {} documents, {} terms, {} postings, tree height {} in {:?}",
        corpus_path.display(),
        stats.document_count,
        stats.term_count,
        stats.posting_count,
        builder.tree().height(),
        started.elapsed()
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::Posting;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn build_from(corpus: &str) -> IndexBuilder {
        let config = IndexConfig::default();
        let mut builder = IndexBuilder::new();
        builder
            .ingest(Scanner::new(Cursor::new(corpus), &config))
            .unwrap();
        builder
    }

    #[test]
    fn test_doc_table_dense_numbers() {
        let mut table = DocTable::new();
        assert_eq!(table.open("a".into(), 0).unwrap(), 0);
        assert_eq!(table.open("b".into(), 4).unwrap(), 1);
        assert_eq!(table.open("a".into(), 9).unwrap(), 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0).unwrap().start_line, 0);
        assert_eq!(table.number_of("b"), Some(1));
        assert_eq!(table.number_of("c"), None);
    }

    #[test]
    fn test_builder_counts() {
        let builder = build_from("$DOC A\n$BODY\ncat dog cat\n$DOC B\n$BODY\ndog dog bird\n");
        let stats = builder.stats();
        assert_eq!(stats.document_count, 2);
        assert_eq!(stats.term_count, 3);
        assert_eq!(stats.posting_count, 4);

        let dog = builder.tree().search("dog").unwrap();
        assert_eq!(
            dog.postings(),
            &[Posting { doc: 0, tf: 1 }, Posting { doc: 1, tf: 2 }]
        );
    }

    #[test]
    fn test_builder_folds_case() {
        let builder = build_from("$DOC A $BODY Cat CAT cat\n");
        assert_eq!(builder.tree().len(), 1);
        assert_eq!(builder.tree().search("cat").unwrap().postings()[0].tf, 3);
        assert!(builder.tree().search("Cat").is_none());
    }

    #[test]
    fn test_empty_document_gets_entry() {
        let builder = build_from("$DOC A\n$DOC B $BODY word\n");
        assert_eq!(builder.docs().len(), 2);
        assert_eq!(builder.tree().search("word").unwrap().postings()[0].doc, 1);
    }

    #[test]
    fn test_term_without_document_is_rejected() {
        let mut builder = IndexBuilder::new();
        let err = builder.add_event(ScanEvent::Term("orphan".into())).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_build_index_missing_corpus() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("idx");
        let err = build_index_with_progress(
            &dir.path().join("nope.txt"),
            &out,
            &IndexConfig::default(),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, IndexError::Io { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn test_build_index_writes_artifacts() {
        let dir = tempdir().unwrap();
        let corpus = dir.path().join("corpus.txt");
        std::fs::write(&corpus, "$DOC A\n$BODY\ncat dog cat\n$DOC B\n$BODY\ndog dog bird\n").unwrap();

        let out = dir.path().join("idx");
        let config = IndexConfig::default();
        let stats = build_index_with_progress(&corpus, &out, &config, true).unwrap();
        assert_eq!(
            stats,
            BuildStats {
                term_count: 3,
                document_count: 2,
                posting_count: 4
            }
        );

        let paths = ArtifactPaths::in_dir(&out, &config);
        assert_eq!(
            std::fs::read_to_string(&paths.dictionary).unwrap(),
            "3\nbird 1\ncat 1\ndog 2\n"
        );
        assert_eq!(
            std::fs::read_to_string(&paths.postings).unwrap(),
            "4\n1 1\n0 2\n0 1\n1 2\n"
        );
        assert_eq!(
            std::fs::read_to_string(&paths.documents).unwrap(),
            "2\nA 0\nB 3\n"
        );
    }
}
