use crate::error::{IndexError, Result};
use crate::index::types::{ArtifactKind, ArtifactPaths, DictEntry, DocNum, Document, Posting};
use crate::utils::fold_term;
use log::debug;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// Upper bound on up-front allocation driven by a declared count
const MAX_PREALLOC: usize = 1 << 16;

/// Alphabetically sorted term dictionary
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: Vec<DictEntry>,
}

impl Dictionary {
    /// Binary search for an exact term; `term` must already be folded
    pub fn lookup(&self, term: &str) -> Option<usize> {
        self.entries
            .binary_search_by(|e| e.term.as_str().cmp(term))
            .ok()
    }

    pub fn get(&self, index: usize) -> Option<&DictEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[DictEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total postings addressed by the dictionary
    pub fn posting_total(&self) -> usize {
        self.entries.last().map_or(0, |e| e.block().end)
    }
}

impl From<Vec<DictEntry>> for Dictionary {
    fn from(entries: Vec<DictEntry>) -> Self {
        Self { entries }
    }
}

/// A fully validated index snapshot read back from its artifacts
#[derive(Debug, Clone)]
pub struct LoadedIndex {
    dictionary: Dictionary,
    postings: Vec<Posting>,
    documents: Vec<Document>,
}

impl LoadedIndex {
    /// Read and validate the three artifacts
    pub fn open(paths: &ArtifactPaths) -> Result<Self> {
        let dictionary = read_dictionary(open_artifact(&paths.dictionary)?, &paths.dictionary)?;
        let postings = read_postings(open_artifact(&paths.postings)?, &paths.postings)?;
        let documents = read_documents(open_artifact(&paths.documents)?, &paths.documents)?;

        debug!(
            "read {} dictionary entries, {} postings, {} documents",
            dictionary.len(),
            postings.len(),
            documents.len()
        );

        Self::new(dictionary, postings, documents)
    }

    /// Assemble an index from parsed parts, checking cross-artifact integrity
    pub fn new(
        dictionary: Dictionary,
        postings: Vec<Posting>,
        documents: Vec<Document>,
    ) -> Result<Self> {
        // Blocks must tile the postings array in term order before anything is sliced
        let mut expected_offset = 0usize;
        let mut previous: Option<&str> = None;
        for entry in dictionary.entries() {
            if previous.is_some_and(|p| p >= entry.term.as_str()) {
                return Err(IndexError::Integrity(format!(
                    "term '{}' breaks dictionary order",
                    entry.term
                )));
            }
            if entry.offset != expected_offset {
                return Err(IndexError::Integrity(format!(
                    "term '{}' starts at posting {} but the preceding blocks end at {}",
                    entry.term, entry.offset, expected_offset
                )));
            }
            previous = Some(entry.term.as_str());
            expected_offset += entry.doc_freq as usize;
        }

        if dictionary.posting_total() != postings.len() {
            return Err(IndexError::Integrity(format!(
                "dictionary addresses {} postings but the postings artifact holds {}",
                dictionary.posting_total(),
                postings.len()
            )));
        }

        // Block index (+1) that last referenced each document, to catch duplicates
        let mut last_block = vec![0usize; documents.len()];
        for (block, entry) in dictionary.entries().iter().enumerate() {
            for posting in &postings[entry.block()] {
                let seen = last_block.get_mut(posting.doc as usize).ok_or_else(|| {
                    IndexError::Integrity(format!(
                        "term '{}' references document {} but only {} documents exist",
                        entry.term,
                        posting.doc,
                        documents.len()
                    ))
                })?;
                if *seen == block + 1 {
                    return Err(IndexError::Integrity(format!(
                        "term '{}' lists document {} twice",
                        entry.term, posting.doc
                    )));
                }
                *seen = block + 1;
            }
        }

        Ok(Self {
            dictionary,
            postings,
            documents,
        })
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn postings(&self) -> &[Posting] {
        &self.postings
    }

    /// Postings block of one dictionary entry
    pub fn block(&self, entry: &DictEntry) -> &[Posting] {
        &self.postings[entry.block()]
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, doc: DocNum) -> Option<&Document> {
        self.documents.get(doc as usize)
    }

    pub fn num_docs(&self) -> usize {
        self.documents.len()
    }
}

fn open_artifact(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| IndexError::io(path, e))
}

/// Parse the dictionary artifact, deriving each postings offset as a running sum
pub fn read_dictionary<R: BufRead>(reader: R, source: &Path) -> Result<Dictionary> {
    let kind = ArtifactKind::Dictionary;
    let mut offset = 0usize;
    let mut previous: Option<String> = None;

    let entries = parse_artifact(reader, kind, source, |line, term, df| {
        let doc_freq: u32 = parse_field(kind, line, df, "document frequency")?;
        if doc_freq == 0 {
            return Err(IndexError::malformed(kind, line, format!("term '{}' has df 0", term)));
        }
        if fold_term(term) != term {
            return Err(IndexError::malformed(
                kind,
                line,
                format!("term '{}' is not in folded (lowercase) form", term),
            ));
        }
        if previous.as_deref().is_some_and(|p| p >= term) {
            return Err(IndexError::malformed(
                kind,
                line,
                format!("term '{}' breaks alphabetical order", term),
            ));
        }
        previous = Some(term.to_string());

        let entry = DictEntry {
            term: term.to_string(),
            doc_freq,
            offset,
        };
        offset += doc_freq as usize;
        Ok(entry)
    })?;

    Ok(Dictionary::from(entries))
}

/// Parse the postings artifact
pub fn read_postings<R: BufRead>(reader: R, source: &Path) -> Result<Vec<Posting>> {
    let kind = ArtifactKind::Postings;
    parse_artifact(reader, kind, source, |line, doc, tf| {
        Ok(Posting {
            doc: parse_field(kind, line, doc, "document number")?,
            tf: parse_field(kind, line, tf, "term frequency")?,
        })
    })
}

/// Parse the documents artifact
pub fn read_documents<R: BufRead>(reader: R, source: &Path) -> Result<Vec<Document>> {
    let kind = ArtifactKind::Documents;
    parse_artifact(reader, kind, source, |line, doc_id, start| {
        Ok(Document {
            doc_id: doc_id.to_string(),
            start_line: parse_field(kind, line, start, "starting line")?,
        })
    })
}

/// Shared artifact layout: a count line, then one two-field record per line.
/// Blank lines are ignored.
fn parse_artifact<R, T, F>(reader: R, kind: ArtifactKind, source: &Path, mut record: F) -> Result<Vec<T>>
where
    R: BufRead,
    F: FnMut(usize, &str, &str) -> Result<T>,
{
    let mut declared: Option<usize> = None;
    let mut items = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => IndexError::malformed(kind, line_no, "invalid UTF-8"),
            _ => IndexError::io(source, e),
        })?;

        let mut fields = line.split_whitespace();
        let Some(first) = fields.next() else { continue };

        match declared {
            None => {
                if fields.next().is_some() {
                    return Err(IndexError::malformed(kind, line_no, "expected a single entry count"));
                }
                let count: usize = parse_field(kind, line_no, first, "entry count")?;
                items.reserve(count.min(MAX_PREALLOC));
                declared = Some(count);
            }
            Some(_) => {
                let second = fields
                    .next()
                    .ok_or_else(|| IndexError::malformed(kind, line_no, "expected 2 fields"))?;
                if fields.next().is_some() {
                    return Err(IndexError::malformed(kind, line_no, "expected 2 fields"));
                }
                items.push(record(line_no, first, second)?);
            }
        }
    }

    let declared = declared.ok_or_else(|| IndexError::malformed(kind, 1, "missing entry count"))?;
    if items.len() != declared {
        return Err(IndexError::CountMismatch {
            artifact: kind,
            declared,
            actual: items.len(),
        });
    }
    Ok(items)
}

fn parse_field<T: FromStr>(kind: ArtifactKind, line: usize, field: &str, what: &str) -> Result<T> {
    field
        .parse()
        .map_err(|_| IndexError::malformed(kind, line, format!("invalid {}: '{}'", what, field)))
}
