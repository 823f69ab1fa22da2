use crate::error::{IndexError, Result};
use crate::index::tree::TermTree;
use crate::index::types::{ArtifactKind, ArtifactPaths, Document};
use log::{debug, warn};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const ARTIFACTS: [ArtifactKind; 3] = [
    ArtifactKind::Dictionary,
    ArtifactKind::Postings,
    ArtifactKind::Documents,
];

/// Writes the dictionary, postings and documents artifacts
pub struct IndexWriter {
    paths: ArtifactPaths,
}

impl IndexWriter {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self { paths }
    }

    /// Write all three artifacts. They are staged as `.tmp` siblings and only
    /// moved into place once every one of them has been written. If moving
    /// one fails, the artifacts already replaced are restored from `.bak`
    /// copies, so the previous set stays whole.
    pub fn write(&self, tree: &TermTree, documents: &[Document]) -> Result<()> {
        check_postings(tree, documents.len())?;

        for kind in ARTIFACTS {
            if let Some(parent) = self.paths.get(kind).parent() {
                fs::create_dir_all(parent).map_err(|e| IndexError::io(parent, e))?;
            }
        }

        let staged = self.write_staged(tree, documents);
        if let Err(e) = staged {
            self.discard_staged();
            return Err(e);
        }

        self.commit()
    }

    fn write_staged(&self, tree: &TermTree, documents: &[Document]) -> Result<()> {
        let dictionary = staging_path(&self.paths.dictionary);
        write_artifact(&dictionary, |out| write_dictionary(out, tree))?;

        let postings = staging_path(&self.paths.postings);
        write_artifact(&postings, |out| write_postings(out, tree))?;

        let docs = staging_path(&self.paths.documents);
        write_artifact(&docs, |out| write_documents(out, documents))?;

        debug!(
            "staged {} terms, {} postings, {} documents",
            tree.len(),
            tree.posting_count(),
            documents.len()
        );
        Ok(())
    }

    /// Move every staged artifact into place, or none of them
    fn commit(&self) -> Result<()> {
        let mut committed: Vec<(ArtifactKind, bool)> = Vec::with_capacity(ARTIFACTS.len());
        for kind in ARTIFACTS {
            match self.replace(kind) {
                Ok(backed_up) => committed.push((kind, backed_up)),
                Err(e) => {
                    self.rollback(&committed);
                    self.discard_staged();
                    return Err(e);
                }
            }
        }

        for (kind, backed_up) in committed {
            if backed_up {
                let _ = fs::remove_file(backup_path(self.paths.get(kind)));
            }
        }
        Ok(())
    }

    /// Swap one staged artifact in, keeping the previous file as `.bak`.
    /// Returns whether a backup was taken.
    fn replace(&self, kind: ArtifactKind) -> Result<bool> {
        let target = self.paths.get(kind);
        let backup = backup_path(target);

        let backed_up = target.is_file();
        if backed_up {
            fs::rename(target, &backup).map_err(|e| IndexError::io(target, e))?;
        }

        if let Err(e) = fs::rename(staging_path(target), target) {
            if backed_up {
                restore(&backup, target);
            }
            return Err(IndexError::io(target, e));
        }
        Ok(backed_up)
    }

    /// Undo already committed replacements, newest first
    fn rollback(&self, committed: &[(ArtifactKind, bool)]) {
        for &(kind, backed_up) in committed.iter().rev() {
            let target = self.paths.get(kind);
            if backed_up {
                restore(&backup_path(target), target);
            } else if let Err(e) = fs::remove_file(target) {
                warn!("could not remove {}: {}", target.display(), e);
            }
        }
    }

    fn discard_staged(&self) {
        for kind in ARTIFACTS {
            let _ = fs::remove_file(staging_path(self.paths.get(kind)));
        }
    }
}

fn restore(backup: &Path, target: &Path) {
    if let Err(e) = fs::rename(backup, target) {
        warn!(
            "could not restore {} from {}: {}",
            target.display(),
            backup.display(),
            e
        );
    }
}

fn with_suffix(target: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn staging_path(target: &Path) -> PathBuf {
    with_suffix(target, ".tmp")
}

fn backup_path(target: &Path) -> PathBuf {
    with_suffix(target, ".bak")
}

/// Create `path`, run `body` against a buffered writer and flush.
/// I/O failures are reported against `path`.
fn write_artifact<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let file = File::create(path).map_err(|e| IndexError::io(path, e))?;
    let mut out = BufWriter::new(file);
    body(&mut out).map_err(|e| IndexError::io(path, e))?;
    out.flush().map_err(|e| IndexError::io(path, e))?;
    Ok(())
}

/// Every posting must name a document of the table being written
pub fn check_postings(tree: &TermTree, doc_count: usize) -> Result<()> {
    for node in tree.iter() {
        if let Some(posting) = node.postings().iter().find(|p| p.doc as usize >= doc_count) {
            return Err(IndexError::Integrity(format!(
                "term '{}' references document {} but only {} documents exist",
                node.term(),
                posting.doc,
                doc_count
            )));
        }
    }
    Ok(())
}

/// Dictionary: term count, then `<term> <df>` per line in term order
pub fn write_dictionary(out: &mut dyn Write, tree: &TermTree) -> io::Result<()> {
    writeln!(out, "{}", tree.len())?;
    for node in tree.iter() {
        writeln!(out, "{} {}", node.term(), node.doc_freq())?;
    }
    Ok(())
}

/// Postings: entry count, then `<docNum> <tf>` per line, one block per term in
/// dictionary order, discovery order within a block
pub fn write_postings(out: &mut dyn Write, tree: &TermTree) -> io::Result<()> {
    writeln!(out, "{}", tree.posting_count())?;
    for node in tree.iter() {
        for posting in node.postings() {
            writeln!(out, "{} {}", posting.doc, posting.tf)?;
        }
    }
    Ok(())
}

/// Documents: document count, then `<docId> <startLine>` in ingestion order
pub fn write_documents(out: &mut dyn Write, documents: &[Document]) -> io::Result<()> {
    writeln!(out, "{}", documents.len())?;
    for doc in documents {
        writeln!(out, "{} {}", doc.doc_id, doc.start_line)?;
    }
    Ok(())
}
