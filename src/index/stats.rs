use crate::query::QueryEngine;
use std::io::{self, Write};
use std::path::Path;

/// Summary of a loaded index
#[derive(Debug, Clone, PartialEq)]
pub struct IndexStats {
    pub document_count: usize,
    pub term_count: usize,
    pub posting_count: usize,
    /// Documents whose tf-idf vector has length 0 (no body, or only
    /// terms present in every document)
    pub zero_norm_documents: usize,
    /// Terms with the highest document frequency, ties alphabetical
    pub top_terms: Vec<(String, u32)>,
}

impl IndexStats {
    pub fn collect(engine: &QueryEngine, top: usize) -> Self {
        let index = engine.index();
        let entries = index.dictionary().entries();

        let mut by_df: Vec<_> = entries.iter().map(|e| (e.term.as_str(), e.doc_freq)).collect();
        // Stable sort keeps the dictionary's alphabetical order among equal df
        by_df.sort_by(|a, b| b.1.cmp(&a.1));

        let zero_norm_documents = (0..index.num_docs())
            .filter(|&d| engine.doc_norm(d as u32).is_some_and(|n| n == 0.0))
            .count();

        Self {
            document_count: index.num_docs(),
            term_count: entries.len(),
            posting_count: index.postings().len(),
            zero_norm_documents,
            top_terms: by_df
                .into_iter()
                .take(top)
                .map(|(t, df)| (t.to_string(), df))
                .collect(),
        }
    }

    /// Average number of postings per term
    pub fn mean_doc_freq(&self) -> f64 {
        if self.term_count == 0 {
            0.0
        } else {
            self.posting_count as f64 / self.term_count as f64
        }
    }
}

/// Display index statistics
pub fn show_stats(engine: &QueryEngine, index_dir: &Path, top: usize) -> io::Result<()> {
    let stats = IndexStats::collect(engine, top);
    write_stats(&mut io::stdout().lock(), &stats, index_dir)
}

pub fn write_stats(out: &mut dyn Write, stats: &IndexStats, index_dir: &Path) -> io::Result<()> {
    writeln!(out, "Index Statistics")?;
    writeln!(out, "================")?;
    writeln!(out)?;
    writeln!(out, "Index location:   {}", index_dir.display())?;
    writeln!(out, "Documents:        {}", stats.document_count)?;
    writeln!(out, "Terms:            {}", stats.term_count)?;
    writeln!(out, "Postings:         {}", stats.posting_count)?;
    writeln!(out, "Mean df:          {:.2}", stats.mean_doc_freq())?;
    writeln!(out, "Zero-norm docs:   {}", stats.zero_norm_documents)?;

    if !stats.top_terms.is_empty() {
        writeln!(out)?;
        writeln!(out, "Most frequent terms (by df):")?;
        for (term, df) in &stats.top_terms {
            writeln!(out, "  {:20} {}", term, df)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::reader::{LoadedIndex, read_dictionary, read_documents, read_postings};
    use std::io::Cursor;

    fn engine() -> QueryEngine {
        let index = LoadedIndex::new(
            read_dictionary(Cursor::new("3\nbird 1\ncat 1\ndog 2\n"), Path::new("d")).unwrap(),
            read_postings(Cursor::new("4\n1 1\n0 2\n0 1\n1 2\n"), Path::new("p")).unwrap(),
            read_documents(Cursor::new("3\nA 0\nB 3\nC 6\n"), Path::new("t")).unwrap(),
        )
        .unwrap();
        QueryEngine::from_index(index).unwrap()
    }

    #[test]
    fn test_collect() {
        let stats = IndexStats::collect(&engine(), 2);
        assert_eq!(stats.document_count, 3);
        assert_eq!(stats.term_count, 3);
        assert_eq!(stats.posting_count, 4);
        // C has no terms at all
        assert_eq!(stats.zero_norm_documents, 1);
        assert_eq!(
            stats.top_terms,
            vec![("dog".to_string(), 2), ("bird".to_string(), 1)]
        );
        assert!((stats.mean_doc_freq() - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_write_stats() {
        let stats = IndexStats::collect(&engine(), 1);
        let mut out = Vec::new();
        write_stats(&mut out, &stats, Path::new("/idx")).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Documents:        3"));
        assert!(text.contains("dog"));
        assert!(!text.contains("bird"));
    }
}
