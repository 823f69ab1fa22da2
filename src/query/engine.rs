use crate::error::Result;
use crate::index::reader::LoadedIndex;
use crate::index::types::{ArtifactPaths, DictEntry, DocNum, Document};
use crate::query::parser::{Query, parse_query};
use crate::query::scorer::{cosine, document_norms, tfidf, vector_norm};
use log::{debug, info};
use std::time::Instant;

/// Relevance of one document to a query
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Relevance {
    /// Nonzero cosine similarity
    Match(f64),
    /// Similarity exactly 0; ranked after every match
    NoMatch,
}

impl Relevance {
    fn from_score(score: f64) -> Self {
        if score == 0.0 {
            Relevance::NoMatch
        } else {
            Relevance::Match(score)
        }
    }

    pub fn score(&self) -> f64 {
        match self {
            Relevance::Match(score) => *score,
            Relevance::NoMatch => 0.0,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Relevance::Match(_))
    }
}

/// One entry of a ranking
#[derive(Debug, Clone, Copy)]
pub struct RankedDoc<'a> {
    pub doc: DocNum,
    pub document: &'a Document,
    pub relevance: Relevance,
}

/// Ranks documents of a loaded index against keyword queries.
/// The loaded index is an immutable snapshot; queries take `&self`.
pub struct QueryEngine {
    index: LoadedIndex,
    doc_norms: Vec<f64>,
}

impl QueryEngine {
    /// Load the artifacts and precompute document vector norms
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let started = Instant::now();
        let engine = Self::from_index(LoadedIndex::open(paths)?)?;
        info!(
            "loaded index: {} documents, {} terms, {} postings in {:?}",
            engine.index.num_docs(),
            engine.index.dictionary().len(),
            engine.index.postings().len(),
            started.elapsed()
        );
        Ok(engine)
    }

    pub fn from_index(index: LoadedIndex) -> Result<Self> {
        let doc_norms = document_norms(index.dictionary(), index.postings(), index.num_docs())?;
        Ok(Self { index, doc_norms })
    }

    pub fn index(&self) -> &LoadedIndex {
        &self.index
    }

    pub fn num_docs(&self) -> usize {
        self.index.num_docs()
    }

    /// Length of a document's tf-idf vector
    pub fn doc_norm(&self, doc: DocNum) -> Option<f64> {
        self.doc_norms.get(doc as usize).copied()
    }

    /// Rank every document against raw query text
    pub fn search(&self, text: &str) -> Vec<RankedDoc<'_>> {
        self.rank(&parse_query(text))
    }

    /// Rank every document against a parsed query. The result always holds
    /// one entry per document: matches by descending score, then the rest,
    /// ties broken by ascending document number.
    pub fn rank(&self, query: &Query) -> Vec<RankedDoc<'_>> {
        let num_docs = self.index.num_docs();
        let dictionary = self.index.dictionary();

        // One slot per unique query term; absent terms keep weight 0
        let mut weights = Vec::with_capacity(query.terms.len());
        let mut found: Vec<(&DictEntry, f64)> = Vec::new();
        for term in &query.terms {
            match dictionary.lookup(&term.term).and_then(|i| dictionary.get(i)) {
                Some(entry) => {
                    let weight = tfidf(query.normalized_tf(term), num_docs, entry.doc_freq);
                    weights.push(weight);
                    found.push((entry, weight));
                }
                None => weights.push(0.0),
            }
        }

        let mut dots = vec![0.0f64; num_docs];
        for (entry, weight) in &found {
            for posting in self.index.block(entry) {
                dots[posting.doc as usize] +=
                    weight * tfidf(posting.tf as f64, num_docs, entry.doc_freq);
            }
        }

        let query_norm = vector_norm(&weights);
        debug!(
            "query: {} unique terms, {} in dictionary, norm {:.4}",
            query.terms.len(),
            found.len(),
            query_norm
        );

        let mut ranked: Vec<RankedDoc<'_>> = self
            .index
            .documents()
            .iter()
            .zip(dots)
            .zip(&self.doc_norms)
            .enumerate()
            .map(|(i, ((document, dot), &norm))| RankedDoc {
                doc: i as DocNum,
                document,
                relevance: Relevance::from_score(cosine(dot, norm, query_norm)),
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.relevance
                .score()
                .total_cmp(&a.relevance.score())
                .then_with(|| a.doc.cmp(&b.doc))
        });
        ranked
    }
}
