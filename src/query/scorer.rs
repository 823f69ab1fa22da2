//! tf-idf weighting and cosine similarity.
//!
//! Weights follow `tf * log2(N / df)`, applied literally: a df larger than N
//! yields a negative weight rather than an error.

use crate::error::{IndexError, Result};
use crate::index::reader::Dictionary;
use crate::index::types::Posting;

/// Weight returned for a term with df 0; unreachable with a consistent index
pub const DF_ZERO_WEIGHT: f64 = 100.0;

/// tf-idf weight of a term occurring `tf` times, in a collection of
/// `num_docs` documents of which `doc_freq` contain it
#[inline]
pub fn tfidf(tf: f64, num_docs: usize, doc_freq: u32) -> f64 {
    if doc_freq == 0 {
        return DF_ZERO_WEIGHT;
    }
    tf * (num_docs as f64 / doc_freq as f64).log2()
}

/// Euclidean length of a weight vector
pub fn vector_norm(weights: &[f64]) -> f64 {
    weights.iter().map(|w| w * w).sum::<f64>().sqrt()
}

/// Cosine similarity from a dot product and both norms; 0 when either norm is 0
#[inline]
pub fn cosine(dot: f64, doc_norm: f64, query_norm: f64) -> f64 {
    let denominator = doc_norm * query_norm;
    if denominator == 0.0 {
        0.0
    } else {
        dot / denominator
    }
}

/// Norm of every document vector, computed in one pass over the postings.
/// A cursor walks the dictionary alongside, advancing past each term's block.
pub fn document_norms(
    dictionary: &Dictionary,
    postings: &[Posting],
    num_docs: usize,
) -> Result<Vec<f64>> {
    let entries = dictionary.entries();
    let mut sums = vec![0.0f64; num_docs];
    let mut cursor = 0usize;

    for (i, posting) in postings.iter().enumerate() {
        while cursor < entries.len() && i >= entries[cursor].block().end {
            cursor += 1;
        }
        let entry = entries.get(cursor).ok_or_else(|| {
            IndexError::Integrity(format!("posting {} lies beyond the last dictionary block", i))
        })?;
        let sum = sums.get_mut(posting.doc as usize).ok_or_else(|| {
            IndexError::Integrity(format!(
                "posting {} references document {} of {}",
                i, posting.doc, num_docs
            ))
        })?;

        let weight = tfidf(posting.tf as f64, num_docs, entry.doc_freq);
        *sum += weight * weight;
    }

    Ok(sums.into_iter().map(f64::sqrt).collect())
}
