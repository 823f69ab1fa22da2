use crate::utils::tokenize_query;
use rustc_hash::FxHashMap;

/// A unique query term and how often it occurred in the query text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTerm {
    pub term: String,
    pub raw_tf: u32,
}

/// Query text reduced to unique folded terms
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Unique terms in first-seen order
    pub terms: Vec<QueryTerm>,
    /// Highest raw frequency among the unique terms (0 for an empty query)
    pub max_tf: u32,
}

impl Query {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Frequency of `term` normalized by the most frequent query term
    pub fn normalized_tf(&self, term: &QueryTerm) -> f64 {
        if self.max_tf == 0 {
            0.0
        } else {
            term.raw_tf as f64 / self.max_tf as f64
        }
    }
}

/// Tokenize on whitespace, fold case and count duplicates
pub fn parse_query(text: &str) -> Query {
    let mut terms: Vec<QueryTerm> = Vec::new();
    let mut slots: FxHashMap<String, usize> = FxHashMap::default();

    for token in tokenize_query(text) {
        match slots.get(&token) {
            Some(&i) => terms[i].raw_tf += 1,
            None => {
                slots.insert(token.clone(), terms.len());
                terms.push(QueryTerm {
                    term: token,
                    raw_tf: 1,
                });
            }
        }
    }

    let max_tf = terms.iter().map(|t| t.raw_tf).max().unwrap_or(0);
    Query { terms, max_tf }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_and_counts() {
        let q = parse_query("dog Cat DOG dog");
        assert_eq!(
            q.terms,
            vec![
                QueryTerm {
                    term: "dog".into(),
                    raw_tf: 3
                },
                QueryTerm {
                    term: "cat".into(),
                    raw_tf: 1
                },
            ]
        );
        assert_eq!(q.max_tf, 3);
        assert!((q.normalized_tf(&q.terms[1]) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_counts_whole_tokens_only() {
        // "cat" inside "cats" is a different token
        let q = parse_query("cats cat");
        assert_eq!(q.terms.len(), 2);
        assert_eq!(q.max_tf, 1);
    }

    #[test]
    fn test_empty_query() {
        let q = parse_query(" \t\n");
        assert!(q.is_empty());
        assert_eq!(q.max_tf, 0);
    }
}
