//! Height-balanced (AVL) term tree built during ingestion.
//!
//! Every node owns one term and the posting list of that term. Nodes are
//! owned recursively; insertion hands back the (possibly new) subtree root at
//! each level, so rotations only ever reassign child links.

use crate::error::{IndexError, Result};
use crate::index::types::{DocNum, Posting};
use std::cmp::Ordering;

type Link = Option<Box<TermNode>>;

/// A term together with its posting list
#[derive(Debug)]
pub struct TermNode {
    term: String,
    /// Postings in discovery order, one per document
    postings: Vec<Posting>,
    height: u32,
    left: Link,
    right: Link,
}

impl TermNode {
    fn new(term: &str, doc: DocNum) -> Self {
        Self {
            term: term.to_string(),
            postings: vec![Posting::new(doc)],
            height: 1,
            left: None,
            right: None,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn postings(&self) -> &[Posting] {
        &self.postings
    }

    /// Number of distinct documents containing this term
    pub fn doc_freq(&self) -> u32 {
        self.postings.len() as u32
    }

    /// Count one occurrence in `doc`. Returns true if a new posting was created.
    fn record(&mut self, doc: DocNum) -> bool {
        // Ingestion is sequential per document, so the last posting is the usual hit
        let position = match self.postings.last() {
            Some(last) if last.doc == doc => Some(self.postings.len() - 1),
            _ => self.postings.iter().position(|p| p.doc == doc),
        };

        match position {
            Some(i) => {
                self.postings[i].tf += 1;
                false
            }
            None => {
                self.postings.push(Posting::new(doc));
                true
            }
        }
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    fn balance(&self) -> i64 {
        height(&self.left) as i64 - height(&self.right) as i64
    }
}

#[inline]
fn height(link: &Link) -> u32 {
    link.as_ref().map_or(0, |n| n.height)
}

/// Ordered map from term to posting list
#[derive(Debug, Default)]
pub struct TermTree {
    root: Link,
    len: usize,
    posting_count: usize,
}

impl TermTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `term` in document `doc`
    pub fn update(&mut self, term: &str, doc: DocNum) {
        if let Some(node) = self.search_mut(term) {
            if node.record(doc) {
                self.posting_count += 1;
            }
            return;
        }

        self.root = Some(insert(self.root.take(), term, doc));
        self.len += 1;
        self.posting_count += 1;
    }

    /// Find the node holding `term`
    pub fn search(&self, term: &str) -> Option<&TermNode> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            match term.cmp(node.term.as_str()) {
                Ordering::Less => current = node.left.as_deref(),
                Ordering::Greater => current = node.right.as_deref(),
                Ordering::Equal => return Some(node),
            }
        }
        None
    }

    fn search_mut(&mut self, term: &str) -> Option<&mut TermNode> {
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            match term.cmp(node.term.as_str()) {
                Ordering::Less => current = node.left.as_deref_mut(),
                Ordering::Greater => current = node.right.as_deref_mut(),
                Ordering::Equal => return Some(node),
            }
        }
        None
    }

    /// In-order traversal, ascending by term
    pub fn iter(&self) -> Iter<'_> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left(self.root.as_deref());
        iter
    }

    /// Number of distinct terms
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total postings across all terms
    pub fn posting_count(&self) -> usize {
        self.posting_count
    }

    /// Height of the tree (0 when empty)
    pub fn height(&self) -> u32 {
        height(&self.root)
    }

    /// Check ordering, balance, cached heights and counters
    pub fn verify(&self) -> Result<()> {
        fn check(link: &Link) -> Result<u32> {
            let Some(node) = link else { return Ok(0) };
            let lh = check(&node.left)?;
            let rh = check(&node.right)?;
            if lh.abs_diff(rh) > 1 {
                return Err(IndexError::Integrity(format!(
                    "term tree unbalanced at '{}' ({} vs {})",
                    node.term, lh, rh
                )));
            }
            if node.height != 1 + lh.max(rh) {
                return Err(IndexError::Integrity(format!(
                    "stale cached height at '{}'",
                    node.term
                )));
            }
            Ok(node.height)
        }

        check(&self.root)?;

        let mut terms = 0;
        let mut postings = 0;
        let mut previous: Option<&str> = None;
        for node in self.iter() {
            if previous.is_some_and(|p| p >= node.term()) {
                return Err(IndexError::Integrity(format!(
                    "term '{}' out of order",
                    node.term()
                )));
            }
            previous = Some(node.term());
            terms += 1;
            postings += node.postings.len();
        }

        if terms != self.len || postings != self.posting_count {
            return Err(IndexError::Integrity(format!(
                "tree counters drifted: {} terms / {} postings recorded, {} / {} present",
                self.len, self.posting_count, terms, postings
            )));
        }
        Ok(())
    }
}

/// Insert a fresh term below `link` and return the rebalanced subtree root
fn insert(link: Link, term: &str, doc: DocNum) -> Box<TermNode> {
    let mut node = match link {
        Some(node) => node,
        None => return Box::new(TermNode::new(term, doc)),
    };

    match term.cmp(node.term.as_str()) {
        Ordering::Less => node.left = Some(insert(node.left.take(), term, doc)),
        Ordering::Greater => node.right = Some(insert(node.right.take(), term, doc)),
        // Callers search before inserting
        Ordering::Equal => return node,
    }

    rebalance(node, term)
}

/// Restore the AVL bound at `node` after `key` was inserted beneath it
fn rebalance(mut node: Box<TermNode>, key: &str) -> Box<TermNode> {
    node.update_height();
    let balance = node.balance();

    if balance > 1 {
        if let Some(left) = node.left.take() {
            // Left-right case needs the child rotated first
            node.left = Some(if key > left.term.as_str() {
                rotate_left(left)
            } else {
                left
            });
            return rotate_right(node);
        }
    } else if balance < -1 {
        if let Some(right) = node.right.take() {
            node.right = Some(if key < right.term.as_str() {
                rotate_right(right)
            } else {
                right
            });
            return rotate_left(node);
        }
    }

    node
}

fn rotate_right(mut node: Box<TermNode>) -> Box<TermNode> {
    match node.left.take() {
        Some(mut pivot) => {
            node.left = pivot.right.take();
            node.update_height();
            pivot.right = Some(node);
            pivot.update_height();
            pivot
        }
        None => node,
    }
}

fn rotate_left(mut node: Box<TermNode>) -> Box<TermNode> {
    match node.right.take() {
        Some(mut pivot) => {
            node.right = pivot.left.take();
            node.update_height();
            pivot.left = Some(node);
            pivot.update_height();
            pivot
        }
        None => node,
    }
}

/// In-order iterator over term nodes
pub struct Iter<'a> {
    stack: Vec<&'a TermNode>,
}

impl<'a> Iter<'a> {
    fn push_left(&mut self, mut node: Option<&'a TermNode>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a TermNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::{HashMap, HashSet};

    fn avl_bound(n: usize) -> f64 {
        1.44 * ((n + 2) as f64).log2()
    }

    #[test]
    fn test_update_creates_and_increments() {
        let mut tree = TermTree::new();
        tree.update("cat", 0);
        tree.update("cat", 0);
        tree.update("cat", 1);

        let node = tree.search("cat").unwrap();
        assert_eq!(node.doc_freq(), 2);
        assert_eq!(
            node.postings(),
            &[Posting { doc: 0, tf: 2 }, Posting { doc: 1, tf: 1 }]
        );
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.posting_count(), 2);
    }

    #[test]
    fn test_repeat_pair_only_bumps_tf() {
        let mut tree = TermTree::new();
        tree.update("dog", 3);
        tree.update("dog", 7);
        tree.update("dog", 3);

        let node = tree.search("dog").unwrap();
        assert_eq!(node.doc_freq(), 2);
        assert_eq!(node.postings()[0], Posting { doc: 3, tf: 2 });
        // Discovery order is kept, not document order
        assert_eq!(node.postings()[1].doc, 7);
    }

    #[test]
    fn test_search_missing() {
        let mut tree = TermTree::new();
        assert!(tree.search("anything").is_none());
        tree.update("bird", 0);
        assert!(tree.search("birds").is_none());
        assert!(tree.search("b").is_none());
    }

    #[test]
    fn test_sequential_inserts_stay_balanced() {
        let mut tree = TermTree::new();
        for i in 0..1000 {
            tree.update(&format!("term{:05}", i), 0);
        }
        assert_eq!(tree.len(), 1000);
        assert!((tree.height() as f64) <= avl_bound(1000));
        tree.verify().unwrap();
    }

    #[test]
    fn test_double_rotations() {
        // Left-right then right-left shapes
        for order in [["c", "a", "b"], ["a", "c", "b"]] {
            let mut tree = TermTree::new();
            for term in order {
                tree.update(term, 0);
            }
            assert_eq!(tree.height(), 2);
            assert_eq!(tree.root.as_ref().unwrap().term(), "b");
            tree.verify().unwrap();
        }
    }

    #[test]
    fn test_iter_in_order() {
        let mut tree = TermTree::new();
        for term in ["pear", "apple", "zebra", "mango", "kiwi"] {
            tree.update(term, 0);
        }
        let terms: Vec<_> = tree.iter().map(|n| n.term()).collect();
        assert_eq!(terms, vec!["apple", "kiwi", "mango", "pear", "zebra"]);
    }

    proptest! {
        #[test]
        fn prop_in_order_sorted_and_balanced(
            updates in prop::collection::vec(("[a-f]{1,4}", 0u32..8), 0..300)
        ) {
            let mut tree = TermTree::new();
            for (term, doc) in &updates {
                tree.update(term, *doc);
            }

            let terms: Vec<_> = tree.iter().map(|n| n.term().to_string()).collect();
            prop_assert!(terms.windows(2).all(|w| w[0] < w[1]));
            prop_assert!((tree.height() as f64) <= avl_bound(tree.len()));
            prop_assert!(tree.verify().is_ok());
        }

        #[test]
        fn prop_doc_freq_counts_distinct_documents(
            updates in prop::collection::vec(("[a-c]{1,2}", 0u32..5), 1..200)
        ) {
            let mut tree = TermTree::new();
            let mut expected_docs: HashMap<&str, HashSet<u32>> = HashMap::new();
            let mut expected_tf: HashMap<(&str, u32), u32> = HashMap::new();
            for (term, doc) in &updates {
                tree.update(term, *doc);
                expected_docs.entry(term.as_str()).or_default().insert(*doc);
                *expected_tf.entry((term.as_str(), *doc)).or_default() += 1;
            }

            for (term, docs) in &expected_docs {
                let node = tree.search(term).unwrap();
                prop_assert_eq!(node.doc_freq() as usize, docs.len());
                for posting in node.postings() {
                    prop_assert_eq!(posting.tf, expected_tf[&(*term, posting.doc)]);
                }
            }
            prop_assert_eq!(tree.len(), expected_docs.len());
        }
    }
}
