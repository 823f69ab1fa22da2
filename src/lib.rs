//! # invfile - inverted-file document retrieval
//!
//! invfile indexes a tagged text corpus into three flat artifacts and answers
//! ranked keyword queries over them with tf-idf weights and cosine similarity.
//!
//! ## Architecture
//!
//! - [`index`] - Corpus scanning, the AVL term tree, artifact writing and reading
//! - [`query`] - Query parsing, tf-idf scoring and ranking
//! - [`output`] - Paginated result formatting
//! - [`shell`] - Interactive query loop
//! - [`utils`] - Tokenizer, title lookup, configuration, progress
//! - [`error`] - Error taxonomy shared by the library
//!
//! ## Quick Start
//!
//! ```ignore
//! use invfile::index::{build_index, ArtifactPaths, IndexConfig};
//! use invfile::query::QueryEngine;
//! use std::path::Path;
//!
//! let config = IndexConfig::default();
//! build_index(Path::new("corpus.txt"), Path::new("idx"), &config)?;
//!
//! let engine = QueryEngine::load(&ArtifactPaths::in_dir(Path::new("idx"), &config))?;
//! for result in engine.search("cat dog").iter().take_while(|r| r.relevance.is_match()) {
//!     println!("{} {:.4}", result.document.doc_id, result.relevance.score());
//! }
//! ```
//!
//! ## Corpus format
//!
//! Whitespace-delimited tokens. `$DOC <id>` opens a document, `$TITLE` and
//! `$BODY` open its sections; every token after a section marker is indexed.
//! Markers and artifact names are configurable through
//! [`index::types::IndexConfig`].

pub mod error;
pub mod index;
pub mod output;
pub mod query;
pub mod shell;
pub mod utils;
