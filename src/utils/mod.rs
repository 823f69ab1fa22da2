//! Utility functions shared by ingestion, querying and the command line.
//!
//! ## Modules
//!
//! - [`app_data`] - Application data directory and persisted configuration
//! - [`progress`] - Spinner that compiles away without the `progress` feature
//! - [`title`] - Title lookup by re-reading the raw corpus
//! - [`tokenizer`] - Whitespace tokens with line tracking, case folding
//!
//! ```no_run
//! use invfile::utils::{fold_term, tokenize_query};
//!
//! assert_eq!(fold_term("Dog"), "dog");
//! assert_eq!(tokenize_query("Cat  dog"), vec!["cat", "dog"]);
//! ```

pub mod app_data;
pub mod progress;
pub mod title;
pub mod tokenizer;

pub use app_data::*;
pub use title::*;
pub use tokenizer::*;
