pub mod build;
pub mod reader;
pub mod scanner;
pub mod stats;
pub mod tree;
pub mod types;
pub mod writer;

pub use build::{DocTable, IndexBuilder, build_index};
pub use reader::{Dictionary, LoadedIndex};
pub use tree::TermTree;
pub use types::*;
pub use writer::IndexWriter;
