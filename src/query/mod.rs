pub mod engine;
pub mod parser;
pub mod scorer;

pub use engine::{QueryEngine, RankedDoc, Relevance};
pub use parser::{Query, QueryTerm, parse_query};
pub use scorer::{cosine, tfidf};
