//! Positional inverted index with phrase-aware boolean and ranked retrieval.
//!
//! Callers hand in documents that are already tokenized; the index records every
//! term occurrence with its 1-based position so multi-term phrases can be matched
//! by adjacency. The index is built once and only read afterwards.

pub mod bm25;
pub mod boolean;
pub mod builder;
pub mod index;
pub mod phrase;
pub mod ql;
pub mod query;
pub mod ranking;

pub use bm25::Bm25Params;
pub use builder::IndexBuilder;
pub use index::{Document, IndexSummary, InvertedIndex, Posting, PostingList};
pub use phrase::Phrase;
pub use ql::QlParams;
pub use query::{NamedQuery, Query, QueryKind, ResultRow, SearchConfig, Searcher};
pub use ranking::{Hit, MAX_RESULTS};

pub type DocId = String;

/// 1-based token offset within a document.
pub type Position = u32;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The query carried no units where at least one is required.
    #[error("empty query")]
    EmptyQuery,
    /// A query unit had no terms.
    #[error("empty phrase")]
    EmptyPhrase,
    #[error("unsupported query kind: {0}")]
    UnsupportedQueryKind(String),
}
