//! Tokenization, near-duplicate detection, and the query engine — the
//! pieces shared between (or owned entirely by) the query side of the
//! pipeline.

pub mod query_engine;
pub mod simhash;
pub mod tokenization;

pub use query_engine::QueryEngine;
