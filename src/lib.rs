//! # scrye
//!
//! A batch-oriented, local inverted-index search engine: a near-duplicate
//! filtering document indexer and a TF-IDF cosine-similarity query engine,
//! both operating over first-character-bucketed shard files on disk.
//!
//! This crate provides both a command-line interface and a library that can
//! be used programmatically in other Rust applications.
//!
//! ## Examples
//!
//! ```no_run
//! use std::path::Path;
//!
//! scrye::build_index(Path::new("corpus/"), Path::new("index_dir/")).unwrap();
//!
//! let engine = scrye::QueryEngine::load(Path::new("index_dir/")).unwrap();
//! let results = engine.search("quick brown fox", 5);
//! println!("{} results", results.len());
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod search;

pub use error::{IndexError, QueryError};
pub use index::{build_index, BuildStats};
pub use search::QueryEngine;
