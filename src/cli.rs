use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "A local, batch-oriented inverted-index search engine", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build an index from a corpus directory
    Index {
        /// Directory of corpus records (one JSON record per file)
        #[arg(value_name = "CORPUS_DIR")]
        corpus_dir: PathBuf,

        /// Directory to write the index into
        #[arg(short, long = "index-dir")]
        index_dir: Option<PathBuf>,
    },

    /// Open an interactive query REPL over an existing index
    Query {
        /// Directory containing a previously built index
        #[arg(short, long = "index-dir")]
        index_dir: Option<PathBuf>,

        /// Number of results to return per query
        #[arg(short = 'k', long)]
        k: Option<usize>,
    },
}
