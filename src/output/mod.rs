//! Output module for human-readable artifacts
//!
//! This module handles:
//! - Mirroring each stored article to a plain-text file
//! - Summarizing the cached corpus

mod article_file;
pub mod stats;

pub use article_file::{
    format_article_text, sanitize_file_stem, write_article_file, ARTICLES_DIR,
    ARTICLE_FILE_EXTENSION,
};
pub use stats::{corpus_statistics, print_statistics, CorpusStatistics};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
