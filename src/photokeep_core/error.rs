use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhotokeepError {
    // Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] rusqlite_migration::Error),

    #[error("Index corruption: {0}")]
    Corruption(String),

    // I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walker error: {0}")]
    Walkdir(#[from] walkdir::Error),

    #[error("Refusing to overwrite existing file: {0}")]
    WouldOverwrite(PathBuf),

    // Metadata errors
    #[error("Exiftool error: {0}")]
    Exiftool(String),

    #[error("Date parsing error: {0}")]
    InvalidDateFormat(String),

    // Naming errors
    #[error("Disambiguation suffix space exhausted for {0}")]
    DisambiguationExhausted(PathBuf),

    // Audit outcome
    #[error("Audit found {0} issue(s)")]
    AuditIssuesFound(usize),
}

/// Result type for photokeep operations.
pub type Result<T> = std::result::Result<T, PhotokeepError>;
