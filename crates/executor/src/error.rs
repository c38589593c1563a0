use std::path::PathBuf;

use thiserror::Error;

use common::error::Error as AtspError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Graph processing error: {0}")]
    GraphError(#[from] AtspError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Failed to load configuration: {0}")]
    ConfigLoadError(String),

    #[error("Failed to parse {path}{}: {cause}", line_suffix(.line))]
    ParseError {
        path: PathBuf,
        line: Option<usize>,
        cause: String,
    },

    #[error("Sweep cancelled before every beta value was scheduled")]
    SweepCancelled,

    #[error("Background task failed: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

fn line_suffix(line: &Option<usize>) -> String {
    line.map(|l| format!(" (line {})", l)).unwrap_or_default()
}

impl Error {
    pub fn parse(path: impl Into<PathBuf>, line: Option<usize>, cause: impl Into<String>) -> Self {
        Error::ParseError {
            path: path.into(),
            line,
            cause: cause.into(),
        }
    }
}
