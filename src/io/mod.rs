pub mod csv_export;
pub mod file;

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PlanFileError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid plan file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}
