use thiserror::Error;

use crate::compile::CompileError;
use crate::config::ConfigError;
use crate::datasource::DataSourceError;
use crate::domain::RecordId;
use crate::engine::EngineError;
use crate::orchestration::{ReportError, ValidationError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Data source error: {0}")]
    Source(#[from] DataSourceError),
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("Replay error: {0}")]
    Engine(#[from] EngineError),
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),
    #[error("No disposal with id {0}")]
    UnknownSale(RecordId),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Source(e) => AppError::Source(e),
            ReportError::Validation(e) => AppError::Validation(e),
            ReportError::Engine(e) => AppError::Engine(e),
            ReportError::UnknownSale(id) => AppError::UnknownSale(id),
        }
    }
}
