use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Could not load dataset {table}: {source}")]
    DataLoad {
        table: &'static str,
        #[source]
        source: Box<AppError>,
    },

    #[error("Dataset not loaded: {0}")]
    TableUnavailable(&'static str),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::TableUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InvalidSelection(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
