use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Config parsing error: {source}")]
    ConfigParseError {
        #[from]
        source: serde_json::Error,
    },

    #[error("CSV writing error: {source}")]
    CsvError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Order book is shut down")]
    OrderBookClosed,

    #[error("Internal processing error: {0}")]
    ProcessingError(String),

    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

impl From<EngineError> for tonic::Status {
    fn from(err: EngineError) -> Self {
        tracing::error!("Mapping EngineError to tonic::Status: {:?}", err);
        match err {
            EngineError::ConfigError(msg) => tonic::Status::failed_precondition(format!("Configuration error: {}", msg)),
            EngineError::ConfigParseError { source } => tonic::Status::failed_precondition(format!("Config parsing error: {}", source)),
            EngineError::CsvError { source } => tonic::Status::internal(format!("CSV writing error: {}", source)),
            EngineError::IoError { source } => tonic::Status::internal(format!("I/O error: {}", source)),
            EngineError::UnknownSymbol(symbol) => tonic::Status::not_found(format!("Unknown symbol: {}", symbol)),
            EngineError::InvalidOrder(msg) => tonic::Status::invalid_argument(format!("Invalid order: {}", msg)),
            EngineError::OrderBookClosed => tonic::Status::unavailable("Order book is shut down"),
            EngineError::ProcessingError(msg) => tonic::Status::internal(format!("Processing error: {}", msg)),
            EngineError::AnyhowError(source) => tonic::Status::internal(format!("An internal error occurred: {}", source)),
        }
    }
}
