use thiserror::Error;

pub mod config;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(
        "Unable to resolve required column(s) [{}] at similarity threshold {threshold}; \
         supply manual_column_overrides or rename the dataset columns",
        .fields.join(", ")
    )]
    UnresolvedColumns { fields: Vec<String>, threshold: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported LLM provider '{0}'")]
    UnsupportedProvider(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for errors caused by the caller's input rather than by the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_) | Error::UnresolvedColumns { .. } | Error::InvalidConfig(_)
        )
    }
}
