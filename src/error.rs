use thiserror::Error;

/// Recoverable failures raised by the graph core. None of them leave partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetroError {
    #[error("station '{0}' is already on the map")]
    DuplicateEntity(String),
    #[error("unknown station '{0}'")]
    UnknownEntity(String),
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),
}

pub type MetroResult<T> = std::result::Result<T, MetroError>;
