pub mod repository;

pub use repository::CatalogRepository;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Could not reach the backend: {0}")]
    TransportError(String),
    #[error("Backend answered {status}: {message}")]
    BackendError { status: u16, message: String },
    #[error("Unreadable catalog: {0}")]
    DecodeError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
