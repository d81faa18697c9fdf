use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid field name: {0:?}")]
    InvalidFieldName(String),
    #[error("invalid entity id: {0:?}")]
    InvalidEntityId(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
