// models/src/errors.rs

use std::io;
pub use thiserror::Error;

use anyhow::Error as AnyhowError;
use serde_json::Error as SerdeJsonError;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum HospitalError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("payment not verified for prescription {prescription_id} of patient {patient_id}")]
    PaymentNotVerified {
        patient_id: Uuid,
        prescription_id: Uuid,
    },

    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("authentication failed: {0}")]
    AuthenticationError(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("failed to acquire lock: {0}")]
    LockError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] SerdeJsonError),

    #[error("an internal error occurred: {0}")]
    InternalError(String),
}

pub type HospitalResult<T> = std::result::Result<T, HospitalError>;

impl From<AnyhowError> for HospitalError {
    fn from(err: AnyhowError) -> Self {
        HospitalError::InternalError(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for HospitalError {
    fn from(err: bcrypt::BcryptError) -> Self {
        HospitalError::AuthenticationError(err.to_string())
    }
}
