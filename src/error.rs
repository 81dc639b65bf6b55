use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("consultation {0} does not exist")]
    NotFound(Uuid),

    #[error("date and time are already taken by another consultation")]
    UniqueViolation,

    #[error("storage lock poisoned")]
    Poisoned,

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("{}", .0.join("\n"))]
    Validation(Vec<String>),

    #[error("consultation {0} does not exist")]
    NotFound(Uuid),

    #[error(transparent)]
    Backend(BackendError),
}

impl From<BackendError> for BookingError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound(id) => BookingError::NotFound(id),
            err => BookingError::Backend(err),
        }
    }
}
