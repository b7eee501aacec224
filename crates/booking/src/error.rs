use database::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("{0}")]
    Validation(String),

    #[error("The requested dates are not available for this vehicle type.")]
    Conflict,

    #[error("Storage error: {0}")]
    Store(StoreError),
}

// Not derived with #[from]: a concurrent-insert conflict surfaced by the
// store must become the same `Conflict` the resolver's own check produces.
impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => BookingError::Conflict,
            other => BookingError::Store(other),
        }
    }
}
