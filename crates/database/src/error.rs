use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to load environment variables for database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Database operation failed: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("A conflicting reservation was committed concurrently.")]
    Conflict,

    #[error("Stored reservation row is invalid: {0}")]
    CorruptRow(String),
}
