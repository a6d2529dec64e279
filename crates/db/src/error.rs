use aegle_core::types::EntityId;

/// Errors produced by the persistence boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The addressed row does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: EntityId },

    /// A stored row could not be decoded into its domain type.
    #[error("Corrupt row: {0}")]
    Decode(String),

    /// A single-row write was rejected.
    #[error("Write failed: {0}")]
    Write(String),

    /// The store cannot be reached at all.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
