use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The referenced entity is absent or soft-deleted.
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// The operation would break a store-wide invariant
    /// (e.g. removing the last active setlist).
    #[error("{0}")]
    InvariantViolation(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl CoreError {
    pub fn setlist_not_found(id: DbId) -> Self {
        Self::NotFound {
            entity: "Setlist",
            id,
        }
    }

    pub fn song_not_found(id: DbId) -> Self {
        Self::NotFound { entity: "Song", id }
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        Self::Validation(format!("invalid field(s): {}", fields.join(", ")))
    }
}
