use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,                    // assigned by the store, strictly increasing
    pub username: String,           // unique, case-sensitive as stored
    pub email: String,              // unique, case-sensitive as stored
    #[serde(skip_serializing)]
    pub password_hash: String,      // Argon2 PHC string, not exposed in JSON
    pub created_at: OffsetDateTime, // set by the store at insert time
}

/// Column values for a user about to be inserted. The store assigns `id`
/// and `created_at`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Which unique column rejected an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    Username,
    Email,
}

impl ConflictField {
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictField::Username => "username",
            ConflictField::Email => "email",
        }
    }
}

impl std::fmt::Display for ConflictField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures surfaced by a user store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the row. `field` is `None` when the
    /// violated constraint cannot be attributed to a single column.
    #[error("{} already exists", .field.map_or("user", ConflictField::as_str))]
    Conflict { field: Option<ConflictField> },

    /// The database could not be reached (pool exhausted/closed, I/O).
    #[error("database unavailable")]
    Unavailable(#[source] sqlx::Error),

    /// Any other database failure.
    #[error("database error")]
    Database(#[source] sqlx::Error),
}

/// Largest page a single `list` call will return.
pub const MAX_PAGE_SIZE: i64 = 500;

/// Persistence seam for user records, implemented by the Postgres store and
/// by an in-memory store used in tests.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user, assigning `id` and `created_at`.
    ///
    /// Uniqueness of `username` and `email` is enforced here atomically: of
    /// two concurrent inserts sharing either value exactly one commits, the
    /// other observes `StoreError::Conflict`.
    async fn insert(&self, new: NewUser) -> Result<User, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// Page through users ordered by ascending id. A `skip` past the end of
    /// the table yields an empty page, not an error.
    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<User>, StoreError>;
}

/// Normalize client-supplied paging values: negative skips become 0 and the
/// limit is clamped to `0..=MAX_PAGE_SIZE`.
pub(crate) fn clamp_page(skip: i64, limit: i64) -> (i64, i64) {
    (skip.max(0), limit.clamp(0, MAX_PAGE_SIZE))
}
