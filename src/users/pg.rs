use async_trait::async_trait;
use sqlx::PgPool;

use crate::users::store::{clamp_page, ConflictField, NewUser, StoreError, User, UserStore};

/// `UserStore` backed by Postgres. Uniqueness is delegated to the `UNIQUE`
/// constraints on `users.username` and `users.email`.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate driver errors into store terms. Unique violations become
/// `Conflict`, attributed to a column by the constraint name when Postgres
/// reports one.
fn map_sqlx_err(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            let field = db.constraint().and_then(|name| {
                if name.contains("username") {
                    Some(ConflictField::Username)
                } else if name.contains("email") {
                    Some(ConflictField::Email)
                } else {
                    None
                }
            });
            StoreError::Conflict { field }
        }
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Unavailable(e)
        }
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)
    }

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<User>, StoreError> {
        let (skip, limit) = clamp_page(skip, limit);
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            ORDER BY id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)
    }
}
