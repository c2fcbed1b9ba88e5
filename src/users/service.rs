use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::{ApiError, ApiResult};
use crate::users::dto::CreateUserRequest;
use crate::users::password::PasswordHasher;
use crate::users::store::{ConflictField, NewUser, User, UserStore};
use crate::users::validate;

/// Registration and lookup flows, written against the store and hasher
/// seams so they run identically over Postgres or the in-memory store.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    /// Register a new user.
    ///
    /// Field validation runs first, then username and email are checked in
    /// that order so the response names the offending field. The plaintext
    /// is hashed only after both checks pass. The checks are advisory: if a
    /// concurrent registration lands between check and insert, the store's
    /// unique constraints still reject the row and the conflict is reported
    /// the same way.
    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn create_user(&self, req: CreateUserRequest) -> ApiResult<User> {
        validate::validate_username(&req.username)?;
        validate::validate_email(&req.email)?;
        validate::validate_password(&req.password)?;

        if self.store.find_by_username(&req.username).await?.is_some() {
            return Err(ApiError::Conflict(Some(ConflictField::Username)));
        }
        if self.store.find_by_email(&req.email).await?.is_some() {
            return Err(ApiError::Conflict(Some(ConflictField::Email)));
        }

        let password_hash = self.hasher.hash(&req.password)?;
        let user = self
            .store
            .insert(NewUser {
                username: req.username,
                email: req.email,
                password_hash,
            })
            .await?;

        debug!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Fetch a single user by id.
    pub async fn get_user(&self, id: i64) -> ApiResult<User> {
        self.store.find_by_id(id).await?.ok_or(ApiError::NotFound)
    }

    /// Page through users in ascending id order.
    pub async fn list_users(&self, skip: i64, limit: i64) -> ApiResult<Vec<User>> {
        Ok(self.store.list(skip, limit).await?)
    }
}
