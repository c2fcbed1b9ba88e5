use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::users::store::{clamp_page, ConflictField, NewUser, StoreError, User, UserStore};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    next_id: i64,
}

/// `UserStore` kept entirely in process memory. Rows live in insertion order,
/// so the vector is already sorted by ascending id.
#[derive(Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        // One write-lock critical section: the uniqueness checks and the
        // append cannot interleave with another insert.
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.username == new.username) {
            return Err(StoreError::Conflict {
                field: Some(ConflictField::Username),
            });
        }
        if inner.users.iter().any(|u| u.email == new.email) {
            return Err(StoreError::Conflict {
                field: Some(ConflictField::Email),
            });
        }

        inner.next_id += 1;
        let user = User {
            id: inner.next_id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<User>, StoreError> {
        let (skip, limit) = clamp_page(skip, limit);
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
