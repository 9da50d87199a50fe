use std::{collections::HashSet, path::PathBuf};

use async_trait::async_trait;
use common::observability::{STORE_FLUSHES_TOTAL, STORE_RECORDS};
use models::user::{User, UserFields};
use tracing::{debug, error};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::storage::json_list_store::JsonListStore;

/// Trait abstraction for user storage.
///
/// Mutations are in-memory until [`UserStore::persist`] is called.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Append a record. Rejects a nil id and ids already present.
    async fn add(&self, user: User) -> Result<(), ServiceError>;
    /// Overwrite name/email of the record with `id`; `None` if absent.
    async fn update(&self, id: Uuid, fields: UserFields) -> Option<User>;
    /// Delete the record with `id` and return it.
    async fn remove(&self, id: Uuid) -> Result<User, ServiceError>;
    async fn get(&self, id: Uuid) -> Option<User>;
    async fn query(&self, predicate: &(dyn for<'u> Fn(&'u User) -> bool + Send + Sync)) -> Vec<User>;
    /// Newest-first by creation date, then `skip`/`take`.
    async fn list(&self, skip: usize, take: usize) -> Vec<User>;
    async fn count(&self) -> usize;
    async fn persist(&self) -> Result<(), ServiceError>;
    async fn clear_and_persist(&self) -> Result<(), ServiceError>;
    /// Swap the whole collection in one step; readers see old or new, never
    /// a partial list. Rejects nil or duplicate ids and leaves the store
    /// untouched in that case. Does not persist.
    async fn replace_all(&self, users: Vec<User>) -> Result<(), ServiceError>;
}

/// [`UserStore`] persisted as a JSON array in a single file.
pub struct FileUserStore {
    list: JsonListStore<User>,
}

impl FileUserStore {
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self, ServiceError> {
        let list = JsonListStore::open(path).await?;
        STORE_RECORDS.set(list.len().await as i64);
        Ok(Self { list })
    }
}

#[async_trait]
impl UserStore for FileUserStore {
    async fn add(&self, user: User) -> Result<(), ServiceError> {
        if user.id.is_nil() {
            return Err(ServiceError::Validation(
                "There was a problem with your request. Please check your data and try again.".into(),
            ));
        }
        self.list
            .mutate(|items| {
                if items.iter().any(|u| u.id == user.id) {
                    return Err(ServiceError::Validation(format!("user {} already exists", user.id)));
                }
                items.push(user);
                Ok(())
            })
            .await
    }

    async fn update(&self, id: Uuid, fields: UserFields) -> Option<User> {
        self.list.modify_first(|u| u.id == id, |u| u.apply(fields)).await
    }

    async fn remove(&self, id: Uuid) -> Result<User, ServiceError> {
        self.list
            .remove_first(|u| u.id == id)
            .await
            .ok_or_else(|| ServiceError::not_found("user"))
    }

    async fn get(&self, id: Uuid) -> Option<User> {
        self.list.find(|u| u.id == id).await
    }

    async fn query(&self, predicate: &(dyn for<'u> Fn(&'u User) -> bool + Send + Sync)) -> Vec<User> {
        self.list.filter(predicate).await
    }

    async fn list(&self, skip: usize, take: usize) -> Vec<User> {
        let mut users = self.list.snapshot().await;
        // stable: equal timestamps keep insertion order
        users.sort_by(|a, b| b.created_date.cmp(&a.created_date));
        users.into_iter().skip(skip).take(take).collect()
    }

    async fn count(&self) -> usize {
        self.list.len().await
    }

    async fn persist(&self) -> Result<(), ServiceError> {
        match self.list.persist().await {
            Ok(count) => {
                STORE_RECORDS.set(count as i64);
                STORE_FLUSHES_TOTAL.with_label_values(&["ok"]).inc();
                debug!(path = %self.list.path().display(), count, "user store flushed");
                Ok(())
            }
            Err(e) => {
                STORE_FLUSHES_TOTAL.with_label_values(&["error"]).inc();
                error!(path = %self.list.path().display(), error = %e, "user store flush failed");
                Err(e)
            }
        }
    }

    async fn clear_and_persist(&self) -> Result<(), ServiceError> {
        self.list.clear().await;
        self.persist().await
    }

    async fn replace_all(&self, users: Vec<User>) -> Result<(), ServiceError> {
        let mut seen = HashSet::with_capacity(users.len());
        for u in &users {
            if u.id.is_nil() || !seen.insert(u.id) {
                return Err(ServiceError::Validation(format!("invalid or duplicate user id {}", u.id)));
            }
        }
        self.list
            .mutate(|items| {
                *items = users;
                Ok(())
            })
            .await
    }
}
