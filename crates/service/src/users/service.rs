use std::sync::Arc;

use chrono::Utc;
use common::observability::record_operation;
use models::user::{User, UserInput};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::{ListLimits, Pagination};
use crate::users::seed;
use crate::users::store::UserStore;

/// Request handlers for the user resource.
///
/// Mutations (validate, change, persist) run one at a time under `writer`;
/// reads go straight to the store and see the latest in-memory state.
pub struct UserService {
    store: Arc<dyn UserStore>,
    limits: ListLimits,
    writer: Mutex<()>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, limits: ListLimits) -> Self {
        Self { store, limits, writer: Mutex::new(()) }
    }

    pub fn limits(&self) -> ListLimits {
        self.limits
    }

    /// Newest-first page of users.
    pub async fn list(&self, page: Pagination) -> Vec<User> {
        let (skip, take) = page.normalize(self.limits.max_page_size);
        let users = self.store.list(skip, take).await;
        record_operation("list", "ok");
        users
    }

    pub async fn get(&self, id: Uuid) -> Result<User, ServiceError> {
        let res = self.store.get(id).await.ok_or_else(|| ServiceError::not_found("user"));
        observe("get", &res);
        res
    }

    /// Validate, assign a new id and the current time, store and persist.
    pub async fn create(&self, input: UserInput) -> Result<User, ServiceError> {
        let res = self.create_inner(input).await;
        observe("create", &res);
        if let Ok(user) = &res {
            info!(user_id = %user.id, "user created");
        }
        res
    }

    async fn create_inner(&self, input: UserInput) -> Result<User, ServiceError> {
        let fields = input.into_fields()?;
        let user = User::new(fields, Utc::now());
        let _w = self.writer.lock().await;
        self.store.add(user.clone()).await?;
        self.store.persist().await?;
        Ok(user)
    }

    /// Overwrite name and email of an existing user; creation date is kept.
    pub async fn update(&self, id: Uuid, input: UserInput) -> Result<User, ServiceError> {
        let res = self.update_inner(id, input).await;
        observe("update", &res);
        if let Ok(user) = &res {
            info!(user_id = %user.id, "user updated");
        }
        res
    }

    async fn update_inner(&self, id: Uuid, input: UserInput) -> Result<User, ServiceError> {
        if id.is_nil() {
            return Err(ServiceError::Validation(
                "id, firstName, lastName, and emailAddress are required.".into(),
            ));
        }
        let fields = input.into_fields().map_err(|_| {
            ServiceError::Validation("id, firstName, lastName, and emailAddress are required.".into())
        })?;
        let _w = self.writer.lock().await;
        let updated = self
            .store
            .update(id, fields)
            .await
            .ok_or_else(|| ServiceError::not_found("user"))?;
        self.store.persist().await?;
        Ok(updated)
    }

    /// Remove a user; absent ids are reported as not found.
    pub async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let res = self.delete_inner(id).await;
        observe("delete", &res);
        if res.is_ok() {
            info!(user_id = %id, "user deleted");
        }
        res
    }

    async fn delete_inner(&self, id: Uuid) -> Result<bool, ServiceError> {
        let _w = self.writer.lock().await;
        self.store.remove(id).await?;
        self.store.persist().await?;
        Ok(true)
    }

    /// Replace all contents with the demo roster.
    pub async fn init(&self) -> Result<bool, ServiceError> {
        let _w = self.writer.lock().await;
        let res = self.reseed().await;
        observe("init", &res);
        res.map(|count| {
            info!(count, "user store reset to demo roster");
            true
        })
    }

    /// Load the demo roster only when the store holds nothing. Returns
    /// whether seeding happened.
    pub async fn seed_if_empty(&self) -> Result<bool, ServiceError> {
        let _w = self.writer.lock().await;
        if self.store.count().await > 0 {
            return Ok(false);
        }
        let count = self.reseed().await?;
        info!(count, "empty user store seeded with demo roster");
        Ok(true)
    }

    // Caller holds `writer`.
    async fn reseed(&self) -> Result<usize, ServiceError> {
        // parse first so a broken roster never wipes existing data
        let users = seed::demo_users()?;
        let count = users.len();
        self.store.replace_all(users).await?;
        self.store.persist().await?;
        Ok(count)
    }
}

fn observe<T>(operation: &str, res: &Result<T, ServiceError>) {
    match res {
        Ok(_) => record_operation(operation, "ok"),
        Err(e) => {
            record_operation(operation, e.kind());
            if matches!(e, ServiceError::Storage(_) | ServiceError::Seed(_)) {
                warn!(operation, error = %e, "user operation failed");
            }
        }
    }
}
