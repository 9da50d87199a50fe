//! Demo roster loaded by the init endpoint.

use chrono::{DateTime, Utc};
use models::user::User;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::ServiceError;

const SEED_USERS_JSON: &str = include_str!("../../data/seed_users.json");

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedUser {
    first_name: String,
    last_name: String,
    email_address: String,
    created_date: DateTime<Utc>,
}

/// Parse the embedded roster into fresh records, each with a new id.
pub fn demo_users() -> Result<Vec<User>, ServiceError> {
    let rows: Vec<SeedUser> =
        serde_json::from_str(SEED_USERS_JSON).map_err(|e| ServiceError::Seed(e.to_string()))?;
    Ok(rows
        .into_iter()
        .map(|row| User {
            id: Uuid::new_v4(),
            first_name: row.first_name,
            last_name: row.last_name,
            email_address: row.email_address,
            created_date: row.created_date,
        })
        .collect())
}
