use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ModelError;

/// A person with contact fields. `created_date` is fixed at creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub created_date: DateTime<Utc>,
}

impl User {
    /// Build a fresh record with a new v4 id.
    pub fn new(fields: UserFields, created_date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: fields.first_name,
            last_name: fields.last_name,
            email_address: fields.email_address,
            created_date,
        }
    }

    /// Overwrite the mutable fields; id and creation date stay as they are.
    pub fn apply(&mut self, fields: UserFields) {
        self.first_name = fields.first_name;
        self.last_name = fields.last_name;
        self.email_address = fields.email_address;
    }
}

/// The mutable part of a [`User`], already checked for presence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserFields {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
}

/// Create/update body. Every field is optional on the wire so that a missing
/// field is reported as a validation error rather than a parse failure.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct UserInput {
    /// Ignored on create; on update the path id wins.
    pub id: Option<Uuid>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<String>,
}

impl UserInput {
    pub fn new(first_name: &str, last_name: &str, email_address: &str) -> Self {
        Self {
            id: None,
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            email_address: Some(email_address.to_string()),
        }
    }

    /// Require all three contact fields to be present and non-blank.
    pub fn into_fields(self) -> Result<UserFields, ModelError> {
        match (present(self.first_name), present(self.last_name), present(self.email_address)) {
            (Some(first_name), Some(last_name), Some(email_address)) => Ok(UserFields {
                first_name,
                last_name,
                email_address,
            }),
            _ => Err(ModelError::Validation(
                "firstName, lastName, and emailAddress are required.".into(),
            )),
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
