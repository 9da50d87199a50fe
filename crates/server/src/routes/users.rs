//! User resource handlers.
//!
//! ```text
//! GET    /user?pageNumber=1&pageSize=10
//! GET    /user/init
//! GET    /user/{id}
//! POST   /user        {"firstName":"Ann","lastName":"Lee","emailAddress":"ann@example.com"}
//! PUT    /user/{id}   {"firstName":"Ann","lastName":"Lee","emailAddress":"ann@example.com"}
//! DELETE /user/{id}
//! ```

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use models::user::{User, UserInput};
use serde::Deserialize;
use service::pagination::Pagination;
use tracing::debug;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::routes::ServerState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based page index, default 1
    #[serde(alias = "PageNumber")]
    pub page_number: Option<u32>,
    /// Items per page, default from config
    #[serde(alias = "PageSize")]
    pub page_size: Option<u32>,
}

type UserPath = Result<Path<String>, PathRejection>;

fn parse_id(path: UserPath) -> Result<Uuid, JsonApiError> {
    let Path(raw) = path?;
    Uuid::parse_str(raw.trim())
        .map_err(|e| JsonApiError::bad_request(format!("invalid user id `{raw}`: {e}")))
}

#[utoipa::path(
    get, path = "/user", tag = "user",
    params(ListQuery),
    responses(
        (status = 200, description = "Users, newest first", body = [User]),
        (status = 400, description = "Bad query", body = crate::errors::ErrorBody)
    )
)]
pub async fn list_users(
    State(state): State<ServerState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<User>>, JsonApiError> {
    let Query(q) = query?;
    let page = Pagination::resolve(q.page_number, q.page_size, state.users.limits());
    let users = state.users.list(page).await;
    debug!(page = page.page_number, size = page.page_size, count = users.len(), "list users");
    Ok(Json(users))
}

#[utoipa::path(
    get, path = "/user/{id}", tag = "user",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "OK", body = User),
        (status = 400, description = "Invalid id", body = crate::errors::ErrorBody),
        (status = 404, description = "Not Found", body = crate::errors::ErrorBody)
    )
)]
pub async fn get_user(
    State(state): State<ServerState>,
    path: UserPath,
) -> Result<Json<User>, JsonApiError> {
    let id = parse_id(path)?;
    Ok(Json(state.users.get(id).await?))
}

#[utoipa::path(
    post, path = "/user", tag = "user",
    request_body = UserInput,
    responses(
        (status = 200, description = "Created", body = User),
        (status = 400, description = "Validation Error", body = crate::errors::ErrorBody),
        (status = 500, description = "Persist Failed", body = crate::errors::ErrorBody)
    )
)]
pub async fn create_user(
    State(state): State<ServerState>,
    body: Result<Json<UserInput>, JsonRejection>,
) -> Result<Json<User>, JsonApiError> {
    let Json(input) = body?;
    Ok(Json(state.users.create(input).await?))
}

#[utoipa::path(
    put, path = "/user/{id}", tag = "user",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UserInput,
    responses(
        (status = 200, description = "Updated", body = User),
        (status = 400, description = "Validation Error", body = crate::errors::ErrorBody),
        (status = 404, description = "Not Found", body = crate::errors::ErrorBody),
        (status = 500, description = "Persist Failed", body = crate::errors::ErrorBody)
    )
)]
pub async fn update_user(
    State(state): State<ServerState>,
    path: UserPath,
    body: Result<Json<UserInput>, JsonRejection>,
) -> Result<Json<User>, JsonApiError> {
    let id = parse_id(path)?;
    let Json(input) = body?;
    if input.id.is_some_and(|body_id| body_id != id) {
        debug!(%id, "ignoring mismatched id in update body");
    }
    Ok(Json(state.users.update(id, input).await?))
}

#[utoipa::path(
    delete, path = "/user/{id}", tag = "user",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Deleted", body = bool),
        (status = 400, description = "Invalid id", body = crate::errors::ErrorBody),
        (status = 404, description = "Not Found", body = crate::errors::ErrorBody)
    )
)]
pub async fn delete_user(
    State(state): State<ServerState>,
    path: UserPath,
) -> Result<Json<bool>, JsonApiError> {
    let id = parse_id(path)?;
    Ok(Json(state.users.delete(id).await?))
}

#[utoipa::path(
    get, path = "/user/init", tag = "user",
    responses(
        (status = 200, description = "Store reset to the demo roster", body = bool),
        (status = 500, description = "Seed Failed", body = crate::errors::ErrorBody)
    )
)]
pub async fn init_users(State(state): State<ServerState>) -> Result<Json<bool>, JsonApiError> {
    Ok(Json(state.users.init().await?))
}
