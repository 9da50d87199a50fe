use models::user::{User, UserInput};
use utoipa::OpenApi;
use utoipa::ToSchema;

use crate::errors::ErrorBody;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::users::list_users,
        crate::routes::users::get_user,
        crate::routes::users::create_user,
        crate::routes::users::update_user,
        crate::routes::users::delete_user,
        crate::routes::users::init_users,
    ),
    components(
        schemas(
            HealthResponse,
            User,
            UserInput,
            ErrorBody,
        )
    ),
    tags(
        (name = "health"),
        (name = "user")
    )
)]
pub struct ApiDoc;
