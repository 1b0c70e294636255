use axum::{
    Json,
    extract::{Path, Query, State},
};

use chatline_gateway::Dispatcher;
use chatline_types::api::UserQuery;
use chatline_types::models::UserShort;

use crate::error::{ApiError, ApiResult};

pub async fn list_users(
    State(dispatcher): State<Dispatcher>,
    Query(query): Query<UserQuery>,
) -> Json<Vec<UserShort>> {
    Json(dispatcher.directory().search(query.q.as_deref()))
}

/// Ids that do not parse are treated like unknown ids.
pub async fn get_user(
    State(dispatcher): State<Dispatcher>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserShort>> {
    id.parse()
        .ok()
        .and_then(|id| dispatcher.directory().short(id))
        .map(Json)
        .ok_or(ApiError::NotFound("User not found"))
}
