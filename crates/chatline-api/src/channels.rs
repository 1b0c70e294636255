use axum::{
    Json,
    extract::{Path, Query, State},
};

use chatline_gateway::Dispatcher;
use chatline_types::api::ChannelQuery;
use chatline_types::models::{ChannelDetail, ChannelSummary};

use crate::error::{ApiError, ApiResult};

/// A missing, zero or non-numeric `userId` lists every channel.
pub async fn list_channels(
    State(dispatcher): State<Dispatcher>,
    Query(query): Query<ChannelQuery>,
) -> Json<Vec<ChannelSummary>> {
    Json(dispatcher.channel_summaries(query.filter()).await)
}

pub async fn get_channel(
    State(dispatcher): State<Dispatcher>,
    Path(id): Path<String>,
) -> ApiResult<Json<ChannelDetail>> {
    dispatcher
        .channel_detail(&id)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("Not found"))
}
