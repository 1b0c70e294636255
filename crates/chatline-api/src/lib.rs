pub mod channels;
pub mod error;
pub mod users;

use axum::{Router, routing::get};

use chatline_gateway::Dispatcher;

/// Read-only query routes over the live gateway state.
pub fn routes(dispatcher: Dispatcher) -> Router {
    Router::new()
        .route("/api/users", get(users::list_users))
        .route("/api/users/{id}", get(users::get_user))
        .route("/api/channels", get(channels::list_channels))
        .route("/api/channels/{id}", get(channels::get_channel))
        .with_state(dispatcher)
}
