use axum::http::HeaderValue;
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::create_cors_layer;
use crate::handlers::events::{create_event, delete_event, get_event, list_events, update_event};
use crate::handlers::health_check;
use crate::AppState;

pub fn create_routes(state: AppState, cors_allowed_origins: &[HeaderValue]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_allowed_origins)),
        )
}
