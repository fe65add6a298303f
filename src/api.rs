use axum::{
    extract::{Path, State},
    http::HeaderValue,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::aggregator::Aggregator;
use crate::topics::TOPICS;

/// Response header telling whether the feed came from cache (`HIT`/`MISS`/`BYPASS`).
pub const CACHE_HEADER: &str = "x-feed-cache";

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Aggregator,
}

pub fn router(aggregator: Aggregator) -> Router {
    create_router(AppState { aggregator })
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/topics", get(list_topics))
        .route("/topics/{topic_id}/posts", get(topic_posts))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn list_topics() -> Json<&'static [&'static str]> {
    Json(TOPICS)
}

/// Always 200: unknown topics and failed upstreams both produce `[]`.
async fn topic_posts(State(state): State<AppState>, Path(topic_id): Path<String>) -> Response {
    let out = state.aggregator.posts_for(&topic_id).await;
    let mut resp = Json(&*out.posts).into_response();
    resp.headers_mut()
        .insert(CACHE_HEADER, HeaderValue::from_static(out.cache.as_str()));
    resp
}
