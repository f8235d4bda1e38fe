use api::{AppState, StreamSettings};
use axum::Router;
use grid_core::Dataset;
use tower_http::cors::CorsLayer;

pub fn build_app(dataset: Dataset, settings: StreamSettings) -> Router {
    api::app(AppState::new(dataset, settings)).layer(CorsLayer::permissive())
}
