pub mod routes;
pub mod state;
pub mod ws;

use axum::Router;

pub use state::{AppState, StreamSettings};

pub fn app(state: AppState) -> Router {
    routes::router(state)
}
