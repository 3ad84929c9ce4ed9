use axum::Router;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod health;
pub mod jobs;
pub mod scheduler;
pub mod state;

pub use scheduler::{spawn_schedule, JobRunner};
pub use state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(jobs::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
