use std::sync::{Arc, Mutex};
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;

pub mod bootstrap;
pub mod config;
pub mod errors;
pub mod interaction;
pub mod routes;
pub mod simulation;
pub mod tick;
pub mod world;

pub use errors::{AppError, InteractError};
pub use interaction::{ActionRegistry, Scheduler};
pub use simulation::{Simulation, TickReport};
pub use world::{Entity, EntityId, Notifier, RecordingNotifier, TracingNotifier, WorldState};

#[derive(Clone)]
pub struct AppState {
    pub sim: Arc<Mutex<Simulation>>,
    pub started: Instant,
}

impl AppState {
    pub fn new(sim: Simulation) -> Self {
        Self { sim: Arc::new(Mutex::new(sim)), started: Instant::now() }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(routes::healthz))
        .route("/version", get(routes::version))
        .route("/status", get(routes::status))
        .route("/find_path", post(routes::find_path))
        .route("/entities", post(routes::spawn_entity))
        .route("/entities/:id", get(routes::get_entity))
        .route("/interact", post(routes::interact))
        .with_state(state)
}

// Prove Send + Sync bounds for compile-time safety.
#[allow(dead_code)]
fn _assert_send_sync() {
    fn assert_bound<T: Send + Sync>() {}
    assert_bound::<AppState>();
}
