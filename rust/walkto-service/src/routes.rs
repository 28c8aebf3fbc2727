use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, info_span};
use walkto_core::collision::TraversalType;
use walkto_core::{route_to_object, BfsPathfinder, PathRequest, SearchOptions, Tile};

use crate::errors::AppError;
use crate::world::EntityId;
use crate::AppState;

fn one() -> i32 { 1 }

#[derive(Copy, Clone, Debug, Deserialize)]
pub struct ObjectRef {
    pub id: u32,
    pub tile: Tile,
}

#[derive(Debug, Deserialize)]
pub struct FindPathRequest {
    pub start: Tile,
    #[serde(default)]
    pub end: Option<Tile>,
    #[serde(default)]
    pub object: Option<ObjectRef>,
    #[serde(default = "one")]
    pub source_width: i32,
    #[serde(default = "one")]
    pub source_length: i32,
    #[serde(default)]
    pub traversal: TraversalType,
    #[serde(default)]
    pub options: Option<SearchOptions>,
}

#[derive(Debug, Serialize)]
pub struct FindPathResponse {
    pub success: bool,
    pub path: Vec<Tile>,
    pub expanded: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Vec<Tile>>,
}

#[derive(Debug, Deserialize)]
pub struct SpawnEntityRequest {
    pub tile: Tile,
    #[serde(default = "one")]
    pub width: i32,
    #[serde(default = "one")]
    pub length: i32,
}

#[derive(Debug, Deserialize)]
pub struct InteractRequest {
    pub entity: EntityId,
    pub object: ObjectRef,
    #[serde(default = "first_option")]
    pub option: u8,
}

fn first_option() -> u8 { 1 }

#[derive(Debug, Serialize)]
pub struct Healthz { pub status: &'static str }

fn poisoned() -> AppError { AppError::Internal(anyhow::anyhow!("simulation lock poisoned")) }

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(Healthz { status: "ok" }))
}

pub async fn version() -> impl IntoResponse {
    let svc_version = env!("CARGO_PKG_VERSION");
    let core_version = walkto_core::version();
    (StatusCode::OK, Json(json!({"service_version": svc_version, "core_version": core_version})))
}

pub async fn status(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let sim = state.sim.lock().map_err(|_| poisoned())?;
    let world = sim.world();
    Ok(Json(json!({
        "tick": world.tick(),
        "entities": world.entity_count(),
        "objects": world.object_count(),
        "pending_tasks": sim.scheduler().pending(),
        "collision_generation": world.shared_collision().generation(),
        "uptime_secs": state.started.elapsed().as_secs(),
    })))
}

/// Routes on the live collision snapshot. The world lock is released before searching.
pub async fn find_path(State(state): State<AppState>, Json(req): Json<FindPathRequest>) -> Result<impl IntoResponse, AppError> {
    let span = info_span!("find_path", start = %req.start);
    let _enter = span.enter();

    let (collision, default_options, target) = {
        let sim = state.sim.lock().map_err(|_| poisoned())?;
        let world = sim.world();
        let target = match (req.object, req.end) {
            (Some(o), _) => {
                let object = world
                    .object(o.id, o.tile)
                    .cloned()
                    .ok_or_else(|| AppError::NotFound(format!("no object {} at {}", o.id, o.tile)))?;
                let def = world
                    .definition(o.id)
                    .ok_or_else(|| AppError::Internal(anyhow::anyhow!("object {} has no definition", o.id)))?;
                Some((object, def))
            }
            (None, Some(_)) => None,
            (None, None) => return Err(AppError::BadRequest("either `end` or `object` is required".into())),
        };
        (world.collision(), world.options().clone(), target)
    };
    let options = req.options.unwrap_or(default_options);

    let response = match (target, req.end) {
        (Some((object, def)), _) => {
            let (footprint, route) = route_to_object(
                collision.as_ref(),
                &options,
                req.start,
                (req.source_width, req.source_length),
                req.traversal,
                &object,
                &def,
            );
            FindPathResponse { success: route.success, path: route.path, expanded: route.expanded, border: Some(footprint.border_tiles()) }
        }
        (None, Some(end)) => {
            let request = PathRequest::new(req.start, end)
                .with_source_size(req.source_width, req.source_length)
                .with_traversal(req.traversal);
            let route = BfsPathfinder::new(collision.as_ref(), &options).find_route(&request, |_| true);
            FindPathResponse { success: route.success, path: route.path, expanded: route.expanded, border: None }
        }
        (None, None) => return Err(AppError::BadRequest("either `end` or `object` is required".into())),
    };
    info!(success = response.success, steps = response.path.len(), expanded = response.expanded, "find_path done");
    Ok((StatusCode::OK, Json(response)))
}

pub async fn spawn_entity(State(state): State<AppState>, Json(req): Json<SpawnEntityRequest>) -> Result<impl IntoResponse, AppError> {
    if req.width < 1 || req.length < 1 {
        return Err(AppError::BadRequest("entity size must be at least 1x1".into()));
    }
    let mut sim = state.sim.lock().map_err(|_| poisoned())?;
    let id = sim.world_mut().spawn_entity(req.tile, req.width, req.length);
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

pub async fn get_entity(State(state): State<AppState>, Path(id): Path<u32>) -> Result<impl IntoResponse, AppError> {
    let sim = state.sim.lock().map_err(|_| poisoned())?;
    let entity = sim
        .world()
        .entity(EntityId(id))
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("unknown entity {}", EntityId(id))))?;
    Ok(Json(entity))
}

pub async fn interact(State(state): State<AppState>, Json(req): Json<InteractRequest>) -> Result<impl IntoResponse, AppError> {
    let mut sim = state.sim.lock().map_err(|_| poisoned())?;
    let ticket = sim.interact(req.entity, req.object.id, req.object.tile, req.option)?;
    Ok((StatusCode::ACCEPTED, Json(json!({ "ticket": ticket }))))
}
