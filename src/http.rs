use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::booking::{BookError, BookOutcome, BookRequest, Orchestrator};
use crate::model::Room;
use crate::observability;
use crate::store::{Store, StoreError};
use crate::views::{self, ViewError};

pub const APP_NAME: &str = "roomd";

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn Store>,
    bookings: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let bookings = Arc::new(Orchestrator::new(store.clone()));
        Self { store, bookings }
    }
}

/// Request-fatal failures. Recovered outcomes (validation, conflict, room
/// not found) never pass through here — they are 200-status payloads on the
/// booking path, preserved from the system this replaces.
#[derive(Debug)]
pub enum AppError {
    Store(StoreError),
    View(ViewError),
    BadRequest(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Store(e) => write!(f, "{e}"),
            AppError::View(e) => write!(f, "{e}"),
            AppError::BadRequest(msg) => write!(f, "bad request: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Store(e) => {
                tracing::error!("storage failure: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::View(e) => {
                tracing::error!("view failure: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl From<ViewError> for AppError {
    fn from(e: ViewError) -> Self {
        AppError::View(e)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(app_name))
        .route("/create-room", post(create_room))
        .route("/bulk-create-room", post(bulk_create_room))
        .route("/rooms", get(list_rooms))
        .route("/rooms/{id}", get(rooms_by_id))
        .route("/book", post(book))
        .route("/booked-rooms", get(booked_rooms_view))
        .route("/customers", get(customers_view))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn app_name() -> &'static str {
    APP_NAME
}

/// Echoes the submitted room back, as stored.
async fn create_room(
    State(state): State<AppState>,
    Json(room): Json<Room>,
) -> Result<Json<Room>, AppError> {
    state.store.insert_room(room.clone()).await?;
    metrics::counter!(observability::ROOMS_CREATED_TOTAL).increment(1);
    Ok(Json(room))
}

async fn bulk_create_room(
    State(state): State<AppState>,
    Json(rooms): Json<Vec<Room>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let inserted = state.store.insert_rooms(rooms).await?;
    metrics::counter!(observability::ROOMS_CREATED_TOTAL).increment(inserted as u64);
    Ok(Json(json!({ "acknowledged": true, "inserted": inserted })))
}

async fn list_rooms(State(state): State<AppState>) -> Result<Json<Vec<Room>>, AppError> {
    Ok(Json(state.store.rooms().await?))
}

/// Exact string match on the caller-supplied `id` field; an unknown id is
/// an empty list, not an error.
async fn rooms_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Room>>, AppError> {
    Ok(Json(state.store.rooms_by_id(&id).await?))
}

async fn book(
    State(state): State<AppState>,
    Json(req): Json<BookRequest>,
) -> Result<Response, AppError> {
    let outcome = state.bookings.book(req).await.map_err(|e| match e {
        BookError::Malformed(c) => AppError::BadRequest(c.to_string()),
        BookError::Store(s) => AppError::Store(s),
    })?;

    let response = match outcome {
        BookOutcome::StartAfterEnd => {
            metrics::counter!(observability::BOOKINGS_REJECTED_TOTAL, "reason" => "validation")
                .increment(1);
            "Start time overlaps End time".into_response()
        }
        BookOutcome::RoomNotFound => {
            metrics::counter!(observability::BOOKINGS_REJECTED_TOTAL, "reason" => "room_not_found")
                .increment(1);
            "No room present".into_response()
        }
        BookOutcome::Conflict(existing) => {
            metrics::counter!(observability::BOOKINGS_REJECTED_TOTAL, "reason" => "conflict")
                .increment(1);
            Json(json!({ "Booked Rooms": existing })).into_response()
        }
        BookOutcome::Booked(booking) => {
            metrics::counter!(observability::BOOKINGS_ACCEPTED_TOTAL).increment(1);
            Json(booking).into_response()
        }
    };
    Ok(response)
}

async fn booked_rooms_view(
    State(state): State<AppState>,
) -> Result<Json<Vec<views::BookedRoomEntry>>, AppError> {
    let bookings = state.store.bookings().await?;
    let rooms = state.store.rooms().await?;
    Ok(Json(views::booked_rooms(&rooms, &bookings)))
}

async fn customers_view(
    State(state): State<AppState>,
) -> Result<Json<Vec<views::CustomerEntry>>, AppError> {
    let bookings = state.store.bookings().await?;
    let rooms = state.store.rooms().await?;
    Ok(Json(views::customers(&rooms, &bookings)?))
}
