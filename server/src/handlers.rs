use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use daybook_shared::{decode_surface_file, encode_surface_file, SurfaceRecord};
use tracing::{debug, error, info, warn};

use crate::logic::{parse_day, sanitize_record};
use crate::state::AppState;

const OCTET_STREAM: &str = "application/octet-stream";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping_handler))
        .route("/days", get(list_days_handler))
        .route(
            "/days/:day",
            get(get_day_handler)
                .put(put_day_handler)
                .delete(delete_day_handler),
        )
        .with_state(state)
}

pub async fn ping_handler() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

pub async fn list_days_handler(State(state): State<AppState>) -> Response {
    match state.storage.list_days().await {
        Ok(days) => Json(days.iter().map(ToString::to_string).collect::<Vec<_>>()).into_response(),
        Err(error) => {
            error!(%error, "failed to list days");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn get_day_handler(
    Path(day): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let Some(day) = parse_day(&day) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    match state.storage.load_surface(day).await {
        Ok(Some(record)) => {
            if header_mentions(&headers, ACCEPT, "application/json") {
                Json(record).into_response()
            } else {
                ([(CONTENT_TYPE, OCTET_STREAM)], encode_surface_file(&record)).into_response()
            }
        }
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(error) => {
            warn!(%day, %error, "failed to load surface");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn put_day_handler(
    Path(day): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(day) = parse_day(&day) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let parsed = if header_mentions(&headers, CONTENT_TYPE, "application/json") {
        serde_json::from_slice::<SurfaceRecord>(&body).map_err(|error| error.to_string())
    } else {
        decode_surface_file(&body).map_err(|error| error.to_string())
    };
    let record = match parsed {
        Ok(record) => sanitize_record(record),
        Err(error) => {
            debug!(%day, %error, bytes = body.len(), "rejecting undecodable surface");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let _write = state.writes.lock().await;
    match state.storage.save_surface(day, &record).await {
        Ok(()) => {
            info!(%day, stickers = record.stickers.len(), "surface saved");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(error) => {
            error!(%day, %error, "failed to save surface");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn delete_day_handler(
    Path(day): Path<String>,
    State(state): State<AppState>,
) -> Response {
    let Some(day) = parse_day(&day) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let _write = state.writes.lock().await;
    match state.storage.delete_surface(day).await {
        Ok(true) => {
            info!(%day, "surface deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(error) => {
            error!(%day, %error, "failed to delete surface");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn header_mentions(headers: &HeaderMap, name: axum::http::HeaderName, needle: &str) -> bool {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains(needle))
}
