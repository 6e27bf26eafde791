use super::AppState;
use crate::domain::SavedDraw;
use crate::error::AppError;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct SaveDrawParams {
    pub id: Option<i64>,
    pub settings: Option<Value>,
    pub results: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct SaveDrawResponse {
    pub success: bool,
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct DrawListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DrawListResponse {
    pub results: Vec<SavedDraw>,
}

fn draw_from_params(params: SaveDrawParams) -> SavedDraw {
    SavedDraw {
        id: params.id.unwrap_or_else(|| Utc::now().timestamp_millis()),
        timestamp: Utc::now(),
        settings: params.settings.unwrap_or(Value::Null),
        results: params.results.unwrap_or(Value::Null),
    }
}

pub async fn save_drawing(
    State(state): State<AppState>,
    Json(params): Json<SaveDrawParams>,
) -> Result<Json<SaveDrawResponse>, AppError> {
    let draw = draw_from_params(params);
    state.repo.insert_draw(&draw).await?;
    info!("Saved draw {}", draw.id);

    Ok(Json(SaveDrawResponse {
        success: true,
        id: draw.id,
    }))
}

pub async fn list_drawings(
    Query(params): Query<DrawListQuery>,
    State(state): State<AppState>,
) -> Result<Json<DrawListResponse>, AppError> {
    let limit = params.limit.unwrap_or(50).max(0);
    let results = state.repo.list_draws(limit).await?;
    Ok(Json(DrawListResponse { results }))
}

pub async fn get_drawing(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<SavedDraw>, AppError> {
    let draw = state
        .repo
        .get_draw(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Draw {id} not found")))?;
    Ok(Json(draw))
}
