//! API route handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use regression_facade::{EvaluationRecord, RegressionEngine, RegressionInput, SelectionResult};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::history::{HistoryEntry, HistoryLog};
use crate::AppState;

/// Default page size of the option and best-model histories.
const HISTORY_PAGE: usize = 20;
/// Default page size of the stack-model history and the shortcut redirects.
const STACK_HISTORY_PAGE: usize = 10;
/// Page sizes must lie strictly between these bounds.
const PAGE_BOUNDS: (usize, usize) = (1, 100);

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
    pub skip: Option<usize>,
}

impl HistoryParams {
    fn resolve(&self, default_limit: usize) -> Result<(usize, usize), ApiError> {
        let limit = self.limit.unwrap_or(default_limit);
        let (low, high) = PAGE_BOUNDS;
        if limit <= low || limit >= high {
            return Err(ApiError::InvalidQuery(format!(
                "limit must be greater than {low} and less than {high}, got {limit}"
            )));
        }
        Ok((limit, self.skip.unwrap_or(0)))
    }
}

/// Run `job` on the worker pool, bounded by the configured timeout.
async fn evaluate<T, F>(state: &AppState, job: F) -> Result<T, ApiError>
where
    F: FnOnce(&RegressionEngine) -> regression_facade::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let engine = Arc::clone(&state.engine);
    let task = state.pool.submit(move || job(&engine));
    match state.evaluation_timeout {
        Some(limit) => tokio::time::timeout(limit, task)
            .await
            .map_err(|_| ApiError::Timeout(limit))?
            .map_err(ApiError::from),
        None => task.await.map_err(ApiError::from),
    }
}

async fn page<T: Clone>(
    log: &HistoryLog<T>,
    params: &HistoryParams,
    default_limit: usize,
) -> Result<Json<Vec<HistoryEntry<T>>>, ApiError> {
    let (limit, skip) = params.resolve(default_limit)?;
    Ok(Json(log.page(skip, limit).await))
}

pub async fn welcome() -> Json<Value> {
    Json(json!({
        "message": "Regression model evaluation service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Liveness probe - is the server running?
pub async fn liveness() -> Json<Value> {
    Json(json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe - worker pool size and history occupancy.
pub async fn readiness(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ready",
        "version": env!("CARGO_PKG_VERSION"),
        "worker_threads": state.pool.threads(),
        "history": {
            "option": state.history.option.len().await,
            "best_model": state.history.best_model.len().await,
            "stack_model": state.history.stack_model.len().await,
        }
    }))
}

pub async fn option_info() -> Json<Value> {
    Json(json!({
        "message": "Fit a named regression model to X_array / Y_array and optionally predict x0"
    }))
}

pub async fn option_post(
    State(state): State<AppState>,
    Json(input): Json<RegressionInput>,
) -> Result<Json<EvaluationRecord>, ApiError> {
    let record = evaluate(&state, move |engine| engine.run_option(&input)).await?;
    state.history.option.push(record.clone()).await;
    Ok(Json(record))
}

pub async fn option_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<HistoryEntry<EvaluationRecord>>>, ApiError> {
    page(&state.history.option, &params, HISTORY_PAGE).await
}

pub async fn best_model_info() -> Json<Value> {
    Json(json!({
        "message": "Evaluate the baseline model roster and return the best performer"
    }))
}

pub async fn best_model_post(
    State(state): State<AppState>,
    Json(input): Json<RegressionInput>,
) -> Result<Json<SelectionResult>, ApiError> {
    let result = evaluate(&state, move |engine| engine.find_best(&input)).await?;
    state.history.best_model.push(result.clone()).await;
    Ok(Json(result))
}

pub async fn best_model_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<HistoryEntry<SelectionResult>>>, ApiError> {
    page(&state.history.best_model, &params, HISTORY_PAGE).await
}

pub async fn stack_model_info() -> Json<Value> {
    Json(json!({
        "message": "Fit the stacking / voting ensemble and route each x0 row to a member model"
    }))
}

pub async fn stack_model_post(
    State(state): State<AppState>,
    Json(input): Json<RegressionInput>,
) -> Result<Json<EvaluationRecord>, ApiError> {
    let record = evaluate(&state, move |engine| engine.run_stack(&input)).await?;
    state.history.stack_model.push(record.clone()).await;
    Ok(Json(record))
}

pub async fn stack_model_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<HistoryEntry<EvaluationRecord>>>, ApiError> {
    page(&state.history.stack_model, &params, STACK_HISTORY_PAGE).await
}

/// `/history/{category}` shortcut: 302 to the category's history route.
pub async fn history_redirect(
    Path(category): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Response, ApiError> {
    let target = match category.to_ascii_lowercase().as_str() {
        "option" => "/regression/option/history",
        "best_model" => "/regression/best-model/history",
        "stacking_model" => "/regression/stack-model/history",
        _ => {
            return Ok((
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("no history named '{category}'") })),
            )
                .into_response())
        }
    };
    let (limit, skip) = params.resolve(STACK_HISTORY_PAGE)?;
    let location = format!("{target}?limit={limit}&skip={skip}");
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
