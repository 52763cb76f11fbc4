use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
};
use log::debug;
use serde::Serialize;
use tuner::{
    BestConfig, CacheEntry, ParamDomain, ParameterSet, PredictionCache,
    fixture::{PerformanceFilter, PerformanceRecord},
};

use crate::{AppState, error::ApiError};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictAll<'a> {
    predictions: &'a PredictionCache,
    best_config: &'a BestConfig,
}

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
    version: &'static str,
}

/// `POST /predict`: snaps the body and answers with its series and metrics.
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<ParameterSet>, JsonRejection>,
) -> Result<Json<CacheEntry>, ApiError> {
    let Json(params) = body?;
    let entry = state.workbench.predict(&params)?;
    Ok(Json(entry))
}

/// `GET /predictAll`: the whole cache plus the best configuration.
pub async fn predict_all(State(state): State<AppState>) -> Response {
    let workbench = &state.workbench;
    debug!("serving {} cached tuple(s)", workbench.cache().len());

    Json(PredictAll {
        predictions: workbench.cache(),
        best_config: workbench.best(),
    })
    .into_response()
}

/// `GET /parameter-ranges`: the legal values of every knob.
///
/// Keys are the knob names (`learning_rate`, not `learning_rates`) and the values come
/// from the active domain, not from the performance records.
pub async fn parameter_ranges(State(state): State<AppState>) -> Json<ParamDomain> {
    Json(state.workbench.domain().clone())
}

/// `GET /model-performance`: the performance records matching the query filters.
pub async fn model_performance(
    State(state): State<AppState>,
    query: Result<Query<PerformanceFilter>, QueryRejection>,
) -> Result<Json<Vec<PerformanceRecord>>, ApiError> {
    let Query(filter) = query?;
    let fixture = state
        .workbench
        .performance()
        .ok_or_else(|| ApiError::NotFound("no model performance data loaded".to_string()))?;

    let records = fixture.filter(&filter);
    debug!("{} performance record(s) match {filter:?}", records.len());
    Ok(Json(records))
}

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
