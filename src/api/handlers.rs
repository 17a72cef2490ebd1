//! API route handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;

use super::error::ApiResult;
use super::state::AppState;
use crate::command::{ListHostsParams, RunParams};
use crate::parser::RunResult;

/// Run an ad-hoc module.
///
/// The body is read as raw bytes so a missing or wrong `Content-Type` does
/// not turn a valid JSON object into a rejection.
pub async fn run(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<Json<RunResult>> {
    let params = RunParams::from_json(&body)?;
    let result = state.adhoc.run(&params).await?;
    Ok(Json(result))
}

/// List the hosts matching a pattern.
pub async fn list_hosts(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListHostsParams>, QueryRejection>,
) -> ApiResult<Json<Vec<String>>> {
    let Query(params) = query?;
    let hosts = state.adhoc.list_hosts(&params).await?;
    Ok(Json(hosts))
}
