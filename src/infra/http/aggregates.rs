use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::application::dashboard::{AggregateKey, AggregateValue};
use crate::application::error::HttpError;

use super::{ApiEnvelope, ApiState};

#[derive(Serialize)]
struct NamedAggregate {
    key: AggregateKey,
    value: AggregateValue,
}

pub(super) async fn single(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Result<Response, HttpError> {
    let key: AggregateKey = name.parse().map_err(|err| {
        HttpError::from_error(
            "infra::http::aggregates",
            StatusCode::NOT_FOUND,
            "Unknown aggregate",
            &err,
        )
    })?;

    let value = state.dashboard.aggregate(key).await?;
    Ok(Json(ApiEnvelope::ok("Ok", NamedAggregate { key, value })).into_response())
}
