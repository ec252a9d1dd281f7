use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::TumorDescriptor;
use super::orchestrator::MpOrchestrator;

/// Router builder exposing determination and catalog endpoints.
pub fn determination_router(orchestrator: Arc<MpOrchestrator>) -> Router {
    Router::new()
        .route("/api/v1/primaries/determine", post(determine_handler))
        .route("/api/v1/groups", get(groups_handler))
        .route("/api/v1/groups/classify", post(classify_handler))
        .route("/api/v1/groups/:group_id", get(group_handler))
        .with_state(orchestrator)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeterminationRequest {
    pub tumor1: TumorDescriptor,
    pub tumor2: TumorDescriptor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRequest {
    pub tumor: TumorDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationView {
    pub group_id: String,
    pub group_name: String,
}

pub(crate) async fn determine_handler(
    State(orchestrator): State<Arc<MpOrchestrator>>,
    axum::Json(request): axum::Json<DeterminationRequest>,
) -> Response {
    let decision = orchestrator.determine(&request.tumor1, &request.tumor2);
    (StatusCode::OK, axum::Json(decision)).into_response()
}

pub(crate) async fn classify_handler(
    State(orchestrator): State<Arc<MpOrchestrator>>,
    axum::Json(request): axum::Json<ClassificationRequest>,
) -> Response {
    let tumor = match request.tumor.validate() {
        Ok(tumor) => tumor,
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
    };

    match orchestrator.classifier().classify_tumor(&tumor) {
        Some(group) => {
            let view = ClassificationView {
                group_id: group.id().to_string(),
                group_name: group.name().to_string(),
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        None => {
            let payload = json!({
                "error": "tumor does not belong to any cancer group",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn groups_handler(State(orchestrator): State<Arc<MpOrchestrator>>) -> Response {
    let summaries = orchestrator.catalog().summaries();
    (StatusCode::OK, axum::Json(summaries)).into_response()
}

pub(crate) async fn group_handler(
    State(orchestrator): State<Arc<MpOrchestrator>>,
    Path(group_id): Path<String>,
) -> Response {
    match orchestrator.catalog().get(&group_id) {
        Some(group) => (StatusCode::OK, axum::Json(group.summary())).into_response(),
        None => {
            let payload = json!({
                "group_id": group_id,
                "error": "unknown cancer group",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}
