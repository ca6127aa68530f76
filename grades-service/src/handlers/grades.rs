use crate::dtos::ClassStats;
use crate::models::GradeRecord;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mongodb::bson::Document;
use service_core::error::AppError;

/// GET /grades/stats — aggregate over the whole collection.
pub async fn overall_stats(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClassStats>>, AppError> {
    metrics::counter!("grades_stats_requests_total").increment(1);

    let stats = state.db.class_stats(None).await?;
    Ok(Json(stats))
}

/// GET /grades/stats/:id — aggregate restricted to one class.
///
/// A non-numeric id is a client error rather than a silent empty result.
pub async fn class_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ClassStats>>, AppError> {
    metrics::counter!("grades_stats_requests_total").increment(1);

    let class_id: i32 = id
        .parse()
        .map_err(|_| AppError::BadRequest(anyhow::anyhow!("Invalid class id: {}", id)))?;

    let stats = state.db.class_stats(Some(class_id)).await?;
    Ok(Json(stats))
}

/// GET /grades/debug — first five raw documents, unmodified.
pub async fn debug_sample(State(state): State<AppState>) -> Result<Json<Vec<Document>>, AppError> {
    let records = state.db.debug_sample().await?;
    Ok(Json(records))
}

/// POST /grades/test-validation — inserts the fixed invalid record.
///
/// The insert succeeds despite violating the schema because the collection
/// validator runs in warn mode. Plain-text response either way, unlike the
/// JSON error bodies of the read routes.
pub async fn test_validation(State(state): State<AppState>) -> Response {
    let record = GradeRecord::invalid_test_record();

    match state.db.insert_grade(&record).await {
        Ok(()) => {
            tracing::info!(
                class_id = record.class_id,
                learner_id = record.learner_id,
                "Inserted validation-test record"
            );
            (
                StatusCode::OK,
                "Inserted invalid test record; validator enforcement is warn-only",
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Validation-test insert failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to insert test record",
            )
                .into_response()
        }
    }
}
