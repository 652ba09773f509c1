use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::domain::TranscriptionJob;
use crate::infrastructure::observability::RequestId;
use crate::presentation::handlers::error_response::error_response;
use crate::presentation::state::AppState;

pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields in JSON request";

#[derive(Debug, Default, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub input_bucket_name: Option<String>,
    #[serde(default)]
    pub output_bucket_name: Option<String>,
    #[serde(default)]
    pub input_audio_file_path: Option<String>,
    #[serde(default)]
    pub output_folder: Option<String>,
}

#[derive(Serialize)]
pub struct PredictResponse {
    pub transcription_gcs_path: String,
}

pub async fn predict_handler(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    body: Result<Json<PredictRequest>, JsonRejection>,
) -> Response {
    let request_id = request_id.map(|Extension(id)| id.0).unwrap_or_default();

    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(request_id = %request_id, error = %rejection, "Rejected predict body");
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let job = match TranscriptionJob::new(
        body.input_bucket_name.as_deref(),
        body.output_bucket_name.as_deref(),
        body.input_audio_file_path.as_deref(),
        body.output_folder.as_deref(),
    ) {
        Ok(job) => job,
        Err(e) => {
            tracing::warn!(request_id = %request_id, missing = ?e.missing, "Invalid predict request");
            return error_response(StatusCode::BAD_REQUEST, MISSING_FIELDS_MESSAGE);
        }
    };

    match state.transcription_service.transcribe(&job).await {
        Ok(result) => {
            tracing::info!(
                request_id = %request_id,
                output = %result.output,
                "Transcription uploaded"
            );
            (
                StatusCode::OK,
                Json(PredictResponse {
                    transcription_gcs_path: result.output.to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                stage = ?e.stage(),
                error = %e,
                "Transcription pipeline failed"
            );
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
