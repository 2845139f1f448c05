use axum::{
    Json,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use recita_services::dao::base::DaoError;
use recita_services::{JudgeError, PipelineError, RangeError, RecordError};
use recita_transcription::TranscriptionError;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Detail of an internal error, withheld from the body and carried on the
/// response for [`expose_internal_detail`].
#[derive(Debug, Clone)]
struct InternalDetail(String);

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    TooManyRequests(String),
    Timeout(String),
    Internal(String),
    Validation(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            ApiError::TooManyRequests(msg) => write!(f, "Too many requests: {msg}"),
            ApiError::Timeout(msg) => write!(f, "Timeout: {msg}"),
            ApiError::Internal(msg) => write!(f, "Internal error: {msg}"),
            ApiError::Validation(msg) => write!(f, "Validation: {msg}"),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::TooManyRequests(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, "too_many_requests", msg)
            }
            ApiError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, "timeout", msg),
            ApiError::Internal(msg) => {
                tracing::error!(%msg, "Internal error");
                let mut response =
                    error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal", INTERNAL_MESSAGE.to_string());
                response.extensions_mut().insert(InternalDetail(msg));
                return response;
            }
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation", msg),
        };

        error_response(status, error_type, message)
    }
}

fn error_response(status: StatusCode, error_type: &str, message: String) -> Response {
    let body = ErrorResponse {
        success: false,
        error: error_type.to_string(),
        message,
    };
    (status, Json(body)).into_response()
}

/// Development-mode middleware: puts the withheld detail of internal errors
/// back into the response message.
pub async fn expose_internal_detail(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    match response.extensions_mut().remove::<InternalDetail>() {
        Some(InternalDetail(detail)) => error_response(response.status(), "internal", detail),
        None => response,
    }
}

impl From<DaoError> for ApiError {
    fn from(err: DaoError) -> Self {
        match err {
            DaoError::NotFound => ApiError::NotFound("Resource not found".to_string()),
            DaoError::DuplicateKey(msg) => ApiError::Validation(msg),
            DaoError::Validation(msg) => ApiError::Validation(msg),
            DaoError::Mongo(e) => ApiError::Internal(e.to_string()),
            DaoError::BsonSer(e) => ApiError::Internal(e.to_string()),
            DaoError::BsonDe(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<RangeError> for ApiError {
    fn from(err: RangeError) -> Self {
        match err {
            e if e.is_validation() => ApiError::BadRequest(e.to_string()),
            e @ RangeError::EmptyPassage(_) => ApiError::NotFound(e.to_string()),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<TranscriptionError> for ApiError {
    fn from(err: TranscriptionError) -> Self {
        match err {
            e if e.is_input_error() => ApiError::BadRequest(e.to_string()),
            e @ TranscriptionError::RateLimited { .. } => ApiError::TooManyRequests(e.to_string()),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<JudgeError> for ApiError {
    fn from(err: JudgeError) -> Self {
        match err {
            e if e.is_input_error() => ApiError::BadRequest(e.to_string()),
            e @ JudgeError::RateLimited { .. } => ApiError::TooManyRequests(e.to_string()),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::InvalidInput(msg) => ApiError::BadRequest(msg),
            RecordError::Store(e) => e.into(),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Range(e) => e.into(),
            PipelineError::Transcription(e) => e.into(),
            PipelineError::Judge(e) => e.into(),
            PipelineError::Record(e) => e.into(),
            e @ PipelineError::Timeout(_) => ApiError::Timeout(e.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
