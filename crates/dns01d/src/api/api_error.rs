use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Failures of the HTTP layer itself; solver failures are reported inside
/// the reply envelope instead
#[derive(Debug, thiserror::Error)]
pub(crate) enum RouteError {
    #[error("unknown API group: {0}")]
    UnknownGroup(String),
    #[error("unknown solver: {0}")]
    UnknownSolver(String),
    #[error("payload has no request")]
    MissingRequest,
    #[error("request has no action")]
    MissingAction,
    #[error(transparent)]
    JsonExtractorRejection(#[from] JsonRejection),
}

pub(crate) struct APIError(anyhow::Error);

impl IntoResponse for APIError {
    fn into_response(self) -> Response {
        let any_err = self.0;
        let status = match any_err.downcast_ref::<RouteError>() {
            Some(RouteError::UnknownGroup(_) | RouteError::UnknownSolver(_)) => {
                StatusCode::NOT_FOUND
            }
            Some(RouteError::MissingRequest | RouteError::MissingAction) => StatusCode::BAD_REQUEST,
            Some(RouteError::JsonExtractorRejection(err)) => match err {
                JsonRejection::JsonDataError(_) => StatusCode::UNPROCESSABLE_ENTITY,
                JsonRejection::JsonSyntaxError(_) => StatusCode::BAD_REQUEST,
                JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            None => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({
            "error": format!("{any_err}"),
        }));
        (status, body).into_response()
    }
}

impl<E> From<E> for APIError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
