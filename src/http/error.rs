use axum::response::{IntoResponse, Json, Response};

use crate::service::{ErrorBody, FailureDetail, ServiceError};

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
            failures: self.failures().iter().map(FailureDetail::from).collect(),
        };

        if status.is_server_error() {
            tracing::error!(kind = body.error, "{}", body.message);
        } else {
            tracing::debug!(kind = body.error, "{}", body.message);
        }

        (status, Json(body)).into_response()
    }
}
