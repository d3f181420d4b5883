use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

pub(crate) const INTERNAL_FAILURE_MESSAGE: &str = "We have some troubles, please, try later.";

/// Every way a request can fail. Bodies are plain text.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    AuthorizationRequired(&'static str),
    #[error("You do not have permission to perform this action.")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Invalid page.")]
    InvalidPage,
    #[error("{0}")]
    Conflict(&'static str),
    #[error("{0}")]
    EmptyResource(&'static str),
    #[error("{}", .0.join("\n"))]
    Validation(Vec<String>),
    #[error("{}", INTERNAL_FAILURE_MESSAGE)]
    Internal(color_eyre::Report),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::AuthorizationRequired(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) | ApiError::InvalidPage => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) | ApiError::EmptyResource(_) | ApiError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let ApiError::Internal(report) = &self {
            let source: &(dyn std::error::Error + Send + Sync + 'static) = report.as_ref();
            sentry::capture_error(source);
            tracing::error!(error = ?report, "ApiError::Internal");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "ApiError");
        }

        (status, self.to_string()).into_response()
    }
}

impl From<color_eyre::Report> for ApiError {
    fn from(err: color_eyre::Report) -> Self {
        ApiError::Internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::eyre;

    #[test]
    fn internal_errors_hide_the_report() {
        let err = ApiError::from(eyre!("connection refused"));

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), INTERNAL_FAILURE_MESSAGE);
    }

    #[test]
    fn validation_errors_list_one_per_line() {
        let err = ApiError::Validation(vec![
            "name: must not be empty".to_string(),
            "cooking_time: must be at least 1".to_string(),
        ]);

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "name: must not be empty\ncooking_time: must be at least 1"
        );
    }

    #[test]
    fn not_found_names_the_thing() {
        assert_eq!(ApiError::NotFound("Recipe").to_string(), "Recipe not found");
    }
}
