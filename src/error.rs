use thiserror::Error;

pub type Result<T> = std::result::Result<T, GarnishError>;

#[derive(Debug, Error)]
pub enum GarnishError {
    #[error("Duplicate route: {method} {path} is handled by both {first} and {second}")]
    DuplicateRoute {
        method: String,
        path: String,
        first: String,
        second: String,
    },

    #[error("Unresolved injection: {owner}.{field} requires service '{id}', which is not registered")]
    UnresolvedInjection {
        owner: String,
        field: String,
        id: String,
    },

    #[error("Service not found: {id}")]
    ServiceNotFound { id: String },

    #[error("No injection declared for field '{field}' of {owner}")]
    UndeclaredInjection { owner: String, field: String },

    #[error("Route {method} {path} belongs to {controller}, which is not registered as a controller")]
    UnregisteredController {
        controller: String,
        method: String,
        path: String,
    },

    #[error("Controller {controller} is registered with conflicting base paths '{first}' and '{second}'")]
    ConflictingController {
        controller: String,
        first: String,
        second: String,
    },

    #[error("Invalid route path '{path}' on {controller}: {reason}")]
    InvalidPath {
        controller: String,
        path: String,
        reason: String,
    },

    #[error("Route path '{path}' names a capture differently from '{existing}' at the same position")]
    ConflictingCapture { path: String, existing: String },

    #[error("Service '{id}' is a {actual}, not a {expected}")]
    ServiceTypeMismatch {
        id: String,
        expected: String,
        actual: String,
    },

    #[error("Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    #[error("Invalid configuration value for {key}: '{value}'")]
    InvalidConfig { key: String, value: String },

    #[error("Failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for GarnishError {
    fn into_response(self) -> axum::response::Response {
        let status = axum::http::StatusCode::INTERNAL_SERVER_ERROR;
        tracing::error!(error = %self, "request failed");
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_duplicate_route_message_names_both_handlers() {
        let err = GarnishError::DuplicateRoute {
            method: "GET".into(),
            path: "/api/cities".into(),
            first: "CitiesController::get".into(),
            second: "OtherController::list".into(),
        };
        assert_eq!(
            err.to_string(),
            "Duplicate route: GET /api/cities is handled by both CitiesController::get and OtherController::list"
        );
    }

    #[test]
    fn test_into_response_is_server_error() {
        let response = GarnishError::Internal("boom".into()).into_response();
        assert_eq!(response.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
