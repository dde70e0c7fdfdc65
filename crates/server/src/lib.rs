use api_types::{ErrorBody, FieldError};
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{ServerState, router, run_with_listener};

mod geolocation;
mod pharmacies;
mod server;
mod signup;
mod user;

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) | EngineError::MissingDocument => StatusCode::BAD_REQUEST,
        EngineError::Unauthorized => StatusCode::UNAUTHORIZED,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::InvalidId(_)
        | EngineError::InvalidRole(_)
        | EngineError::Storage(_)
        | EngineError::Hashing(_)
        | EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn body_for_engine_error(err: EngineError) -> ErrorBody {
    match err {
        EngineError::Validation(violations) => ErrorBody {
            error: "Validation failed".to_string(),
            details: Some(
                violations
                    .into_iter()
                    .map(|v| FieldError {
                        field: v.field,
                        message: v.message,
                    })
                    .collect(),
            ),
        },
        EngineError::KeyNotFound(what) => ErrorBody {
            error: format!("Not found: {what}"),
            details: None,
        },
        err @ (EngineError::InvalidId(_)
        | EngineError::InvalidRole(_)
        | EngineError::Storage(_)
        | EngineError::Hashing(_)
        | EngineError::Database(_)) => {
            tracing::error!("internal error: {err}");
            ErrorBody {
                error: "internal server error".to_string(),
                details: None,
            }
        }
        other => ErrorBody {
            error: other.to_string(),
            details: None,
        },
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), body_for_engine_error(err))
            }
            ServerError::Generic(error) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error,
                    details: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{FieldViolation, IdentityField};

    #[test]
    fn validation_maps_to_400() {
        let err = EngineError::Validation(vec![FieldViolation::new("email", "email is required")]);
        let res = ServerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_document_maps_to_400() {
        let res = ServerError::from(EngineError::MissingDocument).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_unauthorized_maps_to_401() {
        let res = ServerError::from(EngineError::Unauthorized).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res =
            ServerError::from(EngineError::ExistingKey(IdentityField::Email)).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_errors_hide_details() {
        let body = body_for_engine_error(EngineError::Hashing("argon2 exploded".to_string()));
        assert_eq!(body.error, "internal server error");
        assert!(body.details.is_none());
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
