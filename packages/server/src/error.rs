//! API error type and its HTTP mapping.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use route_planner_route::{PlannerError, RouteError};
use route_planner_server_models::ApiError;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned by the API handlers.
#[derive(Debug, Error)]
pub enum ServerError {
    /// No session with this id is open.
    #[error("Session {0} not found")]
    SessionNotFound(Uuid),

    /// The session store is full.
    #[error("Too many open sessions (limit {0})")]
    SessionLimit(usize),

    /// The request body or query was malformed.
    #[error("{0}")]
    BadRequest(String),

    /// One-shot route generation was asked for too few points.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// A session rejected the operation; its state is unchanged.
    #[error(transparent)]
    Planner(#[from] PlannerError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Self::SessionLimit(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadRequest(_) | Self::Route(_) => StatusCode::BAD_REQUEST,
            Self::Planner(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiError {
            error: self.to_string(),
        })
    }
}
