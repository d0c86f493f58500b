use api_types::error::ErrorBody;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{router, run, run_with_listener, spawn_with_listener};

mod categories;
mod daraja;
mod server;
mod system;
mod transactions;
mod views;
mod wallet;

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::SystemLocked { .. } => StatusCode::LOCKED,
        EngineError::DuplicateTransaction { .. } => StatusCode::CONFLICT,
        EngineError::Unauthorized => StatusCode::UNAUTHORIZED,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::Validation(_)
        | EngineError::UnknownCategory(_)
        | EngineError::InvalidState(_)
        | EngineError::AlreadyLocked(_)
        | EngineError::OverAllocation { .. }
        | EngineError::NotBalanced { .. }
        | EngineError::NothingToUnlock => StatusCode::BAD_REQUEST,
    }
}

fn body_for_engine_error(err: EngineError) -> ErrorBody {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            ErrorBody::new("internal server error")
        }
        EngineError::SystemLocked {
            open_transaction_id,
        } => ErrorBody {
            open_transaction_id: Some(open_transaction_id),
            ..ErrorBody::new(
                "System locked: please classify the open transaction before recording new ones",
            )
        },
        EngineError::DuplicateTransaction {
            ref external_reference,
            existing_id,
        } => ErrorBody {
            existing_transaction_id: existing_id,
            ..ErrorBody::new(format!(
                "Transaction {external_reference} already exists"
            ))
        },
        EngineError::OverAllocation {
            max_allowed,
            current_total,
            attempted,
        } => ErrorBody {
            max_allowed_minor: Some(max_allowed.minor()),
            current_total_minor: Some(current_total.minor()),
            attempted_minor: Some(attempted.minor()),
            ..ErrorBody::new(err.to_string())
        },
        EngineError::NotBalanced { remaining } => ErrorBody {
            remaining_minor: Some(remaining.minor()),
            ..ErrorBody::new(err.to_string())
        },
        other => ErrorBody::new(other.to_string()),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, ErrorBody::new(err)),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
