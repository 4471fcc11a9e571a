use axum::{Json, http::StatusCode, response::IntoResponse};
use ledger::LedgerError;

use serde::Serialize;
pub use server::{app, run, run_with_listener, spawn_with_listener};

mod accounts;
mod activity;
mod server;
mod transactions;
mod transfers;

pub mod types {
    pub mod account {
        pub use api_types::account::{AccountListResponse, AccountNew, AccountView, BalanceView};
    }

    pub mod transaction {
        pub use api_types::transaction::{TransactionNew, TransactionUpdate, TransactionView};
    }

    pub mod transfer {
        pub use api_types::transfer::{TransferNew, TransferUpdate, TransferView};
    }

    pub mod activity {
        pub use api_types::activity::{ActivityItemView, ActivityList, ActivityListResponse};
    }
}

pub enum ServerError {
    Ledger(LedgerError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_ledger_error(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::ExistingKey(_) | LedgerError::ConcurrentModification(_) => {
            StatusCode::CONFLICT
        }
        LedgerError::Validation(_) | LedgerError::InsufficientFunds(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        LedgerError::PartialApplication(_) | LedgerError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_ledger_error(err: LedgerError) -> String {
    match err {
        LedgerError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        LedgerError::PartialApplication(detail) => {
            tracing::error!("ledger invariant violated: {detail}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Ledger(err) => (status_for_ledger_error(&err), message_for_ledger_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<LedgerError> for ServerError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_not_found_maps_to_404() {
        let res = ServerError::from(LedgerError::NotFound("account".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn ledger_conflict_maps_to_409() {
        let res = ServerError::from(LedgerError::ExistingKey("Main".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn concurrent_modification_maps_to_409() {
        let res = ServerError::from(LedgerError::ConcurrentModification("busy".to_string()))
            .into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn ledger_validation_maps_to_422() {
        let res = ServerError::from(LedgerError::Validation("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn insufficient_funds_maps_to_422() {
        let res =
            ServerError::from(LedgerError::InsufficientFunds("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn partial_application_maps_to_500() {
        let res =
            ServerError::from(LedgerError::PartialApplication("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
