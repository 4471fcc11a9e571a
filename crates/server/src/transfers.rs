//! Transfers API endpoints

use api_types::transfer::{TransferNew, TransferUpdate, TransferView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use ledger::{CreateTransferCmd, Scope, UpdateTransferCmd};

fn view(transfer: ledger::Transfer) -> TransferView {
    TransferView {
        id: transfer.id,
        from_account_id: transfer.from_account_id,
        to_account_id: transfer.to_account_id,
        amount_minor: transfer.amount.minor(),
        occurred_at: transfer.occurred_at,
        description: transfer.description,
        created_at: transfer.created_at,
    }
}

pub async fn create(
    Extension(scope): Extension<Scope>,
    State(state): State<ServerState>,
    Json(payload): Json<TransferNew>,
) -> Result<(StatusCode, Json<TransferView>), ServerError> {
    let mut cmd = CreateTransferCmd::new(
        scope,
        payload.from_account_id,
        payload.to_account_id,
        payload.amount_minor,
        payload.occurred_at,
    );
    if let Some(description) = payload.description {
        cmd = cmd.with_description(description);
    }
    if let Some(key) = payload.idempotency_key {
        cmd = cmd.with_idempotency_key(key);
    }

    let transfer = state.ledger.create_transfer(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(transfer))))
}

pub async fn get(
    Extension(scope): Extension<Scope>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransferView>, ServerError> {
    let transfer = state.ledger.transfer(&scope, id).await?;

    Ok(Json(view(transfer)))
}

pub async fn update(
    Extension(scope): Extension<Scope>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransferUpdate>,
) -> Result<Json<TransferView>, ServerError> {
    let mut cmd = UpdateTransferCmd::new(scope, id);
    if let Some(from_account_id) = payload.from_account_id {
        cmd = cmd.with_from_account(from_account_id);
    }
    if let Some(to_account_id) = payload.to_account_id {
        cmd = cmd.with_to_account(to_account_id);
    }
    if let Some(amount_minor) = payload.amount_minor {
        cmd = cmd.with_amount_minor(amount_minor);
    }
    if let Some(occurred_at) = payload.occurred_at {
        cmd = cmd.with_occurred_at(occurred_at);
    }
    if let Some(description) = payload.description {
        cmd = cmd.with_description(description);
    }

    let transfer = state.ledger.update_transfer(cmd).await?;
    Ok(Json(view(transfer)))
}

pub async fn delete(
    Extension(scope): Extension<Scope>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_transfer(&scope, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
