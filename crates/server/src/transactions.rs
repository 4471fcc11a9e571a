//! Transactions API endpoints

use api_types::transaction::{
    TransactionKind as ApiKind, TransactionNew, TransactionUpdate, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use ledger::{CreateTransactionCmd, Scope, UpdateTransactionCmd};

fn map_kind(kind: ledger::TransactionKind) -> ApiKind {
    match kind {
        ledger::TransactionKind::Income => ApiKind::Income,
        ledger::TransactionKind::Expense => ApiKind::Expense,
    }
}

fn parse_kind(kind: ApiKind) -> ledger::TransactionKind {
    match kind {
        ApiKind::Income => ledger::TransactionKind::Income,
        ApiKind::Expense => ledger::TransactionKind::Expense,
    }
}

fn view(transaction: ledger::Transaction) -> TransactionView {
    TransactionView {
        id: transaction.id,
        account_id: transaction.account_id,
        kind: map_kind(transaction.kind),
        amount_minor: transaction.amount.minor(),
        category_id: transaction.category_id,
        occurred_at: transaction.occurred_at,
        created_at: transaction.created_at,
    }
}

pub async fn create(
    Extension(scope): Extension<Scope>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let mut cmd = CreateTransactionCmd::new(
        scope,
        payload.account_id,
        parse_kind(payload.kind),
        payload.amount_minor,
        payload.occurred_at,
    );
    if let Some(category_id) = payload.category_id {
        cmd = cmd.with_category(category_id);
    }
    if let Some(key) = payload.idempotency_key {
        cmd = cmd.with_idempotency_key(key);
    }

    let transaction = state.ledger.create_transaction(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(transaction))))
}

pub async fn get(
    Extension(scope): Extension<Scope>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let transaction = state.ledger.transaction(&scope, id).await?;

    Ok(Json(view(transaction)))
}

pub async fn update(
    Extension(scope): Extension<Scope>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let mut cmd = UpdateTransactionCmd::new(scope, id);
    if let Some(account_id) = payload.account_id {
        cmd = cmd.with_account(account_id);
    }
    if let Some(kind) = payload.kind {
        cmd = cmd.with_kind(parse_kind(kind));
    }
    if let Some(amount_minor) = payload.amount_minor {
        cmd = cmd.with_amount_minor(amount_minor);
    }
    if let Some(category_id) = payload.category_id {
        cmd = cmd.with_category(category_id);
    }
    if let Some(occurred_at) = payload.occurred_at {
        cmd = cmd.with_occurred_at(occurred_at);
    }

    let transaction = state.ledger.update_transaction(cmd).await?;
    Ok(Json(view(transaction)))
}

pub async fn delete(
    Extension(scope): Extension<Scope>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_transaction(&scope, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
