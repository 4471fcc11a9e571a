//! Accounts API endpoints

use api_types::account::{AccountListResponse, AccountNew, AccountView, BalanceView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use ledger::Scope;

pub(crate) fn map_currency(currency: ledger::Currency) -> api_types::Currency {
    match currency {
        ledger::Currency::Eur => api_types::Currency::Eur,
        ledger::Currency::Usd => api_types::Currency::Usd,
        ledger::Currency::Gbp => api_types::Currency::Gbp,
    }
}

pub(crate) fn parse_currency(currency: api_types::Currency) -> ledger::Currency {
    match currency {
        api_types::Currency::Eur => ledger::Currency::Eur,
        api_types::Currency::Usd => ledger::Currency::Usd,
        api_types::Currency::Gbp => ledger::Currency::Gbp,
    }
}

fn view(account: ledger::Account) -> AccountView {
    AccountView {
        id: account.id,
        name: account.name,
        balance_minor: account.balance.minor(),
        currency: map_currency(account.currency),
        created_at: account.created_at,
    }
}

pub async fn create(
    Extension(scope): Extension<Scope>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let account = state
        .ledger
        .create_account(
            &scope,
            &payload.name,
            parse_currency(payload.currency.unwrap_or_default()),
            payload.opening_balance_minor.unwrap_or(0),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(view(account))))
}

pub async fn list(
    Extension(scope): Extension<Scope>,
    State(state): State<ServerState>,
) -> Result<Json<AccountListResponse>, ServerError> {
    let accounts = state.ledger.accounts(&scope).await?;

    Ok(Json(AccountListResponse {
        accounts: accounts.into_iter().map(view).collect(),
    }))
}

pub async fn get(
    Extension(scope): Extension<Scope>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.ledger.account(&scope, id).await?;

    Ok(Json(view(account)))
}

pub async fn balance(
    Extension(scope): Extension<Scope>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BalanceView>, ServerError> {
    let balance = state.ledger.balance(&scope, id).await?;

    Ok(Json(BalanceView {
        account_id: id,
        balance_minor: balance.minor(),
    }))
}
