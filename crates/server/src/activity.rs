//! Activity feed API endpoint

use api_types::activity::{
    ActivityItemView, ActivityKind as ApiKind, ActivityList, ActivityListResponse,
    Direction as ApiDirection,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{ServerError, server::ServerState};
use ledger::{ActivityFilter, ActivityKind, ActivityRef, Direction, Scope};

fn parse_kinds(raw: &str) -> Result<Vec<ActivityKind>, ServerError> {
    raw.split(',')
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| match chunk {
            "income" => Ok(ActivityKind::Income),
            "expense" => Ok(ActivityKind::Expense),
            "transfer" => Ok(ActivityKind::Transfer),
            other => Err(ServerError::Generic(format!("unknown kind: {other}"))),
        })
        .collect()
}

fn map_kind(kind: ActivityKind) -> ApiKind {
    match kind {
        ActivityKind::Income => ApiKind::Income,
        ActivityKind::Expense => ApiKind::Expense,
        ActivityKind::Transfer => ApiKind::Transfer,
    }
}

fn map_direction(direction: Direction) -> ApiDirection {
    match direction {
        Direction::Inflow => ApiDirection::Inflow,
        Direction::Outflow => ApiDirection::Outflow,
        Direction::Internal => ApiDirection::Internal,
    }
}

fn view(item: ledger::ActivityItem) -> ActivityItemView {
    let (account_id, from_account_id, to_account_id) = match item.accounts {
        ActivityRef::Single { account_id } => (Some(account_id), None, None),
        ActivityRef::Pair {
            from_account_id,
            to_account_id,
        } => (None, Some(from_account_id), Some(to_account_id)),
    };

    ActivityItemView {
        id: item.id,
        kind: map_kind(item.kind),
        occurred_at: item.occurred_at,
        amount_minor: item.amount.minor(),
        direction: map_direction(item.direction),
        label: item.label,
        account_id,
        from_account_id,
        to_account_id,
    }
}

pub async fn list(
    Extension(scope): Extension<Scope>,
    State(state): State<ServerState>,
    Query(payload): Query<ActivityList>,
) -> Result<Json<ActivityListResponse>, ServerError> {
    let kinds = payload.kinds.as_deref().map(parse_kinds).transpose()?;
    let filter = ActivityFilter {
        from: payload.from,
        to: payload.to,
        kinds,
        account_id: payload.account_id,
    };

    let page = state
        .ledger
        .activity(
            &scope,
            &filter,
            payload.page.unwrap_or(1),
            payload.page_size.unwrap_or(50),
        )
        .await?;

    Ok(Json(ActivityListResponse {
        items: page.items.into_iter().map(view).collect(),
        total: page.total,
        has_more: page.has_more,
    }))
}
