use std::collections::HashMap;

use sea_orm::{Condition, JoinType, QueryFilter, QuerySelect, prelude::*};
use uuid::Uuid;

use crate::{
    ActivityFilter, ActivityItem, ActivityKind, ActivityPage, ActivityRef, Direction, LedgerError,
    ResultLedger, Scope, Transaction, TransactionKind, Transfer, accounts,
    activity::UNKNOWN_LABEL, categories, transactions, transfers,
};

use super::Ledger;

const MAX_PAGE_SIZE: u64 = 500;

impl Ledger {
    /// Merged, reverse-chronological feed of the scope's transactions and
    /// transfers.
    ///
    /// Ordering is `occurred_at` descending, ties broken by `created_at`
    /// then id, so paginating over an unchanged dataset never skips or
    /// duplicates items. `page` starts at 1.
    pub async fn activity(
        &self,
        scope: &Scope,
        filter: &ActivityFilter,
        page: u64,
        page_size: u64,
    ) -> ResultLedger<ActivityPage> {
        if page == 0 {
            return Err(LedgerError::Validation("page starts at 1".to_string()));
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(LedgerError::Validation(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from >= to {
                return Err(LedgerError::Validation(
                    "from must be strictly before to".to_string(),
                ));
            }
        }
        if let Some(kinds) = &filter.kinds {
            if kinds.is_empty() {
                return Err(LedgerError::Validation(
                    "kinds must not be empty".to_string(),
                ));
            }
        }

        // Reads have no balance side effects, so the two record kinds can be
        // fetched concurrently outside any transaction.
        let (transaction_models, transfer_models) = tokio::try_join!(
            fetch_transactions(&self.database, scope, filter),
            fetch_transfers(&self.database, scope, filter),
        )?;

        let account_names: HashMap<Uuid, String> = accounts::Entity::find()
            .filter(accounts::Column::Scope.eq(scope.key()))
            .all(&self.database)
            .await?
            .into_iter()
            .filter_map(|model| {
                Uuid::parse_str(&model.id)
                    .ok()
                    .map(|id| (id, model.name))
            })
            .collect();
        let category_names: HashMap<Uuid, String> = categories::Entity::find()
            .all(&self.database)
            .await?
            .into_iter()
            .filter_map(|model| {
                Uuid::parse_str(&model.id)
                    .ok()
                    .map(|id| (id, model.name))
            })
            .collect();

        // A single corrupt row must not take the whole feed down; skip it.
        let mut items = Vec::with_capacity(transaction_models.len() + transfer_models.len());
        items.extend(
            transaction_models
                .into_iter()
                .filter_map(|model| Transaction::try_from(model).ok())
                .map(|transaction| {
                    transaction_item(&transaction, &account_names, &category_names)
                }),
        );
        items.extend(
            transfer_models
                .into_iter()
                .filter_map(|model| Transfer::try_from(model).ok())
                .map(|transfer| transfer_item(&transfer, &account_names)),
        );

        items.sort_by(|a, b| {
            b.occurred_at
                .cmp(&a.occurred_at)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = items.len() as u64;
        let start = usize::try_from((page - 1).saturating_mul(page_size)).unwrap_or(usize::MAX);
        let end = start.saturating_add(page_size as usize).min(items.len());
        let page_items = if start >= items.len() {
            Vec::new()
        } else {
            items[start..end].to_vec()
        };
        let has_more = end < items.len();

        Ok(ActivityPage {
            items: page_items,
            total,
            has_more,
        })
    }
}

async fn fetch_transactions(
    database: &sea_orm::DatabaseConnection,
    scope: &Scope,
    filter: &ActivityFilter,
) -> ResultLedger<Vec<transactions::Model>> {
    let wants_income = filter.includes(ActivityKind::Income);
    let wants_expense = filter.includes(ActivityKind::Expense);
    if !wants_income && !wants_expense {
        return Ok(Vec::new());
    }

    let mut query = transactions::Entity::find()
        .join(JoinType::InnerJoin, transactions::Relation::Account.def())
        .filter(accounts::Column::Scope.eq(scope.key()));
    if let Some(from) = filter.from {
        query = query.filter(transactions::Column::OccurredAt.gte(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(transactions::Column::OccurredAt.lt(to));
    }
    if let Some(account_id) = filter.account_id {
        query = query.filter(transactions::Column::AccountId.eq(account_id.to_string()));
    }
    if wants_income != wants_expense {
        let kind = if wants_income {
            TransactionKind::Income
        } else {
            TransactionKind::Expense
        };
        query = query.filter(transactions::Column::Kind.eq(kind.as_str()));
    }

    Ok(query.all(database).await?)
}

async fn fetch_transfers(
    database: &sea_orm::DatabaseConnection,
    scope: &Scope,
    filter: &ActivityFilter,
) -> ResultLedger<Vec<transfers::Model>> {
    if !filter.includes(ActivityKind::Transfer) {
        return Ok(Vec::new());
    }

    let mut query = transfers::Entity::find()
        .join(JoinType::InnerJoin, transfers::Relation::FromAccount.def())
        .filter(accounts::Column::Scope.eq(scope.key()));
    if let Some(from) = filter.from {
        query = query.filter(transfers::Column::OccurredAt.gte(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(transfers::Column::OccurredAt.lt(to));
    }
    if let Some(account_id) = filter.account_id {
        query = query.filter(
            Condition::any()
                .add(transfers::Column::FromAccountId.eq(account_id.to_string()))
                .add(transfers::Column::ToAccountId.eq(account_id.to_string())),
        );
    }

    Ok(query.all(database).await?)
}

fn transaction_item(
    transaction: &Transaction,
    account_names: &HashMap<Uuid, String>,
    category_names: &HashMap<Uuid, String>,
) -> ActivityItem {
    let (kind, direction) = match transaction.kind {
        TransactionKind::Income => (ActivityKind::Income, Direction::Inflow),
        TransactionKind::Expense => (ActivityKind::Expense, Direction::Outflow),
    };
    // Category label wins when set; a dangling category id still renders.
    let label = match transaction.category_id {
        Some(category_id) => category_names
            .get(&category_id)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
        None => account_names
            .get(&transaction.account_id)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
    };
    ActivityItem {
        id: transaction.id,
        kind,
        occurred_at: transaction.occurred_at,
        created_at: transaction.created_at,
        amount: transaction.amount,
        direction,
        label,
        accounts: ActivityRef::Single {
            account_id: transaction.account_id,
        },
    }
}

fn transfer_item(transfer: &Transfer, account_names: &HashMap<Uuid, String>) -> ActivityItem {
    let name = |id: &Uuid| {
        account_names
            .get(id)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
    };
    let label = match &transfer.description {
        Some(description) => description.clone(),
        None => format!(
            "{} -> {}",
            name(&transfer.from_account_id),
            name(&transfer.to_account_id)
        ),
    };
    ActivityItem {
        id: transfer.id,
        kind: ActivityKind::Transfer,
        occurred_at: transfer.occurred_at,
        created_at: transfer.created_at,
        amount: transfer.amount,
        direction: Direction::Internal,
        label,
        accounts: ActivityRef::Pair {
            from_account_id: transfer.from_account_id,
            to_account_id: transfer.to_account_id,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Money;
    use chrono::Utc;

    #[test]
    fn transaction_label_prefers_category() {
        let account_id = Uuid::new_v4();
        let category_id = Uuid::new_v4();
        let transaction = Transaction::new(
            account_id,
            TransactionKind::Expense,
            500,
            Some(category_id),
            Utc::now(),
            None,
        )
        .unwrap();

        let accounts = HashMap::from([(account_id, "Main".to_string())]);
        let categories = HashMap::from([(category_id, "Groceries".to_string())]);
        let item = transaction_item(&transaction, &accounts, &categories);
        assert_eq!(item.label, "Groceries");
        assert_eq!(item.direction, Direction::Outflow);
        assert_eq!(item.amount, Money::new(500));
    }

    #[test]
    fn dangling_category_renders_unknown() {
        let transaction = Transaction::new(
            Uuid::new_v4(),
            TransactionKind::Income,
            100,
            Some(Uuid::new_v4()),
            Utc::now(),
            None,
        )
        .unwrap();
        let item = transaction_item(&transaction, &HashMap::new(), &HashMap::new());
        assert_eq!(item.label, UNKNOWN_LABEL);
    }

    #[test]
    fn transfer_label_uses_account_names() {
        let from = Uuid::new_v4();
        let to = Uuid::new_v4();
        let transfer = Transfer::new(from, to, 250, Utc::now(), None, None).unwrap();
        let accounts =
            HashMap::from([(from, "Checking".to_string()), (to, "Savings".to_string())]);
        let item = transfer_item(&transfer, &accounts);
        assert_eq!(item.label, "Checking -> Savings");
        assert_eq!(item.direction, Direction::Internal);
    }
}
