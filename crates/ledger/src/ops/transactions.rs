use sea_orm::{
    ActiveValue, ConnectionTrait, JoinType, QueryFilter, QuerySelect, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    CreateTransactionCmd, LedgerError, Money, ResultLedger, Scope, Transaction,
    UpdateTransactionCmd, accounts, transactions,
};

use super::{
    Ledger,
    accounts::{adjust_balance, apply_deltas, require_account},
    with_tx,
};

impl Ledger {
    /// Records an income or expense and applies its signed delta to the
    /// account balance atomically.
    ///
    /// Balances are signed; an expense larger than the current balance is
    /// accepted and drives the balance negative. Only transfers guard
    /// against overdraw.
    ///
    /// When `idempotency_key` is set and a record with the same key already
    /// exists in the scope, that record is returned unchanged and no new
    /// delta is applied.
    pub async fn create_transaction(
        &self,
        cmd: CreateTransactionCmd,
    ) -> ResultLedger<Transaction> {
        with_tx!(self, |db_tx| {
            if let Some(key) = cmd.idempotency_key.as_deref() {
                if let Some(existing) = find_by_idempotency_key(&db_tx, &cmd.scope, key).await? {
                    return Ok(existing);
                }
            }

            require_account(&db_tx, &cmd.scope, cmd.account_id).await?;

            let transaction = Transaction::new(
                cmd.account_id,
                cmd.kind,
                cmd.amount_minor,
                cmd.category_id,
                cmd.occurred_at,
                cmd.idempotency_key,
            )?;

            adjust_balance(&db_tx, transaction.account_id, transaction.signed_minor()).await?;
            transactions::ActiveModel::from(&transaction)
                .insert(&db_tx)
                .await?;
            Ok(transaction)
        })
    }

    /// Fetches one transaction by id within the caller's scope.
    pub async fn transaction(
        &self,
        scope: &Scope,
        transaction_id: Uuid,
    ) -> ResultLedger<Transaction> {
        let model = require_transaction(&self.database, scope, transaction_id).await?;
        Transaction::try_from(model)
    }

    /// Amends a transaction, reversing its stored effect before applying the
    /// merged one.
    ///
    /// `None` fields keep their stored value. If the merged effect cannot be
    /// applied the whole operation rolls back and the original record and
    /// balances survive untouched.
    pub async fn update_transaction(
        &self,
        cmd: UpdateTransactionCmd,
    ) -> ResultLedger<Transaction> {
        with_tx!(self, |db_tx| {
            let model = require_transaction(&db_tx, &cmd.scope, cmd.transaction_id).await?;
            let stored = Transaction::try_from(model)?;

            let mut merged = stored.clone();
            if let Some(account_id) = cmd.account_id {
                if account_id != stored.account_id {
                    require_account(&db_tx, &cmd.scope, account_id).await?;
                }
                merged.account_id = account_id;
            }
            if let Some(kind) = cmd.kind {
                merged.kind = kind;
            }
            if let Some(amount_minor) = cmd.amount_minor {
                if amount_minor <= 0 {
                    return Err(LedgerError::Validation(
                        "amount_minor must be > 0".to_string(),
                    ));
                }
                merged.amount = Money::new(amount_minor);
            }
            if let Some(category_id) = cmd.category_id {
                merged.category_id = category_id;
            }
            if let Some(occurred_at) = cmd.occurred_at {
                merged.occurred_at = occurred_at;
            }

            apply_deltas(&db_tx, &[(stored.account_id, -stored.signed_minor())]).await?;
            adjust_balance(&db_tx, merged.account_id, merged.signed_minor()).await?;

            let update = transactions::ActiveModel {
                id: ActiveValue::Set(merged.id.to_string()),
                account_id: ActiveValue::Set(merged.account_id.to_string()),
                kind: ActiveValue::Set(merged.kind.as_str().to_string()),
                amount_minor: ActiveValue::Set(merged.amount.minor()),
                category_id: ActiveValue::Set(merged.category_id.map(|id| id.to_string())),
                occurred_at: ActiveValue::Set(merged.occurred_at),
                ..Default::default()
            };
            update.update(&db_tx).await?;
            Ok(merged)
        })
    }

    /// Deletes a transaction and reverses its effect on the account balance.
    pub async fn delete_transaction(
        &self,
        scope: &Scope,
        transaction_id: Uuid,
    ) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let model = require_transaction(&db_tx, scope, transaction_id).await?;
            let stored = Transaction::try_from(model)?;

            apply_deltas(&db_tx, &[(stored.account_id, -stored.signed_minor())]).await?;
            transactions::Entity::delete_by_id(stored.id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}

/// Loads a transaction, enforcing the scope through its account. A record
/// owned by another scope reads as missing.
pub(crate) async fn require_transaction<C: ConnectionTrait>(
    conn: &C,
    scope: &Scope,
    transaction_id: Uuid,
) -> ResultLedger<transactions::Model> {
    transactions::Entity::find_by_id(transaction_id.to_string())
        .join(JoinType::InnerJoin, transactions::Relation::Account.def())
        .filter(accounts::Column::Scope.eq(scope.key()))
        .one(conn)
        .await?
        .ok_or_else(|| LedgerError::NotFound("transaction".to_string()))
}

async fn find_by_idempotency_key<C: ConnectionTrait>(
    conn: &C,
    scope: &Scope,
    key: &str,
) -> ResultLedger<Option<Transaction>> {
    transactions::Entity::find()
        .filter(transactions::Column::IdempotencyKey.eq(key))
        .join(JoinType::InnerJoin, transactions::Relation::Account.def())
        .filter(accounts::Column::Scope.eq(scope.key()))
        .one(conn)
        .await?
        .map(Transaction::try_from)
        .transpose()
}
