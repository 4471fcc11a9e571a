use sea_orm::{
    ActiveValue, ConnectionTrait, JoinType, QueryFilter, QuerySelect, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    CreateTransferCmd, LedgerError, Money, ResultLedger, Scope, Transfer, UpdateTransferCmd,
    accounts, transfers,
    util::{ensure_same_currency, normalize_optional_text},
};

use super::{
    Ledger,
    accounts::{adjust_balance, apply_deltas, debit_guarded, require_account},
    with_tx,
};

impl Ledger {
    /// Moves money between two accounts of the same scope and currency.
    ///
    /// The debit is guarded: if the source balance cannot cover the amount
    /// the whole operation is rejected with
    /// [`LedgerError::InsufficientFunds`] and neither balance moves.
    ///
    /// When `idempotency_key` is set and a transfer with the same key already
    /// exists in the scope, that transfer is returned and no money moves
    /// again.
    pub async fn create_transfer(&self, cmd: CreateTransferCmd) -> ResultLedger<Transfer> {
        with_tx!(self, |db_tx| {
            if let Some(key) = cmd.idempotency_key.as_deref() {
                if let Some(existing) = find_by_idempotency_key(&db_tx, &cmd.scope, key).await? {
                    return Ok(existing);
                }
            }

            let from = require_account(&db_tx, &cmd.scope, cmd.from_account_id).await?;
            let to = require_account(&db_tx, &cmd.scope, cmd.to_account_id).await?;
            ensure_same_currency(&from, &to)?;

            let transfer = Transfer::new(
                cmd.from_account_id,
                cmd.to_account_id,
                cmd.amount_minor,
                cmd.occurred_at,
                normalize_optional_text(cmd.description),
                cmd.idempotency_key,
            )?;

            apply_transfer_effect(
                &db_tx,
                transfer.from_account_id,
                transfer.to_account_id,
                transfer.amount.minor(),
            )
            .await?;
            transfers::ActiveModel::from(&transfer).insert(&db_tx).await?;
            Ok(transfer)
        })
    }

    /// Fetches one transfer by id within the caller's scope.
    pub async fn transfer(&self, scope: &Scope, transfer_id: Uuid) -> ResultLedger<Transfer> {
        let model = require_transfer(&self.database, scope, transfer_id).await?;
        Transfer::try_from(model)
    }

    /// Amends a transfer, reversing the stored movement before applying the
    /// merged one.
    ///
    /// The reversal always uses the **stored** amount and endpoints, never
    /// the incoming ones. If the merged movement cannot be applied the whole
    /// operation rolls back, leaving the original record and balances intact.
    pub async fn update_transfer(&self, cmd: UpdateTransferCmd) -> ResultLedger<Transfer> {
        with_tx!(self, |db_tx| {
            let model = require_transfer(&db_tx, &cmd.scope, cmd.transfer_id).await?;
            let stored = Transfer::try_from(model)?;

            let mut merged = stored.clone();
            if let Some(from_account_id) = cmd.from_account_id {
                merged.from_account_id = from_account_id;
            }
            if let Some(to_account_id) = cmd.to_account_id {
                merged.to_account_id = to_account_id;
            }
            if merged.from_account_id == merged.to_account_id {
                return Err(LedgerError::Validation(
                    "from_account_id and to_account_id must differ".to_string(),
                ));
            }
            if let Some(amount_minor) = cmd.amount_minor {
                if amount_minor <= 0 {
                    return Err(LedgerError::Validation(
                        "amount_minor must be > 0".to_string(),
                    ));
                }
                merged.amount = Money::new(amount_minor);
            }
            if let Some(occurred_at) = cmd.occurred_at {
                merged.occurred_at = occurred_at;
            }
            if let Some(description) = cmd.description {
                merged.description = normalize_optional_text(description);
            }

            let from = require_account(&db_tx, &cmd.scope, merged.from_account_id).await?;
            let to = require_account(&db_tx, &cmd.scope, merged.to_account_id).await?;
            ensure_same_currency(&from, &to)?;

            reverse_transfer_effect(
                &db_tx,
                stored.from_account_id,
                stored.to_account_id,
                stored.amount.minor(),
            )
            .await?;
            apply_transfer_effect(
                &db_tx,
                merged.from_account_id,
                merged.to_account_id,
                merged.amount.minor(),
            )
            .await?;

            let update = transfers::ActiveModel {
                id: ActiveValue::Set(merged.id.to_string()),
                from_account_id: ActiveValue::Set(merged.from_account_id.to_string()),
                to_account_id: ActiveValue::Set(merged.to_account_id.to_string()),
                amount_minor: ActiveValue::Set(merged.amount.minor()),
                occurred_at: ActiveValue::Set(merged.occurred_at),
                description: ActiveValue::Set(merged.description.clone()),
                ..Default::default()
            };
            update.update(&db_tx).await?;
            Ok(merged)
        })
    }

    /// Deletes a transfer and restores both balances to their pre-transfer
    /// values.
    pub async fn delete_transfer(&self, scope: &Scope, transfer_id: Uuid) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let model = require_transfer(&db_tx, scope, transfer_id).await?;
            let stored = Transfer::try_from(model)?;

            reverse_transfer_effect(
                &db_tx,
                stored.from_account_id,
                stored.to_account_id,
                stored.amount.minor(),
            )
            .await?;
            transfers::Entity::delete_by_id(stored.id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}

/// Debits the source and credits the destination, touching accounts in
/// ascending-id order so concurrent transfers over the same pair cannot
/// deadlock.
async fn apply_transfer_effect<C: ConnectionTrait>(
    conn: &C,
    from_account_id: Uuid,
    to_account_id: Uuid,
    amount_minor: i64,
) -> ResultLedger<()> {
    if from_account_id < to_account_id {
        debit_guarded(conn, from_account_id, amount_minor).await?;
        adjust_balance(conn, to_account_id, amount_minor).await?;
    } else {
        adjust_balance(conn, to_account_id, amount_minor).await?;
        debit_guarded(conn, from_account_id, amount_minor).await?;
    }
    Ok(())
}

/// Puts the moved amount back: `+amount` on the source, `-amount` on the
/// destination. Reversal is unguarded; a destination driven negative here is
/// still exact bookkeeping.
async fn reverse_transfer_effect<C: ConnectionTrait>(
    conn: &C,
    from_account_id: Uuid,
    to_account_id: Uuid,
    amount_minor: i64,
) -> ResultLedger<()> {
    apply_deltas(
        conn,
        &[(from_account_id, amount_minor), (to_account_id, -amount_minor)],
    )
    .await
}

/// Loads a transfer, enforcing the scope through its source account.
pub(crate) async fn require_transfer<C: ConnectionTrait>(
    conn: &C,
    scope: &Scope,
    transfer_id: Uuid,
) -> ResultLedger<transfers::Model> {
    transfers::Entity::find_by_id(transfer_id.to_string())
        .join(JoinType::InnerJoin, transfers::Relation::FromAccount.def())
        .filter(accounts::Column::Scope.eq(scope.key()))
        .one(conn)
        .await?
        .ok_or_else(|| LedgerError::NotFound("transfer".to_string()))
}

async fn find_by_idempotency_key<C: ConnectionTrait>(
    conn: &C,
    scope: &Scope,
    key: &str,
) -> ResultLedger<Option<Transfer>> {
    transfers::Entity::find()
        .filter(transfers::Column::IdempotencyKey.eq(key))
        .join(JoinType::InnerJoin, transfers::Relation::FromAccount.def())
        .filter(accounts::Column::Scope.eq(scope.key()))
        .one(conn)
        .await?
        .map(Transfer::try_from)
        .transpose()
}
