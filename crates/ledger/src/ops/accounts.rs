use chrono::Utc;
use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    Account, Currency, LedgerError, Money, ResultLedger, Scope, accounts,
    util::normalize_required_name,
};

use super::{Ledger, with_tx};

impl Ledger {
    /// Creates a new account in the caller's scope.
    ///
    /// Account names are unique per scope; a duplicate is rejected with
    /// [`LedgerError::ExistingKey`].
    pub async fn create_account(
        &self,
        scope: &Scope,
        name: &str,
        currency: Currency,
        opening_balance_minor: i64,
    ) -> ResultLedger<Account> {
        let name = normalize_required_name(name)?;
        if opening_balance_minor < 0 {
            return Err(LedgerError::Validation(
                "opening balance must not be negative".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let duplicate = accounts::Entity::find()
                .filter(accounts::Column::Scope.eq(scope.key()))
                .filter(accounts::Column::Name.eq(name.as_str()))
                .one(&db_tx)
                .await?;
            if duplicate.is_some() {
                return Err(LedgerError::ExistingKey(name));
            }

            let account = Account::new(
                name,
                currency,
                scope,
                Money::new(opening_balance_minor),
                Utc::now(),
            );
            accounts::ActiveModel::from(&account).insert(&db_tx).await?;
            Ok(account)
        })
    }

    /// Fetches one account by id. Ids outside the scope read as missing.
    pub async fn account(&self, scope: &Scope, account_id: Uuid) -> ResultLedger<Account> {
        let model = require_account(&self.database, scope, account_id).await?;
        Account::try_from(model)
    }

    /// Lists the scope's accounts, ordered by name.
    pub async fn accounts(&self, scope: &Scope) -> ResultLedger<Vec<Account>> {
        accounts::Entity::find()
            .filter(accounts::Column::Scope.eq(scope.key()))
            .order_by_asc(accounts::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Account::try_from)
            .collect()
    }

    /// Current balance of one account.
    pub async fn balance(&self, scope: &Scope, account_id: Uuid) -> ResultLedger<Money> {
        let model = require_account(&self.database, scope, account_id).await?;
        Ok(Money::new(model.balance_minor))
    }
}

/// Loads an account, enforcing scope visibility. A hit in another scope is
/// indistinguishable from a miss.
pub(crate) async fn require_account<C: ConnectionTrait>(
    conn: &C,
    scope: &Scope,
    account_id: Uuid,
) -> ResultLedger<accounts::Model> {
    accounts::Entity::find_by_id(account_id.to_string())
        .filter(accounts::Column::Scope.eq(scope.key()))
        .one(conn)
        .await?
        .ok_or_else(|| LedgerError::NotFound("account".to_string()))
}

/// Applies a signed delta to one balance as a single atomic `UPDATE` and
/// returns the resulting balance.
///
/// The balance is never read before writing, so concurrent adjustments
/// serialize at the database and can never lose an update.
pub(crate) async fn adjust_balance<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
    delta_minor: i64,
) -> ResultLedger<i64> {
    let result = accounts::Entity::update_many()
        .col_expr(
            accounts::Column::BalanceMinor,
            Expr::col(accounts::Column::BalanceMinor).add(delta_minor),
        )
        .filter(accounts::Column::Id.eq(account_id.to_string()))
        .exec(conn)
        .await?;
    if result.rows_affected == 0 {
        return Err(LedgerError::NotFound("account".to_string()));
    }

    let model = accounts::Entity::find_by_id(account_id.to_string())
        .one(conn)
        .await?
        .ok_or_else(|| LedgerError::NotFound("account".to_string()))?;
    Ok(model.balance_minor)
}

/// Debits `amount_minor` only if the balance covers it, in the same atomic
/// `UPDATE` that performs the subtraction.
pub(crate) async fn debit_guarded<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
    amount_minor: i64,
) -> ResultLedger<()> {
    let result = accounts::Entity::update_many()
        .col_expr(
            accounts::Column::BalanceMinor,
            Expr::col(accounts::Column::BalanceMinor).sub(amount_minor),
        )
        .filter(accounts::Column::Id.eq(account_id.to_string()))
        .filter(accounts::Column::BalanceMinor.gte(amount_minor))
        .exec(conn)
        .await?;
    if result.rows_affected == 0 {
        let exists = accounts::Entity::find_by_id(account_id.to_string())
            .one(conn)
            .await?
            .is_some();
        if exists {
            return Err(LedgerError::InsufficientFunds(format!(
                "account {account_id} cannot cover {amount_minor}"
            )));
        }
        return Err(LedgerError::NotFound("account".to_string()));
    }
    Ok(())
}

/// Applies a batch of signed deltas used to reverse stored record effects.
///
/// Deltas are issued in ascending account-id order so concurrent batches
/// touching the same accounts cannot deadlock. A missing account here means a
/// stored record points at a deleted account, reported as
/// [`LedgerError::PartialApplication`] so the surrounding transaction rolls
/// back with nothing applied.
pub(crate) async fn apply_deltas<C: ConnectionTrait>(
    conn: &C,
    deltas: &[(Uuid, i64)],
) -> ResultLedger<()> {
    let mut ordered: Vec<(Uuid, i64)> = deltas.to_vec();
    ordered.sort_by_key(|(account_id, _)| *account_id);
    for (account_id, delta_minor) in ordered {
        adjust_balance(conn, account_id, delta_minor)
            .await
            .map_err(|err| match err {
                LedgerError::NotFound(_) => LedgerError::PartialApplication(format!(
                    "account {account_id} referenced by a stored record is missing"
                )),
                other => other,
            })?;
    }
    Ok(())
}
