//! The module contains the `Account` struct and its persistence model.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{Currency, LedgerError, Money, Scope, util::parse_uuid};

/// An account.
///
/// An account is a place money lives: a bank account, a cash wallet, a
/// card. Its balance is owned exclusively by the ledger's adjustment
/// primitive and always equals the sum of the active signed effects of the
/// transaction and transfer records referencing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    /// Stable identifier, generated once and persisted.
    pub id: Uuid,
    pub name: String,
    pub balance: Money,
    pub currency: Currency,
    /// Scope key (`user:<id>` or `org:<id>`) this account is visible in.
    pub scope: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        name: String,
        currency: Currency,
        scope: &Scope,
        opening_balance: Money,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            balance: opening_balance,
            currency,
            scope: scope.key(),
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub balance_minor: i64,
    pub currency: String,
    pub scope: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(account: &Account) -> Self {
        Self {
            id: ActiveValue::Set(account.id.to_string()),
            name: ActiveValue::Set(account.name.clone()),
            balance_minor: ActiveValue::Set(account.balance.minor()),
            currency: ActiveValue::Set(account.currency.code().to_string()),
            scope: ActiveValue::Set(account.scope.clone()),
            created_at: ActiveValue::Set(account.created_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "account")?,
            name: model.name,
            balance: Money::new(model.balance_minor),
            currency: Currency::try_from(model.currency.as_str())?,
            scope: model.scope,
            created_at: model.created_at,
        })
    }
}
