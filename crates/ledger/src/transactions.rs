//! Transaction primitives.
//!
//! A `Transaction` is a single-account income or expense event. Its effective
//! signed delta on the account is `+amount` for income and `-amount` for
//! expense; the ledger applies that delta when the record is created and
//! reverses it before any amendment or deletion.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, Money, ResultLedger, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Signed balance delta for a record of this kind with the given
    /// (non-negative) magnitude.
    pub fn signed_minor(self, amount_minor: i64) -> i64 {
        match self {
            Self::Income => amount_minor,
            Self::Expense => -amount_minor,
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(LedgerError::Validation(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    /// Non-negative magnitude; the sign comes from `kind`.
    pub amount: Money,
    pub category_id: Option<Uuid>,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub idempotency_key: Option<String>,
}

impl Transaction {
    pub fn new(
        account_id: Uuid,
        kind: TransactionKind,
        amount_minor: i64,
        category_id: Option<Uuid>,
        occurred_at: DateTime<Utc>,
        idempotency_key: Option<String>,
    ) -> ResultLedger<Self> {
        if amount_minor <= 0 {
            return Err(LedgerError::Validation(
                "amount_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            account_id,
            kind,
            amount: Money::new(amount_minor),
            category_id,
            occurred_at,
            created_at: Utc::now(),
            idempotency_key,
        })
    }

    /// Signed delta this record currently applies to its account.
    pub fn signed_minor(&self) -> i64 {
        self.kind.signed_minor(self.amount.minor())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub category_id: Option<String>,
    pub occurred_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub idempotency_key: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Account,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            account_id: ActiveValue::Set(tx.account_id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount.minor()),
            category_id: ActiveValue::Set(tx.category_id.map(|id| id.to_string())),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            created_at: ActiveValue::Set(tx.created_at),
            idempotency_key: ActiveValue::Set(tx.idempotency_key.clone()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            account_id: parse_uuid(&model.account_id, "account")?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount: Money::new(model.amount_minor),
            category_id: model
                .category_id
                .as_deref()
                .map(|raw| parse_uuid(raw, "category"))
                .transpose()?,
            occurred_at: model.occurred_at,
            created_at: model.created_at,
            idempotency_key: model.idempotency_key,
        })
    }
}
