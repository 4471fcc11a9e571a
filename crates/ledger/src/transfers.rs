//! Transfer primitives.
//!
//! A `Transfer` moves money between two accounts of the same scope and
//! currency: `-amount` on the source, `+amount` on the destination. Edits and
//! deletes always reverse the **stored** original amount and endpoints before
//! applying anything new, so a record's effect can never be double-reversed
//! against stale values.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, Money, ResultLedger, util::parse_uuid};

/// Lifecycle status of a transfer.
///
/// No partial or pending state is modeled: a persisted transfer has always
/// fully moved its amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Completed,
}

impl TransferStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
        }
    }
}

impl TryFrom<&str> for TransferStatus {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "completed" => Ok(Self::Completed),
            other => Err(LedgerError::Validation(format!(
                "invalid transfer status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: Uuid,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    /// Non-negative magnitude moved from source to destination.
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
    pub description: Option<String>,
    pub status: TransferStatus,
    pub created_at: DateTime<Utc>,
    pub idempotency_key: Option<String>,
}

impl Transfer {
    pub fn new(
        from_account_id: Uuid,
        to_account_id: Uuid,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
        description: Option<String>,
        idempotency_key: Option<String>,
    ) -> ResultLedger<Self> {
        if amount_minor <= 0 {
            return Err(LedgerError::Validation(
                "amount_minor must be > 0".to_string(),
            ));
        }
        if from_account_id == to_account_id {
            return Err(LedgerError::Validation(
                "from_account_id and to_account_id must differ".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            from_account_id,
            to_account_id,
            amount: Money::new(amount_minor),
            occurred_at,
            description,
            status: TransferStatus::Completed,
            created_at: Utc::now(),
            idempotency_key,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub from_account_id: String,
    pub to_account_id: String,
    pub amount_minor: i64,
    pub occurred_at: DateTimeUtc,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub idempotency_key: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::FromAccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    FromAccount,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::ToAccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    ToAccount,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transfer> for ActiveModel {
    fn from(transfer: &Transfer) -> Self {
        Self {
            id: ActiveValue::Set(transfer.id.to_string()),
            from_account_id: ActiveValue::Set(transfer.from_account_id.to_string()),
            to_account_id: ActiveValue::Set(transfer.to_account_id.to_string()),
            amount_minor: ActiveValue::Set(transfer.amount.minor()),
            occurred_at: ActiveValue::Set(transfer.occurred_at),
            description: ActiveValue::Set(transfer.description.clone()),
            status: ActiveValue::Set(transfer.status.as_str().to_string()),
            created_at: ActiveValue::Set(transfer.created_at),
            idempotency_key: ActiveValue::Set(transfer.idempotency_key.clone()),
        }
    }
}

impl TryFrom<Model> for Transfer {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transfer")?,
            from_account_id: parse_uuid(&model.from_account_id, "account")?,
            to_account_id: parse_uuid(&model.to_account_id, "account")?,
            amount: Money::new(model.amount_minor),
            occurred_at: model.occurred_at,
            description: model.description,
            status: TransferStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
            idempotency_key: model.idempotency_key,
        })
    }
}
