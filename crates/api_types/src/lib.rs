use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Usd,
    Gbp,
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        pub currency: Option<Currency>,
        /// Opening balance in minor units. Defaults to 0.
        pub opening_balance_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub name: String,
        pub balance_minor: i64,
        pub currency: Currency,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountListResponse {
        pub accounts: Vec<AccountView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub account_id: Uuid,
        pub balance_minor: i64,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Income,
        Expense,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub account_id: Uuid,
        pub kind: TransactionKind,
        /// Must be > 0. The kind defines the sign of the balance delta.
        pub amount_minor: i64,
        pub category_id: Option<Uuid>,
        pub occurred_at: DateTime<Utc>,
        /// Optional idempotency key for safely retrying the same create request.
        pub idempotency_key: Option<String>,
    }

    /// Partial update; absent fields keep their stored values.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub account_id: Option<Uuid>,
        pub kind: Option<TransactionKind>,
        pub amount_minor: Option<i64>,
        /// Present-and-null clears the category, absent leaves it untouched.
        #[serde(
            default,
            skip_serializing_if = "Option::is_none",
            with = "super::double_option"
        )]
        pub category_id: Option<Option<Uuid>>,
        pub occurred_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub account_id: Uuid,
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub category_id: Option<Uuid>,
        pub occurred_at: DateTime<Utc>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod transfer {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferNew {
        pub from_account_id: Uuid,
        pub to_account_id: Uuid,
        /// Must be > 0.
        pub amount_minor: i64,
        pub occurred_at: DateTime<Utc>,
        pub description: Option<String>,
        /// Optional idempotency key for safely retrying the same create request.
        pub idempotency_key: Option<String>,
    }

    /// Partial update; absent fields keep their stored values.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransferUpdate {
        pub from_account_id: Option<Uuid>,
        pub to_account_id: Option<Uuid>,
        pub amount_minor: Option<i64>,
        pub occurred_at: Option<DateTime<Utc>>,
        /// Present-and-null clears the description, absent leaves it untouched.
        #[serde(
            default,
            skip_serializing_if = "Option::is_none",
            with = "super::double_option"
        )]
        pub description: Option<Option<String>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferView {
        pub id: Uuid,
        pub from_account_id: Uuid,
        pub to_account_id: Uuid,
        pub amount_minor: i64,
        pub occurred_at: DateTime<Utc>,
        pub description: Option<String>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod activity {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ActivityKind {
        Income,
        Expense,
        Transfer,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Direction {
        Inflow,
        Outflow,
        Internal,
    }

    /// Query parameters for the merged feed.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ActivityList {
        /// Inclusive lower bound on `occurred_at`.
        pub from: Option<DateTime<Utc>>,
        /// Exclusive upper bound on `occurred_at`.
        pub to: Option<DateTime<Utc>>,
        /// Comma-separated kinds, e.g. `income,transfer`.
        pub kinds: Option<String>,
        pub account_id: Option<Uuid>,
        /// 1-based page number. Defaults to 1.
        pub page: Option<u64>,
        /// Defaults to 50.
        pub page_size: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ActivityItemView {
        pub id: Uuid,
        pub kind: ActivityKind,
        pub occurred_at: DateTime<Utc>,
        /// Unsigned magnitude; `direction` carries the sign.
        pub amount_minor: i64,
        pub direction: Direction,
        pub label: String,
        pub account_id: Option<Uuid>,
        pub from_account_id: Option<Uuid>,
        pub to_account_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ActivityListResponse {
        pub items: Vec<ActivityItemView>,
        pub total: u64,
        pub has_more: bool,
    }
}

/// (De)serializes `Option<Option<T>>` so a present-and-null JSON field maps
/// to `Some(None)` while an absent field maps to `None`.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
