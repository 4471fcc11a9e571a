//! Write commands accepted by the ledger.
//!
//! Commands carry raw caller input plus the resolved [`Scope`]; all
//! validation happens inside the operation so every entry point shares the
//! same rules.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Scope, TransactionKind};

#[derive(Clone, Debug)]
pub struct CreateTransactionCmd {
    pub scope: Scope,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub category_id: Option<Uuid>,
    pub occurred_at: DateTime<Utc>,
    pub idempotency_key: Option<String>,
}

impl CreateTransactionCmd {
    #[must_use]
    pub fn new(
        scope: Scope,
        account_id: Uuid,
        kind: TransactionKind,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            scope,
            account_id,
            kind,
            amount_minor,
            category_id: None,
            occurred_at,
            idempotency_key: None,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// Partial update; `None` fields keep the stored value.
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub scope: Scope,
    pub transaction_id: Uuid,
    pub account_id: Option<Uuid>,
    pub kind: Option<TransactionKind>,
    pub amount_minor: Option<i64>,
    pub category_id: Option<Option<Uuid>>,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(scope: Scope, transaction_id: Uuid) -> Self {
        Self {
            scope,
            transaction_id,
            account_id: None,
            kind: None,
            amount_minor: None,
            category_id: None,
            occurred_at: None,
        }
    }

    #[must_use]
    pub fn with_account(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn with_amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn with_category(mut self, category_id: Option<Uuid>) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn with_occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }
}

#[derive(Clone, Debug)]
pub struct CreateTransferCmd {
    pub scope: Scope,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount_minor: i64,
    pub occurred_at: DateTime<Utc>,
    pub description: Option<String>,
    pub idempotency_key: Option<String>,
}

impl CreateTransferCmd {
    #[must_use]
    pub fn new(
        scope: Scope,
        from_account_id: Uuid,
        to_account_id: Uuid,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            scope,
            from_account_id,
            to_account_id,
            amount_minor,
            occurred_at,
            description: None,
            idempotency_key: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// Partial update; `None` fields keep the stored value.
#[derive(Clone, Debug)]
pub struct UpdateTransferCmd {
    pub scope: Scope,
    pub transfer_id: Uuid,
    pub from_account_id: Option<Uuid>,
    pub to_account_id: Option<Uuid>,
    pub amount_minor: Option<i64>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub description: Option<Option<String>>,
}

impl UpdateTransferCmd {
    #[must_use]
    pub fn new(scope: Scope, transfer_id: Uuid) -> Self {
        Self {
            scope,
            transfer_id,
            from_account_id: None,
            to_account_id: None,
            amount_minor: None,
            occurred_at: None,
            description: None,
        }
    }

    #[must_use]
    pub fn with_from_account(mut self, from_account_id: Uuid) -> Self {
        self.from_account_id = Some(from_account_id);
        self
    }

    #[must_use]
    pub fn with_to_account(mut self, to_account_id: Uuid) -> Self {
        self.to_account_id = Some(to_account_id);
        self
    }

    #[must_use]
    pub fn with_amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn with_occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }
}
