//! Unified activity feed types.
//!
//! The feed merges transactions and transfers of one scope into a single
//! reverse-chronological stream. Items are read models only; nothing in this
//! module mutates state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Money;

/// Label used when an item references a category or account that no longer
/// resolves.
pub const UNKNOWN_LABEL: &str = "Unknown";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Income,
    Expense,
    Transfer,
}

/// Direction of an item relative to the scope's holdings as a whole.
///
/// Transfers move money between two in-scope accounts, so they are neither
/// inflow nor outflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Inflow,
    Outflow,
    Internal,
}

/// Account endpoints of a feed item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityRef {
    Single {
        account_id: Uuid,
    },
    Pair {
        from_account_id: Uuid,
        to_account_id: Uuid,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityItem {
    /// Id of the underlying transaction or transfer record.
    pub id: Uuid,
    pub kind: ActivityKind,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// Non-negative magnitude; signedness is conveyed by `direction`.
    pub amount: Money,
    pub direction: Direction,
    /// Human-readable summary: category or account name for transactions,
    /// `"<from> -> <to>"` for transfers.
    pub label: String,
    pub accounts: ActivityRef,
}

/// Filter over the merged feed.
///
/// `from` is inclusive and `to` exclusive. `kinds: None` means all kinds;
/// `Some(vec![])` is rejected at query time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivityFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub kinds: Option<Vec<ActivityKind>>,
    pub account_id: Option<Uuid>,
}

impl ActivityFilter {
    pub(crate) fn includes(&self, kind: ActivityKind) -> bool {
        match &self.kinds {
            None => true,
            Some(kinds) => kinds.contains(&kind),
        }
    }
}

/// One page of the feed, with enough bookkeeping for clients to paginate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActivityPage {
    pub items: Vec<ActivityItem>,
    /// Total matching items across all pages.
    pub total: u64,
    pub has_more: bool,
}
