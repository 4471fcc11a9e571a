//! Caller scope.
//!
//! A [`Scope`] names the set of accounts a caller is authorized to see and
//! mutate: their personal accounts, or one organization's accounts. The
//! authentication layer resolves the caller to a scope *before* the ledger is
//! involved; the ledger only threads the value through every operation and
//! filters on it. Ids outside the scope behave exactly like missing ids.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scope {
    Personal { user_id: String },
    Organization { org_id: Uuid },
}

impl Scope {
    #[must_use]
    pub fn personal(user_id: impl Into<String>) -> Self {
        Self::Personal {
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn organization(org_id: Uuid) -> Self {
        Self::Organization { org_id }
    }

    /// Canonical key stored in the `accounts.scope` column.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Personal { user_id } => format!("user:{user_id}"),
            Self::Organization { org_id } => format!("org:{org_id}"),
        }
    }
}

impl core::fmt::Display for Scope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.key())
    }
}
