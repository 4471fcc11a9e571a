//! Ledger consistency engine.
//!
//! The crate keeps per-account balances an exact function of the record
//! history: income/expense transactions apply signed deltas to a single
//! account, transfers apply paired debit/credit deltas to two accounts, and
//! every edit or delete reverses the previously applied effect before
//! applying a new one. A read-only aggregator merges both record kinds into
//! one chronological activity feed.
//!
//! All mutations run inside a database transaction; balance adjustments are
//! single atomic `UPDATE` statements, never read-modify-write.

pub use accounts::Account;
pub use activity::{
    ActivityFilter, ActivityItem, ActivityKind, ActivityPage, ActivityRef, Direction,
};
pub use commands::{
    CreateTransactionCmd, CreateTransferCmd, UpdateTransactionCmd, UpdateTransferCmd,
};
pub use currency::Currency;
pub use error::LedgerError;
pub use money::Money;
pub use ops::{Ledger, LedgerBuilder};
pub use scope::Scope;
pub use transactions::{Transaction, TransactionKind};
pub use transfers::{Transfer, TransferStatus};

mod accounts;
mod activity;
mod categories;
mod commands;
mod currency;
mod error;
mod money;
mod ops;
mod scope;
mod transactions;
mod transfers;
mod util;

pub(crate) type ResultLedger<T> = Result<T, LedgerError>;
