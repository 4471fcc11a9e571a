use sea_orm::DatabaseConnection;

use crate::ResultLedger;

mod accounts;
mod activity;
mod transactions;
mod transfers;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// The ledger facade.
///
/// All operations take the caller's [`Scope`] explicitly and never leak
/// records from other scopes.
///
/// [`Scope`]: crate::Scope
#[derive(Debug)]
pub struct Ledger {
    database: DatabaseConnection,
}

impl Ledger {
    /// Return a builder for `Ledger`. Help to build the struct.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }
}

/// The builder for `Ledger`
#[derive(Default)]
pub struct LedgerBuilder {
    database: DatabaseConnection,
}

impl LedgerBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = db;
        self
    }

    /// Construct `Ledger`
    pub async fn build(self) -> ResultLedger<Ledger> {
        Ok(Ledger {
            database: self.database,
        })
    }
}
