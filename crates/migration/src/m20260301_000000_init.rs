//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for the ledger:
//!
//! - `accounts`: scoped money holders with a denormalized balance
//! - `categories`: labels for income/expense records
//! - `transactions`: single-account income and expense records
//! - `transfers`: two-account money movements

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    Name,
    BalanceMinor,
    Currency,
    Scope,
    CreatedAt,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    Color,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    AccountId,
    Kind,
    AmountMinor,
    CategoryId,
    OccurredAt,
    CreatedAt,
    IdempotencyKey,
}

#[derive(Iden)]
enum Transfers {
    Table,
    Id,
    FromAccountId,
    ToAccountId,
    AmountMinor,
    OccurredAt,
    Description,
    Status,
    CreatedAt,
    IdempotencyKey,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::Name).string().not_null())
                    .col(
                        ColumnDef::new(Accounts::BalanceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Accounts::Currency)
                            .string()
                            .not_null()
                            .default("EUR"),
                    )
                    .col(ColumnDef::new(Accounts::Scope).string().not_null())
                    .col(ColumnDef::new(Accounts::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-scope-name-unique")
                    .table(Accounts::Table)
                    .col(Accounts::Scope)
                    .col(Accounts::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::Color).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::AccountId).string().not_null())
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::CategoryId).string())
                    .col(
                        ColumnDef::new(Transactions::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::IdempotencyKey).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-account_id")
                            .from(Transactions::Table, Transactions::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-account_id-occurred_at")
                    .table(Transactions::Table)
                    .col(Transactions::AccountId)
                    .col(Transactions::OccurredAt)
                    .to_owned(),
            )
            .await?;

        // Idempotency keys are scoped to the owning account, never global;
        // unrelated callers may reuse the same key.
        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-account_id-idempotency_key")
                    .table(Transactions::Table)
                    .col(Transactions::AccountId)
                    .col(Transactions::IdempotencyKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Transfers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transfers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transfers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Transfers::FromAccountId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transfers::ToAccountId).string().not_null())
                    .col(
                        ColumnDef::new(Transfers::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transfers::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transfers::Description).string())
                    .col(ColumnDef::new(Transfers::Status).string().not_null())
                    .col(ColumnDef::new(Transfers::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Transfers::IdempotencyKey).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transfers-from_account_id")
                            .from(Transfers::Table, Transfers::FromAccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transfers-to_account_id")
                            .from(Transfers::Table, Transfers::ToAccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transfers-from_account_id-occurred_at")
                    .table(Transfers::Table)
                    .col(Transfers::FromAccountId)
                    .col(Transfers::OccurredAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transfers-to_account_id")
                    .table(Transfers::Table)
                    .col(Transfers::ToAccountId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transfers-from_account_id-idempotency_key")
                    .table(Transfers::Table)
                    .col(Transfers::FromAccountId)
                    .col(Transfers::IdempotencyKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Transfers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}
