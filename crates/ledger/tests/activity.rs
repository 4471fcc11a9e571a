use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use ledger::{
    ActivityFilter, ActivityKind, CreateTransactionCmd, CreateTransferCmd, Currency, Direction,
    Ledger, LedgerError, Scope, TransactionKind,
};
use migration::MigratorTrait;

async fn ledger_with_db() -> (Ledger, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder().database(db.clone()).build().await.unwrap();
    (ledger, db)
}

fn alice() -> Scope {
    Scope::personal("alice")
}

async fn seed_category(db: &DatabaseConnection, id: Uuid, name: &str) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO categories (id, name, color) VALUES (?, ?, ?)",
        vec![id.to_string().into(), name.into(), "#10b981".into()],
    ))
    .await
    .unwrap();
}

#[tokio::test]
async fn feed_merges_both_kinds_in_reverse_chronological_order() {
    let (ledger, _db) = ledger_with_db().await;
    let scope = alice();
    let checking = ledger
        .create_account(&scope, "Checking", Currency::Eur, 1000)
        .await
        .unwrap();
    let savings = ledger
        .create_account(&scope, "Savings", Currency::Eur, 0)
        .await
        .unwrap();

    let now = Utc::now();
    let income = ledger
        .create_transaction(CreateTransactionCmd::new(
            scope.clone(),
            checking.id,
            TransactionKind::Income,
            1000,
            now - Duration::days(3),
        ))
        .await
        .unwrap();
    let transfer = ledger
        .create_transfer(CreateTransferCmd::new(
            scope.clone(),
            checking.id,
            savings.id,
            400,
            now - Duration::days(2),
        ))
        .await
        .unwrap();
    let expense = ledger
        .create_transaction(CreateTransactionCmd::new(
            scope.clone(),
            checking.id,
            TransactionKind::Expense,
            100,
            now - Duration::days(1),
        ))
        .await
        .unwrap();

    let page = ledger
        .activity(&scope, &ActivityFilter::default(), 1, 50)
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert!(!page.has_more);
    let ids: Vec<Uuid> = page.items.iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![expense.id, transfer.id, income.id]);

    assert_eq!(page.items[0].direction, Direction::Outflow);
    assert_eq!(page.items[1].direction, Direction::Internal);
    assert_eq!(page.items[1].label, "Checking -> Savings");
    assert_eq!(page.items[2].direction, Direction::Inflow);
}

#[tokio::test]
async fn pagination_covers_the_feed_without_gaps_or_duplicates() {
    let (ledger, _db) = ledger_with_db().await;
    let scope = alice();
    let account = ledger
        .create_account(&scope, "Main", Currency::Eur, 0)
        .await
        .unwrap();

    let now = Utc::now();
    for day in 0..5 {
        ledger
            .create_transaction(CreateTransactionCmd::new(
                scope.clone(),
                account.id,
                TransactionKind::Income,
                100 + day,
                now - Duration::days(day),
            ))
            .await
            .unwrap();
    }

    let full = ledger
        .activity(&scope, &ActivityFilter::default(), 1, 50)
        .await
        .unwrap();
    assert_eq!(full.total, 5);

    let mut paged = Vec::new();
    for page in 1..=3 {
        let chunk = ledger
            .activity(&scope, &ActivityFilter::default(), page, 2)
            .await
            .unwrap();
        assert_eq!(chunk.total, 5);
        assert_eq!(chunk.has_more, page < 3);
        paged.extend(chunk.items);
    }
    assert_eq!(paged, full.items);

    let beyond = ledger
        .activity(&scope, &ActivityFilter::default(), 4, 2)
        .await
        .unwrap();
    assert!(beyond.items.is_empty());
    assert!(!beyond.has_more);
}

#[tokio::test]
async fn kind_and_account_filters_narrow_the_feed() {
    let (ledger, _db) = ledger_with_db().await;
    let scope = alice();
    let checking = ledger
        .create_account(&scope, "Checking", Currency::Eur, 1000)
        .await
        .unwrap();
    let savings = ledger
        .create_account(&scope, "Savings", Currency::Eur, 0)
        .await
        .unwrap();

    let now = Utc::now();
    ledger
        .create_transaction(CreateTransactionCmd::new(
            scope.clone(),
            checking.id,
            TransactionKind::Expense,
            100,
            now,
        ))
        .await
        .unwrap();
    let transfer = ledger
        .create_transfer(CreateTransferCmd::new(
            scope.clone(),
            checking.id,
            savings.id,
            200,
            now,
        ))
        .await
        .unwrap();

    let only_transfers = ledger
        .activity(
            &scope,
            &ActivityFilter {
                kinds: Some(vec![ActivityKind::Transfer]),
                ..Default::default()
            },
            1,
            50,
        )
        .await
        .unwrap();
    assert_eq!(only_transfers.total, 1);
    assert_eq!(only_transfers.items[0].id, transfer.id);

    // The savings account only ever appears as a transfer destination.
    let savings_only = ledger
        .activity(
            &scope,
            &ActivityFilter {
                account_id: Some(savings.id),
                ..Default::default()
            },
            1,
            50,
        )
        .await
        .unwrap();
    assert_eq!(savings_only.total, 1);
    assert_eq!(savings_only.items[0].id, transfer.id);
}

#[tokio::test]
async fn date_window_is_from_inclusive_to_exclusive() {
    let (ledger, _db) = ledger_with_db().await;
    let scope = alice();
    let account = ledger
        .create_account(&scope, "Main", Currency::Eur, 0)
        .await
        .unwrap();

    let now = Utc::now();
    let inside = ledger
        .create_transaction(CreateTransactionCmd::new(
            scope.clone(),
            account.id,
            TransactionKind::Income,
            100,
            now - Duration::days(2),
        ))
        .await
        .unwrap();
    ledger
        .create_transaction(CreateTransactionCmd::new(
            scope.clone(),
            account.id,
            TransactionKind::Income,
            100,
            now,
        ))
        .await
        .unwrap();

    let page = ledger
        .activity(
            &scope,
            &ActivityFilter {
                from: Some(now - Duration::days(2)),
                to: Some(now),
                ..Default::default()
            },
            1,
            50,
        )
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, inside.id);
}

#[tokio::test]
async fn transaction_labels_come_from_categories_when_set() {
    let (ledger, db) = ledger_with_db().await;
    let scope = alice();
    let account = ledger
        .create_account(&scope, "Main", Currency::Eur, 1000)
        .await
        .unwrap();

    let groceries = Uuid::new_v4();
    seed_category(&db, groceries, "Groceries").await;

    ledger
        .create_transaction(
            CreateTransactionCmd::new(
                scope.clone(),
                account.id,
                TransactionKind::Expense,
                300,
                Utc::now(),
            )
            .with_category(groceries),
        )
        .await
        .unwrap();

    let page = ledger
        .activity(&scope, &ActivityFilter::default(), 1, 50)
        .await
        .unwrap();
    assert_eq!(page.items[0].label, "Groceries");
}

#[tokio::test]
async fn invalid_paging_and_filters_are_rejected() {
    let (ledger, _db) = ledger_with_db().await;
    let scope = alice();

    let err = ledger
        .activity(&scope, &ActivityFilter::default(), 0, 50)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    let err = ledger
        .activity(&scope, &ActivityFilter::default(), 1, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    let err = ledger
        .activity(
            &scope,
            &ActivityFilter {
                kinds: Some(Vec::new()),
                ..Default::default()
            },
            1,
            50,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    let now = Utc::now();
    let err = ledger
        .activity(
            &scope,
            &ActivityFilter {
                from: Some(now),
                to: Some(now - Duration::days(1)),
                ..Default::default()
            },
            1,
            50,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[tokio::test]
async fn other_scopes_never_leak_into_the_feed() {
    let (ledger, _db) = ledger_with_db().await;
    let scope = alice();
    let other = Scope::personal("bob");

    let mine = ledger
        .create_account(&scope, "Main", Currency::Eur, 0)
        .await
        .unwrap();
    let theirs = ledger
        .create_account(&other, "Main", Currency::Eur, 0)
        .await
        .unwrap();

    ledger
        .create_transaction(CreateTransactionCmd::new(
            scope.clone(),
            mine.id,
            TransactionKind::Income,
            100,
            Utc::now(),
        ))
        .await
        .unwrap();
    ledger
        .create_transaction(CreateTransactionCmd::new(
            other.clone(),
            theirs.id,
            TransactionKind::Income,
            999,
            Utc::now(),
        ))
        .await
        .unwrap();

    let page = ledger
        .activity(&scope, &ActivityFilter::default(), 1, 50)
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].amount.minor(), 100);
}
