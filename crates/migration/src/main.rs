use sea_orm::Database;
use sea_orm_migration::prelude::*;

const USAGE: &str = "usage: migration [up|down|fresh|status]
  up      apply all pending migrations (default)
  down    roll back the most recent migration
  fresh   drop everything and re-apply from scratch
  status  show which migrations have been applied

DATABASE_URL overrides the default sqlite database.";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:./tally.db?mode=rwc".to_string());
    let db = Database::connect(&url).await?;

    match std::env::args().nth(1).as_deref() {
        None | Some("up") => migration::Migrator::up(&db, None).await?,
        Some("down") => migration::Migrator::down(&db, Some(1)).await?,
        Some("fresh") => migration::Migrator::fresh(&db).await?,
        Some("status") => migration::Migrator::status(&db).await?,
        Some(other) => {
            eprintln!("unknown command `{other}`\n\n{USAGE}");
            std::process::exit(2);
        }
    }

    Ok(())
}
