use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use utils::assets::db_path;

pub mod entities;
pub mod models;
pub mod types;

pub use sea_orm::{ConnectionTrait, DbErr, TransactionTrait};

#[derive(Clone)]
pub struct DBService {
    pub pool: DatabaseConnection,
}

impl DBService {
    /// Connects to `DATABASE_URL`, or a sqlite file under the asset dir when
    /// unset, and brings the schema up to date.
    pub async fn new() -> Result<DBService, DbErr> {
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            _ => format!("sqlite://{}?mode=rwc", db_path().to_string_lossy()),
        };

        let pool = Database::connect(&database_url).await?;
        tracing::debug!("Bringing database schema up to date");
        db_migration::Migrator::up(&pool, None).await?;
        Ok(DBService { pool })
    }
}
