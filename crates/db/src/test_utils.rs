//! Test utilities for database operations.
//!
//! Scenario tests run against an in-memory SQLite database with the full
//! schema applied, so they need no external server.

use std::sync::Arc;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::migrations::Migrator;

/// A migrated throwaway database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: Arc<DatabaseConnection>,
}

impl TestDatabase {
    /// Open a fresh in-memory SQLite database and apply every migration.
    ///
    /// The pool holds a single connection: each SQLite memory connection is its
    /// own database.
    pub async fn in_memory() -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).min_connections(1).sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        Migrator::up(&conn, None).await?;

        info!("Created in-memory test database");

        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    /// Shared handle suitable for repositories and services.
    #[must_use]
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }

    /// Run raw SQL, e.g. to install a fault-injection trigger.
    pub async fn execute(&self, sql: &str) -> Result<(), DbErr> {
        self.conn.execute_unprepared(sql).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::User;
    use sea_orm::{EntityTrait, PaginatorTrait};

    #[tokio::test]
    async fn test_in_memory_applies_schema() {
        let db = TestDatabase::in_memory().await.unwrap();
        let count = User::find().count(db.conn.as_ref()).await.unwrap();
        assert_eq!(count, 0);
    }
}
