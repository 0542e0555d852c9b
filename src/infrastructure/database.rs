//! Pooled SQLite connection

use crate::infrastructure::settings::Settings;
use di::{Ref, inject, injectable};
use log::{error, info};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Mutex;

/// Pool handed to every connection created while set, so integration tests
/// can point the DI container at an in-memory database.
static TEST_POOL: Mutex<Option<SqlitePool>> = Mutex::new(None);

/// The catalog store. Holds no pool when `DATABASE_URL` is unset, in which
/// case the app runs on its built-in catalog.
pub struct DatabaseConnection {
    connection: Option<SqlitePool>,
}

#[injectable]
impl DatabaseConnection {
    #[inject]
    pub fn create(settings: Ref<Settings>) -> DatabaseConnection {
        if let Some(pool) = Self::test_pool() {
            return Self::from_pool(pool);
        }

        let Some(connection_string) = settings.database_url.as_deref() else {
            info!("DATABASE_URL not set, catalog store disabled");
            return DatabaseConnection { connection: None };
        };

        let connection = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_lazy(connection_string)
            .map_err(|e| error!("Cannot connect to database: {e}"))
            .ok();

        DatabaseConnection { connection }
    }
}

impl DatabaseConnection {
    pub fn from_pool(pool: SqlitePool) -> Self {
        DatabaseConnection {
            connection: Some(pool),
        }
    }

    pub fn pool(&self) -> Option<&SqlitePool> {
        self.connection.as_ref()
    }

    pub fn set_test_pool(pool: SqlitePool) {
        if let Ok(mut slot) = TEST_POOL.lock() {
            *slot = Some(pool);
        }
    }

    pub fn clear_test_pool() {
        if let Ok(mut slot) = TEST_POOL.lock() {
            *slot = None;
        }
    }

    fn test_pool() -> Option<SqlitePool> {
        TEST_POOL.lock().ok().and_then(|slot| slot.clone())
    }
}
