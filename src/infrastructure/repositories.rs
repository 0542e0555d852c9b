//! DB Repository abstractions

use crate::core::catalog::ServiceModel;
use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::LashModelRow;
use crate::infrastructure::traits::CatalogRepository;
use async_trait::async_trait;
use di::{Ref, injectable};
use log::{debug, error};

#[injectable(CatalogRepository)]
pub struct DbCatalogRepository {
    connection: Ref<DatabaseConnection>,
}

impl DbCatalogRepository {
    pub fn new(connection: Ref<DatabaseConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl CatalogRepository for DbCatalogRepository {
    async fn list_active_models(&self) -> Result<Vec<ServiceModel>, ()> {
        let Some(pool) = self.connection.pool() else {
            debug!("no catalog store configured");
            return Ok(Vec::new());
        };

        let rows: Vec<LashModelRow> = sqlx::query_as(
            "SELECT id, name, description, image_url, price, maintenance_price FROM lash_models WHERE category = 'lash' AND active = 1 ORDER BY datetime(created_at) ASC",
        )
        .fetch_all(pool)
        .await
        .map_err(|e| error!("{e}"))?;

        Ok(rows.into_iter().map(ServiceModel::from).collect())
    }
}
