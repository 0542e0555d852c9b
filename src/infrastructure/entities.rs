//! Database entities

use crate::core::catalog::ServiceModel;
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct LashModelRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub price: f64,
    pub maintenance_price: Option<f64>,
}

impl From<LashModelRow> for ServiceModel {
    fn from(row: LashModelRow) -> Self {
        ServiceModel {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            maintenance_price: row.maintenance_price,
            image_ref: row.image_url,
        }
    }
}
