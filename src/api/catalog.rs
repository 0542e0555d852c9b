//! Catalog, pricing and aftercare endpoints

use crate::core::catalog::{ADDITIONAL_SERVICES, CARE_TIPS, COMBOS, pricing_table};
use crate::core::traits::CatalogService;
use axum::routing::get;
use axum::{Json, Router};
use di_axum::Inject;

pub fn router() -> Router {
    Router::new()
        .route("/api/catalog", get(list_models))
        .route("/api/pricing", get(pricing))
        .route("/api/care-tips", get(care_tips))
}

async fn list_models(Inject(catalog): Inject<dyn CatalogService>) -> Json<schemas::ModelList> {
    Json(schemas::ModelList {
        models: catalog.list_models().await,
    })
}

async fn pricing(Inject(catalog): Inject<dyn CatalogService>) -> Json<schemas::Pricing> {
    let models = catalog.list_models().await;

    Json(schemas::Pricing {
        rows: pricing_table(&models),
        additional_services: ADDITIONAL_SERVICES,
        combos: COMBOS,
    })
}

async fn care_tips() -> Json<schemas::CareTips> {
    Json(schemas::CareTips { tips: CARE_TIPS })
}

pub mod schemas {
    use crate::core::catalog::{AdditionalService, CareTip, ComboOffer, PricingRow, ServiceModel};
    use serde::Serialize;

    #[derive(Serialize, Debug)]
    pub struct ModelList {
        pub models: Vec<ServiceModel>,
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Pricing {
        pub rows: Vec<PricingRow>,
        pub additional_services: &'static [AdditionalService],
        pub combos: &'static [ComboOffer],
    }

    #[derive(Serialize, Debug)]
    pub struct CareTips {
        pub tips: &'static [CareTip],
    }
}
