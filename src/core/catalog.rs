//! Studio service catalog and price display.
//!
//! The static data here is what the studio ships with; a configured database
//! only ever replaces the list of lash models.

use serde::{Deserialize, Serialize};

/// A bookable lash service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceModel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// `None` means maintenance is not offered for this model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_price: Option<f64>,
    pub image_ref: String,
}

impl ServiceModel {
    pub fn is_bookable(&self) -> bool {
        self.price > 0.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdditionalService {
    pub id: &'static str,
    pub name: &'static str,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboOffer {
    pub name: &'static str,
    pub price: f64,
    pub highlights: &'static [&'static str],
    pub best_seller: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CareTip {
    pub title: &'static str,
    pub text: &'static str,
    pub icon: &'static str,
}

/// One line of the pricing table, already formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingRow {
    pub id: String,
    pub name: String,
    pub application: String,
    pub maintenance: String,
}

impl From<&ServiceModel> for PricingRow {
    fn from(model: &ServiceModel) -> Self {
        PricingRow {
            id: model.id.clone(),
            name: model.name.clone(),
            application: format_price(model.price),
            maintenance: format_optional_price(model.maintenance_price),
        }
    }
}

pub fn pricing_table(models: &[ServiceModel]) -> Vec<PricingRow> {
    models.iter().map(PricingRow::from).collect()
}

/// Formats a price in reais: whole values without decimals, otherwise with a
/// decimal comma.
pub fn format_price(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("R$ {}", value as i64)
    } else {
        format!("R$ {:.2}", value).replace('.', ",")
    }
}

/// Missing, zero and negative prices all render as a dash.
pub fn format_optional_price(value: Option<f64>) -> String {
    match value {
        Some(price) if price > 0.0 => format_price(price),
        _ => "-".to_owned(),
    }
}

fn model(
    id: &str,
    name: &str,
    description: &str,
    image_ref: &str,
    price: f64,
    maintenance_price: Option<f64>,
) -> ServiceModel {
    ServiceModel {
        id: id.to_owned(),
        name: name.to_owned(),
        description: description.to_owned(),
        price,
        maintenance_price,
        image_ref: image_ref.to_owned(),
    }
}

/// The catalog used whenever no store is configured or the store is empty.
pub fn fallback_models() -> Vec<ServiceModel> {
    vec![
        model(
            "volume_premium",
            "Volume Premium",
            "Volume intenso, criado com leques volumosos. Ideal para mulheres que desejam um olhar marcante, cheio e glamouroso. Recomendado para quem gosta de destaque, maquiagem e presença forte.",
            "https://images.unsplash.com/photo-1631214500115-598fc2cb8d2d?q=80&w=1000&auto=format&fit=crop",
            170.0,
            Some(90.0),
        ),
        model(
            "princess_effect",
            "Efeito Princesa",
            "Traz alongamento lateral e elevação estratégica que criam um olhar sedutor, misterioso e levemente “esticado”. Favorece quem tem olhos redondos ou pequenos.",
            "https://images.unsplash.com/photo-1597225244660-15a19b6b907c?q=80&w=1000&auto=format&fit=crop",
            150.0,
            Some(90.0),
        ),
        model(
            "volume_havilah",
            "Volume Havilah",
            "Resultado natural, delicado e elegante. Indicado para quem está aplicando cílios pela primeira vez ou busca um efeito discreto. Realça a beleza natural sem exageros.",
            "https://images.unsplash.com/photo-1512496015851-a90fb38ba796?q=80&w=1000&auto=format&fit=crop",
            170.0,
            Some(100.0),
        ),
        model(
            "fox_eyes",
            "Fox Eyes",
            "Efeito de olhar de raposa, com alongamento nos cantos externos. Deixa o rosto mais harmônico e sofisticado. Excelente para mulheres que gostam de um visual moderno e expressivo.",
            "https://images.unsplash.com/photo-1616683693504-3ea7e9ad6fec?q=80&w=1000&auto=format&fit=crop",
            190.0,
            Some(100.0),
        ),
        model(
            "volume_divine",
            "Volume Divino",
            "Leques mais fechados que criam um aspecto “fresh”, como se tivesse saído da água. Queridinho no Instagram. Perfeito para quem ama tendência e estética contemporânea.",
            "https://images.unsplash.com/photo-1587779782550-908359781b0f?q=80&w=1000&auto=format&fit=crop",
            140.0,
            Some(90.0),
        ),
        model(
            "capping",
            "Capping",
            "Combinação equilibrada de naturalidade com volume. Recomendado para quem quer um meio-termo: mais cheio que o clássico, mais leve que o volume russo.",
            "https://images.unsplash.com/photo-1583001931096-959e9ad7b535?q=80&w=1000&auto=format&fit=crop",
            190.0,
            None,
        ),
        model(
            "combo_glamour",
            "Combo Glamour",
            "Abre o olhar e cria sensação de leveza. Modela suavemente e dá um brilho elegante ao olhar. Ótimo para fotos e eventos.",
            "https://images.unsplash.com/photo-1620331311520-246422fd82f9?q=80&w=1000&auto=format&fit=crop",
            230.0,
            // maintenance is part of the combo
            None,
        ),
        model(
            "natural_soft",
            "Natural Soft",
            "Efeito extremamente suave, simulando cílios naturais porém mais longos e curvados. Ideal para clientes discretas e minimalistas.",
            "https://images.unsplash.com/photo-1540555700478-4be289fbecef?q=80&w=1000&auto=format&fit=crop",
            180.0,
            Some(90.0),
        ),
    ]
}

pub const ADDITIONAL_SERVICES: &[AdditionalService] = &[
    AdditionalService {
        id: "rem_out",
        name: "Remoção de Cílios (outro profissional)",
        price: 40.0,
    },
    AdditionalService {
        id: "rem_our",
        name: "Remoção (nossa aplicação)",
        price: 30.0,
    },
    AdditionalService {
        id: "hygiene",
        name: "Higienização Profunda",
        price: 20.0,
    },
];

pub const COMBOS: &[ComboOffer] = &[ComboOffer {
    name: "Combo Glamour",
    price: 230.0,
    highlights: &[
        "Aplicação Volume Havilah",
        "Kit de Cuidados (Shampoo + Pincel)",
        "1ª Manutenção Inclusa",
    ],
    best_seller: true,
}];

pub const CARE_TIPS: &[CareTip] = &[
    CareTip {
        title: "Primeiras 24 Horas",
        text: "Evite molhar os cílios, vapor excessivo (sauna, banho muito quente) e não use maquiagem na região dos olhos.",
        icon: "clock",
    },
    CareTip {
        title: "Higienização Diária",
        text: "Lave os cílios diariamente com shampoo neutro (de bebê) ou espuma de limpeza específica, usando um pincel macio.",
        icon: "droplet",
    },
    CareTip {
        title: "O que Evitar",
        text: "Não use rímel à prova d'água, curvex ou demaquilantes à base de óleo. Evite esfregar os olhos com força.",
        icon: "shield",
    },
    CareTip {
        title: "Escovação",
        text: "Escove os cílios delicadamente todas as manhãs com a escovinha fornecida para mantê-los alinhados.",
        icon: "feather",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_whole_price() {
        assert_eq!(format_price(170.0), "R$ 170");
    }

    #[test]
    fn test_format_fractional_price_uses_decimal_comma() {
        assert_eq!(format_price(89.5), "R$ 89,50");
    }

    #[test]
    fn test_missing_maintenance_renders_dash() {
        assert_eq!(format_optional_price(None), "-");
        assert_eq!(format_optional_price(Some(0.0)), "-");
    }

    #[test]
    fn test_pricing_row_for_model_without_maintenance() {
        let capping = fallback_models()
            .into_iter()
            .find(|m| m.id == "capping")
            .unwrap();

        let row = PricingRow::from(&capping);
        assert_eq!(row.application, "R$ 190");
        assert_eq!(row.maintenance, "-");
        assert!(!row.maintenance.contains("undefined"));
        assert!(!row.maintenance.contains("R$ 0"));
    }

    #[test]
    fn test_pricing_table_keeps_catalog_order() {
        let models = fallback_models();
        let rows = pricing_table(&models);

        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0].name, "Volume Premium");
        assert_eq!(rows[0].maintenance, "R$ 90");
        assert_eq!(rows[7].name, "Natural Soft");
    }

    #[test]
    fn test_fallback_models_are_bookable() {
        assert!(fallback_models().iter().all(ServiceModel::is_bookable));
    }

    #[test]
    fn test_maintenance_price_omitted_from_json_when_absent() {
        let capping = fallback_models()
            .into_iter()
            .find(|m| m.id == "capping")
            .unwrap();

        let json = serde_json::to_value(&capping).unwrap();
        assert!(json.get("maintenancePrice").is_none());
        assert_eq!(json["imageRef"], capping.image_ref);
    }
}
