use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::diets::repo::DietRow;
use crate::ingredients::dto::IngredientResponse;

#[derive(Debug, Deserialize)]
pub struct CreateDietRequest {
    pub animal_id: Uuid,
    pub start_date: Date,
    pub end_date: Option<Date>,
    #[serde(default)]
    pub description: String,
}

/// `end_date` is nullable: absent keeps the stored date, explicit `null`
/// reopens the diet.
#[derive(Debug, Deserialize)]
pub struct UpdateDietRequest {
    pub start_date: Option<Date>,
    #[serde(default, deserialize_with = "crate::patch::double_option")]
    pub end_date: Option<Option<Date>>,
    pub description: Option<String>,
}

/// List filters; `active` absent includes soft-deleted diets.
#[derive(Debug, Deserialize)]
pub struct DietListQuery {
    pub animal_id: Option<Uuid>,
    pub active: Option<bool>,
    pub start_date_gte: Option<Date>,
    pub end_date_lte: Option<Date>,
}

#[derive(Debug, Serialize)]
pub struct DietResponse {
    pub id: Uuid,
    pub animal: Uuid,
    pub animal_name: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub total_daily_mass: Decimal,
    pub description: String,
    pub ingredients_count: i64,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct DietDetailResponse {
    #[serde(flatten)]
    pub diet: DietResponse,
    pub ingredients: Vec<IngredientResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn end_date_patch_distinguishes_absent_null_and_value() {
        let absent: UpdateDietRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.end_date, None);

        let reopened: UpdateDietRequest = serde_json::from_str(r#"{"end_date": null}"#).unwrap();
        assert_eq!(reopened.end_date, Some(None));

        let closed: UpdateDietRequest =
            serde_json::from_str(r#"{"end_date": "2026-04-01"}"#).unwrap();
        assert_eq!(closed.end_date, Some(Some(date!(2026 - 04 - 01))));
    }
}

impl From<DietRow> for DietResponse {
    fn from(d: DietRow) -> Self {
        Self {
            id: d.id,
            animal: d.animal_id,
            animal_name: d.animal_name,
            start_date: d.start_date,
            end_date: d.end_date,
            total_daily_mass: d.total_daily_mass,
            description: d.description,
            ingredients_count: d.ingredients_count,
            is_active: d.is_active,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}
