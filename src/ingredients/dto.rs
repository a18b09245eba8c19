use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::ingredients::repo::IngredientRow;

/// How the ingredient is prepared before serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CookingMethod {
    Raw,
    Cooked,
}

impl CookingMethod {
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Cooked => "cooked",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateIngredientRequest {
    pub name: String,
    pub category_id: Option<Uuid>,
    pub cooking_method: CookingMethod,
    pub unit_id: Uuid,
    pub amount: Decimal,
}

/// `category_id` is nullable: absent keeps the stored category, explicit
/// `null` detaches it.
#[derive(Debug, Deserialize)]
pub struct UpdateIngredientRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::patch::double_option")]
    pub category_id: Option<Option<Uuid>>,
    pub cooking_method: Option<CookingMethod>,
    pub unit_id: Option<Uuid>,
    pub amount: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct IngredientListQuery {
    pub category_id: Option<Uuid>,
    pub cooking_method: Option<CookingMethod>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UnitInfo {
    pub id: Uuid,
    pub name: String,
    pub symbol: String,
    pub conversion_factor: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CategoryInfo {
    pub id: Uuid,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct IngredientResponse {
    pub id: Uuid,
    pub diet: Uuid,
    pub name: String,
    pub category: Option<CategoryInfo>,
    pub cooking_method: String,
    pub unit: UnitInfo,
    pub amount: Decimal,
    pub amount_in_base_unit: Decimal,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_patch_distinguishes_absent_from_null() {
        let absent: UpdateIngredientRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.category_id, None);

        let detached: UpdateIngredientRequest =
            serde_json::from_str(r#"{"category_id": null}"#).unwrap();
        assert_eq!(detached.category_id, Some(None));

        let id = Uuid::new_v4();
        let set: UpdateIngredientRequest =
            serde_json::from_str(&format!(r#"{{"category_id": "{id}"}}"#)).unwrap();
        assert_eq!(set.category_id, Some(Some(id)));
    }
}

impl From<IngredientRow> for IngredientResponse {
    fn from(i: IngredientRow) -> Self {
        let category = match (i.category_id, i.category_code, i.category_name) {
            (Some(id), Some(code), Some(name)) => Some(CategoryInfo { id, code, name }),
            _ => None,
        };
        Self {
            id: i.id,
            diet: i.diet_id,
            name: i.name,
            category,
            cooking_method: i.cooking_method,
            unit: UnitInfo {
                id: i.unit_id,
                name: i.unit_name,
                symbol: i.unit_symbol,
                conversion_factor: i.conversion_factor,
            },
            amount: i.amount,
            amount_in_base_unit: i.amount_in_base_unit,
            is_active: i.is_active,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}
