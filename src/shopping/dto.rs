use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::shopping::repo::{DietInfoRow, ShoppingListItemRow, ShoppingListRow};

#[derive(Debug, Deserialize)]
pub struct CreateShoppingListRequest {
    pub diets: Vec<Uuid>,
    pub days_count: i32,
    pub title: Option<String>,
}

/// Changing `diets` or `days_count` triggers a regeneration of the items.
#[derive(Debug, Deserialize)]
pub struct UpdateShoppingListRequest {
    pub diets: Option<Vec<Uuid>>,
    pub days_count: Option<i32>,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ShoppingListQuery {
    pub is_completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub is_checked: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ShoppingListResponse {
    pub id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub days_count: i32,
    pub is_completed: bool,
    pub items_count: i64,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<ShoppingListRow> for ShoppingListResponse {
    fn from(l: ShoppingListRow) -> Self {
        Self {
            id: l.id,
            created_by: l.created_by,
            title: l.title,
            days_count: l.days_count,
            is_completed: l.is_completed,
            items_count: l.items_count,
            is_active: l.is_active,
            created_at: l.created_at,
            updated_at: l.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DietInfo {
    pub id: Uuid,
    pub animal_id: Uuid,
    pub animal_name: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
}

impl From<DietInfoRow> for DietInfo {
    fn from(d: DietInfoRow) -> Self {
        Self {
            id: d.id,
            animal_id: d.animal_id,
            animal_name: d.animal_name,
            start_date: d.start_date,
            end_date: d.end_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShoppingListItemResponse {
    pub id: Uuid,
    pub shopping_list: Uuid,
    pub ingredient_name: String,
    pub category: String,
    pub unit: crate::ingredients::dto::UnitInfo,
    pub total_amount: Decimal,
    pub is_checked: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<ShoppingListItemRow> for ShoppingListItemResponse {
    fn from(i: ShoppingListItemRow) -> Self {
        Self {
            id: i.id,
            shopping_list: i.shopping_list_id,
            ingredient_name: i.ingredient_name,
            category: i.category,
            unit: crate::ingredients::dto::UnitInfo {
                id: i.unit_id,
                name: i.unit_name,
                symbol: i.unit_symbol,
                conversion_factor: i.conversion_factor,
            },
            total_amount: i.total_amount,
            is_checked: i.is_checked,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}

/// Detail payload: the list plus its diets and consolidated items.
#[derive(Debug, Serialize)]
pub struct ShoppingListDetailResponse {
    #[serde(flatten)]
    pub list: ShoppingListResponse,
    pub diets: Vec<Uuid>,
    pub diets_info: Vec<DietInfo>,
    pub items: Vec<ShoppingListItemResponse>,
}
