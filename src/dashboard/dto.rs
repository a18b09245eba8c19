use serde::Serialize;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::dashboard::repo::{ExpiringDietRow, StaleListRow};

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub animals_count: i64,
    pub active_diets_count: i64,
    pub expiring_diets_count: i64,
    pub active_shopping_lists_count: i64,
    pub completed_shopping_lists_count: i64,
}

#[derive(Debug, Serialize)]
pub struct AnimalWithoutDiet {
    pub id: Uuid,
    pub name: String,
    pub species: String,
}

#[derive(Debug, Serialize)]
pub struct ExpiringDiet {
    pub id: Uuid,
    pub animal_id: Uuid,
    pub animal_name: String,
    pub end_date: Date,
    pub days_left: i64,
}

#[derive(Debug, Serialize)]
pub struct StaleShoppingList {
    pub id: Uuid,
    pub title: String,
    pub created_at: OffsetDateTime,
    pub days_old: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardAlerts {
    pub animals_without_diet: Vec<AnimalWithoutDiet>,
    pub expiring_diets: Vec<ExpiringDiet>,
    pub old_shopping_lists: Vec<StaleShoppingList>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    pub alerts: DashboardAlerts,
}

impl ExpiringDiet {
    pub fn from_row(row: ExpiringDietRow, today: Date) -> Self {
        Self {
            days_left: (row.end_date - today).whole_days(),
            id: row.id,
            animal_id: row.animal_id,
            animal_name: row.animal_name,
            end_date: row.end_date,
        }
    }
}

impl StaleShoppingList {
    pub fn from_row(row: StaleListRow, today: Date) -> Self {
        Self {
            days_old: (today - row.created_at.date()).whole_days(),
            id: row.id,
            title: row.title,
            created_at: row.created_at,
        }
    }
}
