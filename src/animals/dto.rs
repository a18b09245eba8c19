use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::animals::repo::AnimalRow;

#[derive(Debug, Deserialize)]
pub struct CreateAnimalRequest {
    pub species_id: Uuid,
    pub name: String,
    pub date_of_birth: Option<Date>,
    pub weight_kg: Option<Decimal>,
    #[serde(default)]
    pub note: String,
}

/// `date_of_birth` and `weight_kg` are nullable: absent keeps the stored
/// value, explicit `null` clears it.
#[derive(Debug, Deserialize)]
pub struct UpdateAnimalRequest {
    pub species_id: Option<Uuid>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::patch::double_option")]
    pub date_of_birth: Option<Option<Date>>,
    #[serde(default, deserialize_with = "crate::patch::double_option")]
    pub weight_kg: Option<Option<Decimal>>,
    pub note: Option<String>,
}

/// List filters. `active` absent means both live and soft-deleted rows.
#[derive(Debug, Deserialize)]
pub struct AnimalListQuery {
    pub active: Option<bool>,
    pub species_id: Option<Uuid>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SpeciesInfo {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct AnimalResponse {
    pub id: Uuid,
    pub owner: Uuid,
    pub owner_email: String,
    pub species: SpeciesInfo,
    pub name: String,
    pub date_of_birth: Option<Date>,
    pub weight_kg: Option<Decimal>,
    pub note: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_patch_distinguishes_absent_from_null() {
        let absent: UpdateAnimalRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.weight_kg, None);

        let cleared: UpdateAnimalRequest =
            serde_json::from_str(r#"{"weight_kg": null}"#).unwrap();
        assert_eq!(cleared.weight_kg, Some(None));

        let set: UpdateAnimalRequest = serde_json::from_str(r#"{"weight_kg": "4.2"}"#).unwrap();
        assert_eq!(set.weight_kg, Some(Some(Decimal::new(42, 1))));
    }
}

impl From<AnimalRow> for AnimalResponse {
    fn from(a: AnimalRow) -> Self {
        Self {
            id: a.id,
            owner: a.owner_id,
            owner_email: a.owner_email,
            species: SpeciesInfo {
                id: a.species_id,
                name: a.species_name,
            },
            name: a.name,
            date_of_birth: a.date_of_birth,
            weight_kg: a.weight_kg,
            note: a.note,
            is_active: a.is_active,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}
