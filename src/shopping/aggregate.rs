//! Pure ingredient aggregation for shopping lists.

use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

/// One active ingredient contributing to a shopping list, already normalized
/// into the base unit.
#[derive(Debug, Clone)]
pub struct IngredientLine {
    pub name: String,
    pub category: Option<String>,
    pub unit_id: Uuid,
    pub amount_in_base_unit: Decimal,
}

/// One consolidated shopping-list line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedItem {
    pub ingredient_name: String,
    pub category: String,
    pub unit_id: Uuid,
    pub total_amount: Decimal,
}

/// Grouping key: case-insensitive, whitespace-trimmed.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Merges ingredients by normalized name, summing base-unit amounts scaled by
/// `days_count`. The display name, category label and unit of a group come
/// from its first-encountered ingredient; group order follows first encounter.
///
/// Ingredients sharing a normalized name but disagreeing on unit or category
/// are merged anyway (first one wins) with a warning, so the conflict is at
/// least visible in the logs.
pub fn aggregate(lines: &[IngredientLine], days_count: i32) -> Vec<AggregatedItem> {
    let days = Decimal::from(days_count);
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut items: Vec<AggregatedItem> = Vec::new();

    for line in lines {
        let key = normalize_name(&line.name);
        let contribution = line.amount_in_base_unit * days;

        match index.get(&key) {
            Some(&i) => {
                let item = &mut items[i];
                if item.unit_id != line.unit_id {
                    warn!(
                        ingredient = %item.ingredient_name,
                        "aggregating ingredients with mismatched units; keeping the first unit"
                    );
                }
                item.total_amount += contribution;
            }
            None => {
                index.insert(key, items.len());
                items.push(AggregatedItem {
                    ingredient_name: line.name.clone(),
                    category: line.category.clone().unwrap_or_default(),
                    unit_id: line.unit_id,
                    total_amount: contribution,
                });
            }
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, amount: i64, unit_id: Uuid) -> IngredientLine {
        IngredientLine {
            name: name.to_string(),
            category: None,
            unit_id,
            amount_in_base_unit: Decimal::from(amount),
        }
    }

    #[test]
    fn single_ingredient_scales_by_days() {
        let unit = Uuid::new_v4();
        let items = aggregate(&[line("Beef", 500, unit)], 7);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].ingredient_name, "Beef");
        assert_eq!(items[0].total_amount, Decimal::from(3500));
    }

    #[test]
    fn same_name_across_diets_merges() {
        let unit = Uuid::new_v4();
        // base amounts 400 and 300 from two diets, three days
        let items = aggregate(
            &[line("Beef carrot", 400, unit), line("Beef carrot", 300, unit)],
            3,
        );
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].total_amount, Decimal::from(2100));
    }

    #[test]
    fn normalization_is_case_insensitive_and_trimmed() {
        let unit = Uuid::new_v4();
        let items = aggregate(&[line("Carrot", 100, unit), line("CARROT ", 50, unit)], 1);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].total_amount, Decimal::from(150));
        // first-encountered display name is retained
        assert_eq!(items[0].ingredient_name, "Carrot");
    }

    #[test]
    fn distinct_names_stay_separate_in_encounter_order() {
        let unit = Uuid::new_v4();
        let items = aggregate(
            &[line("Liver", 100, unit), line("Rice", 200, unit), line("Liver", 50, unit)],
            2,
        );
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].ingredient_name, "Liver");
        assert_eq!(items[0].total_amount, Decimal::from(300));
        assert_eq!(items[1].ingredient_name, "Rice");
        assert_eq!(items[1].total_amount, Decimal::from(400));
    }

    #[test]
    fn first_category_and_unit_win_on_conflict() {
        let grams = Uuid::new_v4();
        let kilos = Uuid::new_v4();
        let lines = [
            IngredientLine {
                name: "Pumpkin".into(),
                category: Some("Vegetables".into()),
                unit_id: grams,
                amount_in_base_unit: Decimal::from(100),
            },
            IngredientLine {
                name: "pumpkin".into(),
                category: Some("Fruit".into()),
                unit_id: kilos,
                amount_in_base_unit: Decimal::from(200),
            },
        ];
        let items = aggregate(&lines, 1);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category, "Vegetables");
        assert_eq!(items[0].unit_id, grams);
        assert_eq!(items[0].total_amount, Decimal::from(300));
    }

    #[test]
    fn missing_category_becomes_empty_label() {
        let unit = Uuid::new_v4();
        let items = aggregate(&[line("Egg", 60, unit)], 1);
        assert_eq!(items[0].category, "");
    }

    #[test]
    fn empty_input_yields_no_items() {
        assert!(aggregate(&[], 7).is_empty());
    }
}
