//! Predicate builders for the accessible-resource set.
//!
//! Each function returns a SQL fragment implementing
//! `owner == user OR exists active collaboration with user`, scoped to the
//! given table alias. The caller embeds the fragment in its query and binds
//! the user id at `user_bind`.

/// Animals the user owns or collaborates on. `alias` is the `animals` alias.
pub fn accessible_animals(alias: &str, user_bind: usize) -> String {
    format!(
        "({alias}.owner_id = ${user_bind} OR EXISTS (\
            SELECT 1 FROM collaborations ac \
            WHERE ac.animal_id = {alias}.id \
              AND ac.user_id = ${user_bind} \
              AND ac.is_active))"
    )
}

/// Diets whose animal is accessible to the user. `alias` is the `diets` alias.
pub fn accessible_diets(alias: &str, user_bind: usize) -> String {
    format!(
        "EXISTS (SELECT 1 FROM animals da \
            WHERE da.id = {alias}.animal_id \
              AND {})",
        accessible_animals("da", user_bind)
    )
}

/// Shopping lists the user created, or whose diet set touches an animal the
/// user can access. `alias` is the `shopping_lists` alias.
pub fn accessible_shopping_lists(alias: &str, user_bind: usize) -> String {
    format!(
        "({alias}.created_by = ${user_bind} OR EXISTS (\
            SELECT 1 FROM shopping_list_diets sld \
            JOIN diets sd ON sd.id = sld.diet_id AND sd.is_active \
            WHERE sld.shopping_list_id = {alias}.id \
              AND {}))",
        accessible_diets("sd", user_bind)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn animal_predicate_checks_owner_and_active_collaboration() {
        let sql = accessible_animals("a", 1);
        assert!(sql.contains("a.owner_id = $1"));
        assert!(sql.contains("ac.animal_id = a.id"));
        assert!(sql.contains("ac.is_active"));
    }

    #[test]
    fn diet_predicate_goes_through_the_animal() {
        let sql = accessible_diets("d", 2);
        assert!(sql.contains("da.id = d.animal_id"));
        assert!(sql.contains("da.owner_id = $2"));
    }

    #[test]
    fn shopping_list_predicate_includes_creator() {
        let sql = accessible_shopping_lists("sl", 1);
        assert!(sql.contains("sl.created_by = $1"));
        assert!(sql.contains("sld.shopping_list_id = sl.id"));
    }
}
