use sqlx::PgPool;
use time::{Date, Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{
    dashboard::{
        dto::{
            AnimalWithoutDiet, DashboardAlerts, DashboardResponse, DashboardStats, ExpiringDiet,
            StaleShoppingList,
        },
        repo,
    },
    error::ApiError,
};

/// Diets ending within this many days count as expiring.
const EXPIRY_HORIZON_DAYS: i64 = 7;

/// Open lists at least this old show up as stale.
const STALE_LIST_DAYS: i64 = 7;

/// Last day of the inclusive expiry window.
fn expiry_window_end(today: Date) -> Date {
    today + Duration::days(EXPIRY_HORIZON_DAYS)
}

/// Latest creation date that still counts as stale.
fn stale_cutoff(today: Date) -> Date {
    today - Duration::days(STALE_LIST_DAYS)
}

fn month_start(today: Date) -> Date {
    // the 1st always exists
    Date::from_calendar_date(today.year(), today.month(), 1).unwrap_or(today)
}

/// Assembles the stats and alerts blocks against one `today` snapshot, so a
/// request straddling midnight stays internally consistent.
pub async fn build_dashboard(db: &PgPool, user_id: Uuid) -> Result<DashboardResponse, ApiError> {
    let today = OffsetDateTime::now_utc().date();
    let window_end = expiry_window_end(today);

    let expiring = repo::expiring_diets(db, user_id, today, window_end).await?;

    let stats = DashboardStats {
        animals_count: repo::animals_count(db, user_id).await?,
        active_diets_count: repo::active_diets_count(db, user_id, today).await?,
        expiring_diets_count: expiring.len() as i64,
        active_shopping_lists_count: repo::active_lists_count(db, user_id).await?,
        completed_shopping_lists_count: repo::completed_lists_count(
            db,
            user_id,
            month_start(today),
        )
        .await?,
    };

    let alerts = DashboardAlerts {
        animals_without_diet: repo::animals_without_diet(db, user_id, today)
            .await?
            .into_iter()
            .map(|a| AnimalWithoutDiet {
                id: a.id,
                name: a.name,
                species: a.species,
            })
            .collect(),
        expiring_diets: expiring
            .into_iter()
            .map(|row| ExpiringDiet::from_row(row, today))
            .collect(),
        old_shopping_lists: repo::stale_lists(db, user_id, stale_cutoff(today))
            .await?
            .into_iter()
            .map(|row| StaleShoppingList::from_row(row, today))
            .collect(),
    };

    Ok(DashboardResponse { stats, alerts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn expiry_window_is_seven_days_inclusive() {
        let today = date!(2024 - 03 - 10);
        let end = expiry_window_end(today);
        assert_eq!(end, date!(2024 - 03 - 17));
        // a diet ending in five days falls inside the window
        let in_five = today + Duration::days(5);
        assert!(in_five >= today && in_five <= end);
        // eight days out falls outside
        assert!(today + Duration::days(8) > end);
    }

    #[test]
    fn stale_cutoff_is_seven_days_back() {
        let today = date!(2024 - 03 - 10);
        assert_eq!(stale_cutoff(today), date!(2024 - 03 - 03));
    }

    #[test]
    fn month_start_clamps_to_the_first() {
        assert_eq!(month_start(date!(2024 - 03 - 10)), date!(2024 - 03 - 01));
        assert_eq!(month_start(date!(2024 - 12 - 31)), date!(2024 - 12 - 01));
        assert_eq!(month_start(date!(2024 - 01 - 01)), date!(2024 - 01 - 01));
    }
}
