use rust_decimal::Decimal;
use sqlx::PgConnection;
use time::Date;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;

pub fn validate_date_range(start_date: Date, end_date: Option<Date>) -> Result<(), ApiError> {
    if let Some(end) = end_date {
        if start_date > end {
            return Err(ApiError::validation(
                "end_date",
                "Start date cannot be later than end date.",
            ));
        }
    }
    Ok(())
}

/// Recomputes a diet's `total_daily_mass` from its active ingredients.
///
/// Runs on the caller's connection so it can share the transaction of the
/// ingredient mutation that triggered it; the cached total never diverges
/// from the active-ingredient sum across a committed request. A missing diet
/// yields `Decimal::ZERO` without error, so callers need no existence check.
pub async fn recalculate_diet_total(
    conn: &mut PgConnection,
    diet_id: Uuid,
) -> Result<Decimal, ApiError> {
    let total: Option<Decimal> = sqlx::query_scalar(
        r#"
        UPDATE diets
        SET total_daily_mass = COALESCE((
                SELECT SUM(amount_in_base_unit)
                FROM ingredients
                WHERE diet_id = $1 AND is_active
            ), 0),
            updated_at = now()
        WHERE id = $1
        RETURNING total_daily_mass
        "#,
    )
    .bind(diet_id)
    .fetch_optional(&mut *conn)
    .await?;

    let total = total.unwrap_or(Decimal::ZERO);
    debug!(diet_id = %diet_id, total = %total, "diet total recalculated");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn open_ended_diet_is_valid() {
        assert!(validate_date_range(date!(2026 - 01 - 01), None).is_ok());
    }

    #[test]
    fn same_day_range_is_valid() {
        let day = date!(2026 - 03 - 15);
        assert!(validate_date_range(day, Some(day)).is_ok());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err =
            validate_date_range(date!(2026 - 05 - 10), Some(date!(2026 - 05 - 09))).unwrap_err();
        assert!(matches!(err, ApiError::Validation { field: "end_date", .. }));
    }
}
