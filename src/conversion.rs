use rust_decimal::Decimal;

/// Converts an amount expressed in some unit into the base unit (grams),
/// using the unit's conversion factor.
pub fn to_base_unit(amount: Decimal, conversion_factor: Decimal) -> Decimal {
    amount * conversion_factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grams_pass_through() {
        assert_eq!(
            to_base_unit(Decimal::from(500), Decimal::ONE),
            Decimal::from(500)
        );
    }

    #[test]
    fn kilograms_scale_up() {
        assert_eq!(
            to_base_unit(Decimal::new(15, 1), Decimal::from(1000)),
            Decimal::from(1500)
        );
    }

    #[test]
    fn fractional_factors_scale_down() {
        // 250 mg -> 0.25 g
        assert_eq!(
            to_base_unit(Decimal::from(250), Decimal::new(1, 3)),
            Decimal::new(250, 3)
        );
    }
}
