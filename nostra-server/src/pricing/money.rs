//! Money helpers
//!
//! Storage and arithmetic stay in integer minor units (centavos); `Decimal`
//! handles the exact cents→reais conversion at the gateway boundary and for
//! human-facing formatting.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Minor units → exact decimal reais (2500 → 25.00)
pub fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Minor units → f64 reais for the gateway wire format.
///
/// Exact division happens in Decimal; only the final value degrades to f64.
pub fn to_reais_f64(cents: i64) -> f64 {
    cents_to_decimal(cents).to_f64().unwrap_or(0.0)
}

/// Brazilian currency display: `R$ 25,00`
pub fn format_brl(cents: i64) -> String {
    format!("R$ {}", cents_to_decimal(cents)).replace('.', ",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_convert_exactly() {
        assert_eq!(cents_to_decimal(2500).to_string(), "25.00");
        assert_eq!(cents_to_decimal(5).to_string(), "0.05");
        assert_eq!(cents_to_decimal(0).to_string(), "0.00");
    }

    #[test]
    fn reais_f64_matches_decimal_value() {
        assert_eq!(to_reais_f64(5500), 55.0);
        assert_eq!(to_reais_f64(1495), 14.95);
    }

    #[test]
    fn brl_formatting_uses_comma_separator() {
        assert_eq!(format_brl(5500), "R$ 55,00");
        assert_eq!(format_brl(1495), "R$ 14,95");
        assert_eq!(format_brl(5), "R$ 0,05");
    }
}
