use rust_decimal::Decimal;

/// Currency prefix for revenue metrics.
pub const REAIS: &str = "R$";

/// Formats a metric with two decimals, scaled to `mil` (thousands) or
/// `milhões` (millions), e.g. `"R$ 1.50 mil"`.
#[must_use]
pub fn format_number(value: Decimal, prefix: &str) -> String {
    let thousand = Decimal::from(1_000);
    let mut scaled = value;
    for unit in ["", "mil"] {
        if scaled < thousand {
            return join(prefix, scaled, unit);
        }
        scaled /= thousand;
    }
    join(prefix, scaled, "milhões")
}

/// Formats a revenue total in reais.
#[must_use]
pub fn format_revenue(value: Decimal) -> String {
    format_number(value, REAIS)
}

fn join(prefix: &str, value: Decimal, unit: &str) -> String {
    format!("{prefix} {:.2} {unit}", value.round_dp(2))
        .trim()
        .to_string()
}
