//! Platform amounts are stored in minor units (cents); the carrier API wants major units.

pub fn minor_to_major(amount: i64) -> f64 {
    amount as f64 / 100.0
}

/// Renders a minor-unit amount in major units without float noise: `10800` -> `"108"`,
/// `10050` -> `"100.5"`.
pub fn format_major(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    let (whole, cents) = (abs / 100, abs % 100);
    if cents == 0 {
        format!("{sign}{whole}")
    } else {
        let frac = format!("{cents:02}");
        format!("{sign}{whole}.{}", frac.trim_end_matches('0'))
    }
}

/// `TotalValue` as the carrier expects it, e.g. `"108 USD"`.
pub fn format_total_value(amount: i64, currency: &str) -> String {
    format!("{} {}", format_major(amount), currency)
}
