//! Cumulative month-by-month value of a card combination over its first year.

pub const PROJECTION_MONTHS: usize = 12;

/// Spread `recurring_annual` evenly, add each `(month, bonus)` in its month,
/// charge `annual_fees` in month 0, and return the running total.
pub fn project_monthly(
    recurring_annual: f64,
    bonuses: impl IntoIterator<Item = (usize, f64)>,
    annual_fees: f64,
) -> [f64; PROJECTION_MONTHS] {
    let mut monthly = [recurring_annual / PROJECTION_MONTHS as f64; PROJECTION_MONTHS];
    for (month, bonus) in bonuses {
        monthly[month.min(PROJECTION_MONTHS - 1)] += bonus;
    }
    monthly[0] -= annual_fees;

    let mut running = 0.0;
    for value in monthly.iter_mut() {
        running += *value;
        *value = running;
    }
    monthly
}
