use time::Date;

use crate::dashboard::engine::DerivedRow;

/// Inclusive date bounds, vendor by string equality; an absent bound or
/// vendor is unbounded. Input order is preserved.
pub fn apply(
    rows: &[DerivedRow],
    start: Option<Date>,
    end: Option<Date>,
    vendor: Option<&str>,
) -> Vec<DerivedRow> {
    rows.iter()
        .filter(|r| start.is_none_or(|s| r.date >= s))
        .filter(|r| end.is_none_or(|e| r.date <= e))
        .filter(|r| vendor.is_none_or(|v| r.description == v))
        .cloned()
        .collect()
}
