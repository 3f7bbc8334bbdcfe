use std::collections::BTreeMap;

use serde::Serialize;
use time::Date;

use crate::dashboard::engine::DerivedRow;

/// How many vendors the "most visited" card shows.
const TOP_VENDOR_COUNT: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct BalancePoint {
    pub date: Date,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpendBucket {
    pub date: Date,
    pub spend: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct VendorSlice {
    pub vendor: String,
    pub spend: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct VendorVisits {
    pub vendor: String,
    pub visits: usize,
}

// Stable sort: rows sharing a date keep their ledger order, so the drawn
// line stays consistent with the running balance.
pub fn balance_over_time(subset: &[DerivedRow]) -> Vec<BalancePoint> {
    let mut points: Vec<BalancePoint> = subset
        .iter()
        .map(|r| BalancePoint {
            date: r.date,
            balance: r.balance,
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

/// Signed `amount` summed per calendar day, ascending by day.
pub fn daily_spend(subset: &[DerivedRow]) -> Vec<SpendBucket> {
    bucketed(subset, |d| d)
}

/// Signed `amount` summed per month, keyed by the first of the month.
pub fn monthly_spend(subset: &[DerivedRow]) -> Vec<SpendBucket> {
    bucketed(subset, |d| {
        Date::from_calendar_date(d.year(), d.month(), 1).expect("first of month is a valid date")
    })
}

fn bucketed(subset: &[DerivedRow], key: impl Fn(Date) -> Date) -> Vec<SpendBucket> {
    let mut buckets: BTreeMap<Date, f64> = BTreeMap::new();
    for row in subset {
        *buckets.entry(key(row.date)).or_default() += row.amount;
    }
    buckets
        .into_iter()
        .map(|(date, spend)| SpendBucket { date, spend })
        .collect()
}

pub fn vendor_breakdown(subset: &[DerivedRow]) -> Vec<VendorSlice> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for row in subset {
        *totals.entry(&row.description).or_default() += row.amount;
    }
    totals
        .into_iter()
        .map(|(vendor, sum)| VendorSlice {
            vendor: vendor.to_string(),
            spend: sum.abs(),
        })
        .collect()
}

pub fn top_vendors(subset: &[DerivedRow]) -> Vec<VendorVisits> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for row in subset {
        *counts.entry(&row.description).or_default() += 1;
    }
    // BTreeMap iteration is alphabetical, and the sort is stable.
    let mut ranked: Vec<VendorVisits> = counts
        .into_iter()
        .map(|(vendor, visits)| VendorVisits {
            vendor: vendor.to_string(),
            visits,
        })
        .collect();
    ranked.sort_by(|a, b| b.visits.cmp(&a.visits));
    ranked.truncate(TOP_VENDOR_COUNT);
    ranked
}
