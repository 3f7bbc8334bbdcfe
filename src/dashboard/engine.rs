use serde::Serialize;
use time::Date;

use crate::store::ledger::Transaction;

/// Spend rate above which the dashboard shows a pacing warning, units/day.
const HIGH_SPEND_THRESHOLD: f64 = 7.0;
/// Days of runway below which the dashboard shows a run-out warning.
const RUNOUT_DAYS: f64 = 7.0;

/// A ledger row joined with its derived columns.
#[derive(Debug, Clone, Serialize)]
pub struct DerivedRow {
    pub date: Date,
    pub description: String,
    pub amount: f64,
    pub cumulative_spend: f64,
    pub balance: f64,
}

/// Statistics over a filtered subset of derived rows.
#[derive(Debug, Clone, Serialize)]
pub struct SpendSummary {
    pub current_balance: f64,
    pub total_spend: f64,
    pub avg_daily_spend: f64,
    /// `None` means unbounded (no spending in the subset); JSON null.
    pub days_left: Option<f64>,
    pub transaction_count: usize,
    pub high_spend_warning: bool,
    pub runout_warning: bool,
}

/// Prefix sum over the full ledger in row order. Filters select from the
/// result afterwards, so a subset row keeps its full-ledger balance.
pub fn derive(rows: &[Transaction], initial_credit: f64) -> Vec<DerivedRow> {
    let mut running = 0.0;
    rows.iter()
        .map(|t| {
            running += t.amount;
            DerivedRow {
                date: t.date,
                description: t.description.clone(),
                amount: t.amount,
                cumulative_spend: running,
                balance: initial_credit + running,
            }
        })
        .collect()
}

/// An empty subset falls back to the initial credit with zero spend and
/// unbounded runway rather than erroring.
pub fn summarize(subset: &[DerivedRow], initial_credit: f64) -> SpendSummary {
    let current_balance = subset.last().map(|r| r.balance).unwrap_or(initial_credit);
    let total_spend: f64 = subset.iter().map(|r| r.amount).sum();
    let avg_daily_spend = if subset.is_empty() {
        0.0
    } else {
        subset.iter().map(|r| r.amount.abs()).sum::<f64>() / subset.len() as f64
    };
    let days_left = (avg_daily_spend > 0.0).then(|| current_balance / avg_daily_spend);

    SpendSummary {
        current_balance,
        total_spend,
        avg_daily_spend,
        days_left,
        transaction_count: subset.len(),
        high_spend_warning: avg_daily_spend > HIGH_SPEND_THRESHOLD,
        runout_warning: days_left.is_some_and(|d| d < RUNOUT_DAYS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn tx(date: Date, vendor: &str, amount: f64) -> Transaction {
        Transaction {
            date,
            description: vendor.into(),
            amount,
        }
    }

    fn worked_example() -> Vec<Transaction> {
        vec![
            tx(date!(2024 - 01 - 02), "Cafe", -10.0),
            tx(date!(2024 - 01 - 03), "Cafe", -5.0),
            tx(date!(2024 - 01 - 04), "Store", -25.0),
        ]
    }

    #[test]
    fn prefix_sum_property_holds() {
        let rows = worked_example();
        let derived = derive(&rows, 1000.0);
        for (i, row) in derived.iter().enumerate() {
            let expected: f64 = rows[..=i].iter().map(|t| t.amount).sum();
            assert_eq!(row.cumulative_spend, expected);
            assert_eq!(row.balance, 1000.0 + expected);
        }
    }

    #[test]
    fn worked_example_balances() {
        let derived = derive(&worked_example(), 1000.0);
        let balances: Vec<f64> = derived.iter().map(|r| r.balance).collect();
        assert_eq!(balances, vec![990.0, 985.0, 960.0]);
    }

    #[test]
    fn filtered_subset_keeps_full_ledger_balance() {
        let derived = derive(&worked_example(), 1000.0);
        let store_only: Vec<DerivedRow> = derived
            .iter()
            .filter(|r| r.description == "Store")
            .cloned()
            .collect();
        let summary = summarize(&store_only, 1000.0);
        assert_eq!(summary.total_spend, -25.0);
        assert_eq!(summary.current_balance, 960.0);
        assert_eq!(summary.transaction_count, 1);
    }

    #[test]
    fn empty_subset_defaults() {
        let summary = summarize(&[], 1000.0);
        assert_eq!(summary.current_balance, 1000.0);
        assert_eq!(summary.total_spend, 0.0);
        assert_eq!(summary.avg_daily_spend, 0.0);
        assert_eq!(summary.days_left, None);
        assert!(!summary.high_spend_warning);
        assert!(!summary.runout_warning);
    }

    #[test]
    fn avg_daily_spend_is_mean_absolute_amount() {
        let derived = derive(&worked_example(), 1000.0);
        let summary = summarize(&derived, 1000.0);
        let expected = (10.0 + 5.0 + 25.0) / 3.0;
        assert!((summary.avg_daily_spend - expected).abs() < 1e-9);
        assert_eq!(
            summary.days_left,
            Some(summary.current_balance / expected)
        );
        // ~13.3/day is well over the pacing threshold; 72 days of runway is not.
        assert!(summary.high_spend_warning);
        assert!(!summary.runout_warning);
    }

    #[test]
    fn runout_warning_near_zero_balance() {
        let rows = vec![tx(date!(2024 - 01 - 02), "Cafe", -10.0)];
        let derived = derive(&rows, 30.0);
        let summary = summarize(&derived, 30.0);
        assert_eq!(summary.current_balance, 20.0);
        // 20 units at 10/day is 2 days of runway.
        assert_eq!(summary.days_left, Some(2.0));
        assert!(summary.runout_warning);
    }

    #[test]
    fn unbounded_days_left_serializes_as_null() {
        let summary = summarize(&[], 1000.0);
        let json = serde_json::to_value(&summary).expect("serialize summary");
        assert!(json["days_left"].is_null());
        assert_eq!(json["current_balance"], 1000.0);
    }

    #[test]
    fn days_left_unbounded_for_zero_amounts() {
        let rows = vec![tx(date!(2024 - 01 - 02), "Refund Desk", 0.0)];
        let derived = derive(&rows, 100.0);
        let summary = summarize(&derived, 100.0);
        assert_eq!(summary.avg_daily_spend, 0.0);
        assert_eq!(summary.days_left, None);
    }
}
