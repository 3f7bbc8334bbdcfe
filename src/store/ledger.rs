use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime};
use tracing::{info, warn};

use crate::store::StoreError;

/// One ledger row. Amounts are negative for spend; dates are day-granular.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub date: Date,
    pub description: String,
    pub amount: f64,
}

/// The transaction ledger, read once at startup and immutable afterwards.
#[derive(Debug)]
pub struct Ledger {
    rows: Vec<Transaction>,
    first_out_of_order_line: Option<u64>,
}

impl Ledger {
    /// Loads the ledger file: headers matched case-insensitively and trimmed,
    /// unparseable amounts skip the row with a warning, unparseable dates
    /// fail the load, and a file not in date order is flagged loudly.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        let col = |name: &'static str| -> Result<usize, StoreError> {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or(StoreError::MissingColumn(name))
        };
        let date_col = col("date")?;
        let desc_col = col("description")?;
        let amount_col = col("amount")?;

        let mut rows: Vec<Transaction> = Vec::new();
        let mut first_out_of_order_line: Option<u64> = None;
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            let raw_amount = record.get(amount_col).unwrap_or_default();
            let amount = match raw_amount.parse::<f64>() {
                Ok(a) => a,
                Err(_) => {
                    warn!(line, amount = raw_amount, "skipping row with unparseable amount");
                    continue;
                }
            };

            let raw_date = record.get(date_col).unwrap_or_default();
            let date = parse_date(raw_date).ok_or_else(|| StoreError::BadDate {
                line,
                value: raw_date.to_string(),
            })?;

            if first_out_of_order_line.is_none() {
                if let Some(prev) = rows.last() {
                    if date < prev.date {
                        first_out_of_order_line = Some(line);
                    }
                }
            }

            rows.push(Transaction {
                date,
                description: record.get(desc_col).unwrap_or_default().to_string(),
                amount,
            });
        }

        if let Some(line) = first_out_of_order_line {
            warn!(
                line,
                "ledger is not sorted by date; the running balance follows row order, \
                 so balance-over-time output will not match chronology"
            );
        }
        info!(path = %path.display(), count = rows.len(), "ledger loaded");

        Ok(Self {
            rows,
            first_out_of_order_line,
        })
    }

    pub fn from_rows(rows: Vec<Transaction>) -> Self {
        Self {
            rows,
            first_out_of_order_line: None,
        }
    }

    /// Line number of the first row that breaks date order, if any.
    pub fn first_out_of_order_line(&self) -> Option<u64> {
        self.first_out_of_order_line
    }

    pub fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    /// Sorted distinct vendor names, for the filter dropdown.
    pub fn vendors(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|t| t.description.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Earliest and latest transaction dates; `None` for an empty ledger.
    pub fn date_span(&self) -> Option<(Date, Date)> {
        let min = self.rows.iter().map(|t| t.date).min()?;
        let max = self.rows.iter().map(|t| t.date).max()?;
        Some((min, max))
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` (time-of-day discarded) and
/// `MM/DD/YYYY`.
fn parse_date(raw: &str) -> Option<Date> {
    let iso = format_description!("[year]-[month]-[day]");
    if let Ok(d) = Date::parse(raw, iso) {
        return Some(d);
    }
    let iso_dt = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    if let Ok(dt) = PrimitiveDateTime::parse(raw, iso_dt) {
        return Some(dt.date());
    }
    let us = format_description!("[month]/[day]/[year]");
    Date::parse(raw, us).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use time::macros::date;

    fn write_ledger(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp ledger");
        file.write_all(contents.as_bytes()).expect("write ledger");
        file
    }

    #[test]
    fn loads_rows_and_trims_headers() {
        let file = write_ledger(
            "Date, Description, Amount\n\
             2024-01-02,Cafe,-10\n\
             2024-01-03,Store,-25.5\n",
        );
        let ledger = Ledger::load(file.path()).expect("load");
        assert_eq!(ledger.rows().len(), 2);
        assert_eq!(ledger.rows()[0].description, "Cafe");
        assert_eq!(ledger.rows()[1].amount, -25.5);
        assert_eq!(ledger.rows()[0].date, date!(2024 - 01 - 02));
    }

    #[test]
    fn accepts_all_three_date_shapes() {
        assert_eq!(parse_date("2024-02-29"), Some(date!(2024 - 02 - 29)));
        assert_eq!(
            parse_date("2024-02-29 13:45:01"),
            Some(date!(2024 - 02 - 29))
        );
        assert_eq!(parse_date("02/29/2024"), Some(date!(2024 - 02 - 29)));
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn out_of_order_ledger_loads_fully_and_is_flagged() {
        let file = write_ledger(
            "Date,Description,Amount\n\
             2024-01-05,Cafe,-10\n\
             2024-01-02,Store,-5\n\
             2024-01-08,Deli,-1\n",
        );
        let ledger = Ledger::load(file.path()).expect("load");
        // Every row survives in file order; only the flag records the jump.
        assert_eq!(ledger.rows().len(), 3);
        assert_eq!(ledger.rows()[1].description, "Store");
        assert_eq!(ledger.first_out_of_order_line(), Some(3));
    }

    #[test]
    fn sorted_ledger_is_not_flagged() {
        let file = write_ledger(
            "Date,Description,Amount\n\
             2024-01-02,Cafe,-10\n\
             2024-01-02,Store,-5\n\
             2024-01-03,Deli,-1\n",
        );
        let ledger = Ledger::load(file.path()).expect("load");
        assert_eq!(ledger.first_out_of_order_line(), None);
    }

    #[test]
    fn bad_amount_skips_row() {
        let file = write_ledger(
            "Date,Description,Amount\n\
             2024-01-02,Cafe,oops\n\
             2024-01-03,Store,-25\n",
        );
        let ledger = Ledger::load(file.path()).expect("load");
        assert_eq!(ledger.rows().len(), 1);
        assert_eq!(ledger.rows()[0].description, "Store");
    }

    #[test]
    fn bad_date_fails_load() {
        let file = write_ledger(
            "Date,Description,Amount\n\
             someday,Cafe,-10\n",
        );
        let err = Ledger::load(file.path()).unwrap_err();
        assert!(matches!(err, StoreError::BadDate { .. }));
    }

    #[test]
    fn missing_column_fails_load() {
        let file = write_ledger("Date,Vendor,Amount\n2024-01-02,Cafe,-10\n");
        let err = Ledger::load(file.path()).unwrap_err();
        assert!(matches!(err, StoreError::MissingColumn("description")));
    }

    #[test]
    fn vendors_are_sorted_and_distinct() {
        let ledger = Ledger::from_rows(vec![
            Transaction {
                date: date!(2024 - 01 - 02),
                description: "Store".into(),
                amount: -1.0,
            },
            Transaction {
                date: date!(2024 - 01 - 03),
                description: "Cafe".into(),
                amount: -2.0,
            },
            Transaction {
                date: date!(2024 - 01 - 04),
                description: "Cafe".into(),
                amount: -3.0,
            },
        ]);
        assert_eq!(ledger.vendors(), vec!["Cafe".to_string(), "Store".to_string()]);
        assert_eq!(
            ledger.date_span(),
            Some((date!(2024 - 01 - 02), date!(2024 - 01 - 04)))
        );
    }
}
