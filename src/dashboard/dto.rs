use serde::{Deserialize, Serialize};
use time::Date;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Filter query parameters shared by every dashboard data route. Omitted
/// bounds are unbounded; an omitted vendor or the literal `All` is the
/// wildcard.
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    #[serde(default, with = "iso_date::option")]
    pub start_date: Option<Date>,
    #[serde(default, with = "iso_date::option")]
    pub end_date: Option<Date>,
    #[serde(default)]
    pub vendor: Option<String>,
}

impl FilterParams {
    pub fn vendor_filter(&self) -> Option<&str> {
        match self.vendor.as_deref() {
            None | Some("All") | Some("") => None,
            other => other,
        }
    }
}

/// Vendor dropdown options plus the ledger's date span.
#[derive(Debug, Serialize)]
pub struct FilterOptions {
    pub vendors: Vec<String>,
    #[serde(with = "iso_date::option")]
    pub min_date: Option<Date>,
    #[serde(with = "iso_date::option")]
    pub max_date: Option<Date>,
}
