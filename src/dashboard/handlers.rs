use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use time::macros::format_description;
use tracing::instrument;

use crate::{
    dashboard::{
        dto::{FilterOptions, FilterParams},
        engine::{self, DerivedRow, SpendSummary},
        filter, series,
    },
    notify::alert::maybe_send_low_balance_alert,
    session::SessionContext,
    state::AppState,
};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/summary", get(summary))
        .route("/dashboard/transactions", get(transactions))
        .route("/dashboard/series/balance", get(balance_series))
        .route("/dashboard/series/daily", get(daily_series))
        .route("/dashboard/series/monthly", get(monthly_series))
        .route("/dashboard/series/vendors", get(vendor_series))
        .route("/dashboard/top-vendors", get(top_vendors))
        .route("/dashboard/filters", get(filter_options))
        .route("/dashboard/export", get(export_csv))
}

// Full pipeline for one request: derive over the whole ledger, then select.
fn filtered(state: &AppState, params: &FilterParams) -> Vec<DerivedRow> {
    let derived = engine::derive(state.ledger.rows(), state.config.initial_credit);
    filter::apply(
        &derived,
        params.start_date,
        params.end_date,
        params.vendor_filter(),
    )
}

#[instrument(skip(state, ctx))]
pub async fn summary(
    State(state): State<AppState>,
    ctx: SessionContext,
    Query(params): Query<FilterParams>,
) -> Json<SpendSummary> {
    let subset = filtered(&state, &params);
    let summary = engine::summarize(&subset, state.config.initial_credit);
    maybe_send_low_balance_alert(&state, &ctx, summary.current_balance).await;
    Json(summary)
}

#[instrument(skip(state, _ctx))]
pub async fn transactions(
    State(state): State<AppState>,
    _ctx: SessionContext,
    Query(params): Query<FilterParams>,
) -> Json<Vec<DerivedRow>> {
    Json(filtered(&state, &params))
}

#[instrument(skip(state, _ctx))]
pub async fn balance_series(
    State(state): State<AppState>,
    _ctx: SessionContext,
    Query(params): Query<FilterParams>,
) -> Json<Vec<series::BalancePoint>> {
    Json(series::balance_over_time(&filtered(&state, &params)))
}

#[instrument(skip(state, _ctx))]
pub async fn daily_series(
    State(state): State<AppState>,
    _ctx: SessionContext,
    Query(params): Query<FilterParams>,
) -> Json<Vec<series::SpendBucket>> {
    Json(series::daily_spend(&filtered(&state, &params)))
}

#[instrument(skip(state, _ctx))]
pub async fn monthly_series(
    State(state): State<AppState>,
    _ctx: SessionContext,
    Query(params): Query<FilterParams>,
) -> Json<Vec<series::SpendBucket>> {
    Json(series::monthly_spend(&filtered(&state, &params)))
}

#[instrument(skip(state, _ctx))]
pub async fn vendor_series(
    State(state): State<AppState>,
    _ctx: SessionContext,
    Query(params): Query<FilterParams>,
) -> Json<Vec<series::VendorSlice>> {
    Json(series::vendor_breakdown(&filtered(&state, &params)))
}

#[instrument(skip(state, _ctx))]
pub async fn top_vendors(
    State(state): State<AppState>,
    _ctx: SessionContext,
    Query(params): Query<FilterParams>,
) -> Json<Vec<series::VendorVisits>> {
    Json(series::top_vendors(&filtered(&state, &params)))
}

#[instrument(skip(state, _ctx))]
pub async fn filter_options(
    State(state): State<AppState>,
    _ctx: SessionContext,
) -> Json<FilterOptions> {
    let span = state.ledger.date_span();
    Json(FilterOptions {
        vendors: state.ledger.vendors(),
        min_date: span.map(|(min, _)| min),
        max_date: span.map(|(_, max)| max),
    })
}

#[instrument(skip(state, _ctx))]
pub async fn export_csv(
    State(state): State<AppState>,
    _ctx: SessionContext,
    Query(params): Query<FilterParams>,
) -> Result<(HeaderMap, Bytes), (StatusCode, String)> {
    let subset = filtered(&state, &params);
    let body = write_export(&subset).map_err(internal)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        "text/csv; charset=utf-8".parse().unwrap(),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        "attachment; filename=\"filtered_transactions.csv\""
            .parse()
            .unwrap(),
    );
    Ok((headers, Bytes::from(body)))
}

fn write_export(subset: &[DerivedRow]) -> anyhow::Result<Vec<u8>> {
    let date_fmt = format_description!("[year]-[month]-[day]");
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Date", "Description", "Amount", "CumulativeSpend", "Balance"])?;
    for row in subset {
        writer.write_record([
            row.date.format(date_fmt)?,
            row.description.clone(),
            format!("{:.2}", row.amount),
            format!("{:.2}", row.cumulative_spend),
            format!("{:.2}", row.balance),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing export buffer: {e}"))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
