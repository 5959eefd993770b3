//! Tabular export of normalized records.
//!
//! Decimals are rendered as their exact string form and dates as ISO strings,
//! so no value passes through floating point on the way out.

use polars::prelude::{Column, DataFrame};

use crate::{
    error::{FilingsError, Result},
    types::{NormalizedHolding, NormalizedStatementLineItem},
};

/// Converts statement line items into a DataFrame.
///
/// Columns: category, label, tag, taxonomy, value, unit, fiscal_year,
/// fiscal_period, fiscal_quarter, period_start, period_end, is_instant,
/// accession, form, filed.
///
/// # Errors
/// Returns [`FilingsError::Other`] if polars rejects the columns.
pub fn line_items_frame(items: &[NormalizedStatementLineItem]) -> Result<DataFrame> {
    let columns = vec![
        Column::new(
            "category".into(),
            items.iter().map(|i| i.category.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            "label".into(),
            items.iter().map(|i| i.label.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "tag".into(),
            items.iter().map(|i| i.tag.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "taxonomy".into(),
            items.iter().map(|i| i.taxonomy.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "value".into(),
            items.iter().map(|i| i.value.to_string()).collect::<Vec<_>>(),
        ),
        Column::new(
            "unit".into(),
            items.iter().map(|i| i.unit.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "fiscal_year".into(),
            items.iter().map(|i| i.fiscal_year).collect::<Vec<_>>(),
        ),
        Column::new(
            "fiscal_period".into(),
            items
                .iter()
                .map(|i| i.fiscal_period.clone())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "fiscal_quarter".into(),
            items
                .iter()
                .map(|i| i.fiscal_quarter.map(i32::from))
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "period_start".into(),
            items
                .iter()
                .map(|i| i.period_start.map(|d| d.to_string()))
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "period_end".into(),
            items
                .iter()
                .map(|i| i.period_end.to_string())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "is_instant".into(),
            items.iter().map(|i| i.is_instant()).collect::<Vec<_>>(),
        ),
        Column::new(
            "accession".into(),
            items
                .iter()
                .map(|i| i.accession.as_ref().map(ToString::to_string))
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "form".into(),
            items.iter().map(|i| i.form.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "filed".into(),
            items
                .iter()
                .map(|i| i.filed.map(|d| d.to_string()))
                .collect::<Vec<_>>(),
        ),
    ];

    DataFrame::new(columns).map_err(|e| FilingsError::Other(e.to_string()))
}

/// Converts holdings into a DataFrame.
///
/// Columns: cusip, issuer_name, ticker, title_of_class, shares, share_type,
/// market_value, put_call, investment_discretion, sole, shared, none,
/// report_date.
///
/// # Errors
/// Returns [`FilingsError::Other`] if polars rejects the columns.
pub fn holdings_frame(holdings: &[NormalizedHolding]) -> Result<DataFrame> {
    let columns = vec![
        Column::new(
            "cusip".into(),
            holdings.iter().map(|h| h.cusip.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "issuer_name".into(),
            holdings
                .iter()
                .map(|h| h.issuer_name.clone())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "ticker".into(),
            holdings.iter().map(|h| h.ticker.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "title_of_class".into(),
            holdings
                .iter()
                .map(|h| h.title_of_class.clone())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "shares".into(),
            holdings
                .iter()
                .map(|h| h.shares.to_string())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "share_type".into(),
            holdings
                .iter()
                .map(|h| h.share_type.clone())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "market_value".into(),
            holdings
                .iter()
                .map(|h| h.market_value.to_string())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "put_call".into(),
            holdings
                .iter()
                .map(|h| h.put_call.as_str())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "investment_discretion".into(),
            holdings
                .iter()
                .map(|h| h.investment_discretion.clone())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "sole".into(),
            holdings
                .iter()
                .map(|h| h.discretion.sole.to_string())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "shared".into(),
            holdings
                .iter()
                .map(|h| h.discretion.shared.to_string())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "none".into(),
            holdings
                .iter()
                .map(|h| h.discretion.none.to_string())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "report_date".into(),
            holdings
                .iter()
                .map(|h| h.report_date.map(|d| d.to_string()))
                .collect::<Vec<_>>(),
        ),
    ];

    DataFrame::new(columns).map_err(|e| FilingsError::Other(e.to_string()))
}
