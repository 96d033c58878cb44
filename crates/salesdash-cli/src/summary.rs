//! `summary`: fetch, filter by seller, and print the dashboard as text tables.

use clap::Args;
use salesdash_core::{
    clamp_top_sellers, format_number, format_revenue, Dashboard, FilterSet, Region,
    SellerSummary, SourceQuery, TextField,
};
use salesdash_source::SalesApiClient;

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// Region to fetch (Brasil, Centro-Oeste, Nordeste, Norte, Sudeste, Sul)
    #[arg(long)]
    pub region: Option<Region>,
    /// Single year to fetch (2020-2023); every year when omitted
    #[arg(long)]
    pub year: Option<i32>,
    /// Keep only this seller; repeat for several
    #[arg(long = "seller")]
    pub sellers: Vec<String>,
    /// Size of the seller rankings (2-10)
    #[arg(long)]
    pub top: Option<usize>,
}

/// Fetch the records for the selected region and year and print the summary.
///
/// # Errors
///
/// Returns an error if the year is out of range or the fetch fails.
pub(crate) async fn run_summary(
    client: &SalesApiClient,
    args: &SummaryArgs,
) -> anyhow::Result<()> {
    let query = SourceQuery::new(args.region.unwrap_or_default(), args.year)?;
    let records = client.fetch_records(&query).await?;

    let filtered = FilterSet::new()
        .one_of(TextField::Seller, args.sellers.iter().cloned())
        .apply(&records);
    tracing::debug!(
        fetched = records.len(),
        kept = filtered.len(),
        "seller filter applied"
    );

    let dashboard = Dashboard::build(&filtered);
    for line in render_summary(&query, &dashboard, clamp_top_sellers(args.top)) {
        println!("{line}");
    }
    Ok(())
}

/// Two-column text table under an upper-case title.
fn section(title: &str, headers: (&str, &str), rows: Vec<(String, String)>) -> Vec<String> {
    let mut lines = vec![String::new(), title.to_uppercase()];
    if rows.is_empty() {
        lines.push("(no sales)".to_string());
        return lines;
    }
    lines.push(format!("{:<28}{}", headers.0, headers.1));
    lines.extend(rows.into_iter().map(|(k, v)| format!("{k:<28}{v}")));
    lines
}

fn seller_rows(sellers: &[SellerSummary]) -> Vec<(String, String)> {
    sellers
        .iter()
        .map(|s| {
            (
                s.seller.clone(),
                format!("{} / {}", format_revenue(s.revenue), s.sales),
            )
        })
        .collect()
}

pub(crate) fn render_summary(
    query: &SourceQuery,
    dashboard: &Dashboard,
    top: usize,
) -> Vec<String> {
    let year = query
        .year
        .map_or_else(|| "all".to_string(), |y| y.to_string());
    let mut lines = vec![
        format!("Region: {}  Year: {year}", query.region),
        format!(
            "Revenue: {}  Sales: {}",
            format_revenue(dashboard.revenue),
            format_number(dashboard.sales.into(), "")
        ),
    ];

    lines.extend(section(
        "Revenue by location",
        ("LOCATION", "REVENUE"),
        dashboard
            .revenue_by_location
            .iter()
            .map(|r| (r.location.clone(), r.value.to_string()))
            .collect(),
    ));
    lines.extend(section(
        "Monthly revenue",
        ("MONTH", "REVENUE"),
        dashboard
            .revenue_by_month
            .iter()
            .map(|m| (format!("{} {}", m.year, m.month_name), m.value.to_string()))
            .collect(),
    ));
    lines.extend(section(
        "Revenue by category",
        ("CATEGORY", "REVENUE"),
        dashboard
            .revenue_by_category
            .iter()
            .map(|c| (c.category.clone(), c.value.to_string()))
            .collect(),
    ));
    lines.extend(section(
        "Sales by location",
        ("LOCATION", "SALES"),
        dashboard
            .sales_by_location
            .iter()
            .map(|r| (r.location.clone(), r.value.to_string()))
            .collect(),
    ));
    lines.extend(section(
        "Monthly sales",
        ("MONTH", "SALES"),
        dashboard
            .sales_by_month
            .iter()
            .map(|m| (format!("{} {}", m.year, m.month_name), m.value.to_string()))
            .collect(),
    ));
    lines.extend(section(
        "Sales by category",
        ("CATEGORY", "SALES"),
        dashboard
            .sales_by_category
            .iter()
            .map(|c| (c.category.clone(), c.value.to_string()))
            .collect(),
    ));
    lines.extend(section(
        &format!("Top {top} sellers by revenue"),
        ("SELLER", "REVENUE / SALES"),
        seller_rows(&dashboard.top_sellers_by_revenue(top)),
    ));
    lines.extend(section(
        &format!("Top {top} sellers by sales"),
        ("SELLER", "REVENUE / SALES"),
        seller_rows(&dashboard.top_sellers_by_sales(top)),
    ));
    lines
}
