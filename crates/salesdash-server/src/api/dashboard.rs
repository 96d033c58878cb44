use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use rust_decimal::Decimal;
use salesdash_core::{
    clamp_top_sellers, format_number, format_revenue, CategoryTotal, Dashboard, FilterOptions,
    FilterSet, LocationTotal, MonthTotal, Region, SellerSummary, SourceQuery, TextField,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    empty_as_none, map_core_error, map_source_error, split_list, ApiError, ApiResponse, AppState,
};

#[derive(Debug, Deserialize)]
pub(super) struct DashboardQuery {
    pub region: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub year: Option<i32>,
    /// Comma-separated seller names. Absent or empty keeps every seller.
    pub sellers: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub top_sellers: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(super) struct Metrics {
    revenue: Decimal,
    revenue_formatted: String,
    sales: u64,
    sales_formatted: String,
}

#[derive(Debug, Serialize)]
pub(super) struct RevenueTab {
    by_location: Vec<LocationTotal<Decimal>>,
    by_month: Vec<MonthTotal<Decimal>>,
    top_locations: Vec<LocationTotal<Decimal>>,
    by_category: Vec<CategoryTotal<Decimal>>,
}

#[derive(Debug, Serialize)]
pub(super) struct SalesTab {
    by_location: Vec<LocationTotal<u64>>,
    by_month: Vec<MonthTotal<u64>>,
    top_locations: Vec<LocationTotal<u64>>,
    by_category: Vec<CategoryTotal<u64>>,
}

#[derive(Debug, Serialize)]
pub(super) struct SellersTab {
    top: usize,
    by_revenue: Vec<SellerSummary>,
    by_sales: Vec<SellerSummary>,
}

#[derive(Debug, Serialize)]
pub(super) struct DashboardData {
    region: &'static str,
    year: Option<i32>,
    /// Every seller in the fetched data, before the seller filter.
    available_sellers: Vec<String>,
    metrics: Metrics,
    revenue: RevenueTab,
    sales: SalesTab,
    sellers: SellersTab,
}

impl DashboardData {
    fn new(
        query: SourceQuery,
        available_sellers: Vec<String>,
        dashboard: Dashboard,
        top: usize,
    ) -> Self {
        let metrics = Metrics {
            revenue: dashboard.revenue,
            revenue_formatted: format_revenue(dashboard.revenue),
            sales: dashboard.sales,
            sales_formatted: format_number(Decimal::from(dashboard.sales), ""),
        };
        let sellers = SellersTab {
            top,
            by_revenue: dashboard.top_sellers_by_revenue(top),
            by_sales: dashboard.top_sellers_by_sales(top),
        };
        let revenue_top = dashboard.top_locations_by_revenue().to_vec();
        let sales_top = dashboard.top_locations_by_sales().to_vec();

        Self {
            region: query.region.name(),
            year: query.year,
            available_sellers,
            metrics,
            revenue: RevenueTab {
                by_location: dashboard.revenue_by_location,
                by_month: dashboard.revenue_by_month,
                top_locations: revenue_top,
                by_category: dashboard.revenue_by_category,
            },
            sales: SalesTab {
                by_location: dashboard.sales_by_location,
                by_month: dashboard.sales_by_month,
                top_locations: sales_top,
                by_category: dashboard.sales_by_category,
            },
            sellers,
        }
    }
}

pub(super) async fn get_dashboard(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<DashboardData>>, ApiError> {
    let Query(query) =
        query.map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;

    let region = query
        .region
        .as_deref()
        .unwrap_or_default()
        .parse::<Region>()
        .map_err(|e| map_core_error(req_id.0.clone(), &e))?;
    let source_query =
        SourceQuery::new(region, query.year).map_err(|e| map_core_error(req_id.0.clone(), &e))?;
    let top = clamp_top_sellers(query.top_sellers);

    let records = state
        .source
        .fetch_records(&source_query)
        .await
        .map_err(|e| map_source_error(req_id.0.clone(), &e))?;

    let available_sellers = FilterOptions::observe(&records).sellers;
    let filtered = FilterSet::new()
        .one_of(TextField::Seller, split_list(query.sellers.as_deref()))
        .apply(&records);
    let dashboard = Dashboard::build(&filtered);

    Ok(Json(ApiResponse::new(
        DashboardData::new(source_query, available_sellers, dashboard, top),
        req_id.0,
    )))
}
