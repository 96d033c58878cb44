use axum::{extract::State, Extension, Json};
use chrono::NaiveDate;
use salesdash_core::{
    filter::{
        DEFAULT_FREIGHT_RANGE, DEFAULT_INSTALLMENTS_RANGE, DEFAULT_PRICE_RANGE,
        DEFAULT_RATING_RANGE,
    },
    Column, FilterOptions, Region, SourceQuery, MAX_YEAR, MIN_YEAR,
};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_source_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct Range<T> {
    min: T,
    max: T,
}

impl From<(i64, i64)> for Range<i64> {
    fn from((min, max): (i64, i64)) -> Self {
        Self { min, max }
    }
}

/// Selector contents for both dashboard pages.
#[derive(Debug, Serialize)]
pub(super) struct FilterOptionsData {
    regions: Vec<&'static str>,
    years: Range<i32>,
    columns: Vec<&'static str>,
    products: Vec<String>,
    categories: Vec<String>,
    sellers: Vec<String>,
    locations: Vec<String>,
    payment_types: Vec<String>,
    price: Range<i64>,
    freight: Range<i64>,
    rating: Range<i64>,
    installments: Range<i64>,
    purchase_date: Option<Range<NaiveDate>>,
}

impl From<FilterOptions> for FilterOptionsData {
    fn from(options: FilterOptions) -> Self {
        let purchase_date = match (options.first_date, options.last_date) {
            (Some(min), Some(max)) => Some(Range { min, max }),
            _ => None,
        };
        Self {
            regions: Region::ALL.iter().map(|r| r.name()).collect(),
            years: Range {
                min: MIN_YEAR,
                max: MAX_YEAR,
            },
            columns: Column::ALL.iter().map(|c| c.header()).collect(),
            products: options.products,
            categories: options.categories,
            sellers: options.sellers,
            locations: options.locations,
            payment_types: options.payment_types,
            price: DEFAULT_PRICE_RANGE.into(),
            freight: DEFAULT_FREIGHT_RANGE.into(),
            rating: DEFAULT_RATING_RANGE.into(),
            installments: DEFAULT_INSTALLMENTS_RANGE.into(),
            purchase_date,
        }
    }
}

pub(super) async fn get_filter_options(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<FilterOptionsData>>, ApiError> {
    let records = state
        .source
        .fetch_records(&SourceQuery::default())
        .await
        .map_err(|e| map_source_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        FilterOptions::observe(&records).into(),
        req_id.0,
    )))
}
