use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use salesdash_core::{
    export_file_name, to_csv, Column, FilterOptions, RawViewFilter, RecordTable, SaleRecord,
    SourceQuery,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    empty_as_none, map_core_error, map_source_error, split_list, ApiError, ApiResponse, AppState,
};

/// Query string of the raw-data routes. List values are comma-separated.
#[derive(Debug, Default, Deserialize)]
pub(super) struct RawRecordsQuery {
    pub products: Option<String>,
    pub categories: Option<String>,
    pub sellers: Option<String>,
    pub locations: Option<String>,
    pub payment_types: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub price_min: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub price_max: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub freight_min: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub freight_max: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub rating_min: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub rating_max: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub installments_min: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub installments_max: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub to: Option<NaiveDate>,
    pub columns: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct RecordsData {
    columns: Vec<&'static str>,
    rows: Vec<Vec<String>>,
    row_count: usize,
    column_count: usize,
}

impl From<RecordTable> for RecordsData {
    fn from(table: RecordTable) -> Self {
        Self {
            columns: table.headers(),
            row_count: table.row_count(),
            column_count: table.column_count(),
            rows: table.rows,
        }
    }
}

impl RawRecordsQuery {
    pub(super) fn view_filter(&self) -> RawViewFilter {
        let list = |raw: Option<&str>| raw.map(|r| split_list(Some(r)));
        RawViewFilter {
            products: list(self.products.as_deref()),
            categories: list(self.categories.as_deref()),
            sellers: list(self.sellers.as_deref()),
            locations: list(self.locations.as_deref()),
            payment_types: list(self.payment_types.as_deref()),
            price: (self.price_min, self.price_max),
            freight: (self.freight_min, self.freight_max),
            rating: (self.rating_min, self.rating_max),
            installments: (self.installments_min, self.installments_max),
            from: self.from,
            to: self.to,
        }
    }
}

/// Fetches every record and projects the filtered rows onto the requested
/// columns.
async fn filtered_table(
    state: &AppState,
    req_id: &str,
    query: &RawRecordsQuery,
) -> Result<RecordTable, ApiError> {
    let columns = Column::parse_list(query.columns.as_deref().unwrap_or_default())
        .map_err(|e| map_core_error(req_id.to_owned(), &e))?;

    let records: Vec<SaleRecord> = state
        .source
        .fetch_records(&SourceQuery::default())
        .await
        .map_err(|e| map_source_error(req_id.to_owned(), &e))?;

    let options = FilterOptions::observe(&records);
    let filter = query
        .view_filter()
        .to_filter_set(&options)
        .map_err(|e| map_core_error(req_id.to_owned(), &e))?;
    let filtered = filter.apply(&records);

    tracing::debug!(
        fetched = records.len(),
        kept = filtered.len(),
        columns = columns.len(),
        "raw records filtered"
    );
    Ok(RecordTable::project(&filtered, &columns))
}

pub(super) async fn list_records(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<RawRecordsQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<RecordsData>>, ApiError> {
    let Query(query) =
        query.map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;

    let table = filtered_table(&state, &req_id.0, &query).await?;

    Ok(Json(ApiResponse::new(RecordsData::from(table), req_id.0)))
}

pub(super) async fn export_records(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<RawRecordsQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) =
        query.map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;

    let file_name = export_file_name(query.file_name.as_deref());
    let disposition = HeaderValue::from_bytes(
        format!("attachment; filename=\"{file_name}\"").as_bytes(),
    )
    .map_err(|_| {
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            format!("file name {file_name:?} cannot be used in a header"),
        )
    })?;

    let table = filtered_table(&state, &req_id.0, &query).await?;
    let body = to_csv(&table).map_err(|e| map_core_error(req_id.0.clone(), &e))?;

    tracing::info!(rows = table.row_count(), file_name = %file_name, "CSV export");

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
