pub mod aggregate;
pub mod app_config;
pub mod config;
pub mod dashboard;
pub mod export;
pub mod filter;
pub mod format;
pub mod record;
pub mod table;

#[cfg(test)]
pub(crate) mod test_support;

use thiserror::Error;

pub use aggregate::{
    revenue_by_category, revenue_by_location, revenue_by_month, sales_by_category,
    sales_by_location, sales_by_month, seller_summary, CategoryTotal, LocationTotal, MonthTotal,
    SellerSummary,
};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use dashboard::{clamp_top_sellers, Dashboard, DEFAULT_TOP_SELLERS};
pub use export::{export_file_name, to_csv};
pub use filter::{FilterOptions, FilterSet, NumericField, Predicate, RawViewFilter, TextField};
pub use format::{format_number, format_revenue};
pub use record::{Region, SaleRecord, SourceQuery, MAX_YEAR, MIN_YEAR};
pub use table::{Column, RecordTable};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid region: {0}")]
    InvalidRegion(String),

    #[error("year {0} is outside the supported range {MIN_YEAR}..={MAX_YEAR}")]
    YearOutOfRange(i32),

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("invalid range for {field}: {low} > {high}")]
    InvalidRange {
        field: String,
        low: String,
        high: String,
    },

    #[error("CSV encoding error: {0}")]
    Csv(#[from] csv::Error),
}
