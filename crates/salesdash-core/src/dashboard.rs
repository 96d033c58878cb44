//! Every table and metric the dashboard shows, computed from one filtered
//! record collection.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::{
    revenue_by_category, revenue_by_location, revenue_by_month, sales_by_category,
    sales_by_location, sales_by_month, seller_summary, top_sellers_by_revenue,
    top_sellers_by_sales, total_revenue, CategoryTotal, LocationTotal, MonthTotal, SellerSummary,
};
use crate::record::SaleRecord;

/// Number of locations in the "top locations" charts.
pub const TOP_LOCATIONS: usize = 5;
pub const DEFAULT_TOP_SELLERS: usize = 5;
pub const MIN_TOP_SELLERS: usize = 2;
pub const MAX_TOP_SELLERS: usize = 10;

/// Clamps a requested seller-chart size into `2..=10`, defaulting to 5.
#[must_use]
pub fn clamp_top_sellers(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_TOP_SELLERS)
        .clamp(MIN_TOP_SELLERS, MAX_TOP_SELLERS)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub revenue: Decimal,
    pub sales: u64,
    pub revenue_by_location: Vec<LocationTotal<Decimal>>,
    pub revenue_by_month: Vec<MonthTotal<Decimal>>,
    pub revenue_by_category: Vec<CategoryTotal<Decimal>>,
    pub sales_by_location: Vec<LocationTotal<u64>>,
    pub sales_by_month: Vec<MonthTotal<u64>>,
    pub sales_by_category: Vec<CategoryTotal<u64>>,
    pub sellers: Vec<SellerSummary>,
}

impl Dashboard {
    #[must_use]
    pub fn build(records: &[SaleRecord]) -> Self {
        Self {
            revenue: total_revenue(records),
            sales: records.len() as u64,
            revenue_by_location: revenue_by_location(records),
            revenue_by_month: revenue_by_month(records),
            revenue_by_category: revenue_by_category(records),
            sales_by_location: sales_by_location(records),
            sales_by_month: sales_by_month(records),
            sales_by_category: sales_by_category(records),
            sellers: seller_summary(records),
        }
    }

    #[must_use]
    pub fn top_locations_by_revenue(&self) -> &[LocationTotal<Decimal>] {
        let n = self.revenue_by_location.len().min(TOP_LOCATIONS);
        &self.revenue_by_location[..n]
    }

    #[must_use]
    pub fn top_locations_by_sales(&self) -> &[LocationTotal<u64>] {
        let n = self.sales_by_location.len().min(TOP_LOCATIONS);
        &self.sales_by_location[..n]
    }

    #[must_use]
    pub fn top_sellers_by_revenue(&self, n: usize) -> Vec<SellerSummary> {
        top_sellers_by_revenue(&self.sellers, n)
    }

    #[must_use]
    pub fn top_sellers_by_sales(&self, n: usize) -> Vec<SellerSummary> {
        top_sellers_by_sales(&self.sellers, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sale;

    #[test]
    fn empty_collection_builds_an_empty_dashboard() {
        let dashboard = Dashboard::build(&[]);
        assert_eq!(dashboard.revenue, Decimal::ZERO);
        assert_eq!(dashboard.sales, 0);
        assert!(dashboard.revenue_by_location.is_empty());
        assert!(dashboard.revenue_by_month.is_empty());
        assert!(dashboard.revenue_by_category.is_empty());
        assert!(dashboard.sales_by_location.is_empty());
        assert!(dashboard.sales_by_month.is_empty());
        assert!(dashboard.sales_by_category.is_empty());
        assert!(dashboard.sellers.is_empty());
        assert!(dashboard.top_locations_by_revenue().is_empty());
        assert!(dashboard.top_sellers_by_sales(5).is_empty());
    }

    #[test]
    fn top_locations_are_capped_at_five() {
        let records: Vec<SaleRecord> = ["AC", "AL", "AM", "AP", "BA", "CE", "DF"]
            .iter()
            .zip(1..)
            .map(|(loc, price)| sale(loc, price))
            .collect();
        let dashboard = Dashboard::build(&records);
        let top: Vec<&str> = dashboard
            .top_locations_by_revenue()
            .iter()
            .map(|r| r.location.as_str())
            .collect();
        assert_eq!(top, vec!["DF", "CE", "BA", "AP", "AM"]);
        assert_eq!(dashboard.top_locations_by_sales().len(), 5);
    }

    #[test]
    fn totals_match_the_collection() {
        let records = vec![sale("SP", 100), sale("SP", 50), sale("RJ", 30)];
        let dashboard = Dashboard::build(&records);
        assert_eq!(dashboard.revenue, Decimal::from(180));
        assert_eq!(dashboard.sales, 3);
    }

    #[test]
    fn top_sellers_request_is_clamped() {
        assert_eq!(clamp_top_sellers(None), 5);
        assert_eq!(clamp_top_sellers(Some(1)), 2);
        assert_eq!(clamp_top_sellers(Some(7)), 7);
        assert_eq!(clamp_top_sellers(Some(50)), 10);
    }
}
