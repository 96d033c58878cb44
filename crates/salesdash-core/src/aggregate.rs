//! Aggregation Engine: group-by/reduce over a (filtered) record collection.
//!
//! Every table is computed independently from the records it is given.
//! Revenue is an exact [`Decimal`] sum of `price`; counts are `u64`.
//! Groups are discovered in first-seen order and sorted with a stable sort,
//! so rows with equal values keep that order.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::ops::AddAssign;

use chrono::{Datelike, Month, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::record::SaleRecord;

/// Revenue or sale count for one purchase location, with its coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationTotal<V> {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub value: V,
}

/// Revenue or sale count for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthTotal<V> {
    pub year: i32,
    pub month: u32,
    /// English month name, e.g. `"January"`.
    pub month_name: String,
    /// Last day of the month; the bucket label.
    pub month_end: NaiveDate,
    pub value: V,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal<V> {
    pub category: String,
    pub value: V,
}

/// Revenue and number of sales of one seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerSummary {
    pub seller: String,
    pub revenue: Decimal,
    pub sales: u64,
}

/// Groups `records` by `key` and folds each group with `fold`, starting
/// from `init`. Groups are returned in the order their key first appears.
pub(crate) fn group_by<K, V, FK, FF>(
    records: &[SaleRecord],
    key: FK,
    init: V,
    fold: FF,
) -> Vec<(K, V)>
where
    K: Eq + Hash + Clone,
    V: Clone,
    FK: Fn(&SaleRecord) -> K,
    FF: Fn(&mut V, &SaleRecord),
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, V)> = Vec::new();
    for record in records {
        let k = key(record);
        let slot = *index.entry(k.clone()).or_insert_with(|| {
            groups.push((k, init.clone()));
            groups.len() - 1
        });
        fold(&mut groups[slot].1, record);
    }
    groups
}

fn sort_descending<T, V: Ord>(rows: &mut [T], value: impl Fn(&T) -> &V) {
    rows.sort_by(|a, b| value(b).cmp(value(a)));
}

fn by_location<V>(
    records: &[SaleRecord],
    measure: impl Fn(&SaleRecord) -> V,
    zero: V,
) -> Vec<LocationTotal<V>>
where
    V: Copy + Ord + AddAssign,
{
    // The first record seen for a location supplies its coordinates.
    let mut rows: Vec<LocationTotal<V>> = group_by(
        records,
        |r| r.location.clone(),
        None::<(f64, f64, V)>,
        |acc, r| acc.get_or_insert((r.latitude, r.longitude, zero)).2 += measure(r),
    )
    .into_iter()
    .filter_map(|(location, acc)| {
        acc.map(|(latitude, longitude, value)| LocationTotal {
            location,
            latitude,
            longitude,
            value,
        })
    })
    .collect();
    sort_descending(&mut rows, |row| &row.value);
    rows
}

fn by_month<V>(
    records: &[SaleRecord],
    measure: impl Fn(&SaleRecord) -> V,
    zero: V,
) -> Vec<MonthTotal<V>>
where
    V: Copy + AddAssign,
{
    let mut buckets: BTreeMap<(i32, u32), V> = BTreeMap::new();
    for record in records {
        let d = record.purchase_date;
        *buckets.entry((d.year(), d.month())).or_insert(zero) += measure(record);
    }

    let (Some(&first), Some(&last)) = (buckets.keys().next(), buckets.keys().next_back()) else {
        return Vec::new();
    };

    // Months without sales between the first and last one still get a zero bucket.
    let mut rows = Vec::new();
    let mut cursor = first;
    while cursor <= last {
        let (year, month) = cursor;
        if let (Some(month_end), Some(month_name)) = (month_end(year, month), month_name(month)) {
            rows.push(MonthTotal {
                year,
                month,
                month_name: month_name.to_string(),
                month_end,
                value: buckets.get(&cursor).copied().unwrap_or(zero),
            });
        }
        cursor = next_month(year, month);
    }
    rows
}

fn by_category<V>(
    records: &[SaleRecord],
    measure: impl Fn(&SaleRecord) -> V,
    zero: V,
) -> Vec<CategoryTotal<V>>
where
    V: Copy + Ord + AddAssign,
{
    let mut rows: Vec<CategoryTotal<V>> = group_by(
        records,
        |r| r.category.clone(),
        zero,
        |total, r| *total += measure(r),
    )
    .into_iter()
    .map(|(category, value)| CategoryTotal { category, value })
    .collect();
    sort_descending(&mut rows, |row| &row.value);
    rows
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Last calendar day of `year`-`month`.
pub(crate) fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (ny, nm) = next_month(year, month);
    NaiveDate::from_ymd_opt(ny, nm, 1)?.pred_opt()
}

fn month_name(month: u32) -> Option<&'static str> {
    let month = Month::try_from(u8::try_from(month).ok()?).ok()?;
    Some(month.name())
}

fn revenue(record: &SaleRecord) -> Decimal {
    record.price
}

fn one(_: &SaleRecord) -> u64 {
    1
}

/// Sum of `price` over every record.
#[must_use]
pub fn total_revenue(records: &[SaleRecord]) -> Decimal {
    records.iter().map(|r| r.price).sum()
}

/// Revenue per purchase location, highest first.
#[must_use]
pub fn revenue_by_location(records: &[SaleRecord]) -> Vec<LocationTotal<Decimal>> {
    by_location(records, revenue, Decimal::ZERO)
}

/// Revenue per calendar month, in chronological order.
#[must_use]
pub fn revenue_by_month(records: &[SaleRecord]) -> Vec<MonthTotal<Decimal>> {
    by_month(records, revenue, Decimal::ZERO)
}

/// Revenue per product category, highest first.
#[must_use]
pub fn revenue_by_category(records: &[SaleRecord]) -> Vec<CategoryTotal<Decimal>> {
    by_category(records, revenue, Decimal::ZERO)
}

/// Number of sales per purchase location, highest first.
#[must_use]
pub fn sales_by_location(records: &[SaleRecord]) -> Vec<LocationTotal<u64>> {
    by_location(records, one, 0)
}

/// Number of sales per calendar month, in chronological order.
#[must_use]
pub fn sales_by_month(records: &[SaleRecord]) -> Vec<MonthTotal<u64>> {
    by_month(records, one, 0)
}

/// Number of sales per product category, highest first.
#[must_use]
pub fn sales_by_category(records: &[SaleRecord]) -> Vec<CategoryTotal<u64>> {
    by_category(records, one, 0)
}

/// Revenue and sale count per seller, ordered by seller name.
#[must_use]
pub fn seller_summary(records: &[SaleRecord]) -> Vec<SellerSummary> {
    let mut rows: Vec<SellerSummary> = group_by(
        records,
        |r| r.seller.clone(),
        (Decimal::ZERO, 0u64),
        |(revenue, sales), r| {
            *revenue += r.price;
            *sales += 1;
        },
    )
    .into_iter()
    .map(|(seller, (revenue, sales))| SellerSummary {
        seller,
        revenue,
        sales,
    })
    .collect();
    rows.sort_by(|a, b| a.seller.cmp(&b.seller));
    rows
}

/// The `n` sellers with the highest revenue.
#[must_use]
pub fn top_sellers_by_revenue(summary: &[SellerSummary], n: usize) -> Vec<SellerSummary> {
    let mut rows = summary.to_vec();
    sort_descending(&mut rows, |row| &row.revenue);
    rows.truncate(n);
    rows
}

/// The `n` sellers with the most sales.
#[must_use]
pub fn top_sellers_by_sales(summary: &[SellerSummary], n: usize) -> Vec<SellerSummary> {
    let mut rows = summary.to_vec();
    sort_descending(&mut rows, |row| &row.sales);
    rows.truncate(n);
    rows
}
