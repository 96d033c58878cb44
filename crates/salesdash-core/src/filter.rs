//! Filter Engine: a conjunction of typed predicates over [`SaleRecord`]s.
//!
//! A [`FilterSet`] is an immutable value built by the caller (the server
//! from query parameters, the CLI from flags) and applied to a record
//! collection in one pure call. Nothing here holds state between calls.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::record::SaleRecord;
use crate::CoreError;

/// Default price slider of the raw-data view, in reais.
pub const DEFAULT_PRICE_RANGE: (i64, i64) = (0, 5000);
/// Default freight slider of the raw-data view, in reais.
pub const DEFAULT_FREIGHT_RANGE: (i64, i64) = (0, 250);
pub const DEFAULT_RATING_RANGE: (i64, i64) = (1, 5);
pub const DEFAULT_INSTALLMENTS_RANGE: (i64, i64) = (1, 24);

/// String-valued record fields usable in membership predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    Product,
    Category,
    Seller,
    Location,
    PaymentType,
}

impl TextField {
    pub const ALL: [TextField; 5] = [
        TextField::Product,
        TextField::Category,
        TextField::Seller,
        TextField::Location,
        TextField::PaymentType,
    ];

    #[must_use]
    pub fn value(self, record: &SaleRecord) -> &str {
        match self {
            TextField::Product => &record.product,
            TextField::Category => &record.category,
            TextField::Seller => &record.seller,
            TextField::Location => &record.location,
            TextField::PaymentType => &record.payment_type,
        }
    }
}

/// Numeric record fields usable in range predicates. Values compare as [`Decimal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    Price,
    Freight,
    Rating,
    Installments,
}

impl NumericField {
    pub const ALL: [NumericField; 4] = [
        NumericField::Price,
        NumericField::Freight,
        NumericField::Rating,
        NumericField::Installments,
    ];

    #[must_use]
    pub fn value(self, record: &SaleRecord) -> Decimal {
        match self {
            NumericField::Price => record.price,
            NumericField::Freight => record.freight,
            NumericField::Rating => Decimal::from(record.rating),
            NumericField::Installments => Decimal::from(record.installments),
        }
    }

    /// Slider range of the raw-data view.
    #[must_use]
    pub fn default_range(self) -> (i64, i64) {
        match self {
            NumericField::Price => DEFAULT_PRICE_RANGE,
            NumericField::Freight => DEFAULT_FREIGHT_RANGE,
            NumericField::Rating => DEFAULT_RATING_RANGE,
            NumericField::Installments => DEFAULT_INSTALLMENTS_RANGE,
        }
    }

    fn name(self) -> &'static str {
        match self {
            NumericField::Price => "price",
            NumericField::Freight => "freight",
            NumericField::Rating => "rating",
            NumericField::Installments => "installments",
        }
    }
}

/// One boolean test over one field of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// Field value must be one of `allowed`. An empty set places no restriction.
    OneOf {
        field: TextField,
        allowed: BTreeSet<String>,
    },
    /// Field value must lie in `[low, high]`.
    Within {
        field: NumericField,
        low: Decimal,
        high: Decimal,
    },
    /// Purchase date must lie in `[start, end]`.
    DateWithin { start: NaiveDate, end: NaiveDate },
}

impl Predicate {
    #[must_use]
    pub fn matches(&self, record: &SaleRecord) -> bool {
        match self {
            Predicate::OneOf { field, allowed } => {
                allowed.is_empty() || allowed.contains(field.value(record))
            }
            Predicate::Within { field, low, high } => {
                let v = field.value(record);
                *low <= v && v <= *high
            }
            Predicate::DateWithin { start, end } => {
                *start <= record.purchase_date && record.purchase_date <= *end
            }
        }
    }
}

/// Conjunction of predicates. The empty set matches every record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    predicates: Vec<Predicate>,
}

impl FilterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Adds a membership predicate on `field`.
    #[must_use]
    pub fn one_of<I, S>(self, field: TextField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(Predicate::OneOf {
            field,
            allowed: values.into_iter().map(Into::into).collect(),
        })
    }

    /// Adds an inclusive range predicate on `field`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRange`] if `low > high`.
    pub fn within(
        self,
        field: NumericField,
        low: impl Into<Decimal>,
        high: impl Into<Decimal>,
    ) -> Result<Self, CoreError> {
        let (low, high) = (low.into(), high.into());
        if low > high {
            return Err(CoreError::InvalidRange {
                field: field.name().to_string(),
                low: low.to_string(),
                high: high.to_string(),
            });
        }
        Ok(self.with(Predicate::Within { field, low, high }))
    }

    /// Adds an inclusive purchase-date range predicate.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRange`] if `start > end`.
    pub fn date_within(self, start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::InvalidRange {
                field: "purchase_date".to_string(),
                low: start.to_string(),
                high: end.to_string(),
            });
        }
        Ok(self.with(Predicate::DateWithin { start, end }))
    }

    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    #[must_use]
    pub fn matches(&self, record: &SaleRecord) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }

    /// Returns the records that satisfy every predicate, in input order.
    #[must_use]
    pub fn apply(&self, records: &[SaleRecord]) -> Vec<SaleRecord> {
        records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }

    /// The raw-data view's initial state: every observed value selected and
    /// the default slider ranges.
    ///
    /// Behaves as "no filter" only while every record falls inside the
    /// default ranges and the observed values are complete.
    #[must_use]
    pub fn seeded(options: &FilterOptions) -> Self {
        let mut set = Self::new();
        for field in TextField::ALL {
            set = set.one_of(field, options.values(field).iter().cloned());
        }
        for field in NumericField::ALL {
            let (low, high) = field.default_range();
            set = set.with(Predicate::Within {
                field,
                low: Decimal::from(low),
                high: Decimal::from(high),
            });
        }
        if let (Some(start), Some(end)) = (options.first_date, options.last_date) {
            set = set.with(Predicate::DateWithin { start, end });
        }
        set
    }
}

/// Distinct observed values per text field, in first-seen order, plus the
/// observed purchase-date span. Seeds the selectors of the raw-data view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub products: Vec<String>,
    pub categories: Vec<String>,
    pub sellers: Vec<String>,
    pub locations: Vec<String>,
    pub payment_types: Vec<String>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl FilterOptions {
    #[must_use]
    pub fn observe(records: &[SaleRecord]) -> Self {
        Self {
            products: distinct(records, TextField::Product),
            categories: distinct(records, TextField::Category),
            sellers: distinct(records, TextField::Seller),
            locations: distinct(records, TextField::Location),
            payment_types: distinct(records, TextField::PaymentType),
            first_date: records.iter().map(|r| r.purchase_date).min(),
            last_date: records.iter().map(|r| r.purchase_date).max(),
        }
    }

    #[must_use]
    pub fn values(&self, field: TextField) -> &[String] {
        match field {
            TextField::Product => &self.products,
            TextField::Category => &self.categories,
            TextField::Seller => &self.sellers,
            TextField::Location => &self.locations,
            TextField::PaymentType => &self.payment_types,
        }
    }
}

/// User selections of the raw-data view. `None` leaves a selector at its
/// initial state: every observed value, the default slider range, or the
/// observed date span.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawViewFilter {
    pub products: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub sellers: Option<Vec<String>>,
    pub locations: Option<Vec<String>>,
    pub payment_types: Option<Vec<String>>,
    pub price: (Option<Decimal>, Option<Decimal>),
    pub freight: (Option<Decimal>, Option<Decimal>),
    pub rating: (Option<Decimal>, Option<Decimal>),
    pub installments: (Option<Decimal>, Option<Decimal>),
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl RawViewFilter {
    fn selection(&self, field: TextField) -> Option<&[String]> {
        match field {
            TextField::Product => self.products.as_deref(),
            TextField::Category => self.categories.as_deref(),
            TextField::Seller => self.sellers.as_deref(),
            TextField::Location => self.locations.as_deref(),
            TextField::PaymentType => self.payment_types.as_deref(),
        }
    }

    fn bounds(&self, field: NumericField) -> (Option<Decimal>, Option<Decimal>) {
        match field {
            NumericField::Price => self.price,
            NumericField::Freight => self.freight,
            NumericField::Rating => self.rating,
            NumericField::Installments => self.installments,
        }
    }

    /// Resolves the selections against the observed `options` into a
    /// [`FilterSet`]. With nothing selected this equals [`FilterSet::seeded`].
    ///
    /// A single user bound that crosses its default counterpart yields a range
    /// that matches nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRange`] if both bounds of a range are
    /// selected and the lower one exceeds the upper one.
    pub fn to_filter_set(&self, options: &FilterOptions) -> Result<FilterSet, CoreError> {
        let mut set = FilterSet::new();
        for field in TextField::ALL {
            let values = self
                .selection(field)
                .unwrap_or_else(|| options.values(field));
            set = set.one_of(field, values.iter().cloned());
        }
        for field in NumericField::ALL {
            let (default_low, default_high) = field.default_range();
            set = match self.bounds(field) {
                (Some(low), Some(high)) => set.within(field, low, high)?,
                (low, high) => set.with(Predicate::Within {
                    field,
                    low: low.unwrap_or_else(|| Decimal::from(default_low)),
                    high: high.unwrap_or_else(|| Decimal::from(default_high)),
                }),
            };
        }
        set = match (self.from, self.to) {
            (Some(start), Some(end)) => set.date_within(start, end)?,
            (from, to) => match (from.or(options.first_date), to.or(options.last_date)) {
                (Some(start), Some(end)) => set.with(Predicate::DateWithin { start, end }),
                _ => set,
            },
        };
        Ok(set)
    }
}

fn distinct(records: &[SaleRecord], field: TextField) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .map(|r| field.value(r))
        .filter(|v| seen.insert(*v))
        .map(str::to_owned)
        .collect()
}
