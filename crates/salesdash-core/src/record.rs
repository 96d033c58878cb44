//! Typed record schema shared by the fetch, filter and aggregation stages.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// First year offered by the dashboard's year selector.
pub const MIN_YEAR: i32 = 2020;
/// Last year offered by the dashboard's year selector.
pub const MAX_YEAR: i32 = 2023;

/// One sale, as returned by the sales API after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub product: String,
    pub category: String,
    pub price: Decimal,
    pub freight: Decimal,
    pub purchase_date: NaiveDate,
    pub seller: String,
    /// Purchase location, a Brazilian state code such as `"SP"`.
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Customer rating, 1 to 5.
    pub rating: u8,
    pub payment_type: String,
    pub installments: u32,
}

/// Region selector of the dashboard. `Brasil` means every region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[default]
    Brasil,
    CentroOeste,
    Nordeste,
    Norte,
    Sudeste,
    Sul,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::Brasil,
        Region::CentroOeste,
        Region::Nordeste,
        Region::Norte,
        Region::Sudeste,
        Region::Sul,
    ];

    /// Display name, as shown in the region selector.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Region::Brasil => "Brasil",
            Region::CentroOeste => "Centro-Oeste",
            Region::Nordeste => "Nordeste",
            Region::Norte => "Norte",
            Region::Sudeste => "Sudeste",
            Region::Sul => "Sul",
        }
    }

    /// Value of the `regiao` query parameter. The whole country is the empty string.
    #[must_use]
    pub fn query_value(self) -> String {
        match self {
            Region::Brasil => String::new(),
            other => other.name().to_lowercase(),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Region {
    type Err = CoreError;

    /// Accepts display names and query values, case-insensitively. The empty
    /// string is the whole country.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Region::Brasil);
        }
        Region::ALL
            .into_iter()
            .find(|r| r.name().to_lowercase() == needle)
            .ok_or_else(|| CoreError::InvalidRegion(s.to_string()))
    }
}

/// Parameters of one fetch against the sales API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceQuery {
    pub region: Region,
    /// `None` fetches every year.
    pub year: Option<i32>,
}

impl SourceQuery {
    /// Builds a query, rejecting years outside the selector range.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::YearOutOfRange`] if `year` is not in `MIN_YEAR..=MAX_YEAR`.
    pub fn new(region: Region, year: Option<i32>) -> Result<Self, CoreError> {
        if let Some(y) = year {
            if !(MIN_YEAR..=MAX_YEAR).contains(&y) {
                return Err(CoreError::YearOutOfRange(y));
            }
        }
        Ok(Self { region, year })
    }

    /// `(name, value)` query pairs in the order the API expects them.
    #[must_use]
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("regiao", self.region.query_value()),
            ("ano", self.year.map(|y| y.to_string()).unwrap_or_default()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brasil_is_sent_as_empty_region() {
        assert_eq!(Region::Brasil.query_value(), "");
        assert_eq!(Region::CentroOeste.query_value(), "centro-oeste");
        assert_eq!(Region::Sul.query_value(), "sul");
    }

    #[test]
    fn region_parses_names_and_query_values() {
        assert_eq!("Sudeste".parse::<Region>().unwrap(), Region::Sudeste);
        assert_eq!("centro-oeste".parse::<Region>().unwrap(), Region::CentroOeste);
        assert_eq!("".parse::<Region>().unwrap(), Region::Brasil);
        assert!(matches!(
            "Atlantida".parse::<Region>(),
            Err(CoreError::InvalidRegion(_))
        ));
    }

    #[test]
    fn source_query_rejects_years_outside_selector() {
        assert!(SourceQuery::new(Region::Sul, Some(2021)).is_ok());
        assert!(matches!(
            SourceQuery::new(Region::Sul, Some(2019)),
            Err(CoreError::YearOutOfRange(2019))
        ));
    }

    #[test]
    fn all_years_is_sent_as_empty_year() {
        let q = SourceQuery::default();
        let pairs = q.query_pairs();
        assert_eq!(pairs[0], ("regiao", String::new()));
        assert_eq!(pairs[1], ("ano", String::new()));

        let q = SourceQuery::new(Region::Nordeste, Some(2022)).unwrap();
        let pairs = q.query_pairs();
        assert_eq!(pairs[0].1, "nordeste");
        assert_eq!(pairs[1].1, "2022");
    }
}
