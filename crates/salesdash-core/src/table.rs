//! Raw-data view: records projected onto a user-chosen set of columns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::record::SaleRecord;
use crate::CoreError;

/// Date format of the `Data da Compra` column in exported tables.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Record columns, named as the sales API names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Product,
    Category,
    Price,
    Freight,
    PurchaseDate,
    Seller,
    Location,
    Rating,
    PaymentType,
    Installments,
    Latitude,
    Longitude,
}

impl Column {
    /// Every column, in source order. Also the default selection.
    pub const ALL: [Column; 12] = [
        Column::Product,
        Column::Category,
        Column::Price,
        Column::Freight,
        Column::PurchaseDate,
        Column::Seller,
        Column::Location,
        Column::Rating,
        Column::PaymentType,
        Column::Installments,
        Column::Latitude,
        Column::Longitude,
    ];

    #[must_use]
    pub fn header(self) -> &'static str {
        match self {
            Column::Product => "Produto",
            Column::Category => "Categoria do Produto",
            Column::Price => "Preço",
            Column::Freight => "Frete",
            Column::PurchaseDate => "Data da Compra",
            Column::Seller => "Vendedor",
            Column::Location => "Local da compra",
            Column::Rating => "Avaliação da compra",
            Column::PaymentType => "Tipo de pagamento",
            Column::Installments => "Quantidade de parcelas",
            Column::Latitude => "lat",
            Column::Longitude => "lon",
        }
    }

    #[must_use]
    pub fn cell(self, record: &SaleRecord) -> String {
        match self {
            Column::Product => record.product.clone(),
            Column::Category => record.category.clone(),
            Column::Price => record.price.to_string(),
            Column::Freight => record.freight.to_string(),
            Column::PurchaseDate => record.purchase_date.format(DATE_FORMAT).to_string(),
            Column::Seller => record.seller.clone(),
            Column::Location => record.location.clone(),
            Column::Rating => record.rating.to_string(),
            Column::PaymentType => record.payment_type.clone(),
            Column::Installments => record.installments.to_string(),
            Column::Latitude => record.latitude.to_string(),
            Column::Longitude => record.longitude.to_string(),
        }
    }

    /// Parses a comma-separated list of headers. Blank input selects every column.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownColumn`] for a name that is not a header.
    pub fn parse_list(raw: &str) -> Result<Vec<Column>, CoreError> {
        let columns = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Column>, _>>()?;
        if columns.is_empty() {
            return Ok(Column::ALL.to_vec());
        }
        Ok(columns)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for Column {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .into_iter()
            .find(|c| c.header().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownColumn(s.to_string()))
    }
}

/// Header plus stringified rows of the selected columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl RecordTable {
    #[must_use]
    pub fn project(records: &[SaleRecord], columns: &[Column]) -> Self {
        let rows = records
            .iter()
            .map(|r| columns.iter().map(|c| c.cell(r)).collect())
            .collect();
        Self {
            columns: columns.to_vec(),
            rows,
        }
    }

    #[must_use]
    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.header()).collect()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}
