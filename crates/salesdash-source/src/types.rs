//! Sales API response types.
//!
//! The API answers with a bare JSON array of sale objects whose keys are
//! Portuguese column names. Dates arrive as `DD/MM/YYYY` strings and are
//! parsed during normalization, not here.

use rust_decimal::Decimal;
use serde::Deserialize;

/// One element of the sales API response array.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSale {
    #[serde(rename = "Produto")]
    pub product: String,
    #[serde(rename = "Categoria do Produto")]
    pub category: String,
    #[serde(rename = "Preço")]
    pub price: Decimal,
    #[serde(rename = "Frete")]
    pub freight: Decimal,
    /// Purchase date, `DD/MM/YYYY`.
    #[serde(rename = "Data da Compra")]
    pub purchase_date: String,
    #[serde(rename = "Vendedor")]
    pub seller: String,
    #[serde(rename = "Local da compra")]
    pub location: String,
    #[serde(rename = "Avaliação da compra")]
    pub rating: i64,
    #[serde(rename = "Tipo de pagamento")]
    pub payment_type: String,
    #[serde(rename = "Quantidade de parcelas")]
    pub installments: i64,
    pub lat: f64,
    pub lon: f64,
}
