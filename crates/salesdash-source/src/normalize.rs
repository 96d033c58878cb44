//! Conversion from [`ApiSale`] wire shapes to [`salesdash_core::SaleRecord`].

use chrono::NaiveDate;
use salesdash_core::SaleRecord;

use crate::error::SourceError;
use crate::types::ApiSale;

/// Format of the `Data da Compra` field.
pub const API_DATE_FORMAT: &str = "%d/%m/%Y";

/// Normalizes one API sale. `index` is its position in the response array
/// and is only used for error reporting.
///
/// # Errors
///
/// Returns [`SourceError::InvalidRecord`] if the purchase date is not
/// `DD/MM/YYYY`, the rating is outside 1–5, or the installment count is
/// negative.
pub fn normalize_sale(sale: ApiSale, index: usize) -> Result<SaleRecord, SourceError> {
    let purchase_date = NaiveDate::parse_from_str(sale.purchase_date.trim(), API_DATE_FORMAT)
        .map_err(|e| SourceError::InvalidRecord {
            index,
            reason: format!("purchase date \"{}\": {e}", sale.purchase_date),
        })?;

    let rating = u8::try_from(sale.rating)
        .ok()
        .filter(|r| (1..=5).contains(r))
        .ok_or_else(|| SourceError::InvalidRecord {
            index,
            reason: format!("rating {} is outside 1..=5", sale.rating),
        })?;

    let installments = u32::try_from(sale.installments).map_err(|_| SourceError::InvalidRecord {
        index,
        reason: format!("installment count {} is negative", sale.installments),
    })?;

    Ok(SaleRecord {
        product: sale.product,
        category: sale.category,
        price: sale.price,
        freight: sale.freight,
        purchase_date,
        seller: sale.seller,
        location: sale.location,
        latitude: sale.lat,
        longitude: sale.lon,
        rating,
        payment_type: sale.payment_type,
        installments,
    })
}

/// Normalizes a whole response, stopping at the first invalid record.
///
/// # Errors
///
/// Returns the first [`SourceError::InvalidRecord`] encountered.
pub fn normalize_sales(sales: Vec<ApiSale>) -> Result<Vec<SaleRecord>, SourceError> {
    sales
        .into_iter()
        .enumerate()
        .map(|(index, sale)| normalize_sale(sale, index))
        .collect()
}
