use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::record::SaleRecord;

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

pub(crate) fn sale_at(location: &str, price: i64, purchase_date: NaiveDate) -> SaleRecord {
    let (latitude, longitude) = match location {
        "SP" => (-22.19, -48.79),
        "RJ" => (-22.25, -42.66),
        "MG" => (-18.10, -44.38),
        _ => (-15.0, -50.0),
    };
    SaleRecord {
        product: "Modelagem preditiva".to_string(),
        category: "livros".to_string(),
        price: Decimal::from(price),
        freight: Decimal::new(1_050, 2),
        purchase_date,
        seller: "Thiago Silva".to_string(),
        location: location.to_string(),
        latitude,
        longitude,
        rating: 4,
        payment_type: "cartao_credito".to_string(),
        installments: 1,
    }
}

pub(crate) fn sale(location: &str, price: i64) -> SaleRecord {
    sale_at(location, price, date(2021, 6, 15))
}

pub(crate) fn sold_by(seller: &str, price: i64) -> SaleRecord {
    SaleRecord {
        seller: seller.to_string(),
        ..sale("SP", price)
    }
}

pub(crate) fn in_category(category: &str, price: i64) -> SaleRecord {
    SaleRecord {
        category: category.to_string(),
        ..sale("SP", price)
    }
}
