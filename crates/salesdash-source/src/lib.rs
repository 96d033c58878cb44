pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::SalesApiClient;
pub use error::SourceError;
pub use normalize::{normalize_sale, normalize_sales};
pub use types::ApiSale;
