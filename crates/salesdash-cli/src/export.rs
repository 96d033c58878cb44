//! `export`: the raw-data view as a CSV file.

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use salesdash_core::{
    export_file_name, to_csv, Column, FilterOptions, RawViewFilter, RecordTable, SourceQuery,
};
use salesdash_source::SalesApiClient;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Output file, `-` for stdout (defaults to dados.csv, `.csv` is appended when missing)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// Column to include, by header name; repeat for several (all when omitted)
    #[arg(long = "column")]
    pub columns: Vec<Column>,
    #[arg(long = "product")]
    pub products: Vec<String>,
    #[arg(long = "category")]
    pub categories: Vec<String>,
    #[arg(long = "seller")]
    pub sellers: Vec<String>,
    #[arg(long = "location")]
    pub locations: Vec<String>,
    #[arg(long = "payment-type")]
    pub payment_types: Vec<String>,
    #[arg(long)]
    pub price_min: Option<Decimal>,
    #[arg(long)]
    pub price_max: Option<Decimal>,
    #[arg(long)]
    pub freight_min: Option<Decimal>,
    #[arg(long)]
    pub freight_max: Option<Decimal>,
    #[arg(long)]
    pub rating_min: Option<Decimal>,
    #[arg(long)]
    pub rating_max: Option<Decimal>,
    #[arg(long)]
    pub installments_min: Option<Decimal>,
    #[arg(long)]
    pub installments_max: Option<Decimal>,
    /// First purchase date to keep (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last purchase date to keep (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

/// An omitted repeatable flag keeps every observed value.
fn selection(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}

impl ExportArgs {
    pub(crate) fn view_filter(&self) -> RawViewFilter {
        RawViewFilter {
            products: selection(&self.products),
            categories: selection(&self.categories),
            sellers: selection(&self.sellers),
            locations: selection(&self.locations),
            payment_types: selection(&self.payment_types),
            price: (self.price_min, self.price_max),
            freight: (self.freight_min, self.freight_max),
            rating: (self.rating_min, self.rating_max),
            installments: (self.installments_min, self.installments_max),
            from: self.from,
            to: self.to,
        }
    }

    pub(crate) fn selected_columns(&self) -> Vec<Column> {
        if self.columns.is_empty() {
            Column::ALL.to_vec()
        } else {
            self.columns.clone()
        }
    }

    /// The target file, named the way the server names its downloads.
    /// `-` passes through unchanged.
    pub(crate) fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) if path.as_os_str() == "-" => path.clone(),
            Some(path) => {
                path.with_file_name(export_file_name(path.file_name().and_then(|n| n.to_str())))
            }
            None => PathBuf::from(export_file_name(None)),
        }
    }
}

/// Fetch every record, apply the raw-view filters and write the projection.
///
/// # Errors
///
/// Returns an error if the fetch fails, a range is inverted, or the file
/// cannot be written.
pub(crate) async fn run_export(
    client: &SalesApiClient,
    args: &ExportArgs,
) -> anyhow::Result<()> {
    let records = client.fetch_records(&SourceQuery::default()).await?;
    let options = FilterOptions::observe(&records);
    let filtered = args.view_filter().to_filter_set(&options)?.apply(&records);

    let table = RecordTable::project(&filtered, &args.selected_columns());
    let csv = to_csv(&table)?;

    let path = args.output_path();
    if path.as_os_str() == "-" {
        use std::io::Write;
        std::io::stdout()
            .write_all(&csv)
            .context("failed to write CSV to stdout")?;
        return Ok(());
    }

    tokio::fs::write(&path, &csv)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(
        rows = table.row_count(),
        columns = table.column_count(),
        path = %path.display(),
        "CSV export written"
    );
    println!(
        "wrote {} rows and {} columns to {}",
        table.row_count(),
        table.column_count(),
        path.display()
    );
    Ok(())
}
