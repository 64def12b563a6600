use crate::domain::model::{OutputFormat, SalesReport};
use crate::utils::error::Result;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const SUMMARY_FILE: &str = "summary.json";
pub const SALES_BY_DAY_FILE: &str = "sales_by_day.csv";
pub const TOP_PRODUCTS_FILE: &str = "top_products.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct ReportFile {
    pub name: &'static str,
    pub contents: Vec<u8>,
}

/// Renders the report into one file per requested artifact.
pub fn render(report: &SalesReport, formats: &[OutputFormat]) -> Result<Vec<ReportFile>> {
    let mut files = Vec::new();

    if formats.contains(&OutputFormat::Json) {
        files.push(ReportFile {
            name: SUMMARY_FILE,
            contents: serde_json::to_vec_pretty(report)?,
        });
    }

    if formats.contains(&OutputFormat::Csv) {
        files.push(ReportFile {
            name: SALES_BY_DAY_FILE,
            contents: sales_by_day_csv(report)?,
        });
        files.push(ReportFile {
            name: TOP_PRODUCTS_FILE,
            contents: top_products_csv(report)?,
        });
    }

    Ok(files)
}

fn sales_by_day_csv(report: &SalesReport) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["date", "amount", "orders"])?;
    for bucket in &report.summary.sales_by_day {
        writer.write_record([
            bucket.date.clone(),
            format!("{:.2}", bucket.amount),
            bucket.orders.to_string(),
        ])?;
    }
    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

fn top_products_csv(report: &SalesReport) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["rank", "id", "title", "total_sold", "revenue"])?;
    for (rank, product) in report.summary.top_products.iter().enumerate() {
        writer.write_record([
            (rank + 1).to_string(),
            product.id.clone(),
            product.title.clone(),
            product.total_sold.to_string(),
            format!("{:.2}", product.revenue),
        ])?;
    }
    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

/// Packs the rendered files into a single ZIP archive.
pub fn bundle(files: &[ReportFile]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for file in files {
        zip.start_file(file.name, SimpleFileOptions::default())?;
        zip.write_all(&file.contents)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
