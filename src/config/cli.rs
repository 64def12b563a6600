use crate::core::Storage;
use crate::utils::error::Result;
use std::path::Path;

#[cfg(feature = "cli")]
use crate::utils::error::AnalyticsError;

#[cfg(feature = "cli")]
use crate::config::job::{parse_formats, resolve_range, resolve_source, JobConfig};
#[cfg(feature = "cli")]
use crate::config::toml_config::TomlConfig;
#[cfg(feature = "cli")]
use crate::domain::query::SalesQuery;
#[cfg(feature = "cli")]
use crate::utils::validation::validate_required_field;
#[cfg(feature = "cli")]
use chrono::NaiveDate;
#[cfg(feature = "cli")]
use clap::Parser;

/// Filesystem storage rooted at `base_path`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        Ok(tokio::fs::read(full_path).await?)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "vinyl-sales")]
#[command(about = "Seller sales report for the vinyl marketplace")]
pub struct CliConfig {
    /// TOML job file; flags given on the command line override it
    #[arg(short, long)]
    pub config: Option<String>,

    /// REST endpoint of the orders table
    #[arg(long)]
    pub orders_endpoint: Option<String>,

    /// Local JSON file with order rows (instead of --orders-endpoint)
    #[arg(long)]
    pub orders_file: Option<String>,

    #[arg(long)]
    pub api_key: Option<String>,

    #[arg(long)]
    pub seller_id: Option<String>,

    /// Inclusive start date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Inclusive end date (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<String>,

    /// Window size when no start date is given
    #[arg(long)]
    pub last_days: Option<u32>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "json,csv")]
    pub formats: Vec<String>,

    /// Bundle the report files into sales_report.zip
    #[arg(long)]
    pub zip: bool,

    #[arg(long)]
    pub max_orders: Option<usize>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory per stage")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
pub const DEFAULT_ARCHIVE_NAME: &str = "sales_report.zip";

#[cfg(feature = "cli")]
impl CliConfig {
    /// Builds the job from flags alone.
    pub fn to_job(&self, today: NaiveDate) -> Result<JobConfig> {
        let source = resolve_source(
            self.orders_endpoint.clone(),
            self.orders_file.clone(),
            self.api_key.clone(),
        )?;
        let seller_id = validate_required_field("seller_id", &self.seller_id)?;
        let range = resolve_range(
            self.start_date.as_deref(),
            self.end_date.as_deref(),
            self.last_days,
            today,
        )?;

        Ok(JobConfig {
            source,
            query: SalesQuery::new(seller_id.as_str(), range)?,
            output_path: self.output_path.clone(),
            output_formats: parse_formats("formats", &self.formats)?,
            archive_name: self.zip.then(|| DEFAULT_ARCHIVE_NAME.to_string()),
            max_orders: self.max_orders,
            request_timeout: None,
        })
    }

    /// Applies explicitly given flags on top of a TOML job.
    pub fn overlay(&self, config: &mut TomlConfig) -> Result<()> {
        if self.orders_endpoint.is_some() && self.orders_file.is_some() {
            return Err(AnalyticsError::ConfigError {
                message: "Use either --orders-endpoint or --orders-file, not both".to_string(),
            });
        }
        if let Some(endpoint) = &self.orders_endpoint {
            config.source.r#type = "api".to_string();
            config.source.endpoint = Some(endpoint.clone());
        }
        if let Some(path) = &self.orders_file {
            config.source.r#type = "file".to_string();
            config.source.path = Some(path.clone());
        }
        if self.api_key.is_some() {
            config.source.api_key = self.api_key.clone();
        }
        if self.seller_id.is_some() {
            config.query.seller_id = self.seller_id.clone();
        }
        if self.start_date.is_some() {
            config.query.start_date = self.start_date.clone();
        }
        if self.end_date.is_some() {
            config.query.end_date = self.end_date.clone();
        }
        if self.last_days.is_some() {
            config.query.last_days = self.last_days;
        }
        if self.max_orders.is_some() {
            config.extract.get_or_insert_with(Default::default).max_orders = self.max_orders;
        }
        if self.zip {
            let compression = config.load.compression.get_or_insert_with(Default::default);
            compression.enabled = true;
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use crate::domain::model::{OrderSource, OutputFormat};
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_cli_to_job() {
        let cli = CliConfig::parse_from([
            "vinyl-sales",
            "--orders-endpoint",
            "https://db.example.com/rest/v1/orders",
            "--seller-id",
            "seller-9",
            "--start-date",
            "2024-06-01",
            "--formats",
            "csv",
            "--zip",
        ]);

        let job = cli.to_job(today()).unwrap();
        assert!(matches!(job.source, OrderSource::Api { .. }));
        assert_eq!(job.query.seller_id, "seller-9");
        assert_eq!(job.query.range.end, today());
        assert_eq!(job.output_formats, vec![OutputFormat::Csv]);
        assert_eq!(job.archive_name.as_deref(), Some(DEFAULT_ARCHIVE_NAME));
    }

    #[test]
    fn test_cli_requires_seller() {
        let cli = CliConfig::parse_from(["vinyl-sales", "--orders-file", "orders.json"]);
        assert!(cli.to_job(today()).is_err());
    }

    #[test]
    fn test_overlay_on_toml() {
        let mut config = TomlConfig::from_toml_str(
            r#"
[job]
name = "monthly"

[source]
type = "api"
endpoint = "https://db.example.com/rest/v1/orders"

[query]
seller_id = "seller-1"

[load]
output_path = "./output"
output_formats = ["json"]
"#,
        )
        .unwrap();

        let cli = CliConfig::parse_from([
            "vinyl-sales",
            "--orders-file",
            "orders.json",
            "--seller-id",
            "seller-2",
            "--zip",
        ]);
        cli.overlay(&mut config).unwrap();

        let job = config.to_job(today()).unwrap();
        assert_eq!(
            job.source,
            OrderSource::File {
                path: "orders.json".to_string()
            }
        );
        assert_eq!(job.query.seller_id, "seller-2");
        assert!(job.archive_name.is_some());
    }

    #[test]
    fn test_overlay_rejects_both_sources() {
        let mut config = TomlConfig::from_toml_str(
            r#"
[job]
name = "monthly"

[source]
type = "file"
path = "orders.json"

[query]
seller_id = "seller-1"

[load]
output_path = "./output"
output_formats = ["json"]
"#,
        )
        .unwrap();

        let cli = CliConfig::parse_from([
            "vinyl-sales",
            "--orders-endpoint",
            "https://db.example.com/rest/v1/orders",
            "--orders-file",
            "other.json",
        ]);
        let err = cli.overlay(&mut config).unwrap_err();
        assert!(matches!(err, AnalyticsError::ConfigError { .. }));
        assert_eq!(config.source.path.as_deref(), Some("orders.json"));
        assert!(config.source.endpoint.is_none());
    }

    #[tokio::test]
    async fn test_local_storage_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        storage
            .write_file("nested/dir/summary.json", b"{}")
            .await
            .unwrap();
        let data = storage.read_file("nested/dir/summary.json").await.unwrap();
        assert_eq!(data, b"{}");
        assert!(storage.read_file("missing.json").await.is_err());
    }
}
