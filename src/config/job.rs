use crate::core::ConfigProvider;
use crate::domain::model::{OrderSource, OutputFormat};
use crate::domain::query::{DateRange, SalesQuery, DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS};
use crate::utils::error::{AnalyticsError, Result};
use crate::utils::validation::{
    parse_iso_date, validate_file_extension, validate_non_empty_string, validate_path,
    validate_positive_number, validate_range, validate_url, Validate,
};
use chrono::NaiveDate;
use std::time::Duration;

/// Fully resolved settings for one report run, whatever front end produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct JobConfig {
    pub source: OrderSource,
    pub query: SalesQuery,
    pub output_path: String,
    pub output_formats: Vec<OutputFormat>,
    pub archive_name: Option<String>,
    pub max_orders: Option<usize>,
    pub request_timeout: Option<Duration>,
}

impl ConfigProvider for JobConfig {
    fn source(&self) -> &OrderSource {
        &self.source
    }

    fn query(&self) -> &SalesQuery {
        &self.query
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.output_formats
    }

    fn archive_name(&self) -> Option<&str> {
        self.archive_name.as_deref()
    }

    fn max_orders(&self) -> Option<usize> {
        self.max_orders
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }
}

impl Validate for JobConfig {
    fn validate(&self) -> Result<()> {
        match &self.source {
            OrderSource::Api { endpoint, api_key } => {
                validate_url("source.endpoint", endpoint)?;
                if let Some(key) = api_key {
                    validate_non_empty_string("source.api_key", key)?;
                    if key.starts_with("${") {
                        tracing::warn!("source.api_key looks like an unresolved variable: {}", key);
                    }
                }
            }
            OrderSource::File { path } => {
                validate_path("source.path", path)?;
                validate_file_extension("source.path", path, &["json"])?;
            }
        }

        validate_path("load.output_path", &self.output_path)?;
        if self.output_formats.is_empty() {
            return Err(AnalyticsError::InvalidConfigValueError {
                field: "load.output_formats".to_string(),
                value: String::new(),
                reason: "At least one output format is required".to_string(),
            });
        }
        if let Some(archive) = &self.archive_name {
            validate_file_extension("load.compression.filename", archive, &["zip"])?;
        }
        if let Some(max) = self.max_orders {
            validate_positive_number("extract.max_orders", max, 1)?;
        }

        tracing::debug!("Job configuration validation passed");
        Ok(())
    }
}

pub fn resolve_source(
    endpoint: Option<String>,
    file: Option<String>,
    api_key: Option<String>,
) -> Result<OrderSource> {
    match (endpoint, file) {
        (Some(endpoint), None) => Ok(OrderSource::Api { endpoint, api_key }),
        (None, Some(path)) => Ok(OrderSource::File { path }),
        (Some(_), Some(_)) => Err(AnalyticsError::ConfigError {
            message: "Use either an orders endpoint or an orders file, not both".to_string(),
        }),
        (None, None) => Err(AnalyticsError::MissingConfigError {
            field: "orders_endpoint or orders_file".to_string(),
        }),
    }
}

/// Resolves the report window. Missing ends fall back to `today` and a
/// `last_days` window (30 days by default).
pub fn resolve_range(
    start: Option<&str>,
    end: Option<&str>,
    last_days: Option<u32>,
    today: NaiveDate,
) -> Result<DateRange> {
    let days = last_days.unwrap_or(DEFAULT_WINDOW_DAYS);
    validate_range("query.last_days", days, 1, MAX_WINDOW_DAYS)?;
    match (start, end) {
        (Some(start), Some(end)) => DateRange::parse(start, end),
        (Some(start), None) => DateRange::new(parse_iso_date("query.start_date", start)?, today),
        (None, Some(end)) => DateRange::last_days(parse_iso_date("query.end_date", end)?, days),
        (None, None) => DateRange::last_days(today, days),
    }
}

pub fn parse_formats(field_name: &str, values: &[String]) -> Result<Vec<OutputFormat>> {
    let mut formats = Vec::new();
    for value in values {
        let format =
            OutputFormat::parse(value).ok_or_else(|| AnalyticsError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: value.clone(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    OutputFormat::VALID.join(", ")
                ),
            })?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    Ok(formats)
}
