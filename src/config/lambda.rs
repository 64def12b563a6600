use crate::config::job::{parse_formats, resolve_range, JobConfig};
use crate::core::Storage;
use crate::domain::model::OrderSource;
use crate::domain::query::SalesQuery;
use crate::utils::error::{AnalyticsError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_url, Validate};
use aws_sdk_s3::Client as S3Client;
use chrono::NaiveDate;
use std::env;

#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub orders_endpoint: String,
    pub api_key: Option<String>,
    pub s3_bucket: String,
    pub s3_prefix: String,
    pub s3_region: String,
    pub output_formats: Vec<String>,
    pub bundle: bool,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            orders_endpoint: env::var("ORDERS_ENDPOINT").map_err(|_| {
                AnalyticsError::MissingConfigError {
                    field: "ORDERS_ENDPOINT".to_string(),
                }
            })?,
            api_key: env::var("SUPABASE_API_KEY").ok(),
            s3_bucket: env::var("S3_BUCKET").map_err(|_| AnalyticsError::MissingConfigError {
                field: "S3_BUCKET".to_string(),
            })?,
            s3_prefix: env::var("S3_PREFIX").unwrap_or_else(|_| "sales-reports".to_string()),
            s3_region: env::var("S3_REGION").unwrap_or_else(|_| "ap-southeast-2".to_string()),
            output_formats: env::var("OUTPUT_FORMATS")
                .unwrap_or_else(|_| "json".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            bundle: env::var("BUNDLE_REPORT")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }

    /// Job for one invocation. Reports land under `<prefix>/<seller_id>/<start>_<end>/`.
    pub fn job_for(
        &self,
        seller_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
        last_days: Option<u32>,
        today: NaiveDate,
    ) -> Result<JobConfig> {
        let range = resolve_range(start_date, end_date, last_days, today)?;
        let query = SalesQuery::new(seller_id, range)?;
        let output_path = format!(
            "{}/{}/{}_{}",
            self.s3_prefix.trim_end_matches('/'),
            query.seller_id,
            range.start,
            range.end
        );

        Ok(JobConfig {
            source: OrderSource::Api {
                endpoint: self.orders_endpoint.clone(),
                api_key: self.api_key.clone(),
            },
            query,
            output_path,
            output_formats: parse_formats("OUTPUT_FORMATS", &self.output_formats)?,
            archive_name: self.bundle.then(|| "sales_report.zip".to_string()),
            max_orders: None,
            request_timeout: None,
        })
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        validate_url("ORDERS_ENDPOINT", &self.orders_endpoint)?;
        validate_s3_bucket_name("S3_BUCKET", &self.s3_bucket)?;
        validate_non_empty_string("S3_PREFIX", &self.s3_prefix)?;
        validate_aws_region("S3_REGION", &self.s3_region)?;
        parse_formats("OUTPUT_FORMATS", &self.output_formats)?;

        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}

fn invalid(field_name: &str, value: &str, reason: &str) -> AnalyticsError {
    AnalyticsError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_s3_bucket_name(field_name: &str, bucket_name: &str) -> Result<()> {
    if bucket_name.len() < 3 || bucket_name.len() > 63 {
        return Err(invalid(
            field_name,
            bucket_name,
            "S3 bucket name must be between 3 and 63 characters",
        ));
    }
    if !bucket_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(invalid(
            field_name,
            bucket_name,
            "S3 bucket name can only contain lowercase letters, numbers, hyphens, and dots",
        ));
    }
    if bucket_name.starts_with('-') || bucket_name.ends_with('-') {
        return Err(invalid(
            field_name,
            bucket_name,
            "S3 bucket name cannot start or end with a hyphen",
        ));
    }
    Ok(())
}

fn validate_aws_region(field_name: &str, region: &str) -> Result<()> {
    validate_non_empty_string(field_name, region)?;
    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(invalid(
            field_name,
            region,
            "AWS region can only contain lowercase letters, numbers, and hyphens",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

impl Storage for S3Storage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| AnalyticsError::StorageError {
                message: format!("Failed to read s3://{}/{}: {}", self.bucket, path, e),
            })?;

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| AnalyticsError::StorageError {
                message: format!("Failed to collect S3 object body: {}", e),
            })?;

        Ok(data.into_bytes().to_vec())
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .content_type(content_type(path))
            .body(data.to_vec().into())
            .send()
            .await
            .map_err(|e| AnalyticsError::StorageError {
                message: format!("Failed to write s3://{}/{}: {}", self.bucket, path, e),
            })?;
        Ok(())
    }
}

fn content_type(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}
