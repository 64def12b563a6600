use crate::config::job::{parse_formats, resolve_range, resolve_source, JobConfig};
use crate::domain::query::SalesQuery;
use crate::utils::error::{AnalyticsError, Result};
use crate::utils::validation::{validate_range, validate_required_field, Validate};
use chrono::{NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ARCHIVE_FILENAME: &str = "sales_report.zip";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub job: JobSection,
    pub source: SourceConfig,
    #[serde(default)]
    pub query: QueryConfig,
    pub extract: Option<ExtractConfig>,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSection {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// `api` or `file`
    pub r#type: String,
    pub endpoint: Option<String>,
    pub path: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryConfig {
    pub seller_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub last_days: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub max_orders: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content)?;

        toml::from_str(&processed).map_err(|e| AnalyticsError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SUPABASE_API_KEY})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| {
            AnalyticsError::ConfigError {
                message: format!("Invalid substitution pattern: {}", e),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!("Environment variable {} is not set", var_name);
                caps[0].to_string()
            })
        });

        Ok(result.into_owned())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().is_some_and(|m| m.enabled)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }

    /// Resolves the file into a runnable job; open date ends are anchored on `today`.
    pub fn to_job(&self, today: NaiveDate) -> Result<JobConfig> {
        let source = match self.source.r#type.as_str() {
            "api" => resolve_source(
                Some(validate_required_field("source.endpoint", &self.source.endpoint)?.clone()),
                None,
                self.source.api_key.clone(),
            )?,
            "file" => resolve_source(
                None,
                Some(validate_required_field("source.path", &self.source.path)?.clone()),
                None,
            )?,
            other => {
                return Err(AnalyticsError::InvalidConfigValueError {
                    field: "source.type".to_string(),
                    value: other.to_string(),
                    reason: "Expected \"api\" or \"file\"".to_string(),
                })
            }
        };

        let seller_id = validate_required_field("query.seller_id", &self.query.seller_id)?;
        let range = resolve_range(
            self.query.start_date.as_deref(),
            self.query.end_date.as_deref(),
            self.query.last_days,
            today,
        )?;

        let archive_name = self
            .load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| {
                c.filename
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ARCHIVE_FILENAME.to_string())
            });

        let request_timeout = match self.source.timeout_seconds {
            Some(secs) => {
                validate_range("source.timeout_seconds", secs, 1, 300)?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(JobConfig {
            source,
            query: SalesQuery::new(seller_id.as_str(), range)?,
            output_path: self.load.output_path.clone(),
            output_formats: parse_formats("load.output_formats", &self.load.output_formats)?,
            archive_name,
            max_orders: self.extract.as_ref().and_then(|e| e.max_orders),
            request_timeout,
        })
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.to_job(Utc::now().date_naive())?.validate()
    }
}
