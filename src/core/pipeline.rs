use crate::core::report;
use crate::core::source::{decode_orders, fetch_orders, select_orders};
use crate::core::{ConfigProvider, Order, Pipeline, SalesReport, Storage};
use crate::domain::aggregator::SalesAggregator;
use crate::domain::model::OrderSource;
use crate::utils::error::Result;
use reqwest::Client;

/// Seller sales report: fetch orders, aggregate, write report files.
pub struct SalesPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
    aggregator: SalesAggregator,
}

impl<S: Storage, C: ConfigProvider> SalesPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().unwrap_or_else(|e| {
            tracing::warn!("Falling back to default HTTP client: {}", e);
            Client::new()
        });

        Self {
            storage,
            config,
            client,
            aggregator: SalesAggregator::default(),
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    fn output_key(&self, name: &str) -> String {
        let base = self.config.output_path().trim_end_matches('/');
        if base.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", base, name)
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for SalesPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Order>> {
        let query = self.config.query();

        let payload = match self.config.source() {
            OrderSource::Api { endpoint, api_key } => {
                fetch_orders(&self.client, endpoint, api_key.as_deref(), query).await?
            }
            OrderSource::File { path } => {
                tracing::debug!("Reading orders from file: {}", path);
                let bytes = self.storage.read_file(path).await?;
                serde_json::from_slice(&bytes)?
            }
        };

        let decoded = decode_orders(payload)?;
        let fetched = decoded.len();
        let orders = select_orders(decoded, query, self.config.max_orders());

        tracing::debug!(
            "Kept {} of {} orders for seller {} ({} to {})",
            orders.len(),
            fetched,
            query.seller_id,
            query.range.start,
            query.range.end
        );
        Ok(orders)
    }

    async fn transform(&self, orders: Vec<Order>) -> Result<SalesReport> {
        let summary = self.aggregator.summarize(&orders);
        Ok(SalesReport::new(self.config.query(), summary))
    }

    async fn load(&self, report: &SalesReport) -> Result<String> {
        let files = report::render(report, self.config.output_formats())?;

        if let Some(archive) = self.config.archive_name() {
            let key = self.output_key(archive);
            tracing::debug!("Creating ZIP archive with {} files", files.len());
            let bytes = report::bundle(&files)?;
            tracing::debug!("Writing ZIP archive ({} bytes) to {}", bytes.len(), key);
            self.storage.write_file(&key, &bytes).await?;
            return Ok(key);
        }

        for file in &files {
            let key = self.output_key(file.name);
            tracing::debug!("Writing {} ({} bytes)", key, file.contents.len());
            self.storage.write_file(&key, &file.contents).await?;
        }
        Ok(self.config.output_path().to_string())
    }
}
