use crate::domain::model::{Order, OrderSource, OutputFormat, SalesReport};
use crate::domain::query::SalesQuery;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn source(&self) -> &OrderSource;
    fn query(&self) -> &SalesQuery;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[OutputFormat];
    /// ZIP archive name when the report files should be bundled.
    fn archive_name(&self) -> Option<&str>;
    fn max_orders(&self) -> Option<usize>;
    fn request_timeout(&self) -> Option<Duration>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Order>>;
    async fn transform(&self, orders: Vec<Order>) -> Result<SalesReport>;
    async fn load(&self, report: &SalesReport) -> Result<String>;
}
