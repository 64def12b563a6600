pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{JobConfig, LocalStorage};

#[cfg(feature = "lambda")]
pub use config::lambda::{LambdaConfig, S3Storage};

pub use core::{engine::AnalyticsEngine, pipeline::SalesPipeline};
pub use domain::aggregator::SalesAggregator;
pub use domain::model::{DailyBucket, LineItem, Order, ProductRanking, SalesReport, SalesSummary};
pub use domain::query::{DateRange, SalesQuery};
pub use utils::error::{AnalyticsError, Result};
