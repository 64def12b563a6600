pub mod engine;
pub mod pipeline;
pub mod report;
pub mod source;

pub use crate::domain::model::{Order, SalesReport, SalesSummary};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
