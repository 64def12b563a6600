use crate::core::{Pipeline, SalesReport};
use crate::utils::error::Result;
use crate::utils::monitor::StageMonitor;

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub output_path: String,
    pub report: SalesReport,
}

pub struct AnalyticsEngine<P: Pipeline> {
    pipeline: P,
    monitor: StageMonitor,
}

impl<P: Pipeline> AnalyticsEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: StageMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        tracing::info!("🚀 Starting sales report");

        tracing::info!("📥 Extracting orders...");
        let orders = self.pipeline.extract().await?;
        tracing::info!("Extracted {} orders", orders.len());
        self.monitor.log_stage("extract");

        tracing::info!("🧮 Aggregating sales...");
        let report = self.pipeline.transform(orders).await?;
        tracing::info!(
            "Total sales {:.2} over {} orders, {} days, {} ranked products",
            report.summary.total_sales,
            report.summary.order_count,
            report.summary.sales_by_day.len(),
            report.summary.top_products.len()
        );
        self.monitor.log_stage("transform");

        tracing::info!("💾 Writing report...");
        let output_path = self.pipeline.load(&report).await?;
        tracing::info!("Report saved to: {}", output_path);
        self.monitor.log_stage("load");
        self.monitor.log_final_stats();

        Ok(RunOutcome {
            output_path,
            report,
        })
    }
}
