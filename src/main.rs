use chrono::Utc;
use clap::Parser;
use vinyl_sales::config::toml_config::TomlConfig;
use vinyl_sales::utils::error::{AnalyticsError, ErrorSeverity};
use vinyl_sales::utils::{logger, validation::Validate};
use vinyl_sales::{AnalyticsEngine, CliConfig, JobConfig, LocalStorage, SalesPipeline};

fn fail(e: &AnalyticsError) -> ! {
    tracing::error!("❌ {} (Category: {:?})", e, e.category());
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2, // 可重試
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn resolve_job(
    cli: &CliConfig,
    toml: Option<TomlConfig>,
) -> Result<(JobConfig, bool), AnalyticsError> {
    let today = Utc::now().date_naive();

    match toml {
        Some(mut config) => {
            cli.overlay(&mut config)?;
            let monitor = cli.monitor || config.monitoring_enabled();
            Ok((config.to_job(today)?, monitor))
        }
        None => Ok((cli.to_job(today)?, cli.monitor)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 先讀設定檔，log_level 才能套用到 logger
    let toml = cli.config.as_deref().map(TomlConfig::from_file).transpose();
    let log_level = toml
        .as_ref()
        .ok()
        .and_then(|config| config.as_ref())
        .and_then(|config| config.log_level());
    logger::init_cli_logger(cli.verbose, log_level);
    tracing::info!("Starting vinyl-sales CLI");
    tracing::debug!("CLI config: {:?}", cli);

    let toml = match toml {
        Ok(toml) => toml,
        Err(e) => fail(&e),
    };
    if let Some(path) = &cli.config {
        tracing::info!("📁 Loaded configuration from: {}", path);
    }

    let (job, monitor_enabled) = match resolve_job(&cli, toml) {
        Ok(resolved) => resolved,
        Err(e) => fail(&e),
    };

    if let Err(e) = job.validate() {
        fail(&e);
    }
    tracing::info!(
        "✅ Report for seller {} from {} to {}",
        job.query.seller_id,
        job.query.range.start,
        job.query.range.end
    );
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(".".to_string());
    let pipeline = SalesPipeline::new(storage, job);
    let engine = AnalyticsEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(outcome) => {
            let summary = &outcome.report.summary;
            println!("✅ Sales report completed");
            println!(
                "   Total sales: {:.2} | Orders: {} | Average: {:.2}",
                summary.total_sales, summary.order_count, summary.average_order_value
            );
            println!("📁 Output saved to: {}", outcome.output_path);
        }
        Err(e) => fail(&e),
    }

    Ok(())
}
