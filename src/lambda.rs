use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client as S3Client;
use chrono::Utc;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use vinyl_sales::utils::{logger, validation::Validate};
use vinyl_sales::{AnalyticsEngine, LambdaConfig, S3Storage, SalesPipeline, SalesSummary};

#[derive(Deserialize)]
pub struct Request {
    pub seller_id: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub last_days: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub output_path: String,
    #[serde(flatten)]
    pub summary: SalesSummary,
}

async fn function_handler(event: LambdaEvent<Request>) -> Result<Response, Error> {
    let request = event.payload;
    tracing::info!("Sales report requested for seller {}", request.seller_id);

    let lambda_config = LambdaConfig::from_env()?;
    lambda_config.validate()?;

    let job = lambda_config.job_for(
        &request.seller_id,
        request.start_date.as_deref(),
        request.end_date.as_deref(),
        request.last_days,
        Utc::now().date_naive(),
    )?;
    job.validate()?;

    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .region(Region::new(lambda_config.s3_region.clone()))
        .force_path_style(true)
        .build();
    let storage = S3Storage::new(
        S3Client::from_conf(s3_config),
        lambda_config.s3_bucket.clone(),
    );

    let engine = AnalyticsEngine::new(SalesPipeline::new(storage, job));
    let outcome = engine.run().await?;

    tracing::info!(
        "Sales report for {} written to {}",
        request.seller_id,
        outcome.output_path
    );
    Ok(Response {
        output_path: outcome.output_path,
        summary: outcome.report.summary,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();
    run(service_fn(function_handler)).await
}
