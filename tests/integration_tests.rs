use anyhow::Result;
use httpmock::prelude::*;
use std::io::Read;
use tempfile::TempDir;
use vinyl_sales::core::ConfigProvider;
use vinyl_sales::domain::model::{OrderSource, OutputFormat};
use vinyl_sales::utils::validation::Validate;
use vinyl_sales::{AnalyticsEngine, DateRange, JobConfig, LocalStorage, SalesPipeline, SalesQuery};

fn orders_payload() -> serde_json::Value {
    serde_json::json!([
        {"id": 101, "seller_id": "seller-1", "created_at": "2024-03-02T09:30:00+00:00", "total_amount": "64.00",
         "status": "paid",
         "items": [
            {"id": "lp-miles", "title": "Kind of Blue", "price": 32, "quantity": 2}
         ]},
        {"id": 102, "seller_id": "seller-1", "created_at": "2024-03-02T18:00:00+00:00", "total_amount": 25,
         "items": [
            {"id": "lp-coltrane", "title": "A Love Supreme", "price": "25.00", "quantity": 1}
         ]},
        {"id": 103, "seller_id": "seller-1", "created_at": "2024-03-05T12:00:00+00:00", "total_amount": 57,
         "items": [
            {"id": "lp-miles", "title": "Kind of Blue", "price": 32},
            {"id": "lp-mingus", "title": "Mingus Ah Um", "price": 25, "quantity": null}
         ]},
        {"id": 104, "seller_id": "seller-1", "created_at": "2024-04-01T00:00:00+00:00", "total_amount": 500}
    ])
}

fn job(source: OrderSource, output_path: &str) -> JobConfig {
    JobConfig {
        source,
        query: SalesQuery::new("seller-1", DateRange::parse("2024-03-01", "2024-03-31").unwrap())
            .unwrap(),
        output_path: output_path.to_string(),
        output_formats: vec![OutputFormat::Json, OutputFormat::Csv],
        archive_name: None,
        max_orders: None,
        request_timeout: None,
    }
}

#[tokio::test]
async fn test_end_to_end_report_from_api() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let base = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/orders")
            .query_param("seller_id", "eq.seller-1")
            .query_param("select", "*");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(orders_payload());
    });

    let config = job(
        OrderSource::Api {
            endpoint: server.url("/rest/v1/orders"),
            api_key: Some("anon".to_string()),
        },
        "reports",
    );
    config.validate()?;

    let pipeline = SalesPipeline::new(LocalStorage::new(base.clone()), config);
    let engine = AnalyticsEngine::new(pipeline);
    let outcome = engine.run().await?;

    api_mock.assert();
    assert_eq!(outcome.output_path, "reports");

    let summary = &outcome.report.summary;
    assert_eq!(summary.order_count, 3);
    assert_eq!(summary.total_sales, 146.0);
    assert!((summary.average_order_value - 146.0 / 3.0).abs() < 1e-9);

    let recent: Vec<&str> = summary.recent_orders.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(recent, vec!["103", "102", "101"]);

    assert_eq!(summary.sales_by_day.len(), 2);
    assert_eq!(summary.sales_by_day[0].date, "2024-03-02");
    assert_eq!(summary.sales_by_day[0].amount, 89.0);
    assert_eq!(summary.sales_by_day[0].orders, 2);

    let top: Vec<(&str, u64, f64)> = summary
        .top_products
        .iter()
        .map(|p| (p.id.as_str(), p.total_sold, p.revenue))
        .collect();
    assert_eq!(
        top,
        vec![
            ("lp-miles", 3, 96.0),
            ("lp-mingus", 1, 25.0),
            ("lp-coltrane", 1, 25.0)
        ]
    );

    let reports = temp_dir.path().join("reports");
    let summary_json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(reports.join("summary.json"))?)?;
    assert_eq!(summary_json["sellerId"], "seller-1");
    assert_eq!(summary_json["endDate"], "2024-03-31");
    assert_eq!(summary_json["salesByDay"][1]["date"], "2024-03-05");

    let days = std::fs::read_to_string(reports.join("sales_by_day.csv"))?;
    assert_eq!(
        days,
        "date,amount,orders\n2024-03-02,89.00,2\n2024-03-05,57.00,1\n"
    );
    let products = std::fs::read_to_string(reports.join("top_products.csv"))?;
    assert!(products.contains("1,lp-miles,Kind of Blue,3,96.00"));

    Ok(())
}

#[tokio::test]
async fn test_report_from_file_bundled_as_zip() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let base = temp_dir.path().to_str().unwrap().to_string();
    std::fs::write(
        temp_dir.path().join("orders.json"),
        serde_json::to_vec(&serde_json::json!({ "orders": orders_payload() }))?,
    )?;

    let mut config = job(
        OrderSource::File {
            path: "orders.json".to_string(),
        },
        "out",
    );
    config.archive_name = Some("sales_report.zip".to_string());
    config.max_orders = Some(2);
    assert_eq!(config.archive_name(), Some("sales_report.zip"));

    let engine = AnalyticsEngine::new(SalesPipeline::new(LocalStorage::new(base), config));
    let outcome = engine.run().await?;

    assert_eq!(outcome.output_path, "out/sales_report.zip");
    assert_eq!(outcome.report.summary.order_count, 2);

    let archive_path = temp_dir.path().join("out").join("sales_report.zip");
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(std::fs::read(archive_path)?))?;
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["sales_by_day.csv", "summary.json", "top_products.csv"]);

    let mut summary = String::new();
    archive.by_name("summary.json")?.read_to_string(&mut summary)?;
    let summary: serde_json::Value = serde_json::from_str(&summary)?;
    assert_eq!(summary["orderCount"], 2);
    assert_eq!(summary["totalSales"], 82.0);

    Ok(())
}

#[tokio::test]
async fn test_empty_window_produces_zero_summary() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/orders");
        then.status(200).json_body(serde_json::json!([]));
    });

    let config = job(
        OrderSource::Api {
            endpoint: server.url("/rest/v1/orders"),
            api_key: None,
        },
        "empty",
    );
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let outcome = AnalyticsEngine::new(SalesPipeline::new(storage, config))
        .run()
        .await?;

    let summary = &outcome.report.summary;
    assert_eq!(summary.total_sales, 0.0);
    assert_eq!(summary.order_count, 0);
    assert_eq!(summary.average_order_value, 0.0);
    assert!(summary.recent_orders.is_empty());
    assert!(summary.sales_by_day.is_empty());
    assert!(summary.top_products.is_empty());

    let days = std::fs::read_to_string(temp_dir.path().join("empty").join("sales_by_day.csv"))?;
    assert_eq!(days, "date,amount,orders\n");
    Ok(())
}

#[tokio::test]
async fn test_server_error_surfaces_as_retryable() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/orders");
        then.status(503).body("maintenance");
    });

    let temp_dir = TempDir::new().unwrap();
    let config = job(
        OrderSource::Api {
            endpoint: server.url("/rest/v1/orders"),
            api_key: None,
        },
        "reports",
    );
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let err = AnalyticsEngine::new(SalesPipeline::new(storage, config))
        .run()
        .await
        .unwrap_err();

    assert_eq!(
        err.severity(),
        vinyl_sales::utils::error::ErrorSeverity::Medium
    );
    assert!(!temp_dir.path().join("reports").exists());
}
