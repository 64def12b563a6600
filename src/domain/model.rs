use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::query::SalesQuery;

/// A marketplace order row as stored by the orders table.
///
/// Decoding is permissive: numeric columns may arrive as numbers or numeric
/// strings, `amount` also reads from `total_amount`, and line items that are
/// not objects are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_id")]
    pub seller_id: Option<String>,
    pub created_at: String,
    #[serde(default, alias = "total_amount", deserialize_with = "lenient::amount")]
    pub amount: f64,
    #[serde(default, alias = "order_items", deserialize_with = "lenient::items")]
    pub items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default, alias = "product_id", deserialize_with = "lenient::opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_quantity")]
    pub quantity: Option<u32>,
}

impl LineItem {
    /// Missing or non-positive quantities count as a single unit.
    pub fn effective_quantity(&self) -> u32 {
        self.quantity.filter(|q| *q > 0).unwrap_or(1)
    }

    pub fn revenue(&self) -> f64 {
        self.price.unwrap_or(0.0) * f64::from(self.effective_quantity())
    }

    pub fn product_key(&self) -> &str {
        self.id.as_deref().unwrap_or("unknown")
    }
}

impl Order {
    /// The order timestamp normalized to UTC, when it can be parsed.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }

    pub fn sale_date(&self) -> Option<NaiveDate> {
        self.timestamp().map(|ts| ts.date_naive())
    }

    /// Bucket key for the per-day series: the UTC date, or the raw date
    /// prefix of `created_at` when the timestamp is not parseable.
    pub fn day_key(&self) -> String {
        match self.sale_date() {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => self
                .created_at
                .split(['T', ' '])
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // Postgres 文字輸出，例如 "2024-01-01 10:00:00.123+00"
    for format in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(ts) = DateTime::parse_from_str(raw, format) {
            return Some(ts.with_timezone(&Utc));
        }
    }
    // 沒有時區的時間戳一律視為 UTC
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub date: String,
    pub amount: f64,
    pub orders: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRanking {
    pub id: String,
    pub title: String,
    pub total_sold: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub total_sales: f64,
    pub order_count: usize,
    pub average_order_value: f64,
    pub recent_orders: Vec<Order>,
    pub sales_by_day: Vec<DailyBucket>,
    pub top_products: Vec<ProductRanking>,
}

impl SalesSummary {
    pub fn empty() -> Self {
        Self {
            total_sales: 0.0,
            order_count: 0,
            average_order_value: 0.0,
            recent_orders: Vec::new(),
            sales_by_day: Vec::new(),
            top_products: Vec::new(),
        }
    }
}

/// A summary together with the query it answers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub seller_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub summary: SalesSummary,
}

impl SalesReport {
    pub fn new(query: &SalesQuery, summary: SalesSummary) -> Self {
        Self {
            seller_id: query.seller_id.clone(),
            start_date: query.range.start,
            end_date: query.range.end,
            generated_at: Utc::now(),
            summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderSource {
    Api {
        endpoint: String,
        api_key: Option<String>,
    },
    File {
        path: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    pub const VALID: [&'static str; 2] = ["json", "csv"];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "csv" => Some(OutputFormat::Csv),
            _ => None,
        }
    }
}

mod lenient {
    use super::LineItem;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn number(value: &Value) -> Option<f64> {
        let n = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        n.filter(|n| n.is_finite())
    }

    fn text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        let value = Value::deserialize(d)?;
        text(value).ok_or_else(|| serde::de::Error::custom("order id must be a string or number"))
    }

    pub fn opt_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(Option::<Value>::deserialize(d)?.and_then(text))
    }

    pub fn amount<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(Option::<Value>::deserialize(d)?
            .as_ref()
            .and_then(number)
            .unwrap_or(0.0))
    }

    pub fn opt_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(Option::<Value>::deserialize(d)?.as_ref().and_then(number))
    }

    pub fn opt_quantity<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        Ok(Option::<Value>::deserialize(d)?
            .as_ref()
            .and_then(number)
            .filter(|q| q.fract() == 0.0 && *q >= 1.0 && *q <= f64::from(u32::MAX))
            .map(|q| q as u32))
    }

    pub fn items<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<LineItem>, D::Error> {
        let values = match Option::<Value>::deserialize(d)? {
            Some(Value::Array(values)) => values,
            _ => return Ok(Vec::new()),
        };
        Ok(values
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect())
    }
}
