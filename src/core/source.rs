use crate::domain::model::Order;
use crate::domain::query::SalesQuery;
use crate::utils::error::{AnalyticsError, Result};
use reqwest::Client;
use serde_json::Value;

/// Fetches the seller's orders from a PostgREST-style `orders` endpoint.
///
/// The server-side filters only narrow the payload; callers still run
/// [`select_orders`] because some endpoints ignore unknown filters.
pub async fn fetch_orders(
    client: &Client,
    endpoint: &str,
    api_key: Option<&str>,
    query: &SalesQuery,
) -> Result<Value> {
    let params = [
        ("select", "*".to_string()),
        ("seller_id", format!("eq.{}", query.seller_id)),
        ("created_at", format!("gte.{}", query.range.start)),
        ("created_at", format!("lt.{}", query.range.end_exclusive())),
        ("order", "created_at.desc".to_string()),
    ];

    tracing::debug!("Requesting orders from: {}", endpoint);
    let mut request = client
        .get(endpoint)
        .query(&params[..])
        .header("Accept", "application/json");
    if let Some(key) = api_key {
        request = request.header("apikey", key).bearer_auth(key);
    }

    let response = request.send().await?;
    let status = response.status();
    tracing::debug!("Orders API response status: {}", status);

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AnalyticsError::ApiStatusError {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json().await?)
}

/// Accepts a bare array or an object wrapping it under `orders` / `data`.
/// Rows that do not decode as orders are skipped.
pub fn decode_orders(payload: Value) -> Result<Vec<Order>> {
    let rows = match payload {
        Value::Array(rows) => rows,
        Value::Object(mut obj) => match obj.remove("orders").or_else(|| obj.remove("data")) {
            Some(Value::Array(rows)) => rows,
            _ => {
                return Err(AnalyticsError::DataError {
                    message: "expected an `orders` or `data` array in the payload".to_string(),
                })
            }
        },
        other => {
            return Err(AnalyticsError::DataError {
                message: format!("expected a JSON array of orders, got {}", kind(&other)),
            })
        }
    };

    let total = rows.len();
    let orders: Vec<Order> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<Order>(row) {
            Ok(order) => Some(order),
            Err(e) => {
                tracing::warn!("Skipping malformed order row: {}", e);
                None
            }
        })
        .collect();

    if orders.len() < total {
        tracing::warn!("Decoded {} of {} order rows", orders.len(), total);
    }
    Ok(orders)
}

/// Keeps orders matching `query`, newest first, capped at `max_orders`.
pub fn select_orders(orders: Vec<Order>, query: &SalesQuery, max_orders: Option<usize>) -> Vec<Order> {
    let mut selected: Vec<Order> = orders.into_iter().filter(|o| query.matches(o)).collect();
    selected.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    if let Some(max) = max_orders {
        selected.truncate(max);
    }
    selected
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::DateRange;
    use serde_json::json;

    fn query() -> SalesQuery {
        SalesQuery::new("seller-1", DateRange::parse("2024-01-01", "2024-01-31").unwrap()).unwrap()
    }

    #[test]
    fn test_decode_wrapped_payload() {
        let orders = decode_orders(json!({
            "data": [
                {"id": "1", "created_at": "2024-01-01", "amount": 5},
                {"created_at": "2024-01-01"}
            ]
        }))
        .unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, "1");
    }

    #[test]
    fn test_decode_rejects_scalar_payload() {
        let err = decode_orders(json!("nope")).unwrap_err();
        assert!(matches!(err, AnalyticsError::DataError { .. }));
        assert!(decode_orders(json!({"rows": []})).is_err());
    }

    #[test]
    fn test_select_orders_filters_sorts_and_caps() {
        let orders = decode_orders(json!([
            {"id": "old", "seller_id": "seller-1", "created_at": "2024-01-02T10:00:00Z", "amount": 1},
            {"id": "other", "seller_id": "seller-2", "created_at": "2024-01-20T10:00:00Z", "amount": 1},
            {"id": "new", "seller_id": "seller-1", "created_at": "2024-01-20T10:00:00Z", "amount": 1},
            {"id": "mid", "seller_id": "seller-1", "created_at": "2024-01-10T10:00:00Z", "amount": 1},
            {"id": "late", "seller_id": "seller-1", "created_at": "2024-02-01T00:00:00Z", "amount": 1}
        ]))
        .unwrap();

        let selected = select_orders(orders.clone(), &query(), None);
        let ids: Vec<&str> = selected.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);

        let capped = select_orders(orders, &query(), Some(2));
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].id, "new");
    }
}
