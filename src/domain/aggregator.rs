use std::collections::{BTreeMap, HashMap};

use crate::domain::model::{DailyBucket, Order, ProductRanking, SalesSummary};

pub const RECENT_ORDER_LIMIT: usize = 5;
pub const TOP_PRODUCT_LIMIT: usize = 5;

/// Turns an already-filtered, recency-sorted order list into a [`SalesSummary`].
///
/// Pure: no I/O, input is borrowed and never reordered.
#[derive(Debug, Clone, Copy)]
pub struct SalesAggregator {
    recent_limit: usize,
    top_limit: usize,
}

impl Default for SalesAggregator {
    fn default() -> Self {
        Self {
            recent_limit: RECENT_ORDER_LIMIT,
            top_limit: TOP_PRODUCT_LIMIT,
        }
    }
}

impl SalesAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summarize(&self, orders: &[Order]) -> SalesSummary {
        let total_sales: f64 = orders.iter().map(|o| o.amount).sum();
        let order_count = orders.len();
        let average_order_value = if order_count > 0 {
            total_sales / order_count as f64
        } else {
            0.0
        };

        SalesSummary {
            total_sales,
            order_count,
            average_order_value,
            recent_orders: orders.iter().take(self.recent_limit).cloned().collect(),
            sales_by_day: sales_by_day(orders),
            top_products: top_products(orders, self.top_limit),
        }
    }
}

/// Per-day totals, ascending by date.
pub fn sales_by_day(orders: &[Order]) -> Vec<DailyBucket> {
    let mut buckets: BTreeMap<String, DailyBucket> = BTreeMap::new();
    for order in orders {
        let key = order.day_key();
        let bucket = buckets.entry(key.clone()).or_insert_with(|| DailyBucket {
            date: key,
            amount: 0.0,
            orders: 0,
        });
        bucket.amount += order.amount;
        bucket.orders += 1;
    }
    buckets.into_values().collect()
}

/// Products ranked by revenue, descending. Equal revenue keeps first-seen order.
pub fn top_products(orders: &[Order], limit: usize) -> Vec<ProductRanking> {
    let mut ranking: Vec<ProductRanking> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for item in orders.iter().flat_map(|o| o.items.iter()) {
        let key = item.product_key();
        let slot = *index.entry(key).or_insert_with(|| {
            ranking.push(ProductRanking {
                id: key.to_string(),
                title: item.title.clone().unwrap_or_default(),
                total_sold: 0,
                revenue: 0.0,
            });
            ranking.len() - 1
        });
        let entry = &mut ranking[slot];
        if entry.title.is_empty() {
            if let Some(title) = item.title.as_deref().filter(|t| !t.is_empty()) {
                entry.title = title.to_string();
            }
        }
        entry.total_sold += u64::from(item.effective_quantity());
        entry.revenue += item.revenue();
    }

    // sort_by 是穩定排序，同營收維持首次出現順序
    ranking.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    ranking.truncate(limit);
    ranking
}
