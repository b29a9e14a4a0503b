//! Order-to-sales rate with store-name cross-mapping.
//!
//! The procurement system and the POS system name the same stores
//! differently; a fixed table maps between the two conventions. Order
//! totals are re-bucketed under POS names before the rate is computed.

use std::collections::HashMap;

use serde::Serialize;

use crate::aggregate::{round1, StoreSalesTotal};
use crate::period::PeriodFilter;
use crate::snapshot::StoreOrderDetail;

/// Order-system store name -> POS store name.
const STORE_MAPPING: &[(&str, &str)] = &[
    ("역대짬뽕 장안본점(98)", "역대짬뽕 본점"),
    ("역대짬뽕 오산시청점(99)", "역대짬뽕 오산시청점"),
    ("역대짬뽕 병점점(99)", "역대짬뽕 병점점"),
    ("역대짬뽕 송탄점(99)", "역대짬뽕 송탄점"),
    ("역대짬뽕 화성반월점(99)", "역대짬뽕 화성반월점"),
    ("역대짬뽕 다산1호점(14)", "역대짬뽕 다산1호점"),
    ("역대짬뽕 송파점(95)", "역대짬뽕 송파점"),
    ("역대짬뽕 두정점(101)", "역대짬뽕 두정점"),
];

/// Bidirectional store-name lookup. Unknown names pass through unchanged so
/// a new store shows up under its raw name instead of disappearing.
#[derive(Debug, Clone)]
pub struct OrderStoreMap {
    to_pos: HashMap<&'static str, &'static str>,
    to_order: HashMap<&'static str, &'static str>,
}

impl Default for OrderStoreMap {
    fn default() -> Self {
        let mut to_pos = HashMap::new();
        let mut to_order = HashMap::new();
        for (order_name, pos_name) in STORE_MAPPING {
            to_pos.insert(*order_name, *pos_name);
            to_order.insert(*pos_name, *order_name);
        }
        Self { to_pos, to_order }
    }
}

impl OrderStoreMap {
    pub fn pos_name<'a>(&self, order_name: &'a str) -> &'a str {
        self.to_pos.get(order_name).copied().unwrap_or(order_name)
    }

    pub fn order_name<'a>(&self, pos_name: &'a str) -> &'a str {
        self.to_order.get(pos_name).copied().unwrap_or(pos_name)
    }
}

/// Sum order totals within the active period, re-bucketed by POS store
/// name. Stores whose filtered total is zero are omitted.
pub fn order_totals_by_pos_store(
    store_details: &HashMap<String, StoreOrderDetail>,
    map: &OrderStoreMap,
    period: &PeriodFilter,
) -> HashMap<String, i64> {
    let mut totals: HashMap<String, i64> = HashMap::new();
    for (order_name, detail) in store_details {
        let total: i64 = detail
            .daily
            .iter()
            .filter(|(date, _)| period.matches_date(date))
            .map(|(_, record)| record.total)
            .sum();
        if total > 0 {
            *totals.entry(map.pos_name(order_name).to_string()).or_insert(0) += total;
        }
    }
    totals
}

/// One store's order-to-sales rate row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRate {
    pub name: String,
    /// Procurement-system account name for matched rows.
    pub order_store: Option<String>,
    pub sales: i64,
    pub order: i64,
    /// Percentage, one decimal. 0 when sales are zero.
    pub rate: f64,
    /// `false` means no order total matched this POS store; rendered as
    /// "미연동" rather than 0%.
    pub matched: bool,
}

/// Join filtered per-store sales totals with period-filtered order totals.
/// Rows with neither sales nor orders are dropped; output is ordered by
/// rate, highest first.
pub fn order_rates(
    stores: &[StoreSalesTotal],
    order_totals: &HashMap<String, i64>,
    map: &OrderStoreMap,
) -> Vec<OrderRate> {
    let mut rates: Vec<OrderRate> = stores
        .iter()
        .filter_map(|store| {
            let order = order_totals.get(&store.name).copied().unwrap_or(0);
            if store.total <= 0 && order <= 0 {
                return None;
            }
            let rate = if store.total > 0 {
                round1(order as f64 / store.total as f64 * 100.0)
            } else {
                0.0
            };
            let matched = order > 0;
            Some(OrderRate {
                name: store.name.clone(),
                order_store: matched.then(|| map.order_name(&store.name).to_string()),
                sales: store.total,
                order,
                rate,
                matched,
            })
        })
        .collect();
    rates.sort_by(|a, b| b.rate.total_cmp(&a.rate));
    rates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::DailyRecord;

    fn detail(days: &[(&str, i64)]) -> StoreOrderDetail {
        StoreOrderDetail {
            daily: days
                .iter()
                .map(|(date, total)| {
                    (
                        date.to_string(),
                        DailyRecord {
                            count: 1,
                            total: *total,
                        },
                    )
                })
                .collect(),
        }
    }

    fn store(name: &str, total: i64) -> StoreSalesTotal {
        StoreSalesTotal {
            code: name.to_string(),
            name: name.to_string(),
            total,
            ..StoreSalesTotal::default()
        }
    }

    #[test]
    fn mapping_is_bidirectional_and_passes_unknown_names_through() {
        let map = OrderStoreMap::default();
        assert_eq!(map.pos_name("역대짬뽕 장안본점(98)"), "역대짬뽕 본점");
        assert_eq!(map.order_name("역대짬뽕 본점"), "역대짬뽕 장안본점(98)");
        assert_eq!(map.pos_name("신규지점"), "신규지점");
    }

    #[test]
    fn order_totals_respect_period_and_rename() {
        let mut details = HashMap::new();
        details.insert(
            "역대짬뽕 장안본점(98)".to_string(),
            detail(&[("2024-01-10", 1_000), ("2024-02-10", 9_000)]),
        );
        details.insert(
            "역대짬뽕 송탄점(99)".to_string(),
            detail(&[("2024-02-01", 500)]),
        );

        let map = OrderStoreMap::default();
        let period = PeriodFilter::Monthly("2024-01".to_string());
        let totals = order_totals_by_pos_store(&details, &map, &period);
        assert_eq!(totals.get("역대짬뽕 본점"), Some(&1_000));
        // Songtan has no January orders, so it is absent rather than zero.
        assert!(!totals.contains_key("역대짬뽕 송탄점"));
    }

    #[test]
    fn rates_flag_unmatched_stores_and_sort_by_rate() {
        let stores = vec![
            store("역대짬뽕 본점", 10_000),
            store("역대짬뽕 송탄점", 4_000),
            store("역대짬뽕 병점점", 0),
        ];
        let mut order_totals = HashMap::new();
        order_totals.insert("역대짬뽕 본점".to_string(), 2_000);
        order_totals.insert("역대짬뽕 송탄점".to_string(), 3_000);

        let rates = order_rates(&stores, &order_totals, &OrderStoreMap::default());
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].name, "역대짬뽕 송탄점");
        assert_eq!(rates[0].rate, 75.0);
        assert!(rates[0].matched);
        assert_eq!(rates[0].order_store.as_deref(), Some("역대짬뽕 송탄점(99)"));
        assert_eq!(rates[1].rate, 20.0);
        assert_eq!(rates[1].order_store.as_deref(), Some("역대짬뽕 장안본점(98)"));
    }

    #[test]
    fn store_with_orders_but_no_sales_shows_as_unrated_row() {
        let stores = vec![store("역대짬뽕 본점", 0)];
        let mut order_totals = HashMap::new();
        order_totals.insert("역대짬뽕 본점".to_string(), 1_500);

        let rates = order_rates(&stores, &order_totals, &OrderStoreMap::default());
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].rate, 0.0);
        assert!(rates[0].matched);
    }

    #[test]
    fn unmatched_row_carries_no_order_account() {
        let stores = vec![store("역대짬뽕 신설점", 5_000)];
        let rates = order_rates(&stores, &HashMap::new(), &OrderStoreMap::default());
        assert_eq!(rates.len(), 1);
        assert!(!rates[0].matched);
        assert_eq!(rates[0].order_store, None);
    }
}
