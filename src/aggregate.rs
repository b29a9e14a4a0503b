//! Summary metric recomputation over filtered record sets.
//!
//! Every function here is a single linear pass over the *filtered* input;
//! nothing re-reads the unfiltered snapshot. Divide-by-zero cases surface as
//! `None` (rendered "-") or 0%, never as NaN.

use std::collections::BTreeMap;
use std::collections::HashMap;

use serde::Serialize;

use crate::filter::round2;
use crate::snapshot::{
    DailySales, PeriodBucket, PriceChangeItem, ReviewItem, StoreDaySales,
};

/// Channel totals across a filtered set of day records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SalesTotals {
    pub hall: i64,
    pub delivery: i64,
    pub delivery_external: i64,
    pub total: i64,
    pub days: u64,
}

pub fn aggregate_sales_days(days: &[DailySales]) -> SalesTotals {
    let mut totals = SalesTotals::default();
    for day in days {
        totals.hall += day.hall;
        totals.delivery += day.delivery;
        totals.delivery_external += day.delivery_external;
        totals.total += day.total;
    }
    totals.days = days.len() as u64;
    totals
}

/// Per-store channel totals accumulated from filtered per-store day rows.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct StoreSalesTotal {
    pub code: String,
    pub name: String,
    pub hall: i64,
    pub delivery: i64,
    pub delivery_external: i64,
    pub total: i64,
}

pub fn aggregate_store_days(rows: &[StoreDaySales]) -> Vec<StoreSalesTotal> {
    let mut by_code: HashMap<&str, StoreSalesTotal> = HashMap::new();
    for row in rows {
        let entry = by_code
            .entry(row.code.as_str())
            .or_insert_with(|| StoreSalesTotal {
                code: row.code.clone(),
                name: row.name.clone(),
                ..StoreSalesTotal::default()
            });
        entry.hall += row.hall;
        entry.delivery += row.delivery;
        entry.delivery_external += row.delivery_external;
        entry.total += row.total;
    }
    by_code.into_values().collect()
}

/// Percentage shares (one decimal) for a list of totals. `None` when the
/// denominator is zero; callers render that as "-".
pub fn share_percentages(totals: &[i64]) -> Option<Vec<f64>> {
    let sum: i64 = totals.iter().sum();
    if sum == 0 {
        return None;
    }
    Some(
        totals
            .iter()
            .map(|total| round1(*total as f64 / sum as f64 * 100.0))
            .collect(),
    )
}

/// Aggregate view of a filtered price-change set.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PriceOverview {
    pub distinct_products: u64,
    /// Average last price over items with a positive last price; absent when
    /// no such item exists.
    pub avg_last_price: Option<f64>,
    pub up_count: u64,
    pub down_count: u64,
    pub flat_count: u64,
}

pub fn price_overview(items: &[PriceChangeItem]) -> PriceOverview {
    let mut overview = PriceOverview::default();
    let mut seen_codes: Vec<&str> = Vec::new();
    let mut priced_sum: i64 = 0;
    let mut priced_count: u64 = 0;

    for item in items {
        if !seen_codes.contains(&item.code.as_str()) {
            seen_codes.push(&item.code);
        }
        if item.last_price > 0 {
            priced_sum += item.last_price;
            priced_count += 1;
        }
        if item.change > 0 {
            overview.up_count += 1;
        } else if item.change < 0 {
            overview.down_count += 1;
        } else {
            overview.flat_count += 1;
        }
    }

    overview.distinct_products = seen_codes.len() as u64;
    overview.avg_last_price = if priced_count > 0 {
        Some(round2(priced_sum as f64 / priced_count as f64))
    } else {
        None
    };
    overview
}

/// One weekly/monthly bucket prepared for display. `change_pct` comes from
/// the snapshot generator; it is selected here, never derived.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PeriodRow {
    pub key: String,
    pub count: u64,
    pub total: i64,
    pub change_pct: Option<f64>,
}

pub fn period_rows(buckets: &BTreeMap<String, PeriodBucket>) -> Vec<PeriodRow> {
    buckets
        .iter()
        .map(|(key, bucket)| PeriodRow {
            key: key.clone(),
            count: bucket.count,
            total: bucket.total,
            change_pct: bucket.change_pct,
        })
        .collect()
}

/// Counts across a filtered review set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReviewCounts {
    pub total: u64,
    pub visitor: u64,
    pub blog: u64,
    pub negative: u64,
}

pub fn review_counts(reviews: &[ReviewItem]) -> ReviewCounts {
    let mut counts = ReviewCounts::default();
    for review in reviews {
        counts.total += 1;
        match review.review_type {
            crate::snapshot::ReviewType::Visitor => counts.visitor += 1,
            crate::snapshot::ReviewType::Blog => counts.blog += 1,
        }
        if review.is_negative {
            counts.negative += 1;
        }
    }
    counts
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ReviewType;

    #[test]
    fn sales_totals_sum_the_filtered_set() {
        let days = vec![
            DailySales {
                date: "2024-01-01".to_string(),
                hall: 100,
                delivery: 50,
                total: 150,
                ..DailySales::default()
            },
            DailySales {
                date: "2024-01-02".to_string(),
                hall: 200,
                delivery: 100,
                total: 300,
                ..DailySales::default()
            },
        ];
        let totals = aggregate_sales_days(&days);
        assert_eq!(totals.hall, 300);
        assert_eq!(totals.delivery, 150);
        assert_eq!(totals.total, 450);
        assert_eq!(totals.days, 2);
    }

    #[test]
    fn store_days_accumulate_by_code() {
        let rows = vec![
            StoreDaySales {
                code: "98".to_string(),
                name: "역대짬뽕 본점".to_string(),
                hall: 10,
                total: 15,
                ..StoreDaySales::default()
            },
            StoreDaySales {
                code: "98".to_string(),
                name: "역대짬뽕 본점".to_string(),
                hall: 20,
                total: 25,
                ..StoreDaySales::default()
            },
            StoreDaySales {
                code: "99".to_string(),
                name: "역대짬뽕 송탄점".to_string(),
                total: 5,
                ..StoreDaySales::default()
            },
        ];
        let mut totals = aggregate_store_days(&rows);
        totals.sort_by(|a, b| a.code.cmp(&b.code));
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].hall, 30);
        assert_eq!(totals[0].total, 40);
        assert_eq!(totals[1].total, 5);
    }

    #[test]
    fn shares_sum_to_one_hundred_within_rounding() {
        let shares = share_percentages(&[100, 200, 700]).expect("non-zero denominator");
        assert_eq!(shares, vec![10.0, 20.0, 70.0]);
        let sum: f64 = shares.iter().sum();
        assert!((sum - 100.0).abs() < 0.2);
    }

    #[test]
    fn zero_denominator_reports_absent_shares() {
        assert_eq!(share_percentages(&[0, 0]), None);
        assert_eq!(share_percentages(&[]), None);
    }

    #[test]
    fn price_overview_guards_empty_average() {
        let items = vec![
            PriceChangeItem {
                code: "A".to_string(),
                last_price: 0,
                change: -100,
                ..PriceChangeItem::default()
            },
            PriceChangeItem {
                code: "B".to_string(),
                last_price: 3000,
                change: 500,
                ..PriceChangeItem::default()
            },
            PriceChangeItem {
                code: "B".to_string(),
                last_price: 1000,
                change: 0,
                ..PriceChangeItem::default()
            },
        ];
        let overview = price_overview(&items);
        assert_eq!(overview.distinct_products, 2);
        assert_eq!(overview.avg_last_price, Some(2000.0));
        assert_eq!(overview.up_count, 1);
        assert_eq!(overview.down_count, 1);
        assert_eq!(overview.flat_count, 1);

        let empty = price_overview(&[]);
        assert_eq!(empty.avg_last_price, None);
    }

    #[test]
    fn period_rows_pass_through_upstream_change_pct() {
        let mut buckets = BTreeMap::new();
        buckets.insert(
            "2024-01".to_string(),
            PeriodBucket {
                count: 3,
                total: 900,
                change_pct: None,
            },
        );
        buckets.insert(
            "2024-02".to_string(),
            PeriodBucket {
                count: 4,
                total: 990,
                change_pct: Some(10.0),
            },
        );

        let rows = period_rows(&buckets);
        assert_eq!(rows[0].key, "2024-01");
        assert_eq!(rows[0].change_pct, None);
        assert_eq!(rows[1].change_pct, Some(10.0));
    }

    #[test]
    fn review_counts_split_by_type_and_negativity() {
        let reviews = vec![
            ReviewItem {
                review_type: ReviewType::Visitor,
                is_negative: true,
                ..ReviewItem::default()
            },
            ReviewItem {
                review_type: ReviewType::Blog,
                ..ReviewItem::default()
            },
        ];
        let counts = review_counts(&reviews);
        assert_eq!(counts.total, 2);
        assert_eq!(counts.visitor, 1);
        assert_eq!(counts.blog, 1);
        assert_eq!(counts.negative, 1);
    }
}
