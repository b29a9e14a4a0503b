//! Filter engine shared by every dashboard.
//!
//! Criteria compose by logical AND in a fixed order: store equality, then
//! period match on the record date, then free-text search, then facet
//! filters. Empty criteria values are no-ops. Inputs are never mutated;
//! every function returns a fresh collection.

use crate::period::PeriodFilter;
use crate::snapshot::{
    AdsSnapshot, DailySales, KeywordBid, PriceChangeItem, ReviewItem, ReviewType, StoreDaySales,
};

/// Case-insensitive substring match across a set of searchable fields.
/// An empty query matches everything; otherwise the first matching field
/// wins.
pub fn matches_query<'a>(query: &str, fields: impl IntoIterator<Item = &'a str>) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    fields
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

// ---------------------------------------------------------------------------
// Sales
// ---------------------------------------------------------------------------

/// Day records narrowed to the active period.
pub fn filter_sales_days(days: &[DailySales], period: &PeriodFilter) -> Vec<DailySales> {
    days.iter()
        .filter(|day| period.matches_date(&day.date))
        .cloned()
        .collect()
}

/// Per-store day rows across every date inside the period, optionally
/// narrowed to one store name.
pub fn filter_store_day_rows(
    daily_detail: &std::collections::HashMap<String, Vec<StoreDaySales>>,
    period: &PeriodFilter,
    store: &str,
) -> Vec<StoreDaySales> {
    let mut rows = Vec::new();
    for (date, detail) in daily_detail {
        if !period.matches_date(date) {
            continue;
        }
        for row in detail {
            if !store.is_empty() && row.name != store {
                continue;
            }
            rows.push(row.clone());
        }
    }
    rows
}

// ---------------------------------------------------------------------------
// Keywords
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Paused,
}

impl StatusFilter {
    pub fn parse(input: &str) -> Self {
        match input {
            "active" => StatusFilter::Active,
            "paused" => StatusFilter::Paused,
            _ => StatusFilter::All,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeywordCriteria {
    pub campaign_id: String,
    pub adgroup_id: String,
    pub status: StatusFilter,
    pub query: String,
}

/// Narrow the keyword list. Campaign membership is resolved through the
/// adgroup list since keywords only carry their adgroup id.
pub fn filter_keywords(snapshot: &AdsSnapshot, criteria: &KeywordCriteria) -> Vec<KeywordBid> {
    snapshot
        .keywords
        .iter()
        .filter(|kw| {
            if !criteria.campaign_id.is_empty() {
                let in_campaign = snapshot
                    .adgroups
                    .iter()
                    .find(|ag| ag.ncc_adgroup_id == kw.ncc_adgroup_id)
                    .is_some_and(|ag| ag.ncc_campaign_id == criteria.campaign_id);
                if !in_campaign {
                    return false;
                }
            }
            if !criteria.adgroup_id.is_empty() && kw.ncc_adgroup_id != criteria.adgroup_id {
                return false;
            }
            match criteria.status {
                StatusFilter::All => {}
                StatusFilter::Active => {
                    if kw.user_lock {
                        return false;
                    }
                }
                StatusFilter::Paused => {
                    if !kw.user_lock {
                        return false;
                    }
                }
            }
            matches_query(
                &criteria.query,
                [
                    kw.keyword.as_str(),
                    kw.campaign_name.as_str(),
                    kw.adgroup_name.as_str(),
                ],
            )
        })
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ReviewCriteria {
    pub store: String,
    pub review_type: Option<ReviewType>,
    pub negative_only: bool,
    pub query: String,
}

pub fn filter_reviews(reviews: &[ReviewItem], criteria: &ReviewCriteria) -> Vec<ReviewItem> {
    reviews
        .iter()
        .filter(|review| {
            if !criteria.store.is_empty() && review.store_name != criteria.store {
                return false;
            }
            if let Some(wanted) = criteria.review_type {
                if review.review_type != wanted {
                    return false;
                }
            }
            if criteria.negative_only && !review.is_negative {
                return false;
            }
            let tag_fields = review.tags.iter().map(String::as_str);
            let keyword_fields = review.keywords.iter().map(String::as_str);
            matches_query(
                &criteria.query,
                [
                    review.store_name.as_str(),
                    review.author.as_str(),
                    review.content.as_str(),
                ]
                .into_iter()
                .chain(tag_fields)
                .chain(keyword_fields),
            )
        })
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Price-change items
// ---------------------------------------------------------------------------

/// Filter price items by free text and period.
///
/// When a period is active every derived price field is re-derived from the
/// period's slice of the history: first/last follow the filtered history in
/// date order, min/max cover only that subset's positive prices, and
/// change/change_pct are recomputed from the filtered endpoints. An item
/// whose history has no entries inside the period is dropped entirely.
pub fn filter_price_items(
    items: &[PriceChangeItem],
    period: &PeriodFilter,
    query: &str,
) -> Vec<PriceChangeItem> {
    items
        .iter()
        .filter(|item| matches_query(query, [item.name.as_str(), item.code.as_str()]))
        .filter_map(|item| {
            if period.is_all() {
                return Some(item.clone());
            }
            refit_to_period(item, period)
        })
        .collect()
}

fn refit_to_period(item: &PriceChangeItem, period: &PeriodFilter) -> Option<PriceChangeItem> {
    let history: Vec<_> = item
        .history
        .iter()
        .filter(|point| period.matches_date(&point.date))
        .cloned()
        .collect();
    let first = history.first()?.clone();
    let last = history
        .last()
        .expect("non-empty history has a last entry")
        .clone();

    let positive: Vec<i64> = history
        .iter()
        .map(|point| point.price)
        .filter(|price| *price > 0)
        .collect();
    let min_price = positive.iter().copied().min().unwrap_or(0);
    let max_price = positive.iter().copied().max().unwrap_or(0);

    let change = last.price - first.price;
    let change_pct = if first.price > 0 {
        round2(change as f64 / first.price as f64 * 100.0)
    } else {
        0.0
    };

    Some(PriceChangeItem {
        first_price: first.price,
        last_price: last.price,
        min_price,
        max_price,
        change,
        change_pct,
        count: history.len() as u64,
        first_date: first.date,
        last_date: last.date,
        history,
        ..item.clone()
    })
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
