//! Sort engine with click-toggle semantics.
//!
//! String keys order by Korean dictionary ordering and default ascending;
//! numeric keys default descending on first selection. Sorting always
//! returns a new collection.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::aggregate::StoreSalesTotal;
use crate::snapshot::{KeywordBid, KeywordStats, PriceChangeItem, ReviewItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    /// Query-parameter form, the inverse of [`SortDirection::parse`].
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// A sortable column with a type-appropriate default direction.
pub trait SortKey: Copy + PartialEq {
    fn default_direction(self) -> SortDirection;
}

/// Active sort selection. Clicking the active key toggles direction;
/// clicking a new key resets to that key's default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortState<K: SortKey> {
    pub key: K,
    pub direction: SortDirection,
}

impl<K: SortKey> SortState<K> {
    pub fn new(key: K) -> Self {
        Self {
            key,
            direction: key.default_direction(),
        }
    }

    pub fn click(self, key: K) -> Self {
        if self.key == key {
            Self {
                key,
                direction: self.direction.toggled(),
            }
        } else {
            Self::new(key)
        }
    }
}

/// Korean dictionary comparison. Precomposed Hangul syllables are laid out
/// in dictionary order in Unicode, so comparing scalar values yields the
/// ordering the POS store names and keywords expect.
pub fn compare_korean(a: &str, b: &str) -> Ordering {
    a.chars().cmp(b.chars())
}

// ---------------------------------------------------------------------------
// Store table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreSortKey {
    Name,
    Hall,
    Delivery,
    DeliveryExternal,
    Total,
}

impl StoreSortKey {
    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "name" => Some(StoreSortKey::Name),
            "hall" => Some(StoreSortKey::Hall),
            "delivery" => Some(StoreSortKey::Delivery),
            "delivery_external" => Some(StoreSortKey::DeliveryExternal),
            "total" => Some(StoreSortKey::Total),
            _ => None,
        }
    }

    /// Query-parameter form, the inverse of [`StoreSortKey::parse`].
    pub fn as_str(self) -> &'static str {
        match self {
            StoreSortKey::Name => "name",
            StoreSortKey::Hall => "hall",
            StoreSortKey::Delivery => "delivery",
            StoreSortKey::DeliveryExternal => "delivery_external",
            StoreSortKey::Total => "total",
        }
    }
}

impl SortKey for StoreSortKey {
    fn default_direction(self) -> SortDirection {
        match self {
            StoreSortKey::Name => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }
}

pub fn sort_stores(
    stores: &[StoreSalesTotal],
    state: SortState<StoreSortKey>,
) -> Vec<StoreSalesTotal> {
    let mut sorted = stores.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = match state.key {
            StoreSortKey::Name => compare_korean(&a.name, &b.name),
            StoreSortKey::Hall => a.hall.cmp(&b.hall),
            StoreSortKey::Delivery => a.delivery.cmp(&b.delivery),
            StoreSortKey::DeliveryExternal => a.delivery_external.cmp(&b.delivery_external),
            StoreSortKey::Total => a.total.cmp(&b.total),
        };
        state.direction.apply(ordering)
    });
    sorted
}

// ---------------------------------------------------------------------------
// Keyword table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordSortKey {
    Keyword,
    Campaign,
    Adgroup,
    BidAmt,
    SearchVolume,
    CompIdx,
}

impl KeywordSortKey {
    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "keyword" => Some(KeywordSortKey::Keyword),
            "campaign" => Some(KeywordSortKey::Campaign),
            "adgroup" => Some(KeywordSortKey::Adgroup),
            "bid_amt" => Some(KeywordSortKey::BidAmt),
            "search_volume" => Some(KeywordSortKey::SearchVolume),
            "comp_idx" => Some(KeywordSortKey::CompIdx),
            _ => None,
        }
    }
}

impl SortKey for KeywordSortKey {
    fn default_direction(self) -> SortDirection {
        match self {
            KeywordSortKey::Keyword | KeywordSortKey::Campaign | KeywordSortKey::Adgroup => {
                SortDirection::Asc
            }
            _ => SortDirection::Desc,
        }
    }
}

pub fn sort_keywords(
    keywords: &[KeywordBid],
    stats: &HashMap<String, KeywordStats>,
    state: SortState<KeywordSortKey>,
) -> Vec<KeywordBid> {
    let volume = |kw: &KeywordBid| {
        stats
            .get(&kw.keyword)
            .map(KeywordStats::monthly_volume)
            .unwrap_or(0)
    };
    let comp_weight = |kw: &KeywordBid| {
        stats
            .get(&kw.keyword)
            .map(|entry| entry.comp_idx.weight())
            .unwrap_or(0)
    };

    let mut sorted = keywords.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = match state.key {
            KeywordSortKey::Keyword => compare_korean(&a.keyword, &b.keyword),
            KeywordSortKey::Campaign => compare_korean(&a.campaign_name, &b.campaign_name),
            KeywordSortKey::Adgroup => compare_korean(&a.adgroup_name, &b.adgroup_name),
            KeywordSortKey::BidAmt => a.bid_amt.cmp(&b.bid_amt),
            KeywordSortKey::SearchVolume => volume(a).cmp(&volume(b)),
            KeywordSortKey::CompIdx => comp_weight(a).cmp(&comp_weight(b)),
        };
        state.direction.apply(ordering)
    });
    sorted
}

// ---------------------------------------------------------------------------
// Price cards
// ---------------------------------------------------------------------------

/// Price-card orderings. `ChangeDesc`/`ChangeAsc` rank by the magnitude of
/// the change percentage, so a −40% move outranks a +10% move under
/// `ChangeDesc`. `UpOnly`/`DownOnly` first drop records of the other sign,
/// then order by the signed percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceSortMode {
    #[default]
    ChangeDesc,
    ChangeAsc,
    PriceDesc,
    NameAsc,
    UpOnly,
    DownOnly,
}

impl PriceSortMode {
    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "change_desc" => Some(PriceSortMode::ChangeDesc),
            "change_asc" => Some(PriceSortMode::ChangeAsc),
            "price_desc" => Some(PriceSortMode::PriceDesc),
            "name_asc" => Some(PriceSortMode::NameAsc),
            "up_only" => Some(PriceSortMode::UpOnly),
            "down_only" => Some(PriceSortMode::DownOnly),
            _ => None,
        }
    }
}

pub fn sort_price_items(items: &[PriceChangeItem], mode: PriceSortMode) -> Vec<PriceChangeItem> {
    let mut sorted: Vec<PriceChangeItem> = match mode {
        PriceSortMode::UpOnly => items.iter().filter(|i| i.change > 0).cloned().collect(),
        PriceSortMode::DownOnly => items.iter().filter(|i| i.change < 0).cloned().collect(),
        _ => items.to_vec(),
    };

    match mode {
        PriceSortMode::ChangeDesc => {
            sorted.sort_by(|a, b| b.change_pct.abs().total_cmp(&a.change_pct.abs()));
        }
        PriceSortMode::ChangeAsc => {
            sorted.sort_by(|a, b| a.change_pct.abs().total_cmp(&b.change_pct.abs()));
        }
        PriceSortMode::PriceDesc => {
            sorted.sort_by(|a, b| b.last_price.cmp(&a.last_price));
        }
        PriceSortMode::NameAsc => {
            sorted.sort_by(|a, b| compare_korean(&a.name, &b.name));
        }
        PriceSortMode::UpOnly => {
            sorted.sort_by(|a, b| b.change_pct.total_cmp(&a.change_pct));
        }
        PriceSortMode::DownOnly => {
            sorted.sort_by(|a, b| a.change_pct.total_cmp(&b.change_pct));
        }
    }
    sorted
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewSortMode {
    #[default]
    Recent,
    Oldest,
}

impl ReviewSortMode {
    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "recent" => Some(ReviewSortMode::Recent),
            "oldest" => Some(ReviewSortMode::Oldest),
            _ => None,
        }
    }
}

pub fn sort_reviews(reviews: &[ReviewItem], mode: ReviewSortMode) -> Vec<ReviewItem> {
    let mut sorted = reviews.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = a.date().unwrap_or("").cmp(b.date().unwrap_or(""));
        match mode {
            ReviewSortMode::Recent => ordering.reverse(),
            ReviewSortMode::Oldest => ordering,
        }
    });
    sorted
}
