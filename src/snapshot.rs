//! Snapshot data model and the shared in-memory snapshot store.
//!
//! All four dashboards read pre-generated JSON snapshots that are replaced
//! wholesale on every successful fetch. Absent or malformed optional fields
//! default to zero/empty instead of failing the parse; the crawlers that
//! produce these files make no schema promises beyond the happy path.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// Sales snapshot (POS system)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesSnapshot {
    pub generated_at: String,
    pub summary: SalesSummary,
    /// Month keys, newest first, as produced by the report generator.
    pub month_list: Vec<String>,
    pub daily: Vec<DailySales>,
    /// Date -> per-store breakdown for that day.
    pub daily_detail: HashMap<String, Vec<StoreDaySales>>,
    pub stores: Vec<StoreRef>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesSummary {
    pub hall: i64,
    pub delivery: i64,
    pub delivery_external: i64,
    pub total: i64,
    pub days: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DailySales {
    pub date: String,
    pub hall: i64,
    pub delivery: i64,
    pub delivery_external: i64,
    pub total: i64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreDaySales {
    pub code: String,
    pub name: String,
    pub hall: i64,
    pub delivery: i64,
    pub delivery_external: i64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreRef {
    pub code: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Order/price report snapshot (procurement system)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSnapshot {
    pub generated_at: String,
    pub summary: ReportSummary,
    pub daily: BTreeMap<String, DailyRecord>,
    /// Weekly buckets keyed by `YYYY-Www`. `change_pct` is computed by the
    /// snapshot generator; it is displayed, never recomputed here.
    pub weekly: BTreeMap<String, PeriodBucket>,
    /// Monthly buckets keyed by `YYYY-MM`; same contract as `weekly`.
    pub monthly: BTreeMap<String, PeriodBucket>,
    pub stores: Vec<StoreTotal>,
    pub categories: Vec<CategoryTotal>,
    pub price_changes: Vec<PriceChangeItem>,
    /// Order-system store name -> per-day order totals.
    pub store_details: HashMap<String, StoreOrderDetail>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSummary {
    pub total_records: u64,
    pub total_stores: u64,
    pub total_products: u64,
    pub total_sales: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyRecord {
    pub count: u64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodBucket {
    pub count: u64,
    pub total: i64,
    pub change_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreTotal {
    pub name: String,
    pub count: u64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryTotal {
    pub name: String,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceChangeItem {
    pub code: String,
    pub name: String,
    pub category: String,
    pub first_price: i64,
    pub last_price: i64,
    pub min_price: i64,
    pub max_price: i64,
    pub change: i64,
    pub change_pct: f64,
    pub count: u64,
    pub first_date: String,
    pub last_date: String,
    /// Price observations in date order.
    pub history: Vec<PricePoint>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PricePoint {
    pub date: String,
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOrderDetail {
    pub daily: HashMap<String, DailyRecord>,
}

// ---------------------------------------------------------------------------
// Ads snapshot (Naver search ads)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdsSnapshot {
    pub generated_at: String,
    pub summary: AdsSummary,
    pub campaigns: Vec<Campaign>,
    pub adgroups: Vec<Adgroup>,
    pub keywords: Vec<KeywordBid>,
    /// Keyword text -> monthly search stats.
    pub keyword_stats: HashMap<String, KeywordStats>,
    /// Keyword text -> observed bid required per ad rank (1..5).
    pub keyword_rank_bids: HashMap<String, Vec<RankBid>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdsSummary {
    pub total_campaigns: u64,
    pub total_adgroups: u64,
    pub total_keywords: u64,
    pub active_keywords: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Campaign {
    pub ncc_campaign_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Adgroup {
    pub ncc_adgroup_id: String,
    pub ncc_campaign_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeywordBid {
    pub ncc_keyword_id: String,
    pub ncc_adgroup_id: String,
    pub keyword: String,
    pub campaign_name: String,
    pub adgroup_name: String,
    pub bid_amt: i64,
    /// `true` means the keyword is paused by the advertiser.
    pub user_lock: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeywordStats {
    pub monthly_pc_qc_cnt: u64,
    pub monthly_mobile_qc_cnt: u64,
    pub comp_idx: CompIdx,
}

impl KeywordStats {
    /// Combined PC + mobile monthly search volume.
    pub fn monthly_volume(&self) -> u64 {
        self.monthly_pc_qc_cnt + self.monthly_mobile_qc_cnt
    }
}

/// Competitiveness bucket as reported by the ads API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompIdx {
    #[serde(rename = "낮음")]
    Low,
    #[serde(rename = "중간")]
    Medium,
    #[serde(rename = "높음")]
    High,
    #[default]
    #[serde(other)]
    Unknown,
}

impl CompIdx {
    /// Ordering weight used by the sort engine; unknown sorts last.
    pub fn weight(self) -> u8 {
        match self {
            CompIdx::High => 3,
            CompIdx::Medium => 2,
            CompIdx::Low => 1,
            CompIdx::Unknown => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CompIdx::Low => "낮음",
            CompIdx::Medium => "중간",
            CompIdx::High => "높음",
            CompIdx::Unknown => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RankBid {
    pub rank: u8,
    pub pc_bid: i64,
    pub mobile_bid: i64,
}

// ---------------------------------------------------------------------------
// Review snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewSnapshot {
    pub generated_at: String,
    pub summary: ReviewSummary,
    pub stores: Vec<ReviewStoreCount>,
    pub reviews: Vec<ReviewItem>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewSummary {
    pub total_reviews: u64,
    pub visitor_reviews: u64,
    pub blog_reviews: u64,
    pub negative_reviews: u64,
    /// Period-over-period change percentages, pre-computed by the crawler.
    pub prev_day_change_pct: Option<f64>,
    pub prev_week_change_pct: Option<f64>,
    pub prev_month_change_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewStoreCount {
    pub store_name: String,
    pub visitor_count: u64,
    pub blog_count: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewItem {
    #[serde(rename = "type")]
    pub review_type: ReviewType,
    pub store_name: String,
    pub author: String,
    pub content: String,
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
    pub images: Vec<String>,
    pub visit_date: Option<String>,
    pub write_date: Option<String>,
    pub is_negative: bool,
    pub sentiment_score: Option<f64>,
}

impl ReviewItem {
    /// Visitor reviews carry a visit date, blog reviews a write date.
    pub fn date(&self) -> Option<&str> {
        self.visit_date
            .as_deref()
            .or(self.write_date.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewType {
    #[default]
    Visitor,
    Blog,
}

// ---------------------------------------------------------------------------
// Shared snapshot store
// ---------------------------------------------------------------------------

/// Content fingerprint of a raw snapshot payload. Used by the loader to log
/// and skip no-op replacements when a refresh returns identical bytes.
pub fn snapshot_fingerprint(raw: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw);
    hex::encode(hasher.finalize())
}

/// Shared holder for the current snapshot of one dashboard.
///
/// Snapshots are only ever replaced wholesale; a failed refresh leaves the
/// previous value untouched, and `None` renders as the "no data" state.
#[derive(Debug)]
pub struct SnapshotStore<T> {
    inner: Arc<RwLock<Versioned<T>>>,
}

#[derive(Debug, Default)]
struct Versioned<T> {
    value: Option<T>,
    fingerprint: Option<String>,
}

impl<T> Clone for SnapshotStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for SnapshotStore<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Versioned {
                value: None,
                fingerprint: None,
            })),
        }
    }
}

impl<T: Clone> SnapshotStore<T> {
    pub fn new(value: T) -> Self {
        let store = Self::default();
        store.replace(value, None);
        store
    }

    pub fn current(&self) -> Option<T> {
        self.inner
            .read()
            .expect("snapshot lock should not be poisoned")
            .value
            .clone()
    }

    pub fn fingerprint(&self) -> Option<String> {
        self.inner
            .read()
            .expect("snapshot lock should not be poisoned")
            .fingerprint
            .clone()
    }

    /// Install a new snapshot. Returns `false` when the fingerprint matches
    /// the current one and the replacement was skipped.
    pub fn replace(&self, value: T, fingerprint: Option<String>) -> bool {
        let mut guard = self
            .inner
            .write()
            .expect("snapshot lock should not be poisoned");
        if fingerprint.is_some() && guard.fingerprint == fingerprint {
            return false;
        }
        guard.value = Some(value);
        guard.fingerprint = fingerprint;
        true
    }
}

/// The four snapshot stores the dashboards read from.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSet {
    pub sales: SnapshotStore<SalesSnapshot>,
    pub report: SnapshotStore<ReportSnapshot>,
    pub ads: SnapshotStore<AdsSnapshot>,
    pub reviews: SnapshotStore<ReviewSnapshot>,
}
