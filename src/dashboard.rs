//! Dashboard view models and HTTP routes.
//!
//! Four dashboards share one pipeline: read the current snapshot, narrow it
//! with the request's criteria, aggregate the filtered set, sort, render.
//! A missing snapshot renders the no-data page instead of an error.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::aggregate::{
    aggregate_sales_days, aggregate_store_days, period_rows, price_overview, review_counts,
    share_percentages, PeriodRow, PriceOverview, ReviewCounts, SalesTotals, StoreSalesTotal,
};
use crate::bids::{
    bid_at_rank, estimate_rank, BidAdvice, BidChange, BidChangeSink, BidPolicy, RankEstimate,
    RankSelection,
};
use crate::chart::{render_bar_svg, BarSeries, ChartSlot};
use crate::filter::{
    filter_keywords, filter_price_items, filter_reviews, filter_sales_days, filter_store_day_rows,
    KeywordCriteria, ReviewCriteria, StatusFilter,
};
use crate::orders::{order_rates, order_totals_by_pos_store, OrderRate, OrderStoreMap};
use crate::period::{month_list, parse_period_type, week_list, PeriodFilter};
use crate::snapshot::{
    AdsSnapshot, AdsSummary, Campaign, DailySales, KeywordBid, PriceChangeItem, ReportSnapshot,
    ReportSummary, ReviewItem, ReviewSnapshot, ReviewSummary, SalesSnapshot, SnapshotSet,
};
use crate::sort::{
    sort_keywords, sort_price_items, sort_reviews, sort_stores, KeywordSortKey, PriceSortMode,
    ReviewSortMode, SortDirection, SortKey, SortState, StoreSortKey,
};

#[derive(Clone)]
pub struct AppState {
    pub snapshots: SnapshotSet,
    pub bid_policy: BidPolicy,
    pub bid_sink: Arc<dyn BidChangeSink>,
    sales_chart: Arc<Mutex<ChartSlot<String>>>,
    order_rate_chart: Arc<Mutex<ChartSlot<String>>>,
}

impl AppState {
    pub fn new(snapshots: SnapshotSet, bid_sink: Arc<dyn BidChangeSink>) -> Self {
        Self {
            snapshots,
            bid_policy: BidPolicy::default(),
            bid_sink,
            sales_chart: Arc::new(Mutex::new(ChartSlot::default())),
            order_rate_chart: Arc::new(Mutex::new(ChartSlot::default())),
        }
    }
}

pub fn dashboard_router(state: AppState) -> Router {
    Router::new()
        .route("/sales", get(get_sales_html))
        .route("/sales/snapshot", get(get_sales_snapshot))
        .route("/sales/chart.svg", get(get_sales_chart))
        .route("/sales/order-rate-chart.svg", get(get_order_rate_chart))
        .route("/report", get(get_report_html))
        .route("/report/snapshot", get(get_report_snapshot))
        .route("/ads", get(get_ads_html))
        .route("/ads/snapshot", get(get_ads_snapshot))
        .route("/ads/bids", post(post_bid_changes))
        .route("/reviews", get(get_reviews_html))
        .route("/reviews/snapshot", get(get_reviews_snapshot))
        .with_state(state)
}

fn period_filter(period_type: &str, period: &str) -> PeriodFilter {
    PeriodFilter::from_selection(parse_period_type(period_type).ok(), period)
}

fn sort_state<K: SortKey>(key: K, dir: &str) -> SortState<K> {
    let mut state = SortState::new(key);
    if let Some(direction) = SortDirection::parse(dir) {
        state.direction = direction;
    }
    state
}

// ---------------------------------------------------------------------------
// Sales dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalesQuery {
    #[serde(default)]
    pub period_type: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub store: String,
    #[serde(default)]
    pub sort: String,
    #[serde(default)]
    pub dir: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreShareRow {
    pub store: StoreSalesTotal,
    /// Share of the filtered grand total, one decimal. Absent when the
    /// grand total is zero.
    pub share_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesView {
    pub generated_at: String,
    /// Selector state echoed back so the rendered controls stay sticky.
    pub period_type: String,
    pub period: String,
    /// Selectable period keys derived from the snapshot, newest first.
    pub months: Vec<String>,
    pub weeks: Vec<String>,
    pub sort: SortState<StoreSortKey>,
    pub totals: SalesTotals,
    pub days: Vec<DailySales>,
    pub stores: Vec<StoreShareRow>,
    pub order_rates: Vec<OrderRate>,
}

pub fn sales_view(
    sales: &SalesSnapshot,
    report: Option<&ReportSnapshot>,
    query: &SalesQuery,
) -> SalesView {
    let period = period_filter(&query.period_type, &query.period);

    let days = filter_sales_days(&sales.daily, &period);
    let totals = aggregate_sales_days(&days);

    let day_rows = filter_store_day_rows(&sales.daily_detail, &period, &query.store);
    let store_totals = aggregate_store_days(&day_rows);
    let sort_key = StoreSortKey::parse(&query.sort).unwrap_or(StoreSortKey::Total);
    let sort = sort_state(sort_key, &query.dir);
    let sorted = sort_stores(&store_totals, sort);

    let amounts: Vec<i64> = sorted.iter().map(|store| store.total).collect();
    let shares = share_percentages(&amounts);
    let stores: Vec<StoreShareRow> = sorted
        .into_iter()
        .enumerate()
        .map(|(index, store)| StoreShareRow {
            share_pct: shares.as_ref().map(|all| all[index]),
            store,
        })
        .collect();

    let order_rates = report
        .map(|report| {
            let map = OrderStoreMap::default();
            let order_totals = order_totals_by_pos_store(&report.store_details, &map, &period);
            let all_stores: Vec<StoreSalesTotal> =
                stores.iter().map(|row| row.store.clone()).collect();
            order_rates(&all_stores, &order_totals, &map)
        })
        .unwrap_or_default();

    SalesView {
        generated_at: sales.generated_at.clone(),
        period_type: query.period_type.clone(),
        period: query.period.clone(),
        months: month_list(sales.daily.iter().map(|day| day.date.as_str())),
        weeks: week_list(sales.daily.iter().map(|day| day.date.as_str())),
        sort,
        totals,
        days,
        stores,
        order_rates,
    }
}

// ---------------------------------------------------------------------------
// Order/price report dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub period_type: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub sort: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    pub generated_at: String,
    pub summary: ReportSummary,
    pub overview: PriceOverview,
    pub periods: Vec<PeriodRow>,
    pub prices: Vec<PriceChangeItem>,
}

pub fn report_view(report: &ReportSnapshot, query: &ReportQuery) -> ReportView {
    let period = period_filter(&query.period_type, &query.period);

    let filtered = filter_price_items(&report.price_changes, &period, &query.q);
    let mode = PriceSortMode::parse(&query.sort).unwrap_or_default();
    let prices = sort_price_items(&filtered, mode);
    let overview = price_overview(&prices);

    let periods = match query.period_type.as_str() {
        "weekly" => period_rows(&report.weekly),
        _ => period_rows(&report.monthly),
    };

    ReportView {
        generated_at: report.generated_at.clone(),
        summary: report.summary.clone(),
        overview,
        periods,
        prices,
    }
}

// ---------------------------------------------------------------------------
// Ads dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdsQuery {
    #[serde(default)]
    pub campaign: String,
    #[serde(default)]
    pub adgroup: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub sort: String,
    #[serde(default)]
    pub dir: String,
    /// Keyword + rank selected for the click/cost projection.
    #[serde(default)]
    pub estimate_keyword: String,
    pub rank: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdsRow {
    pub keyword: KeywordBid,
    pub volume: Option<u64>,
    pub comp_label: &'static str,
    pub rank3_bid: Option<i64>,
    pub advice: Option<BidAdvice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdsView {
    pub generated_at: String,
    pub summary: AdsSummary,
    pub campaigns: Vec<Campaign>,
    pub rows: Vec<AdsRow>,
    /// Keyword the projection card targets, with its observed ranks.
    pub estimate_keyword: String,
    pub available_ranks: Vec<u8>,
    pub selection: RankSelection,
    pub estimate: Option<RankEstimate>,
}

pub fn ads_view(ads: &AdsSnapshot, policy: &BidPolicy, query: &AdsQuery) -> AdsView {
    let criteria = KeywordCriteria {
        campaign_id: query.campaign.clone(),
        adgroup_id: query.adgroup.clone(),
        status: StatusFilter::parse(&query.status),
        query: query.q.clone(),
    };
    let filtered = filter_keywords(ads, &criteria);
    let sort_key = KeywordSortKey::parse(&query.sort).unwrap_or(KeywordSortKey::Keyword);
    let sorted = sort_keywords(&filtered, &ads.keyword_stats, sort_state(sort_key, &query.dir));

    let rows: Vec<AdsRow> = sorted
        .into_iter()
        .map(|keyword| {
            let stats = ads.keyword_stats.get(&keyword.keyword);
            let rank3_bid = ads
                .keyword_rank_bids
                .get(&keyword.keyword)
                .and_then(|bids| bid_at_rank(bids, 3));
            let advice = rank3_bid.and_then(|rank3| policy.advise(keyword.bid_amt, rank3));
            AdsRow {
                volume: stats.map(|s| s.monthly_volume()),
                comp_label: stats.map(|s| s.comp_idx.label()).unwrap_or("-"),
                rank3_bid,
                advice,
                keyword,
            }
        })
        .collect();

    let mut selection = RankSelection::default();
    if let Some(rank) = query.rank {
        selection.toggle(&query.estimate_keyword, rank);
    }
    let estimate = selection.selected(&query.estimate_keyword).and_then(|rank| {
        let stats = ads.keyword_stats.get(&query.estimate_keyword)?;
        let bids = ads.keyword_rank_bids.get(&query.estimate_keyword)?;
        estimate_rank(stats.monthly_volume(), bids, rank)
    });
    let available_ranks = ads
        .keyword_rank_bids
        .get(&query.estimate_keyword)
        .map(|bids| {
            let mut ranks: Vec<u8> = bids.iter().map(|bid| bid.rank).collect();
            ranks.sort_unstable();
            ranks
        })
        .unwrap_or_default();

    AdsView {
        generated_at: ads.generated_at.clone(),
        summary: ads.summary.clone(),
        campaigns: ads.campaigns.clone(),
        rows,
        estimate_keyword: query.estimate_keyword.clone(),
        available_ranks,
        selection,
        estimate,
    }
}

// ---------------------------------------------------------------------------
// Review dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewQuery {
    #[serde(default)]
    pub store: String,
    #[serde(default, rename = "type")]
    pub review_type: String,
    #[serde(default)]
    pub negative: String,
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub sort: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewView {
    pub generated_at: String,
    pub summary: ReviewSummary,
    pub counts: ReviewCounts,
    pub reviews: Vec<ReviewItem>,
}

pub fn review_view(snapshot: &ReviewSnapshot, query: &ReviewQuery) -> ReviewView {
    let criteria = ReviewCriteria {
        store: query.store.clone(),
        review_type: match query.review_type.as_str() {
            "visitor" => Some(crate::snapshot::ReviewType::Visitor),
            "blog" => Some(crate::snapshot::ReviewType::Blog),
            _ => None,
        },
        negative_only: query.negative == "1" || query.negative == "true",
        query: query.q.clone(),
    };
    let filtered = filter_reviews(&snapshot.reviews, &criteria);
    let counts = review_counts(&filtered);
    let mode = ReviewSortMode::parse(&query.sort).unwrap_or_default();
    let reviews = sort_reviews(&filtered, mode);

    ReviewView {
        generated_at: snapshot.generated_at.clone(),
        summary: snapshot.summary.clone(),
        counts,
        reviews,
    }
}

// ---------------------------------------------------------------------------
// Bid change endpoint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct BidChangeRequest {
    pub changes: Vec<BidChangeEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BidChangeEntry {
    pub keyword_id: String,
    pub keyword: String,
    pub previous: i64,
    pub next: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BidChangeResponse {
    pub applied: usize,
    pub message: String,
}

async fn post_bid_changes(
    State(state): State<AppState>,
    Json(request): Json<BidChangeRequest>,
) -> Response {
    let changes: Vec<BidChange> = request
        .changes
        .into_iter()
        .map(|entry| BidChange {
            keyword_id: entry.keyword_id,
            keyword: entry.keyword,
            previous: entry.previous,
            next: entry.next,
        })
        .collect();

    let sink = Arc::clone(&state.bid_sink);
    let outcome = tokio::task::spawn_blocking(move || sink.apply(&changes)).await;

    match outcome {
        Ok(Ok(applied)) => Json(BidChangeResponse {
            applied,
            message: format!("{applied}개 키워드의 입찰가가 변경되었습니다."),
        })
        .into_response(),
        Ok(Err(err)) => {
            warn!(component = "dashboard", event = "bids.apply.rejected", error = %err);
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        Err(err) => {
            warn!(component = "dashboard", event = "bids.apply.panicked", error = %err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP handlers
// ---------------------------------------------------------------------------

async fn get_sales_html(
    State(state): State<AppState>,
    Query(query): Query<SalesQuery>,
) -> impl IntoResponse {
    let Some(sales) = state.snapshots.sales.current() else {
        return Html(render_no_data("매출 대시보드"));
    };
    let report = state.snapshots.report.current();
    let view = sales_view(&sales, report.as_ref(), &query);

    let mut store_series = BarSeries::new("지점별 매출");
    for row in &view.stores {
        store_series.push(row.store.name.clone(), row.store.total as f64);
    }
    if let Ok(mut slot) = state.sales_chart.lock() {
        slot.replace(|| render_bar_svg(&store_series));
    }

    let mut rate_series = BarSeries::new("매출 대비 발주율 (%)");
    for rate in &view.order_rates {
        rate_series.push(rate.name.clone(), rate.rate);
    }
    if let Ok(mut slot) = state.order_rate_chart.lock() {
        slot.replace(|| render_bar_svg(&rate_series));
    }

    Html(render_sales_html(&view))
}

async fn get_sales_snapshot(
    State(state): State<AppState>,
    Query(query): Query<SalesQuery>,
) -> Response {
    let Some(sales) = state.snapshots.sales.current() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let report = state.snapshots.report.current();
    Json(sales_view(&sales, report.as_ref(), &query)).into_response()
}

async fn get_sales_chart(State(state): State<AppState>) -> Response {
    serve_chart(&state.sales_chart)
}

async fn get_order_rate_chart(State(state): State<AppState>) -> Response {
    serve_chart(&state.order_rate_chart)
}

fn serve_chart(slot: &Arc<Mutex<ChartSlot<String>>>) -> Response {
    let svg = slot
        .lock()
        .ok()
        .and_then(|slot| slot.current().cloned());
    match svg {
        Some(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn get_report_html(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> impl IntoResponse {
    match state.snapshots.report.current() {
        Some(report) => Html(render_report_html(&report_view(&report, &query))),
        None => Html(render_no_data("발주/가격 대시보드")),
    }
}

async fn get_report_snapshot(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Response {
    match state.snapshots.report.current() {
        Some(report) => Json(report_view(&report, &query)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn get_ads_html(
    State(state): State<AppState>,
    Query(query): Query<AdsQuery>,
) -> impl IntoResponse {
    match state.snapshots.ads.current() {
        Some(ads) => Html(render_ads_html(&ads_view(&ads, &state.bid_policy, &query))),
        None => Html(render_no_data("광고 키워드 대시보드")),
    }
}

async fn get_ads_snapshot(
    State(state): State<AppState>,
    Query(query): Query<AdsQuery>,
) -> Response {
    match state.snapshots.ads.current() {
        Some(ads) => Json(ads_view(&ads, &state.bid_policy, &query)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn get_reviews_html(
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> impl IntoResponse {
    match state.snapshots.reviews.current() {
        Some(snapshot) => Html(render_reviews_html(&review_view(&snapshot, &query))),
        None => Html(render_no_data("리뷰 대시보드")),
    }
}

async fn get_reviews_snapshot(
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> Response {
    match state.snapshots.reviews.current() {
        Some(snapshot) => Json(review_view(&snapshot, &query)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub(crate) fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn display_or_dash(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

/// Thousands-separated KRW amount.
fn format_krw(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-{grouped}원")
    } else {
        format!("{grouped}원")
    }
}

fn format_pct(value: Option<f64>) -> String {
    match value {
        Some(pct) => format!("{pct:.1}%"),
        None => "-".to_string(),
    }
}

fn format_signed_pct(value: f64) -> String {
    if value > 0.0 {
        format!("+{value:.2}%")
    } else {
        format!("{value:.2}%")
    }
}

fn page_shell(title: &str, body: &str) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html><html lang=\"ko\"><head><meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    out.push_str("<style>body{margin:0;font-family:\"Pretendard\",\"Apple SD Gothic Neo\",sans-serif;background:#f6f4ef;color:#20262b}.shell{max-width:1280px;margin:0 auto;padding:20px 16px}.hero{background:linear-gradient(135deg,#7a1f1f,#b23a2f);color:#fdf6f1;border-radius:14px;padding:16px 18px}.hero h1{margin:0;font-size:1.4rem}.hero-meta{margin-top:6px;font-size:.85rem;color:#f3ddd2}.card{margin-top:14px;background:#fff;border:1px solid #ddd5c8;border-radius:14px;overflow:hidden}.card h2{margin:0;padding:12px 14px;font-size:1rem;border-bottom:1px solid #eee6d8}table{width:100%;border-collapse:collapse}thead th{background:#3c2a24;color:#f5ece4;font-size:.78rem;padding:9px 10px;text-align:left}tbody td{font-size:.84rem;padding:8px 10px;border-bottom:1px solid #efe9dd;white-space:nowrap}tbody tr:nth-child(even){background:#fbf9f4}.up{color:#c0392b;font-weight:700}.down{color:#1f618d;font-weight:700}.muted{color:#8a8174}.badge{display:inline-block;padding:2px 8px;border-radius:10px;font-size:.72rem;font-weight:700}.badge-raise{background:#fdecea;color:#c0392b}.badge-lower{background:#eaf2fb;color:#1f618d}.badge-ok{background:#eef7ee;color:#1e8449}.no-data{padding:40px;text-align:center;color:#8a8174}thead th a{color:inherit;text-decoration:none}.selector{padding:12px 14px;display:flex;align-items:center;gap:8px}.selector select,.selector button{font-size:.85rem;padding:4px 8px}</style>\n");
    out.push_str("</head><body><main class=\"shell\">\n");
    out.push_str(body);
    out.push_str("</main></body></html>\n");
    out
}

fn hero(title: &str, generated_at: &str, extra: &str) -> String {
    format!(
        "<section class=\"hero\"><h1>{}</h1><div class=\"hero-meta\">생성: {} {}</div></section>\n",
        escape_html(title),
        escape_html(if generated_at.is_empty() { "-" } else { generated_at }),
        extra
    )
}

fn render_no_data(title: &str) -> String {
    let body = format!(
        "{}<section class=\"card\"><div class=\"no-data\">데이터가 없습니다.</div></section>",
        hero(title, "", "")
    );
    page_shell(title, &body)
}

fn change_class(change: i64) -> &'static str {
    if change > 0 {
        "up"
    } else if change < 0 {
        "down"
    } else {
        "muted"
    }
}

/// Period dropdowns populated from the snapshot's own dates, keeping the
/// active selection sticky across requests.
fn period_selector(view: &SalesView) -> String {
    let mut out = String::from(
        "<section class=\"card\"><form class=\"selector\" method=\"get\" action=\"/sales\">",
    );
    out.push_str("<select name=\"period_type\">");
    for (value, label) in [("", "전체"), ("monthly", "월간"), ("weekly", "주간")] {
        let selected = if view.period_type == value { " selected" } else { "" };
        out.push_str(&format!("<option value=\"{value}\"{selected}>{label}</option>"));
    }
    out.push_str("</select><select name=\"period\"><option value=\"\">전체 기간</option>");
    let keys = if view.period_type == "weekly" {
        &view.weeks
    } else {
        &view.months
    };
    for key in keys {
        let selected = if view.period == *key { " selected" } else { "" };
        out.push_str(&format!(
            "<option value=\"{}\"{selected}>{}</option>",
            escape_html(key),
            escape_html(key)
        ));
    }
    out.push_str("</select><button type=\"submit\">조회</button></form></section>\n");
    out
}

/// Column header whose link applies the click-toggle: re-clicking the active
/// column flips direction, a new column starts at its default.
fn store_sort_header(view: &SalesView, key: StoreSortKey, label: &str) -> String {
    let next = view.sort.click(key);
    format!(
        "<th><a href=\"/sales?period_type={}&amp;period={}&amp;sort={}&amp;dir={}\">{}</a></th>",
        escape_html(&view.period_type),
        escape_html(&view.period),
        next.key.as_str(),
        next.direction.as_str(),
        label
    )
}

pub fn render_sales_html(view: &SalesView) -> String {
    let mut body = hero(
        "매출 대시보드",
        &view.generated_at,
        &format!("<span>영업일: {}일</span>", view.totals.days),
    );

    body.push_str(&period_selector(view));

    body.push_str(&format!(
        "<section class=\"card\"><h2>채널별 합계</h2><table><thead><tr><th>홀</th><th>배달</th><th>외부배달</th><th>합계</th></tr></thead><tbody><tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr></tbody></table></section>\n",
        format_krw(view.totals.hall),
        format_krw(view.totals.delivery),
        format_krw(view.totals.delivery_external),
        format_krw(view.totals.total),
    ));

    body.push_str("<section class=\"card\"><h2>지점별 매출</h2><table><thead><tr>");
    for (key, label) in [
        (StoreSortKey::Name, "지점"),
        (StoreSortKey::Hall, "홀"),
        (StoreSortKey::Delivery, "배달"),
        (StoreSortKey::DeliveryExternal, "외부배달"),
        (StoreSortKey::Total, "합계"),
    ] {
        body.push_str(&store_sort_header(view, key, label));
    }
    body.push_str("<th>비중</th></tr></thead><tbody>\n");
    for row in &view.stores {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&row.store.name),
            format_krw(row.store.hall),
            format_krw(row.store.delivery),
            format_krw(row.store.delivery_external),
            format_krw(row.store.total),
            format_pct(row.share_pct),
        ));
    }
    body.push_str("</tbody></table></section>\n");

    body.push_str("<section class=\"card\"><h2>매출 대비 발주율</h2>");
    if view.order_rates.is_empty() {
        body.push_str("<div class=\"no-data\">발주 데이터가 없습니다.</div>");
    } else {
        body.push_str("<table><thead><tr><th>지점</th><th>발주 계정</th><th>매출</th><th>발주</th><th>발주율</th></tr></thead><tbody>\n");
        for rate in &view.order_rates {
            let rate_cell = if rate.matched {
                format!("{:.1}%", rate.rate)
            } else {
                "미연동".to_string()
            };
            body.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&rate.name),
                escape_html(rate.order_store.as_deref().unwrap_or("-")),
                format_krw(rate.sales),
                format_krw(rate.order),
                rate_cell,
            ));
        }
        body.push_str("</tbody></table>");
    }
    body.push_str("</section>\n");

    page_shell("매출 대시보드", &body)
}

pub fn render_report_html(view: &ReportView) -> String {
    let mut body = hero(
        "발주/가격 대시보드",
        &view.generated_at,
        &format!(
            "<span>상품 {}종 · 평균단가 {}</span>",
            view.overview.distinct_products,
            view.overview
                .avg_last_price
                .map(|avg| format_krw(avg.round() as i64))
                .unwrap_or_else(|| "-".to_string()),
        ),
    );

    body.push_str(&format!(
        "<section class=\"card\"><h2>가격 변동 요약</h2><table><thead><tr><th>인상</th><th>인하</th><th>유지</th></tr></thead><tbody><tr><td class=\"up\">{}</td><td class=\"down\">{}</td><td class=\"muted\">{}</td></tr></tbody></table></section>\n",
        view.overview.up_count, view.overview.down_count, view.overview.flat_count,
    ));

    body.push_str("<section class=\"card\"><h2>기간별 발주</h2><table><thead><tr><th>기간</th><th>건수</th><th>금액</th><th>전기 대비</th></tr></thead><tbody>\n");
    for row in &view.periods {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&row.key),
            row.count,
            format_krw(row.total),
            display_or_dash(&row.change_pct.map(format_signed_pct)),
        ));
    }
    body.push_str("</tbody></table></section>\n");

    body.push_str("<section class=\"card\"><h2>단가 변동</h2><table><thead><tr><th>상품</th><th>분류</th><th>최초가</th><th>최근가</th><th>최저</th><th>최고</th><th>변동</th><th>변동률</th></tr></thead><tbody>\n");
    for item in &view.prices {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td class=\"{}\">{}</td></tr>\n",
            escape_html(&item.name),
            escape_html(&item.category),
            format_krw(item.first_price),
            format_krw(item.last_price),
            format_krw(item.min_price),
            format_krw(item.max_price),
            change_class(item.change),
            format_krw(item.change),
            change_class(item.change),
            format_signed_pct(item.change_pct),
        ));
    }
    body.push_str("</tbody></table></section>\n");

    page_shell("발주/가격 대시보드", &body)
}

pub fn render_ads_html(view: &AdsView) -> String {
    let mut body = hero(
        "광고 키워드 대시보드",
        &view.generated_at,
        &format!(
            "<span>키워드 {} (활성 {})</span>",
            view.summary.total_keywords, view.summary.active_keywords
        ),
    );

    if !view.estimate_keyword.is_empty() && !view.available_ranks.is_empty() {
        let mut links = String::new();
        for rank in &view.available_ranks {
            let href = match view.selection.clone().toggle(&view.estimate_keyword, *rank) {
                Some(active) => format!(
                    "/ads?estimate_keyword={}&amp;rank={}",
                    escape_html(&view.estimate_keyword),
                    active
                ),
                // Re-clicking the active rank clears the projection.
                None => format!("/ads?estimate_keyword={}", escape_html(&view.estimate_keyword)),
            };
            let class = if view.selection.selected(&view.estimate_keyword) == Some(*rank) {
                "badge badge-ok"
            } else {
                "badge"
            };
            links.push_str(&format!("<a class=\"{class}\" href=\"{href}\">{rank}위</a> "));
        }
        body.push_str(&format!(
            "<section class=\"card\"><h2>{} 순위 선택</h2><div class=\"selector\">{}</div></section>\n",
            escape_html(&view.estimate_keyword),
            links
        ));
    }

    if let Some(estimate) = &view.estimate {
        body.push_str(&format!(
            "<section class=\"card\"><h2>순위 {} 예상</h2><table><thead><tr><th>입찰가</th><th>예상 월 클릭</th><th>예상 월 비용</th></tr></thead><tbody><tr><td>{}</td><td>{}</td><td>{}</td></tr></tbody></table></section>\n",
            estimate.rank,
            format_krw(estimate.bid),
            estimate.monthly_clicks,
            format_krw(estimate.monthly_cost),
        ));
    }

    body.push_str("<section class=\"card\"><h2>키워드</h2><table><thead><tr><th>키워드</th><th>캠페인</th><th>광고그룹</th><th>상태</th><th>입찰가</th><th>월 검색량</th><th>경쟁도</th><th>3위 입찰가</th><th>진단</th></tr></thead><tbody>\n");
    for row in &view.rows {
        let status = if row.keyword.user_lock {
            "중지"
        } else {
            "노출중"
        };
        let advice_cell = match row.advice {
            Some(BidAdvice::Raise { recommended }) => format!(
                "<span class=\"badge badge-raise\">인상 제안 {}</span>",
                format_krw(recommended)
            ),
            Some(BidAdvice::Lower { recommended }) => format!(
                "<span class=\"badge badge-lower\">인하 제안 {}</span>",
                format_krw(recommended)
            ),
            Some(BidAdvice::Adequate) => "<span class=\"badge badge-ok\">적정</span>".to_string(),
            None => "-".to_string(),
        };
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&row.keyword.keyword),
            escape_html(&row.keyword.campaign_name),
            escape_html(&row.keyword.adgroup_name),
            status,
            format_krw(row.keyword.bid_amt),
            row.volume
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string()),
            row.comp_label,
            row.rank3_bid
                .map(format_krw)
                .unwrap_or_else(|| "-".to_string()),
            advice_cell,
        ));
    }
    body.push_str("</tbody></table></section>\n");

    page_shell("광고 키워드 대시보드", &body)
}

pub fn render_reviews_html(view: &ReviewView) -> String {
    let mut body = hero(
        "리뷰 대시보드",
        &view.generated_at,
        &format!(
            "<span>전체 {} · 방문자 {} · 블로그 {} · 부정 {}</span>",
            view.counts.total, view.counts.visitor, view.counts.blog, view.counts.negative
        ),
    );

    body.push_str(&format!(
        "<section class=\"card\"><h2>증감</h2><table><thead><tr><th>전일 대비</th><th>전주 대비</th><th>전월 대비</th></tr></thead><tbody><tr><td>{}</td><td>{}</td><td>{}</td></tr></tbody></table></section>\n",
        display_or_dash(&view.summary.prev_day_change_pct.map(format_signed_pct)),
        display_or_dash(&view.summary.prev_week_change_pct.map(format_signed_pct)),
        display_or_dash(&view.summary.prev_month_change_pct.map(format_signed_pct)),
    ));

    body.push_str("<section class=\"card\"><h2>리뷰</h2><table><thead><tr><th>유형</th><th>지점</th><th>작성자</th><th>날짜</th><th>내용</th><th>태그</th></tr></thead><tbody>\n");
    for review in &view.reviews {
        let kind = match review.review_type {
            crate::snapshot::ReviewType::Visitor => "방문자",
            crate::snapshot::ReviewType::Blog => "블로그",
        };
        let row_class = if review.is_negative { "down" } else { "" };
        body.push_str(&format!(
            "<tr><td class=\"{}\">{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            row_class,
            kind,
            escape_html(&review.store_name),
            escape_html(&review.author),
            escape_html(review.date().unwrap_or("-")),
            escape_html(&review.content),
            escape_html(&review.tags.join(", ")),
        ));
    }
    body.push_str("</tbody></table></section>\n");

    page_shell("리뷰 대시보드", &body)
}
