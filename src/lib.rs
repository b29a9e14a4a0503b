//! Storeboard core crate.
//!
//! Server-rendered dashboards for the 역대짬뽕 chain:
//! - sales (POS channel totals, store shares, order-to-sales rate)
//! - order/price report (period buckets, unit-price history)
//! - ads keywords (search volume join, bid advice, rank cost projection)
//! - reviews (visitor/blog feeds with negativity flags)

mod aggregate;
mod bids;
mod chart;
mod dashboard;
mod filter;
mod loader;
mod observability;
mod orders;
mod period;
mod snapshot;
mod sort;

pub use aggregate::{
    aggregate_sales_days, aggregate_store_days, period_rows, price_overview, review_counts,
    share_percentages, PeriodRow, PriceOverview, ReviewCounts, SalesTotals, StoreSalesTotal,
};
pub use bids::{
    adjust_bid, bid_at_rank, ctr_for_rank, estimate_rank, validate_bid, BidAdvice, BidChange,
    BidChangeSink, BidError, BidPolicy, LoggingBidChangeSink, RankEstimate, RankSelection, MAX_BID,
    MIN_BID,
};
pub use chart::{render_bar_svg, Bar, BarSeries, ChartSlot};
pub use dashboard::{
    ads_view, dashboard_router, render_ads_html, render_report_html, render_reviews_html,
    render_sales_html, report_view, review_view, sales_view, AdsQuery, AdsRow, AdsView, AppState,
    BidChangeEntry, BidChangeRequest, BidChangeResponse, ReportQuery, ReportView, ReviewQuery,
    ReviewView, SalesQuery, SalesView, StoreShareRow,
};
pub use filter::{
    filter_keywords, filter_price_items, filter_reviews, filter_sales_days, filter_store_day_rows,
    matches_query, KeywordCriteria, ReviewCriteria, StatusFilter,
};
pub use loader::{
    install_payload, loader_config_from_env, snapshot_url, LoadError, LoaderConfig, SnapshotLoader,
    ADS_FILE, REPORT_FILE, REVIEW_FILE, SALES_FILE,
};
pub use observability::{
    init_logging, log_app_bind, log_app_start, logging_config_from_env, LogFormat, LoggingConfig,
    LoggingInitError,
};
pub use orders::{order_rates, order_totals_by_pos_store, OrderRate, OrderStoreMap};
pub use period::{
    month_key, month_list, parse_period_type, week_key, week_list, PeriodError, PeriodFilter,
    PeriodType,
};
pub use snapshot::{
    snapshot_fingerprint, Adgroup, AdsSnapshot, AdsSummary, Campaign, CategoryTotal, CompIdx,
    DailyRecord, DailySales, KeywordBid, KeywordStats, PeriodBucket, PriceChangeItem, PricePoint,
    RankBid, ReportSnapshot, ReportSummary, ReviewItem, ReviewSnapshot, ReviewStoreCount,
    ReviewSummary, ReviewType, SalesSnapshot, SalesSummary, SnapshotSet, SnapshotStore,
    StoreDaySales, StoreOrderDetail, StoreRef, StoreTotal,
};
pub use sort::{
    compare_korean, sort_keywords, sort_price_items, sort_reviews, sort_stores, KeywordSortKey,
    PriceSortMode, ReviewSortMode, SortDirection, SortKey, SortState, StoreSortKey,
};
