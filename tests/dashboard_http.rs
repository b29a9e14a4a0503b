use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use storeboard::{
    dashboard_router, AdsSnapshot, AppState, DailySales, KeywordBid, KeywordStats,
    LoggingBidChangeSink, PriceChangeItem, PricePoint, RankBid, ReportSnapshot, ReviewItem,
    ReviewSnapshot, SalesSnapshot, SnapshotSet, StoreDaySales,
};
use tower::util::ServiceExt;

fn test_state(snapshots: SnapshotSet) -> AppState {
    AppState::new(
        snapshots,
        Arc::new(LoggingBidChangeSink::with_delay(Duration::ZERO)),
    )
}

fn populated_snapshots() -> SnapshotSet {
    let set = SnapshotSet::default();

    let mut daily_detail = HashMap::new();
    daily_detail.insert(
        "2024-01-10".to_string(),
        vec![
            StoreDaySales {
                code: "98".to_string(),
                name: "역대짬뽕 본점".to_string(),
                hall: 600,
                delivery: 200,
                total: 800,
                ..StoreDaySales::default()
            },
            StoreDaySales {
                code: "99".to_string(),
                name: "역대짬뽕 송탄점".to_string(),
                total: 200,
                ..StoreDaySales::default()
            },
        ],
    );
    set.sales.replace(
        SalesSnapshot {
            generated_at: "2024-01-31T00:00:00".to_string(),
            daily: vec![DailySales {
                date: "2024-01-10".to_string(),
                hall: 700,
                delivery: 300,
                total: 1_000,
                ..DailySales::default()
            }],
            daily_detail,
            ..SalesSnapshot::default()
        },
        None,
    );

    set.report.replace(
        ReportSnapshot {
            generated_at: "2024-01-31T00:00:00".to_string(),
            price_changes: vec![PriceChangeItem {
                code: "P001".to_string(),
                name: "고춧가루".to_string(),
                category: "조미료".to_string(),
                first_price: 1_000,
                last_price: 1_200,
                change: 200,
                change_pct: 20.0,
                history: vec![
                    PricePoint {
                        date: "2024-01-01".to_string(),
                        price: 1_000,
                    },
                    PricePoint {
                        date: "2024-01-15".to_string(),
                        price: 1_200,
                    },
                ],
                ..PriceChangeItem::default()
            }],
            ..ReportSnapshot::default()
        },
        None,
    );

    set.ads.replace(
        AdsSnapshot {
            generated_at: "2024-01-31T00:00:00".to_string(),
            keywords: vec![KeywordBid {
                ncc_keyword_id: "kw-1".to_string(),
                keyword: "짬뽕".to_string(),
                campaign_name: "플레이스".to_string(),
                bid_amt: 300,
                ..KeywordBid::default()
            }],
            keyword_stats: HashMap::from([(
                "짬뽕".to_string(),
                KeywordStats {
                    monthly_pc_qc_cnt: 4_000,
                    monthly_mobile_qc_cnt: 6_000,
                    ..KeywordStats::default()
                },
            )]),
            keyword_rank_bids: HashMap::from([(
                "짬뽕".to_string(),
                vec![RankBid {
                    rank: 3,
                    pc_bid: 450,
                    mobile_bid: 500,
                }],
            )]),
            ..AdsSnapshot::default()
        },
        None,
    );

    set.reviews.replace(
        ReviewSnapshot {
            generated_at: "2024-01-31T00:00:00".to_string(),
            reviews: vec![ReviewItem {
                store_name: "역대짬뽕 본점".to_string(),
                author: "방문자1".to_string(),
                content: "진한 국물".to_string(),
                visit_date: Some("2024-01-12".to_string()),
                ..ReviewItem::default()
            }],
            ..ReviewSnapshot::default()
        },
        None,
    );

    set
}

async fn get_text(app: axum::Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn sales_page_renders_store_table_and_shares() {
    let app = dashboard_router(test_state(populated_snapshots()));
    let (status, text) = get_text(app, "/sales?period_type=monthly&period=2024-01").await;

    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("역대짬뽕 본점"));
    assert!(text.contains("80.0%"));
    assert!(text.contains("1,000원"));

    // Every share cell renders as a one-decimal percentage.
    let share_cell = regex::Regex::new(r"<td>\d+\.\d%</td>").unwrap();
    assert!(share_cell.is_match(&text));
}

#[tokio::test]
async fn sales_chart_is_published_after_page_render() {
    let state = test_state(populated_snapshots());

    let (status, _) = get_text(dashboard_router(state.clone()), "/sales").await;
    assert_eq!(status, StatusCode::OK);

    let (status, svg) = get_text(dashboard_router(state), "/sales/chart.svg").await;
    assert_eq!(status, StatusCode::OK);
    assert!(svg.contains("<svg"));
    assert!(svg.contains("역대짬뽕 본점"));
}

#[tokio::test]
async fn chart_endpoint_is_404_before_any_render() {
    let app = dashboard_router(test_state(populated_snapshots()));
    let (status, _) = get_text(app, "/sales/chart.svg").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn report_page_applies_period_refit() {
    let app = dashboard_router(test_state(populated_snapshots()));
    let (status, text) = get_text(app, "/report?period_type=monthly&period=2024-01").await;

    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("고춧가루"));
    assert!(text.contains("+20.00%"));
}

#[tokio::test]
async fn ads_page_shows_raise_advice() {
    let app = dashboard_router(test_state(populated_snapshots()));
    let (status, text) = get_text(app, "/ads").await;

    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("짬뽕"));
    assert!(text.contains("인상 제안"));
    assert!(text.contains("500원"));
}

#[tokio::test]
async fn ads_rank_estimate_appears_when_selected() {
    let app = dashboard_router(test_state(populated_snapshots()));
    let (status, text) =
        get_text(app, "/ads?estimate_keyword=%EC%A7%AC%EB%BD%95&rank=3").await;

    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("순위 3 예상"));
    assert!(text.contains("250"));
    assert!(text.contains("125,000원"));
}

#[tokio::test]
async fn reviews_page_lists_reviews() {
    let app = dashboard_router(test_state(populated_snapshots()));
    let (status, text) = get_text(app, "/reviews").await;

    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("진한 국물"));
    assert!(text.contains("방문자1"));
}

#[tokio::test]
async fn missing_snapshot_renders_no_data_page() {
    let app = dashboard_router(test_state(SnapshotSet::default()));
    let (status, text) = get_text(app, "/sales").await;

    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("데이터가 없습니다"));
}

#[tokio::test]
async fn snapshot_endpoints_serve_json_or_404() {
    let app = dashboard_router(test_state(populated_snapshots()));
    let (status, body) = get_text(app, "/ads/snapshot").await;
    assert_eq!(status, StatusCode::OK);
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed["rows"][0]["keyword"]["keyword"], "짬뽕");

    let empty = dashboard_router(test_state(SnapshotSet::default()));
    let (status, _) = get_text(empty, "/report/snapshot").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sales_snapshot_json_applies_the_period_filter() {
    let state = test_state(populated_snapshots());

    let (status, body) = get_text(
        dashboard_router(state.clone()),
        "/sales/snapshot?period_type=monthly&period=2024-03",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    // A period matching nothing yields an empty view, not the raw snapshot.
    assert_eq!(parsed["period"], "2024-03");
    assert!(parsed["days"].as_array().unwrap().is_empty());
    assert!(parsed["stores"].as_array().unwrap().is_empty());
    assert_eq!(parsed["totals"]["total"], 0);

    let (status, body) = get_text(
        dashboard_router(state),
        "/sales/snapshot?period_type=monthly&period=2024-01",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed["days"][0]["date"], "2024-01-10");
    assert_eq!(parsed["stores"][0]["share_pct"], 80.0);
}

#[tokio::test]
async fn reviews_snapshot_json_applies_the_store_filter() {
    let state = test_state(populated_snapshots());

    let (status, body) = get_text(
        dashboard_router(state.clone()),
        "/reviews/snapshot?store=%EC%97%AD%EB%8C%80%EC%A7%AC%EB%BD%95%20%EB%B3%B8%EC%A0%90",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed["counts"]["total"], 1);

    let (status, body) = get_text(
        dashboard_router(state),
        "/reviews/snapshot?store=%EC%97%AD%EB%8C%80%EC%A7%AC%EB%BD%95%20%EC%86%A1%ED%83%84%EC%A0%90",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed["counts"]["total"], 0);
    assert!(parsed["reviews"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn bid_change_endpoint_applies_valid_sets() {
    let app = dashboard_router(test_state(populated_snapshots()));
    let request = Request::builder()
        .method("POST")
        .uri("/ads/bids")
        .header("content-type", "application/json")
        .body(Body::from(
            r#"{"changes": [{"keyword_id": "kw-1", "keyword": "짬뽕", "previous": 300, "next": 500}]}"#,
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["applied"], 1);
}

#[tokio::test]
async fn bid_change_below_platform_minimum_is_rejected() {
    let app = dashboard_router(test_state(populated_snapshots()));
    let request = Request::builder()
        .method("POST")
        .uri("/ads/bids")
        .header("content-type", "application/json")
        .body(Body::from(
            r#"{"changes": [{"keyword_id": "kw-1", "keyword": "짬뽕", "previous": 300, "next": 50}]}"#,
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
