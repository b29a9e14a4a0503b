//! Keyword bid metrics and the bid-change boundary.
//!
//! All amounts are KRW. The ads platform enforces a bid range of
//! [`MIN_BID`, `MAX_BID`]; every computed bid is clamped into that range
//! before it is shown or queued.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::snapshot::RankBid;

/// Platform minimum bid, KRW.
pub const MIN_BID: i64 = 70;
/// Platform maximum bid, KRW.
pub const MAX_BID: i64 = 100_000;

/// Estimated click-through rate by ad rank. Ranks outside 1..=5 fall back
/// to the rank-5 rate.
pub fn ctr_for_rank(rank: u8) -> f64 {
    match rank {
        1 => 0.05,
        2 => 0.035,
        3 => 0.025,
        4 => 0.015,
        _ => 0.01,
    }
}

/// Observed bid required for a rank, preferring the mobile figure and
/// falling back to PC when mobile is absent.
pub fn bid_at_rank(bids: &[RankBid], rank: u8) -> Option<i64> {
    let entry = bids.iter().find(|bid| bid.rank == rank)?;
    if entry.mobile_bid > 0 {
        Some(entry.mobile_bid)
    } else if entry.pc_bid > 0 {
        Some(entry.pc_bid)
    } else {
        None
    }
}

/// Monthly click/cost projection for holding one rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RankEstimate {
    pub rank: u8,
    pub bid: i64,
    pub monthly_clicks: i64,
    pub monthly_cost: i64,
}

/// Project monthly clicks and cost for `rank` from the keyword's combined
/// monthly search volume. `None` when no usable bid exists for the rank.
pub fn estimate_rank(volume: u64, bids: &[RankBid], rank: u8) -> Option<RankEstimate> {
    let bid = bid_at_rank(bids, rank)?;
    let monthly_clicks = (volume as f64 * ctr_for_rank(rank)).round() as i64;
    Some(RankEstimate {
        rank,
        bid,
        monthly_clicks,
        monthly_cost: monthly_clicks * bid,
    })
}

/// Per-keyword single-rank selection. Selecting the active rank again
/// clears it, returning the estimate column to its placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RankSelection {
    selected: HashMap<String, u8>,
}

impl RankSelection {
    /// Toggle `rank` for a keyword and return the now-active rank.
    pub fn toggle(&mut self, keyword_id: &str, rank: u8) -> Option<u8> {
        match self.selected.get(keyword_id) {
            Some(current) if *current == rank => {
                self.selected.remove(keyword_id);
                None
            }
            _ => {
                self.selected.insert(keyword_id.to_string(), rank);
                Some(rank)
            }
        }
    }

    pub fn selected(&self, keyword_id: &str) -> Option<u8> {
        self.selected.get(keyword_id).copied()
    }
}

/// Thresholds for comparing a current bid against the rank-3 bid. The
/// raise threshold moved from 0.8 to 0.7 over time; both remain available.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BidPolicy {
    /// Advise a raise when current < rank3 × this factor.
    pub raise_below: f64,
    /// Advise a lower when current > rank3 × this factor.
    pub lower_above: f64,
    /// Recommended bid on a lower is rank3 × this factor, rounded.
    pub lower_target: f64,
}

impl BidPolicy {
    pub const LEGACY_RAISE_BELOW: f64 = 0.8;

    pub fn legacy() -> Self {
        Self {
            raise_below: Self::LEGACY_RAISE_BELOW,
            ..Self::default()
        }
    }

    /// Compare `current_bid` against the rank-3 market bid. `None` when no
    /// positive rank-3 bid is known; no advice is better than bad advice.
    pub fn advise(&self, current_bid: i64, rank3_bid: i64) -> Option<BidAdvice> {
        if rank3_bid <= 0 {
            return None;
        }
        let rank3 = rank3_bid as f64;
        let advice = if (current_bid as f64) < rank3 * self.raise_below {
            BidAdvice::Raise {
                recommended: rank3_bid,
            }
        } else if current_bid as f64 > rank3 * self.lower_above {
            BidAdvice::Lower {
                recommended: (rank3 * self.lower_target).round() as i64,
            }
        } else {
            BidAdvice::Adequate
        };
        Some(advice)
    }
}

impl Default for BidPolicy {
    fn default() -> Self {
        Self {
            raise_below: 0.7,
            lower_above: 1.5,
            lower_target: 1.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BidAdvice {
    Raise { recommended: i64 },
    Lower { recommended: i64 },
    Adequate,
}

/// Scale a bid by `factor`, round to the nearest 10 KRW, clamp to the
/// platform range.
pub fn adjust_bid(bid: i64, factor: f64) -> i64 {
    let scaled = ((bid as f64 * factor) / 10.0).round() as i64 * 10;
    scaled.clamp(MIN_BID, MAX_BID)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BidError {
    #[error("bid {0} is below the platform minimum of {MIN_BID}")]
    BelowMinimum(i64),
    #[error("bid {0} is above the platform maximum of {MAX_BID}")]
    AboveMaximum(i64),
    #[error("no bid changes to apply")]
    EmptyChangeSet,
}

/// Validate a manually entered bid against the platform bounds.
pub fn validate_bid(bid: i64) -> Result<(), BidError> {
    if bid < MIN_BID {
        return Err(BidError::BelowMinimum(bid));
    }
    if bid > MAX_BID {
        return Err(BidError::AboveMaximum(bid));
    }
    Ok(())
}

/// One pending bid edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidChange {
    pub keyword_id: String,
    pub keyword: String,
    pub previous: i64,
    pub next: i64,
}

/// Destination for confirmed bid changes. The dashboard never mutates the
/// ads platform itself; implementations decide what "apply" means.
pub trait BidChangeSink: Send + Sync {
    /// Apply a validated change set, returning the number of changes taken.
    fn apply(&self, changes: &[BidChange]) -> Result<usize, BidError>;
}

/// Sink that records the intended changes in the log and reports success
/// after a fixed delay, without contacting the ads platform.
#[derive(Debug, Clone)]
pub struct LoggingBidChangeSink {
    delay: Duration,
}

impl Default for LoggingBidChangeSink {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1000),
        }
    }
}

impl LoggingBidChangeSink {
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl BidChangeSink for LoggingBidChangeSink {
    fn apply(&self, changes: &[BidChange]) -> Result<usize, BidError> {
        if changes.is_empty() {
            return Err(BidError::EmptyChangeSet);
        }
        for change in changes {
            validate_bid(change.next)?;
        }
        std::thread::sleep(self.delay);
        for change in changes {
            info!(
                component = "bids",
                event = "bids.apply.change",
                keyword_id = %change.keyword_id,
                keyword = %change.keyword,
                previous = change.previous,
                next = change.next,
                "queued bid change"
            );
        }
        info!(
            component = "bids",
            event = "bids.apply.done",
            count = changes.len(),
            "bid change set applied"
        );
        Ok(changes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank_bids() -> Vec<RankBid> {
        vec![
            RankBid {
                rank: 1,
                pc_bid: 900,
                mobile_bid: 1_000,
            },
            RankBid {
                rank: 3,
                pc_bid: 450,
                mobile_bid: 500,
            },
            RankBid {
                rank: 4,
                pc_bid: 200,
                mobile_bid: 0,
            },
        ]
    }

    #[test]
    fn rank_three_estimate_matches_expected_projection() {
        let estimate = estimate_rank(10_000, &rank_bids(), 3).expect("rank 3 bid exists");
        assert_eq!(estimate.monthly_clicks, 250);
        assert_eq!(estimate.monthly_cost, 125_000);
        assert_eq!(estimate.bid, 500);
    }

    #[test]
    fn missing_mobile_bid_falls_back_to_pc() {
        assert_eq!(bid_at_rank(&rank_bids(), 4), Some(200));
        assert_eq!(bid_at_rank(&rank_bids(), 5), None);
    }

    #[test]
    fn unknown_rank_uses_floor_ctr() {
        assert_eq!(ctr_for_rank(7), 0.01);
    }

    #[test]
    fn rank_selection_toggles_off_on_repeat() {
        let mut selection = RankSelection::default();
        assert_eq!(selection.toggle("kw-1", 3), Some(3));
        assert_eq!(selection.selected("kw-1"), Some(3));
        assert_eq!(selection.toggle("kw-1", 2), Some(2));
        assert_eq!(selection.toggle("kw-1", 2), None);
        assert_eq!(selection.selected("kw-1"), None);
    }

    #[test]
    fn low_bid_gets_raise_advice_at_rank_three_bid() {
        let advice = BidPolicy::default().advise(300, 500);
        assert_eq!(advice, Some(BidAdvice::Raise { recommended: 500 }));
    }

    #[test]
    fn high_bid_gets_lower_advice_at_scaled_target() {
        let advice = BidPolicy::default().advise(900, 500);
        assert_eq!(advice, Some(BidAdvice::Lower { recommended: 600 }));
    }

    #[test]
    fn in_band_bid_is_adequate_and_zero_rank_bid_yields_nothing() {
        assert_eq!(BidPolicy::default().advise(400, 500), Some(BidAdvice::Adequate));
        assert_eq!(BidPolicy::default().advise(400, 0), None);
    }

    #[test]
    fn legacy_policy_raises_earlier() {
        // 380 < 500×0.8 but not < 500×0.7.
        assert_eq!(BidPolicy::default().advise(380, 500), Some(BidAdvice::Adequate));
        assert_eq!(
            BidPolicy::legacy().advise(380, 500),
            Some(BidAdvice::Raise { recommended: 500 })
        );
    }

    #[test]
    fn adjust_rounds_to_ten_and_clamps() {
        assert_eq!(adjust_bid(333, 1.1), 370);
        assert_eq!(adjust_bid(80, 0.5), MIN_BID);
        assert_eq!(adjust_bid(99_990, 1.5), MAX_BID);
    }

    #[test]
    fn inverse_factors_round_trip_within_rounding_granularity() {
        let original = 1_000;
        let adjusted = adjust_bid(adjust_bid(original, 1.1), 1.0 / 1.1);
        assert!((adjusted - original).abs() <= 10);
        assert!((MIN_BID..=MAX_BID).contains(&adjusted));
    }

    #[test]
    fn sink_rejects_out_of_range_and_empty_sets() {
        let sink = LoggingBidChangeSink::with_delay(Duration::ZERO);
        assert_eq!(sink.apply(&[]), Err(BidError::EmptyChangeSet));

        let below = BidChange {
            keyword_id: "kw-1".to_string(),
            keyword: "짬뽕".to_string(),
            previous: 100,
            next: 50,
        };
        assert_eq!(sink.apply(&[below]), Err(BidError::BelowMinimum(50)));
    }

    #[test]
    fn sink_reports_applied_count() {
        let sink = LoggingBidChangeSink::with_delay(Duration::ZERO);
        let changes = vec![
            BidChange {
                keyword_id: "kw-1".to_string(),
                keyword: "짬뽕".to_string(),
                previous: 300,
                next: 500,
            },
            BidChange {
                keyword_id: "kw-2".to_string(),
                keyword: "짜장면".to_string(),
                previous: 700,
                next: 600,
            },
        ];
        assert_eq!(sink.apply(&changes), Ok(2));
    }
}
