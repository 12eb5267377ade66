//! Outcome buckets
//!
//! Append-only per-category outcome lists filled during the single pass over
//! a team's games. Only the aggregator writes to them.

use serde::Serialize;

use crate::trends::record::TeamRecord;
use crate::{GameId, Half, Quarter};

/// Result against the spread for one game
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadOutcome {
    pub game_id: GameId,
    /// The analyzed team's spread (negative = favorite)
    pub spread: f64,
    pub margin: i32,
    /// `None` is a push
    pub covered: Option<bool>,
}

impl SpreadOutcome {
    pub fn is_push(&self) -> bool {
        self.covered.is_none()
    }

    pub fn as_favorite(&self) -> bool {
        self.spread < 0.0
    }
}

/// Final points for one game
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringOutcome {
    pub game_id: GameId,
    pub team_points: u32,
    pub opp_points: u32,
}

impl ScoringOutcome {
    pub fn total(&self) -> u32 {
        self.team_points + self.opp_points
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuarterOutcome {
    pub game_id: GameId,
    pub quarter: Quarter,
    pub team_score: u32,
    pub opp_score: u32,
    pub won: bool,
}

impl QuarterOutcome {
    pub fn lost(&self) -> bool {
        self.opp_score > self.team_score
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HalfOutcome {
    pub game_id: GameId,
    pub half: Half,
    pub team_score: u32,
    pub opp_score: u32,
    pub won: bool,
}

impl HalfOutcome {
    pub fn lost(&self) -> bool {
        self.opp_score > self.team_score
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarginOutcome {
    pub game_id: GameId,
    pub margin: i32,
    pub is_win: bool,
}

/// Combined score against the posted total
#[derive(Debug, Clone, PartialEq)]
pub struct TotalOutcome {
    pub game_id: GameId,
    pub total_points: u32,
    pub over_under: f64,
    pub went_over: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FirstScoreOutcome {
    pub game_id: GameId,
    /// First quarter in which either side scored
    pub quarter: Quarter,
    pub scored_first: bool,
}

/// A game left out of the analysis and why
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedGame {
    pub game_id: GameId,
    pub reason: String,
}

/// Against-the-spread counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpreadSummary {
    pub covers: usize,
    pub failures: usize,
    pub pushes: usize,
    pub games_without_odds: usize,
}

impl SpreadSummary {
    /// Graded games: everything but pushes and games with no line
    pub fn valid(&self) -> usize {
        self.covers + self.failures
    }
}

/// All buckets for one team, in the caller's game order
#[derive(Debug, Clone, Default)]
pub struct TrendBuckets {
    record: TeamRecord,
    spread: Vec<SpreadOutcome>,
    scoring: Vec<ScoringOutcome>,
    quarters: Vec<QuarterOutcome>,
    halves: Vec<HalfOutcome>,
    margins: Vec<MarginOutcome>,
    totals: Vec<TotalOutcome>,
    first_score: Vec<FirstScoreOutcome>,
    skipped: Vec<SkippedGame>,
}

impl TrendBuckets {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_mut(&mut self) -> &mut TeamRecord {
        &mut self.record
    }

    pub(crate) fn push_spread(&mut self, outcome: SpreadOutcome) {
        self.spread.push(outcome);
    }

    pub(crate) fn push_scoring(&mut self, outcome: ScoringOutcome) {
        self.scoring.push(outcome);
    }

    pub(crate) fn push_quarters(&mut self, outcomes: [QuarterOutcome; 4]) {
        self.quarters.extend(outcomes);
    }

    pub(crate) fn push_halves(&mut self, outcomes: [HalfOutcome; 2]) {
        self.halves.extend(outcomes);
    }

    pub(crate) fn push_margin(&mut self, outcome: MarginOutcome) {
        self.margins.push(outcome);
    }

    pub(crate) fn push_total(&mut self, outcome: TotalOutcome) {
        self.totals.push(outcome);
    }

    pub(crate) fn push_first_score(&mut self, outcome: FirstScoreOutcome) {
        self.first_score.push(outcome);
    }

    pub(crate) fn push_skipped(&mut self, skipped: SkippedGame) {
        self.skipped.push(skipped);
    }

    pub fn record(&self) -> &TeamRecord {
        &self.record
    }

    pub fn spread(&self) -> &[SpreadOutcome] {
        &self.spread
    }

    pub fn scoring(&self) -> &[ScoringOutcome] {
        &self.scoring
    }

    pub fn quarters(&self) -> &[QuarterOutcome] {
        &self.quarters
    }

    pub fn halves(&self) -> &[HalfOutcome] {
        &self.halves
    }

    pub fn margins(&self) -> &[MarginOutcome] {
        &self.margins
    }

    pub fn totals(&self) -> &[TotalOutcome] {
        &self.totals
    }

    pub fn first_score(&self) -> &[FirstScoreOutcome] {
        &self.first_score
    }

    pub fn skipped(&self) -> &[SkippedGame] {
        &self.skipped
    }

    /// Games that made it into the analysis
    pub fn games_analyzed(&self) -> usize {
        self.record.games
    }

    /// Games with a full quarter breakdown for both sides
    pub fn line_score_games(&self) -> usize {
        self.halves.len() / Half::ALL.len()
    }

    pub fn spread_summary(&self) -> SpreadSummary {
        let mut summary = SpreadSummary {
            games_without_odds: self.games_analyzed().saturating_sub(self.spread.len()),
            ..SpreadSummary::default()
        };
        for outcome in &self.spread {
            match outcome.covered {
                Some(true) => summary.covers += 1,
                Some(false) => summary.failures += 1,
                None => summary.pushes += 1,
            }
        }
        summary
    }

    pub fn quarter_outcomes(&self, quarter: Quarter) -> impl Iterator<Item = &QuarterOutcome> {
        self.quarters.iter().filter(move |o| o.quarter == quarter)
    }

    pub fn half_outcomes(&self, half: Half) -> impl Iterator<Item = &HalfOutcome> {
        self.halves.iter().filter(move |o| o.half == half)
    }
}
