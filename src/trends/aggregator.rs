//! Trend aggregation for one team
//!
//! Single synchronous pass over the caller's games (most recent first, never
//! re-sorted). Games missing odds or line scores only drop out of the buckets
//! that need that data; games missing final scores are skipped entirely and
//! reported back, without aborting the rest of the analysis.

use std::collections::HashMap;

use crate::report::TrendReport;
use crate::trends::buckets::{SkippedGame, TrendBuckets};
use crate::trends::classify;
use crate::trends::format::{TrendFormatter, TrendLine};
use crate::{Game, GameId, OddsRecord, Result, Side, Sport, TeamCode, TrendsConfig, TrendsError};

/// Source of betting lines keyed by game
pub trait OddsLookup {
    fn odds_for(&self, game_id: &GameId) -> Option<&OddsRecord>;
}

impl OddsLookup for HashMap<GameId, OddsRecord> {
    fn odds_for(&self, game_id: &GameId) -> Option<&OddsRecord> {
        self.get(game_id)
    }
}

impl OddsLookup for [OddsRecord] {
    fn odds_for(&self, game_id: &GameId) -> Option<&OddsRecord> {
        self.iter().find(|o| o.game_id == *game_id)
    }
}

/// Game facts validated up front so nothing is recorded for a bad game
struct Scored {
    side: Side,
    team_points: u32,
    opp_points: u32,
    margin: i32,
    total: u32,
}

/// Computes and formats trends for a single team
#[derive(Debug, Clone)]
pub struct TrendAggregator {
    team: TeamCode,
    sport: Sport,
    min_occurrences: usize,
}

impl TrendAggregator {
    pub fn new(team: impl Into<TeamCode>) -> Self {
        TrendAggregator {
            team: team.into(),
            sport: Sport::default(),
            min_occurrences: 2,
        }
    }

    pub fn from_config(team: impl Into<TeamCode>, config: &TrendsConfig) -> Self {
        Self::new(team)
            .with_sport(config.sport)
            .with_min_occurrences(config.min_occurrences)
    }

    /// Minimum count for a trend to be reported (at least 1)
    pub fn with_min_occurrences(mut self, min_occurrences: usize) -> Self {
        self.min_occurrences = min_occurrences.max(1);
        self
    }

    pub fn with_sport(mut self, sport: Sport) -> Self {
        self.sport = sport;
        self
    }

    pub fn team(&self) -> &TeamCode {
        &self.team
    }

    pub fn sport(&self) -> Sport {
        self.sport
    }

    pub fn min_occurrences(&self) -> usize {
        self.min_occurrences
    }

    /// Fill every bucket from the games, in the order given
    pub fn compute<O>(&self, games: &[Game], odds: &O) -> Result<TrendBuckets>
    where
        O: OddsLookup + ?Sized,
    {
        if games.is_empty() {
            return Err(TrendsError::EmptyInput {
                team: self.team.clone(),
            });
        }

        let mut buckets = TrendBuckets::new();
        for game in games {
            match self.validate(game) {
                Ok(scored) => self.accumulate(&mut buckets, game, &scored, odds.odds_for(&game.id)),
                Err(e) => {
                    log::warn!("Skipping game for {}: {}", self.team, e);
                    buckets.push_skipped(SkippedGame {
                        game_id: game.id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if buckets.games_analyzed() == 0 {
            return Err(TrendsError::NoValidGames {
                team: self.team.clone(),
                skipped: buckets.skipped().len(),
            });
        }

        log::debug!(
            "Aggregated {} games for {} ({} skipped)",
            buckets.games_analyzed(),
            self.team,
            buckets.skipped().len()
        );
        Ok(buckets)
    }

    /// Threshold-gated sentences for computed buckets
    pub fn format(&self, buckets: &TrendBuckets) -> Vec<TrendLine> {
        TrendFormatter::new(&self.team, self.sport.rules(), self.min_occurrences).format(buckets)
    }

    /// Compute and format in one call
    pub fn analyze<O>(&self, games: &[Game], odds: &O) -> Result<TrendReport>
    where
        O: OddsLookup + ?Sized,
    {
        let buckets = self.compute(games, odds)?;
        let lines = self.format(&buckets);
        Ok(TrendReport {
            team: self.team.clone(),
            sport: self.sport,
            min_occurrences: self.min_occurrences,
            games_analyzed: buckets.games_analyzed(),
            skipped: buckets.skipped().to_vec(),
            lines,
        })
    }

    fn validate(&self, game: &Game) -> Result<Scored> {
        let invalid = |reason: &str| TrendsError::InvalidGame {
            game_id: game.id.clone(),
            reason: reason.to_string(),
        };

        let side = game
            .side_of(&self.team)
            .ok_or_else(|| invalid(&format!("{} did not play in this game", self.team)))?;
        let team_points = game
            .points(side)
            .ok_or_else(|| invalid("missing team points"))?;
        let opp_points = game
            .points(side.opposite())
            .ok_or_else(|| invalid("missing opponent points"))?;
        let margin =
            classify::margin(game, side).ok_or_else(|| invalid("points out of range"))?;
        let total =
            classify::total_points(game).ok_or_else(|| invalid("points out of range"))?;

        Ok(Scored {
            side,
            team_points,
            opp_points,
            margin,
            total,
        })
    }

    fn accumulate(
        &self,
        buckets: &mut TrendBuckets,
        game: &Game,
        scored: &Scored,
        odds: Option<&OddsRecord>,
    ) {
        let id = &game.id;
        let side = scored.side;
        let margin = scored.margin;
        let total = scored.total;

        buckets
            .record_mut()
            .update(side, scored.team_points, scored.opp_points);
        buckets.push_scoring(classify::classify_scoring(
            id,
            scored.team_points,
            scored.opp_points,
        ));
        buckets.push_margin(classify::classify_margin(id, margin));

        if let Some(outcome) = classify::classify_spread(id, margin, side, odds) {
            buckets.push_spread(outcome);
        }
        if let Some(outcome) = classify::classify_total(id, total, odds) {
            buckets.push_total(outcome);
        }

        let line_scores = (
            classify::team_line_score(game, side),
            classify::opponent_line_score(game, side),
        );
        if let (Some(team), Some(opp)) = line_scores {
            buckets.push_quarters(classify::classify_quarters(id, team, opp));
            buckets.push_halves(classify::classify_halves(id, team, opp));
            if let Some(outcome) = classify::classify_first_score(id, team, opp) {
                buckets.push_first_score(outcome);
            }
        }
    }
}
