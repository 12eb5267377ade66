//! Elo rating system for team strength estimation
//!
//! Computes dynamic team ratings from game history and converts rating gaps
//! into hypothetical point spreads.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{Game, TeamCode};

/// Elo rating configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EloConfig {
    /// K-factor: how much ratings change per game
    pub k_factor: f64,
    /// Home advantage in rating points
    pub home_advantage: f64,
    /// Starting rating for new teams
    pub initial_rating: f64,
    /// Rating points worth one point on the spread
    pub points_per_spread: f64,
}

impl Default for EloConfig {
    fn default() -> Self {
        EloConfig {
            k_factor: 20.0,
            home_advantage: 55.0,
            initial_rating: 1500.0,
            points_per_spread: 25.0,
        }
    }
}

/// Elo rating computer
pub struct EloRatings {
    ratings: HashMap<TeamCode, f64>,
    games_rated: usize,
    config: EloConfig,
}

impl Default for EloRatings {
    fn default() -> Self {
        Self::new(EloConfig::default())
    }
}

impl EloRatings {
    pub fn new(config: EloConfig) -> Self {
        EloRatings {
            ratings: HashMap::new(),
            games_rated: 0,
            config,
        }
    }

    /// Replay games in chronological order
    pub fn from_games(config: EloConfig, games: &[Game]) -> Self {
        let mut elo = Self::new(config);
        for game in games {
            elo.update(game);
        }
        elo
    }

    /// Current rating for a team (initial if unknown)
    pub fn rating(&self, team: &TeamCode) -> f64 {
        self.ratings
            .get(team)
            .copied()
            .unwrap_or(self.config.initial_rating)
    }

    pub fn games_rated(&self) -> usize {
        self.games_rated
    }

    /// Expected score (0-1) for the home team
    pub fn expected_score(&self, home: &TeamCode, away: &TeamCode) -> f64 {
        let home_rating = self.rating(home) + self.config.home_advantage;
        let away_rating = self.rating(away);
        let diff = away_rating - home_rating;
        1.0 / (1.0 + 10.0_f64.powf(diff / 400.0))
    }

    /// Update ratings after a game. Games without a final score are ignored.
    pub fn update(&mut self, game: &Game) {
        let Some((home_points, away_points)) = game.final_score() else {
            log::debug!("Not rating game {} without a final score", game.id);
            return;
        };

        let home_expected = self.expected_score(&game.home_team, &game.away_team);

        // Actual result: 1 = home win, 0.5 = tie, 0 = away win
        let home_actual = match home_points.cmp(&away_points) {
            std::cmp::Ordering::Greater => 1.0,
            std::cmp::Ordering::Equal => 0.5,
            std::cmp::Ordering::Less => 0.0,
        };

        let shift = self.config.k_factor * (home_actual - home_expected);
        let home_new = self.rating(&game.home_team) + shift;
        let away_new = self.rating(&game.away_team) - shift;

        self.ratings.insert(game.home_team.clone(), home_new);
        self.ratings.insert(game.away_team.clone(), away_new);
        self.games_rated += 1;
    }

    /// Spread the ratings imply for the home side (negative = home favored),
    /// rounded to the nearest half point
    pub fn hypothetical_spread(&self, home: &TeamCode, away: &TeamCode) -> f64 {
        let gap = self.rating(home) + self.config.home_advantage - self.rating(away);
        let points = -gap / self.config.points_per_spread;
        (points * 2.0).round() / 2.0
    }

    /// All rated teams, best first (ties broken by team code)
    pub fn standings(&self) -> Vec<(TeamCode, f64)> {
        let mut table: Vec<_> = self
            .ratings
            .iter()
            .map(|(team, rating)| (team.clone(), *rating))
            .collect();
        table.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        table
    }
}
