//! Straight-up record
//!
//! Win/loss counts and points for the analyzed team over the games in the report.

use crate::trends::percent;
use crate::Side;

/// Straight-up record for a team
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamRecord {
    /// Games analyzed
    pub games: usize,
    /// Outright wins
    pub wins: usize,
    /// Games that finished level
    pub ties: usize,
    /// Total points scored
    pub points_for: u64,
    /// Total points conceded
    pub points_against: u64,
    pub home_games: usize,
    pub home_wins: usize,
    pub away_games: usize,
    pub away_wins: usize,
}

impl TeamRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one game from the team's point of view
    pub fn update(&mut self, side: Side, points_for: u32, points_against: u32) {
        self.games += 1;
        self.points_for += u64::from(points_for);
        self.points_against += u64::from(points_against);

        match side {
            Side::Home => self.home_games += 1,
            Side::Away => self.away_games += 1,
        }

        match points_for.cmp(&points_against) {
            std::cmp::Ordering::Greater => {
                self.wins += 1;
                match side {
                    Side::Home => self.home_wins += 1,
                    Side::Away => self.away_wins += 1,
                }
            }
            std::cmp::Ordering::Equal => self.ties += 1,
            std::cmp::Ordering::Less => {}
        }
    }

    /// Everything that was not a win, ties included
    pub fn losses(&self) -> usize {
        self.games - self.wins
    }

    pub fn home_losses(&self) -> usize {
        self.home_games - self.home_wins
    }

    pub fn away_losses(&self) -> usize {
        self.away_games - self.away_wins
    }

    /// "W-L" as printed in reports
    pub fn summary(&self) -> String {
        format!("{}-{}", self.wins, self.losses())
    }

    /// Win percentage over all games played
    pub fn win_pct(&self) -> Option<u32> {
        percent(self.wins, self.games)
    }

    pub fn home_win_pct(&self) -> Option<u32> {
        percent(self.home_wins, self.home_games)
    }

    pub fn away_win_pct(&self) -> Option<u32> {
        percent(self.away_wins, self.away_games)
    }
}
