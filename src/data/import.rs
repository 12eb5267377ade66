//! JSON game feed import
//!
//! Loads games and betting lines exported by the ingestion jobs and stores
//! them in the database.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::Database;
use crate::{Game, OddsRecord, Result};

/// A batch of games and lines as written by the feed exporters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameFeed {
    #[serde(default)]
    pub games: Vec<Game>,
    #[serde(default)]
    pub odds: Vec<OddsRecord>,
}

/// Counts from one import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub games: usize,
    pub odds: usize,
    /// Lines referring to games not present in the feed or database
    pub orphaned_odds: usize,
}

impl GameFeed {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Store the feed. Lines are only kept for games the database knows about.
    pub fn import(&self, db: &Database) -> Result<ImportSummary> {
        let games = db.upsert_games(&self.games)?;

        let known = db.all_games(None)?;
        let (linked, orphaned): (Vec<_>, Vec<_>) = self
            .odds
            .iter()
            .cloned()
            .partition(|o| known.iter().any(|g| g.id == o.game_id));

        for record in &orphaned {
            log::warn!("Dropping line for unknown game {}", record.game_id);
        }
        let odds = db.upsert_all_odds(&linked)?;

        log::info!("Imported {} games and {} lines", games, odds);
        Ok(ImportSummary {
            games,
            odds,
            orphaned_odds: orphaned.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::GameFilter;
    use crate::TeamCode;

    const FEED: &str = r#"{
        "games": [
            {
                "id": "401547417",
                "season": 2024,
                "week": 1,
                "played_on": "2024-09-05",
                "home_team": "kc",
                "away_team": "bal",
                "home_points": 27,
                "away_points": 20,
                "home_line_score": {"1": 7, "2": 6, "3": 7, "4": 7},
                "away_line_score": {"1": 7, "2": 3, "3": 0, "4": 10}
            },
            {
                "id": "401547430",
                "season": 2024,
                "week": 2,
                "played_on": "2024-09-15",
                "home_team": "KC",
                "away_team": "CIN",
                "home_points": 26,
                "away_points": 25
            }
        ],
        "odds": [
            {"game_id": "401547417", "spread_home": -3.0, "spread_away": 3.0, "total_over": 46.5},
            {"game_id": "999", "spread_home": -1.0}
        ]
    }"#;

    #[test]
    fn test_parse_feed() {
        let feed = GameFeed::from_json(FEED).unwrap();
        assert_eq!(feed.games.len(), 2);
        assert_eq!(feed.games[0].home_team, TeamCode::new("KC"));
        assert_eq!(
            feed.games[0].away_line_score.map(|l| l.quarters()),
            Some([7, 3, 0, 10])
        );
        assert!(feed.games[1].home_line_score.is_none());
        assert_eq!(feed.odds[1].total_over, None);
    }

    #[test]
    fn test_import_drops_orphaned_lines() {
        let db = Database::in_memory().unwrap();
        let summary = GameFeed::from_json(FEED).unwrap().import(&db).unwrap();

        assert_eq!(
            summary,
            ImportSummary {
                games: 2,
                odds: 1,
                orphaned_odds: 1
            }
        );

        let games = db
            .team_games(&TeamCode::new("KC"), &GameFilter::default())
            .unwrap();
        assert_eq!(games[0].id.0, "401547430");
        assert_eq!(db.odds_for(&games).unwrap().len(), 1);
    }

    #[test]
    fn test_imperfect_line_scores_keep_the_feed() {
        let feed = GameFeed::from_json(
            r#"{
                "games": [
                    {"id": "a", "home_team": "KC", "away_team": "LV",
                     "home_points": 27, "away_points": 20},
                    {"id": "b", "home_team": "KC", "away_team": "BUF",
                     "home_points": 30, "away_points": 27,
                     "home_line_score": {"1": 7, "2": null, "3": 7, "4": 6},
                     "away_line_score": [7, 7, 7, 6, 0]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(feed.games.len(), 2);
        assert!(feed.games[1].home_line_score.is_none());
        assert_eq!(
            feed.games[1].away_line_score.map(|l| l.quarters()),
            Some([7, 7, 7, 6])
        );

        let db = Database::in_memory().unwrap();
        assert_eq!(feed.import(&db).unwrap().games, 2);
    }

    #[test]
    fn test_malformed_feed_is_an_error() {
        assert!(GameFeed::from_json("{\"games\": [{\"id\": 1}]}").is_err());
    }
}
