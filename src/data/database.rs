//! SQLite storage for games and betting lines

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;

use crate::{Game, GameId, LineScore, OddsRecord, Result, TeamCode};

/// Which of a team's games to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameFilter {
    /// Only games from this season
    pub season: Option<u16>,
    /// Only games through this week (inclusive)
    pub week: Option<u8>,
    /// Most recent N games
    pub limit: usize,
}

impl Default for GameFilter {
    fn default() -> Self {
        GameFilter {
            season: None,
            week: None,
            limit: 16,
        }
    }
}

const GAME_COLUMNS: &str = "id, season, week, played_on, home_team, away_team,
                            home_points, away_points, home_line_score, away_line_score";

/// Database connection and operations
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS games (
                id TEXT PRIMARY KEY,
                season INTEGER,
                week INTEGER,
                played_on TEXT,
                home_team TEXT NOT NULL,
                away_team TEXT NOT NULL,
                home_points INTEGER,
                away_points INTEGER,
                home_line_score TEXT,
                away_line_score TEXT
            );

            CREATE TABLE IF NOT EXISTS odds (
                game_id TEXT PRIMARY KEY REFERENCES games(id),
                spread_home REAL,
                spread_away REAL,
                total_over REAL
            );

            CREATE INDEX IF NOT EXISTS idx_games_played_on ON games(played_on);
            CREATE INDEX IF NOT EXISTS idx_games_teams ON games(home_team, away_team);
            "#,
        )?;
        Ok(())
    }

    // ==================== Game Operations ====================

    /// Insert or update a game
    pub fn upsert_game(&self, game: &Game) -> Result<()> {
        let home_line = game
            .home_line_score
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let away_line = game
            .away_line_score
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            r#"
            INSERT INTO games (id, season, week, played_on, home_team, away_team,
                               home_points, away_points, home_line_score, away_line_score)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                season = COALESCE(excluded.season, season),
                week = COALESCE(excluded.week, week),
                played_on = COALESCE(excluded.played_on, played_on),
                home_team = excluded.home_team,
                away_team = excluded.away_team,
                home_points = COALESCE(excluded.home_points, home_points),
                away_points = COALESCE(excluded.away_points, away_points),
                home_line_score = COALESCE(excluded.home_line_score, home_line_score),
                away_line_score = COALESCE(excluded.away_line_score, away_line_score)
            "#,
            params![
                game.id.0,
                game.season,
                game.week,
                game.played_on.map(|d| d.format("%Y-%m-%d").to_string()),
                game.home_team.as_str(),
                game.away_team.as_str(),
                game.home_points,
                game.away_points,
                home_line,
                away_line,
            ],
        )?;
        Ok(())
    }

    /// Insert multiple games
    pub fn upsert_games(&self, games: &[Game]) -> Result<usize> {
        let mut count = 0;
        for game in games {
            self.upsert_game(game)?;
            count += 1;
        }
        Ok(count)
    }

    /// Games for one team, most recent first
    pub fn team_games(&self, team: &TeamCode, filter: &GameFilter) -> Result<Vec<Game>> {
        let sql = format!(
            "SELECT {GAME_COLUMNS}
             FROM games
             WHERE (home_team = ?1 OR away_team = ?1)
               AND (?2 IS NULL OR season = ?2)
               AND (?3 IS NULL OR week <= ?3)
             ORDER BY played_on DESC, season DESC, week DESC, id DESC
             LIMIT ?4"
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let games = stmt
            .query_map(
                params![team.as_str(), filter.season, filter.week, filter.limit],
                Self::row_to_game,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(games)
    }

    /// All games in chronological order, optionally for one season
    pub fn all_games(&self, season: Option<u16>) -> Result<Vec<Game>> {
        let sql = format!(
            "SELECT {GAME_COLUMNS}
             FROM games
             WHERE ?1 IS NULL OR season = ?1
             ORDER BY played_on, season, week, id"
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let games = stmt
            .query_map(params![season], Self::row_to_game)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(games)
    }

    /// Every team code that appears in a game
    pub fn teams(&self) -> Result<Vec<TeamCode>> {
        let mut stmt = self.conn.prepare(
            "SELECT home_team FROM games UNION SELECT away_team FROM games ORDER BY 1",
        )?;
        let teams = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .map(|r| r.map(TeamCode::from))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(teams)
    }

    pub fn has_team(&self, team: &TeamCode) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM games WHERE home_team = ?1 OR away_team = ?1 LIMIT 1",
                params![team.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn row_to_game(row: &rusqlite::Row) -> rusqlite::Result<Game> {
        let played_on: Option<String> = row.get(3)?;
        let home_line: Option<String> = row.get(8)?;
        let away_line: Option<String> = row.get(9)?;

        Ok(Game {
            id: GameId(row.get(0)?),
            season: row.get(1)?,
            week: row.get(2)?,
            played_on: played_on.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
            home_team: TeamCode::from(row.get::<_, String>(4)?),
            away_team: TeamCode::from(row.get::<_, String>(5)?),
            home_points: row.get(6)?,
            away_points: row.get(7)?,
            home_line_score: home_line.as_deref().and_then(Self::parse_line_score),
            away_line_score: away_line.as_deref().and_then(Self::parse_line_score),
        })
    }

    fn parse_line_score(text: &str) -> Option<LineScore> {
        match serde_json::from_str(text) {
            Ok(score) => Some(score),
            Err(e) => {
                log::warn!("Ignoring stored line score {:?}: {}", text, e);
                None
            }
        }
    }

    // ==================== Odds Operations ====================

    /// Insert or replace the line for a game
    pub fn upsert_odds(&self, odds: &OddsRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO odds (game_id, spread_home, spread_away, total_over)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(game_id) DO UPDATE SET
                spread_home = COALESCE(excluded.spread_home, spread_home),
                spread_away = COALESCE(excluded.spread_away, spread_away),
                total_over = COALESCE(excluded.total_over, total_over)
            "#,
            params![
                odds.game_id.0,
                odds.spread_home,
                odds.spread_away,
                odds.total_over
            ],
        )?;
        Ok(())
    }

    pub fn upsert_all_odds(&self, odds: &[OddsRecord]) -> Result<usize> {
        let mut count = 0;
        for record in odds {
            self.upsert_odds(record)?;
            count += 1;
        }
        Ok(count)
    }

    /// Lines for the given games; games without a line are simply absent
    pub fn odds_for(&self, games: &[Game]) -> Result<HashMap<GameId, OddsRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT game_id, spread_home, spread_away, total_over FROM odds WHERE game_id = ?1",
        )?;

        let mut odds = HashMap::new();
        for game in games {
            let record = stmt
                .query_row(params![game.id.0], |row| {
                    Ok(OddsRecord {
                        game_id: GameId(row.get(0)?),
                        spread_home: row.get(1)?,
                        spread_away: row.get(2)?,
                        total_over: row.get(3)?,
                    })
                })
                .optional()?;
            if let Some(record) = record {
                odds.insert(record.game_id.clone(), record);
            }
        }
        Ok(odds)
    }

    // ==================== Statistics ====================

    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let game_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?;

        let odds_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM odds", [], |row| row.get(0))?;

        let team_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM (SELECT home_team FROM games UNION SELECT away_team FROM games)",
            [],
            |row| row.get(0),
        )?;

        let min_date: Option<String> = self
            .conn
            .query_row("SELECT MIN(played_on) FROM games", [], |row| row.get(0))
            .optional()?
            .flatten();

        let max_date: Option<String> = self
            .conn
            .query_row("SELECT MAX(played_on) FROM games", [], |row| row.get(0))
            .optional()?
            .flatten();

        Ok(DatabaseStats {
            team_count: team_count as usize,
            game_count: game_count as usize,
            odds_count: odds_count as usize,
            earliest_game: min_date.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
            latest_game: max_date.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        })
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub team_count: usize,
    pub game_count: usize,
    pub odds_count: usize,
    pub earliest_game: Option<NaiveDate>,
    pub latest_game: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_game(id: &str, week: u8, home: &str, away: &str) -> Game {
        Game {
            id: GameId::new(id),
            season: Some(2024),
            week: Some(week),
            played_on: NaiveDate::from_ymd_opt(2024, 9, 1 + week as u32),
            home_team: TeamCode::new(home),
            away_team: TeamCode::new(away),
            home_points: Some(24),
            away_points: Some(17),
            home_line_score: Some(LineScore::new([7, 7, 3, 7])),
            away_line_score: None,
        }
    }

    #[test]
    fn test_create_database() {
        let db = Database::in_memory().unwrap();
        let stats = db.get_stats().unwrap();
        assert_eq!(stats.team_count, 0);
        assert_eq!(stats.game_count, 0);
        assert!(stats.earliest_game.is_none());
    }

    #[test]
    fn test_insert_and_read_game() {
        let db = Database::in_memory().unwrap();
        let game = make_game("g1", 1, "KC", "BAL");
        db.upsert_game(&game).unwrap();

        let games = db
            .team_games(&TeamCode::new("kc"), &GameFilter::default())
            .unwrap();
        assert_eq!(games, vec![game]);

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.game_count, 1);
        assert_eq!(stats.team_count, 2);
        assert_eq!(db.teams().unwrap(), vec![TeamCode::new("BAL"), TeamCode::new("KC")]);
    }

    #[test]
    fn test_team_games_most_recent_first_with_filters() {
        let db = Database::in_memory().unwrap();
        db.upsert_games(&[
            make_game("w1", 1, "KC", "BAL"),
            make_game("w2", 2, "CIN", "KC"),
            make_game("w3", 3, "KC", "ATL"),
            make_game("w4", 4, "LAC", "KC"),
            make_game("other", 4, "NYJ", "NE"),
        ])
        .unwrap();
        let kc = TeamCode::new("KC");

        let ids = |games: Vec<Game>| games.into_iter().map(|g| g.id.0).collect::<Vec<_>>();

        let recent = db
            .team_games(&kc, &GameFilter { limit: 3, ..GameFilter::default() })
            .unwrap();
        assert_eq!(ids(recent), vec!["w4", "w3", "w2"]);

        let through_week_two = db
            .team_games(
                &kc,
                &GameFilter {
                    week: Some(2),
                    ..GameFilter::default()
                },
            )
            .unwrap();
        assert_eq!(ids(through_week_two), vec!["w2", "w1"]);

        let other_season = db
            .team_games(
                &kc,
                &GameFilter {
                    season: Some(2023),
                    ..GameFilter::default()
                },
            )
            .unwrap();
        assert!(other_season.is_empty());
    }

    #[test]
    fn test_odds_lookup_only_returns_recorded_lines() {
        let db = Database::in_memory().unwrap();
        let games = vec![make_game("g1", 1, "KC", "BAL"), make_game("g2", 2, "KC", "CIN")];
        db.upsert_games(&games).unwrap();
        db.upsert_odds(&OddsRecord {
            game_id: GameId::new("g1"),
            spread_home: Some(-3.0),
            spread_away: Some(3.0),
            total_over: Some(46.5),
        })
        .unwrap();

        let odds = db.odds_for(&games).unwrap();
        assert_eq!(odds.len(), 1);
        assert_eq!(odds[&GameId::new("g1")].total_over, Some(46.5));
    }

    #[test]
    fn test_upsert_keeps_existing_scores() {
        let db = Database::in_memory().unwrap();
        db.upsert_game(&make_game("g1", 1, "KC", "BAL")).unwrap();

        let mut update = make_game("g1", 1, "KC", "BAL");
        update.home_points = None;
        update.home_line_score = None;
        db.upsert_game(&update).unwrap();

        let stored = db.all_games(None).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].home_points, Some(24));
        assert!(stored[0].home_line_score.is_some());
        assert!(db.has_team(&TeamCode::new("BAL")).unwrap());
        assert!(!db.has_team(&TeamCode::new("SF")).unwrap());
    }
}
