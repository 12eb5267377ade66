//! Team betting trends
//!
//! Turns a team's recent game history and betting lines into threshold-gated
//! trend sentences (straight-up record, against the spread, quarters, halves,
//! margins, totals, first score).

pub mod api;
pub mod data;
pub mod ratings;
pub mod report;
pub mod trends;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use ratings::EloConfig;

/// Normalized team abbreviation ("KC", "BOS", ...)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TeamCode(String);

impl TeamCode {
    pub fn new(code: &str) -> Self {
        TeamCode(code.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TeamCode {
    fn from(code: String) -> Self {
        TeamCode::new(&code)
    }
}

impl From<&str> for TeamCode {
    fn from(code: &str) -> Self {
        TeamCode::new(code)
    }
}

impl From<TeamCode> for String {
    fn from(code: TeamCode) -> Self {
        code.0
    }
}

impl fmt::Display for TeamCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a game
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub String);

impl GameId {
    pub fn new(id: impl Into<String>) -> Self {
        GameId(id.into())
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which side of a game a team played on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

/// Sport being analyzed; picks the threshold rule tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    #[default]
    Football,
    Basketball,
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sport::Football => write!(f, "football"),
            Sport::Basketball => write!(f, "basketball"),
        }
    }
}

impl std::str::FromStr for Sport {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "football" | "nfl" | "ncaaf" | "cfb" => Ok(Sport::Football),
            "basketball" | "nba" | "ncaab" | "cbb" => Ok(Sport::Basketball),
            _ => Err(format!("Unknown sport: {}. Use football or basketball.", s)),
        }
    }
}

/// Regulation quarter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    /// Quarters in scan order
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    pub fn index(self) -> usize {
        match self {
            Quarter::Q1 => 0,
            Quarter::Q2 => 1,
            Quarter::Q3 => 2,
            Quarter::Q4 => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quarter::Q1 => "1st quarter",
            Quarter::Q2 => "2nd quarter",
            Quarter::Q3 => "3rd quarter",
            Quarter::Q4 => "4th quarter",
        }
    }
}

/// Regulation half
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Half {
    First,
    Second,
}

impl Half {
    pub const ALL: [Half; 2] = [Half::First, Half::Second];

    pub fn label(self) -> &'static str {
        match self {
            Half::First => "1st half",
            Half::Second => "2nd half",
        }
    }
}

/// Per-quarter points for one team in one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineScore([u32; 4]);

impl LineScore {
    pub fn new(quarters: [u32; 4]) -> Self {
        LineScore(quarters)
    }

    /// Build from a list of quarter points. Entries past the fourth are
    /// overtime and ignored; a missing or null regulation quarter yields `None`.
    pub fn from_slice(points: &[Option<u32>]) -> Option<Self> {
        match points {
            [Some(q1), Some(q2), Some(q3), Some(q4), ..] => Some(LineScore([*q1, *q2, *q3, *q4])),
            _ => None,
        }
    }

    /// Build from a label map such as `{"1": 7, "2": 3, "3": 0, "4": 10}`.
    ///
    /// Labels may be `"1"`, `"Q1"` or `"q1"`. Overtime periods are ignored and a
    /// partial breakdown (missing or null quarter) yields `None` rather than
    /// zero-filled quarters.
    pub fn from_labels(labels: &BTreeMap<String, Option<u32>>) -> Option<Self> {
        let mut quarters = [None; 4];
        for (label, points) in labels {
            let label = label.trim().to_lowercase();
            let number = label.strip_prefix('q').unwrap_or(label.as_str());
            if let Ok(n @ 1..=4) = number.parse::<usize>() {
                quarters[n - 1] = *points;
            }
        }
        Self::from_slice(&quarters)
    }

    pub fn quarter(&self, quarter: Quarter) -> u32 {
        self.0[quarter.index()]
    }

    pub fn first_half(&self) -> u32 {
        self.0[0] + self.0[1]
    }

    pub fn second_half(&self) -> u32 {
        self.0[2] + self.0[3]
    }

    pub fn half(&self, half: Half) -> u32 {
        match half {
            Half::First => self.first_half(),
            Half::Second => self.second_half(),
        }
    }

    pub fn quarters(&self) -> [u32; 4] {
        self.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLineScore {
    List(Vec<Option<u32>>),
    Labeled(BTreeMap<String, Option<u32>>),
    Unrecognized(serde::de::IgnoredAny),
}

impl RawLineScore {
    fn parse(&self) -> Option<LineScore> {
        match self {
            RawLineScore::List(points) => LineScore::from_slice(points),
            RawLineScore::Labeled(labels) => LineScore::from_labels(labels),
            RawLineScore::Unrecognized(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for LineScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        RawLineScore::deserialize(deserializer)?
            .parse()
            .ok_or_else(|| serde::de::Error::custom("line score needs all four quarters"))
    }
}

/// Feed line scores never fail the game: anything short of four regulation
/// quarters is dropped.
fn lenient_line_score<'de, D>(deserializer: D) -> std::result::Result<Option<LineScore>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawLineScore>::deserialize(deserializer)?;
    let parsed = raw.as_ref().and_then(RawLineScore::parse);
    if raw.is_some() && parsed.is_none() {
        log::debug!("Dropping partial line score");
    }
    Ok(parsed)
}

/// A single game as supplied by the storage or feed layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    #[serde(default)]
    pub season: Option<u16>,
    #[serde(default)]
    pub week: Option<u8>,
    #[serde(default)]
    pub played_on: Option<NaiveDate>,
    pub home_team: TeamCode,
    pub away_team: TeamCode,
    #[serde(default)]
    pub home_points: Option<u32>,
    #[serde(default)]
    pub away_points: Option<u32>,
    #[serde(default, deserialize_with = "lenient_line_score")]
    pub home_line_score: Option<LineScore>,
    #[serde(default, deserialize_with = "lenient_line_score")]
    pub away_line_score: Option<LineScore>,
}

impl Game {
    /// Which side the given team played on, if it played at all
    pub fn side_of(&self, team: &TeamCode) -> Option<Side> {
        if *team == self.home_team {
            Some(Side::Home)
        } else if *team == self.away_team {
            Some(Side::Away)
        } else {
            None
        }
    }

    pub fn team(&self, side: Side) -> &TeamCode {
        match side {
            Side::Home => &self.home_team,
            Side::Away => &self.away_team,
        }
    }

    /// Final (home, away) points when both are known
    pub fn final_score(&self) -> Option<(u32, u32)> {
        Some((self.home_points?, self.away_points?))
    }

    pub fn points(&self, side: Side) -> Option<u32> {
        match side {
            Side::Home => self.home_points,
            Side::Away => self.away_points,
        }
    }

    pub fn line_score(&self, side: Side) -> Option<&LineScore> {
        match side {
            Side::Home => self.home_line_score.as_ref(),
            Side::Away => self.away_line_score.as_ref(),
        }
    }
}

/// Betting line recorded for one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsRecord {
    pub game_id: GameId,
    #[serde(default)]
    pub spread_home: Option<f64>,
    #[serde(default)]
    pub spread_away: Option<f64>,
    #[serde(default)]
    pub total_over: Option<f64>,
}

impl OddsRecord {
    /// Spread for one side (negative = favorite); mirrors the other side if missing
    pub fn spread_for(&self, side: Side) -> Option<f64> {
        let (own, other) = match side {
            Side::Home => (self.spread_home, self.spread_away),
            Side::Away => (self.spread_away, self.spread_home),
        };
        own.or_else(|| other.map(|s| -s))
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum TrendsError {
    #[error("No games supplied for {team}")]
    EmptyInput { team: TeamCode },

    #[error("None of the {skipped} games supplied for {team} could be analyzed")]
    NoValidGames { team: TeamCode, skipped: usize },

    #[error("Invalid game {game_id}: {reason}")]
    InvalidGame { game_id: GameId, reason: String },

    #[error("Unknown team: {0}")]
    UnknownTeam(TeamCode),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, TrendsError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub trends: TrendsConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub elo: EloConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendsConfig {
    /// A trend is reported only when it happened at least this many times
    pub min_occurrences: usize,
    /// Number of most recent games to analyze
    pub games: usize,
    pub sport: Sport,
}

impl Default for TrendsConfig {
    fn default() -> Self {
        TrendsConfig {
            min_occurrences: 2,
            games: 16,
            sport: Sport::Football,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub database_path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            database_path: "data/trends.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TrendsError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| TrendsError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TrendsError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.trends.min_occurrences == 0 {
            return Err(TrendsError::Config(
                "trends.min_occurrences must be at least 1".to_string(),
            ));
        }
        if self.trends.games == 0 {
            return Err(TrendsError::Config("trends.games must be at least 1".to_string()));
        }
        if self.elo.points_per_spread <= 0.0 {
            return Err(TrendsError::Config(
                "elo.points_per_spread must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
