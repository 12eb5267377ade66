use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::data::{Database, GameFilter};
use crate::ratings::{EloConfig, EloRatings};
use crate::report::{team_report, TrendReport};
use crate::trends::TrendAggregator;
use crate::{Result, Sport, TeamCode, TrendsConfig, TrendsError};

#[derive(Clone)]
pub struct ApiState {
    pub db: Arc<Mutex<Database>>,
    pub trends: TrendsConfig,
    pub elo: EloConfig,
}

impl ApiState {
    pub fn new(db: Database, trends: TrendsConfig, elo: EloConfig) -> Self {
        ApiState {
            db: Arc::new(Mutex::new(db)),
            trends,
            elo,
        }
    }

    /// Run a storage call off the async runtime
    async fn with_db<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let guard = db
                .lock()
                .map_err(|_| TrendsError::Task("database lock poisoned".to_string()))?;
            f(&*guard)
        })
        .await
        .map_err(|e| TrendsError::Task(e.to_string()))?
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/teams/:team/trends", get(get_team_trends))
        .route("/ratings", get(get_ratings))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct TrendsQuery {
    pub games: Option<usize>,
    pub season: Option<u16>,
    pub week: Option<u8>,
    pub min: Option<usize>,
    pub sport: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RatingsQuery {
    pub season: Option<u16>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub rank: usize,
    pub team: TeamCode,
    pub rating: f64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn get_team_trends(
    State(state): State<ApiState>,
    Path(team): Path<String>,
    Query(params): Query<TrendsQuery>,
) -> Result<Json<TrendReport>> {
    let sport = match params.sport.as_deref() {
        Some(s) => s.parse::<Sport>().map_err(TrendsError::Parse)?,
        None => state.trends.sport,
    };
    let games = params.games.unwrap_or(state.trends.games);
    let min = params.min.unwrap_or(state.trends.min_occurrences);
    if games == 0 || min == 0 {
        return Err(TrendsError::Config(
            "games and min must be at least 1".to_string(),
        ));
    }

    let aggregator = TrendAggregator::new(team.as_str())
        .with_sport(sport)
        .with_min_occurrences(min);
    let filter = GameFilter {
        season: params.season,
        week: params.week,
        limit: games,
    };

    let report = state
        .with_db(move |db| team_report(db, &aggregator, &filter))
        .await?;
    Ok(Json(report))
}

pub async fn get_ratings(
    State(state): State<ApiState>,
    Query(params): Query<RatingsQuery>,
) -> Result<Json<Vec<RatingResponse>>> {
    let config = state.elo.clone();
    let games = state.with_db(move |db| db.all_games(params.season)).await?;

    let ratings = EloRatings::from_games(config, &games)
        .standings()
        .into_iter()
        .enumerate()
        .map(|(i, (team, rating))| RatingResponse {
            rank: i + 1,
            team,
            rating: (rating * 10.0).round() / 10.0,
        })
        .collect();

    Ok(Json(ratings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Game, GameId, OddsRecord};

    fn seeded_state() -> ApiState {
        let db = Database::in_memory().unwrap();
        let results = [("KC", "LV", 27, 20), ("DEN", "KC", 24, 24), ("KC", "BUF", 17, 30)];
        for (i, (home, away, home_points, away_points)) in results.into_iter().enumerate() {
            db.upsert_game(&Game {
                id: GameId::new(format!("g{}", i)),
                season: Some(2024),
                week: Some(3 - i as u8),
                played_on: None,
                home_team: TeamCode::new(home),
                away_team: TeamCode::new(away),
                home_points: Some(home_points),
                away_points: Some(away_points),
                home_line_score: None,
                away_line_score: None,
            })
            .unwrap();
        }
        db.upsert_odds(&OddsRecord {
            game_id: GameId::new("g0"),
            spread_home: Some(-3.0),
            spread_away: Some(3.0),
            total_over: None,
        })
        .unwrap();
        ApiState::new(db, TrendsConfig::default(), EloConfig::default())
    }

    #[tokio::test]
    async fn test_team_trends_handler() {
        let state = seeded_state();
        let Json(report) = get_team_trends(
            State(state),
            Path("kc".to_string()),
            Query(TrendsQuery::default()),
        )
        .await
        .unwrap();

        assert_eq!(report.team, TeamCode::new("KC"));
        assert_eq!(report.games_analyzed, 3);
        assert_eq!(
            report.lines[0].text,
            "KC is 1-2 straight up in their last 3 games (33%)."
        );
    }

    #[tokio::test]
    async fn test_unknown_team_and_bad_sport() {
        let state = seeded_state();
        let missing = get_team_trends(
            State(state.clone()),
            Path("SF".to_string()),
            Query(TrendsQuery::default()),
        )
        .await;
        assert!(matches!(missing, Err(TrendsError::UnknownTeam(_))));

        let bad_sport = get_team_trends(
            State(state),
            Path("KC".to_string()),
            Query(TrendsQuery {
                sport: Some("curling".to_string()),
                ..TrendsQuery::default()
            }),
        )
        .await;
        assert!(matches!(bad_sport, Err(TrendsError::Parse(_))));
    }

    #[tokio::test]
    async fn test_zero_min_rejected() {
        let zero_min = get_team_trends(
            State(seeded_state()),
            Path("KC".to_string()),
            Query(TrendsQuery {
                min: Some(0),
                ..TrendsQuery::default()
            }),
        )
        .await;
        assert!(matches!(zero_min, Err(TrendsError::Config(_))));
    }

    #[tokio::test]
    async fn test_ratings_handler() {
        let Json(ratings) = get_ratings(State(seeded_state()), Query(RatingsQuery::default()))
            .await
            .unwrap();
        assert_eq!(ratings.len(), 4);
        assert_eq!(ratings[0].rank, 1);
        assert!(ratings.windows(2).all(|w| w[0].rating >= w[1].rating));
    }
}
