//! Per-game classification
//!
//! Pure functions deriving the facts each bucket records. Nothing here
//! touches the buckets themselves.

use crate::trends::buckets::{
    FirstScoreOutcome, HalfOutcome, MarginOutcome, QuarterOutcome, ScoringOutcome,
    SpreadOutcome, TotalOutcome,
};
use crate::{Game, GameId, Half, LineScore, OddsRecord, Quarter, Side};

/// Point differential from `side`'s point of view (positive = won by that many).
///
/// `None` when a final score is missing or the points do not fit an `i32`.
pub fn margin(game: &Game, side: Side) -> Option<i32> {
    let (home, away) = game.final_score()?;
    let home = i32::try_from(home).ok()?;
    let away = i32::try_from(away).ok()?;
    match side {
        Side::Home => home.checked_sub(away),
        Side::Away => away.checked_sub(home),
    }
}

/// The analyzed team's quarter breakdown, if the source recorded one
pub fn team_line_score(game: &Game, side: Side) -> Option<&LineScore> {
    game.line_score(side)
}

pub fn opponent_line_score(game: &Game, side: Side) -> Option<&LineScore> {
    game.line_score(side.opposite())
}

/// Combined final points of both sides; `None` on a missing score or overflow
pub fn total_points(game: &Game) -> Option<u32> {
    let (home, away) = game.final_score()?;
    home.checked_add(away)
}

/// Grade the team's margin against its spread.
///
/// A negative spread means the team was favored. The team covers when
/// `margin + spread > 0` and pushes when it is exactly zero, which is the same
/// as "margin > |spread|" for favorites and "margin > -spread" otherwise.
/// Returns `None` when no spread was recorded for the game.
pub fn classify_spread(
    game_id: &GameId,
    margin: i32,
    side: Side,
    odds: Option<&OddsRecord>,
) -> Option<SpreadOutcome> {
    let spread = odds?.spread_for(side)?;
    let against_line = margin as f64 + spread;

    let covered = if against_line > 0.0 {
        Some(true)
    } else if against_line < 0.0 {
        Some(false)
    } else {
        None
    };

    Some(SpreadOutcome {
        game_id: game_id.clone(),
        spread,
        margin,
        covered,
    })
}

pub fn classify_scoring(game_id: &GameId, team_points: u32, opp_points: u32) -> ScoringOutcome {
    ScoringOutcome {
        game_id: game_id.clone(),
        team_points,
        opp_points,
    }
}

/// One outcome per regulation quarter. Ties are not wins.
pub fn classify_quarters(
    game_id: &GameId,
    team: &LineScore,
    opp: &LineScore,
) -> [QuarterOutcome; 4] {
    Quarter::ALL.map(|quarter| {
        let team_score = team.quarter(quarter);
        let opp_score = opp.quarter(quarter);
        QuarterOutcome {
            game_id: game_id.clone(),
            quarter,
            team_score,
            opp_score,
            won: team_score > opp_score,
        }
    })
}

/// First half is Q1+Q2, second half Q3+Q4. Ties are not wins.
pub fn classify_halves(game_id: &GameId, team: &LineScore, opp: &LineScore) -> [HalfOutcome; 2] {
    Half::ALL.map(|half| {
        let team_score = team.half(half);
        let opp_score = opp.half(half);
        HalfOutcome {
            game_id: game_id.clone(),
            half,
            team_score,
            opp_score,
            won: team_score > opp_score,
        }
    })
}

pub fn classify_margin(game_id: &GameId, margin: i32) -> MarginOutcome {
    MarginOutcome {
        game_id: game_id.clone(),
        margin,
        // a tie is not a win
        is_win: margin > 0,
    }
}

/// Grade the combined score against the posted total. An exact push is not "over".
pub fn classify_total(
    game_id: &GameId,
    total_points: u32,
    odds: Option<&OddsRecord>,
) -> Option<TotalOutcome> {
    let over_under = odds?.total_over?;
    Some(TotalOutcome {
        game_id: game_id.clone(),
        total_points,
        over_under,
        went_over: total_points as f64 > over_under,
    })
}

/// Find the first quarter in which anyone scored and record who led it.
///
/// Scanning stops at that quarter; a scoreless game yields `None`.
pub fn classify_first_score(
    game_id: &GameId,
    team: &LineScore,
    opp: &LineScore,
) -> Option<FirstScoreOutcome> {
    Quarter::ALL.iter().find_map(|&quarter| {
        let team_score = team.quarter(quarter);
        let opp_score = opp.quarter(quarter);
        if team_score == 0 && opp_score == 0 {
            return None;
        }
        Some(FirstScoreOutcome {
            game_id: game_id.clone(),
            quarter,
            scored_first: team_score > 0 && (opp_score == 0 || team_score > opp_score),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TeamCode;

    fn make_game(home_points: u32, away_points: u32) -> Game {
        Game {
            id: GameId::new("g1"),
            season: Some(2024),
            week: Some(1),
            played_on: None,
            home_team: TeamCode::new("KC"),
            away_team: TeamCode::new("BAL"),
            home_points: Some(home_points),
            away_points: Some(away_points),
            home_line_score: None,
            away_line_score: None,
        }
    }

    fn odds(spread_home: f64, total: Option<f64>) -> OddsRecord {
        OddsRecord {
            game_id: GameId::new("g1"),
            spread_home: Some(spread_home),
            spread_away: Some(-spread_home),
            total_over: total,
        }
    }

    #[test]
    fn test_margin_symmetry() {
        for (home, away) in [(27, 20), (17, 30), (24, 24), (0, 3)] {
            let game = make_game(home, away);
            let home_margin = margin(&game, Side::Home).unwrap();
            let away_margin = margin(&game, Side::Away).unwrap();
            assert_eq!(home_margin, -away_margin);
        }
        assert_eq!(margin(&make_game(27, 20), Side::Home), Some(7));
    }

    #[test]
    fn test_margin_missing_points() {
        let mut game = make_game(10, 3);
        game.away_points = None;
        assert_eq!(margin(&game, Side::Home), None);
        assert_eq!(total_points(&game), None);
    }

    #[test]
    fn test_out_of_range_points() {
        let huge = make_game(u32::MAX, 3);
        assert_eq!(margin(&huge, Side::Home), None);
        assert_eq!(total_points(&huge), None);

        let wide = make_game(i32::MAX as u32, 0);
        assert_eq!(margin(&wide, Side::Home), Some(i32::MAX));
        assert_eq!(margin(&wide, Side::Away), Some(-i32::MAX));
        assert_eq!(total_points(&wide), Some(i32::MAX as u32));
    }

    #[test]
    fn test_favorite_cover_and_push() {
        let id = GameId::new("g1");
        let line = odds(-3.0, None);

        let cover = classify_spread(&id, 7, Side::Home, Some(&line)).unwrap();
        assert_eq!(cover.covered, Some(true));

        let push = classify_spread(&id, 3, Side::Home, Some(&line)).unwrap();
        assert_eq!(push.covered, None);

        let miss = classify_spread(&id, 2, Side::Home, Some(&line)).unwrap();
        assert_eq!(miss.covered, Some(false));
    }

    #[test]
    fn test_underdog_cover_and_push() {
        let id = GameId::new("g1");
        // home favored by 6.5, so the away side is +6.5
        let line = odds(-6.5, None);

        let lost_close = classify_spread(&id, -3, Side::Away, Some(&line)).unwrap();
        assert_eq!(lost_close.spread, 6.5);
        assert_eq!(lost_close.covered, Some(true));

        let blown_out = classify_spread(&id, -10, Side::Away, Some(&line)).unwrap();
        assert_eq!(blown_out.covered, Some(false));

        let dog = odds(4.0, None);
        let push = classify_spread(&id, -4, Side::Home, Some(&dog)).unwrap();
        assert_eq!(push.covered, None);
    }

    #[test]
    fn test_pick_em_needs_outright_win() {
        let id = GameId::new("g1");
        let line = odds(0.0, None);
        assert_eq!(
            classify_spread(&id, 0, Side::Home, Some(&line)).unwrap().covered,
            None
        );
        assert_eq!(
            classify_spread(&id, 1, Side::Home, Some(&line)).unwrap().covered,
            Some(true)
        );
    }

    #[test]
    fn test_spread_skipped_without_odds() {
        let id = GameId::new("g1");
        assert!(classify_spread(&id, 7, Side::Home, None).is_none());

        let no_spread = OddsRecord {
            game_id: id.clone(),
            spread_home: None,
            spread_away: None,
            total_over: Some(44.5),
        };
        assert!(classify_spread(&id, 7, Side::Home, Some(&no_spread)).is_none());
    }

    #[test]
    fn test_quarter_tie_is_not_a_win() {
        let id = GameId::new("g1");
        let team = LineScore::new([7, 10, 0, 3]);
        let opp = LineScore::new([7, 3, 3, 0]);

        let quarters = classify_quarters(&id, &team, &opp);
        assert_eq!(quarters[0].quarter, Quarter::Q1);
        assert!(!quarters[0].won);
        assert!(!quarters[0].lost());
        assert!(quarters[1].won);
        assert!(quarters[2].lost());
        assert!(quarters[3].won);
    }

    #[test]
    fn test_halves_sum_quarters() {
        let id = GameId::new("g1");
        let team = LineScore::new([7, 3, 0, 7]);
        let opp = LineScore::new([0, 10, 7, 0]);

        let halves = classify_halves(&id, &team, &opp);
        assert_eq!(halves[0].team_score, 10);
        assert_eq!(halves[0].opp_score, 10);
        assert!(!halves[0].won);
        assert_eq!(halves[1].team_score, 7);
        assert!(!halves[1].won);
        assert!(!halves[1].lost());
    }

    #[test]
    fn test_margin_tie_is_not_a_win() {
        let id = GameId::new("g1");
        assert!(!classify_margin(&id, 0).is_win);
        assert!(classify_margin(&id, 1).is_win);
        assert!(!classify_margin(&id, -1).is_win);
    }

    #[test]
    fn test_total_push_is_not_over() {
        let id = GameId::new("g1");
        let line = odds(-3.0, Some(47.0));
        assert!(!classify_total(&id, 47, Some(&line)).unwrap().went_over);
        assert!(classify_total(&id, 48, Some(&line)).unwrap().went_over);
        assert!(classify_total(&id, 48, Some(&odds(-3.0, None))).is_none());
    }

    #[test]
    fn test_first_score_stops_at_first_scoring_quarter() {
        let id = GameId::new("g1");
        let team = LineScore::new([3, 0, 14, 0]);
        let opp = LineScore::new([0, 0, 0, 0]);

        let first = classify_first_score(&id, &team, &opp).unwrap();
        assert_eq!(first.quarter, Quarter::Q1);
        assert!(first.scored_first);
    }

    #[test]
    fn test_first_score_skips_scoreless_quarters() {
        let id = GameId::new("g1");
        let team = LineScore::new([0, 0, 3, 7]);
        let opp = LineScore::new([0, 7, 0, 0]);

        let first = classify_first_score(&id, &team, &opp).unwrap();
        assert_eq!(first.quarter, Quarter::Q2);
        assert!(!first.scored_first);

        let scoreless = LineScore::new([0, 0, 0, 0]);
        assert!(classify_first_score(&id, &scoreless, &scoreless).is_none());
    }

    #[test]
    fn test_first_score_shared_quarter() {
        let id = GameId::new("g1");
        let team = LineScore::new([7, 0, 0, 0]);
        let opp = LineScore::new([7, 0, 0, 0]);
        assert!(!classify_first_score(&id, &team, &opp).unwrap().scored_first);

        let ahead = LineScore::new([10, 0, 0, 0]);
        assert!(classify_first_score(&id, &ahead, &opp).unwrap().scored_first);
    }
}
