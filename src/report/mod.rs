//! Trend report output
//!
//! Renders a team's trend sentences for the terminal, JSON consumers, CSV
//! export, or as an article-writing prompt.

use serde::Serialize;

use crate::data::{Database, GameFilter};
use crate::trends::buckets::SkippedGame;
use crate::trends::format::{Category, TrendLine};
use crate::trends::TrendAggregator;
use crate::{Result, Sport, TeamCode, TrendsError};

/// Everything a caller needs to present one team's trends
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub team: TeamCode,
    pub sport: Sport,
    pub min_occurrences: usize,
    pub games_analyzed: usize,
    pub skipped: Vec<SkippedGame>,
    pub lines: Vec<TrendLine>,
}

impl TrendReport {
    /// Non-empty categories with their sentences, in report order
    pub fn grouped(&self) -> Vec<(Category, Vec<&str>)> {
        Category::ALL
            .iter()
            .filter_map(|&category| {
                let texts: Vec<&str> = self
                    .lines
                    .iter()
                    .filter(|l| l.category == category)
                    .map(|l| l.text.as_str())
                    .collect();
                (!texts.is_empty()).then_some((category, texts))
            })
            .collect()
    }
}

/// Load a team's games and lines from storage and analyze them.
///
/// Shared by the CLI and the HTTP API so both print the same sentences.
pub fn team_report(
    db: &Database,
    aggregator: &TrendAggregator,
    filter: &GameFilter,
) -> Result<TrendReport> {
    let team = aggregator.team();
    let games = db.team_games(team, filter)?;
    if games.is_empty() && !db.has_team(team)? {
        return Err(TrendsError::UnknownTeam(team.clone()));
    }
    let odds = db.odds_for(&games)?;
    aggregator.analyze(&games, &odds)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Prompt,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "prompt" => Ok(OutputFormat::Prompt),
            _ => Err(format!(
                "Unknown format: {}. Use table, json, csv, or prompt.",
                s
            )),
        }
    }
}

pub fn render(report: &TrendReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Csv => Ok(render_csv(report)),
        OutputFormat::Prompt => Ok(render_prompt(report)),
    }
}

pub fn render_table(report: &TrendReport) -> String {
    let mut out = String::new();
    out.push_str("┌─────────────────────────────────────────────────┐\n");
    out.push_str(&format!(
        "│  {} trends: last {} games ({})\n",
        report.team, report.games_analyzed, report.sport
    ));

    let groups = report.grouped();
    if groups.is_empty() {
        out.push_str("├─────────────────────────────────────────────────┤\n");
        out.push_str(&format!(
            "│  No trend reached {} occurrences\n",
            report.min_occurrences
        ));
    }
    for (category, texts) in groups {
        out.push_str("├─────────────────────────────────────────────────┤\n");
        out.push_str(&format!("│  {}\n", category.title()));
        for text in texts {
            out.push_str(&format!("│    • {}\n", text));
        }
    }

    if !report.skipped.is_empty() {
        out.push_str("├─────────────────────────────────────────────────┤\n");
        out.push_str(&format!("│  Skipped {} games\n", report.skipped.len()));
        for skipped in &report.skipped {
            out.push_str(&format!("│    {}: {}\n", skipped.game_id, skipped.reason));
        }
    }
    out.push_str("└─────────────────────────────────────────────────┘\n");
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn render_csv(report: &TrendReport) -> String {
    let mut out = String::from("team,category,trend\n");
    for line in &report.lines {
        out.push_str(&format!(
            "{},{},{}\n",
            csv_field(report.team.as_str()),
            csv_field(line.category.title()),
            csv_field(&line.text)
        ));
    }
    out
}

/// Prompt asking a writer model for a short betting-trends article.
///
/// The sentences are embedded verbatim so the model cannot change the numbers.
pub fn render_prompt(report: &TrendReport) -> String {
    let mut out = format!(
        "Write a short betting-trends preview for {team} ({sport}). Use only the \
         facts listed below, keep every number exactly as given, and do not invent \
         statistics. Group related trends into short paragraphs and end with a one \
         sentence takeaway.\n\nSample: {team}'s last {games} games.\n",
        team = report.team,
        sport = report.sport,
        games = report.games_analyzed,
    );
    for (category, texts) in report.grouped() {
        out.push_str(&format!("\n{}:\n", category.title()));
        for text in texts {
            out.push_str(&format!("- {}\n", text));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameId;

    fn sample_report() -> TrendReport {
        TrendReport {
            team: TeamCode::new("KC"),
            sport: Sport::Football,
            min_occurrences: 2,
            games_analyzed: 3,
            skipped: vec![SkippedGame {
                game_id: GameId::new("g9"),
                reason: "Invalid game g9: missing team points".to_string(),
            }],
            lines: vec![
                TrendLine {
                    category: Category::General,
                    text: "KC is 1-2 straight up in their last 3 games (33%).".to_string(),
                },
                TrendLine {
                    category: Category::Margin,
                    text: "KC has lost by 8-14 points in 2 of their last 3 games.".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_grouped_keeps_category_order() {
        let report = sample_report();
        let groups = report.grouped();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, Category::General);
        assert_eq!(groups[1].0, Category::Margin);
    }

    #[test]
    fn test_csv_quotes_sentences_with_commas() {
        let mut report = sample_report();
        report.lines[0].text = "KC, at home, is 2-0.".to_string();
        let csv = render_csv(&report);
        let rows: Vec<_> = csv.lines().collect();
        assert_eq!(rows[0], "team,category,trend");
        assert_eq!(rows[1], "KC,General,\"KC, at home, is 2-0.\"");
        assert_eq!(
            rows[2],
            "KC,Margins,KC has lost by 8-14 points in 2 of their last 3 games."
        );
    }

    #[test]
    fn test_json_contains_lines_and_skips() {
        let json = render(&sample_report(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["team"], "KC");
        assert_eq!(value["sport"], "football");
        assert_eq!(value["lines"][1]["category"], "margin");
        assert_eq!(value["skipped"][0]["game_id"], "g9");
    }

    #[test]
    fn test_prompt_embeds_sentences_verbatim() {
        let report = sample_report();
        let prompt = render_prompt(&report);
        for line in &report.lines {
            assert!(prompt.contains(&line.text));
        }
        assert!(prompt.contains("Sample: KC's last 3 games."));
    }

    #[test]
    fn test_team_report_from_storage() {
        use crate::{Game, GameId, OddsRecord};

        let db = Database::in_memory().unwrap();
        for (i, (home, away, hp, ap)) in [("KC", "LV", 27, 20), ("KC", "DEN", 30, 10)]
            .into_iter()
            .enumerate()
        {
            db.upsert_game(&Game {
                id: GameId::new(format!("g{}", i)),
                season: Some(2024),
                week: Some(i as u8 + 1),
                played_on: None,
                home_team: TeamCode::new(home),
                away_team: TeamCode::new(away),
                home_points: Some(hp),
                away_points: Some(ap),
                home_line_score: None,
                away_line_score: None,
            })
            .unwrap();
            db.upsert_odds(&OddsRecord {
                game_id: GameId::new(format!("g{}", i)),
                spread_home: Some(-3.5),
                spread_away: Some(3.5),
                total_over: None,
            })
            .unwrap();
        }

        let aggregator = TrendAggregator::new("KC");
        let report = team_report(&db, &aggregator, &GameFilter::default()).unwrap();
        assert_eq!(report.games_analyzed, 2);
        assert!(report
            .lines
            .iter()
            .any(|l| l.text == "KC has covered the spread in 2 of 2 games against the spread (100%)."));

        let unknown = team_report(&db, &TrendAggregator::new("SF"), &GameFilter::default());
        assert!(matches!(unknown, Err(TrendsError::UnknownTeam(_))));

        let filtered = GameFilter {
            season: Some(2019),
            ..GameFilter::default()
        };
        assert!(matches!(
            team_report(&db, &aggregator, &filtered),
            Err(TrendsError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
