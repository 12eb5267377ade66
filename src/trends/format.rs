//! Trend sentences
//!
//! Maps bucket counts to human-readable sentences. A rule only produces a
//! sentence when its count reaches the minimum-occurrence threshold. Output
//! follows category order, then rule order within the category.

use serde::Serialize;
use std::fmt;

use crate::trends::buckets::TrendBuckets;
use crate::trends::percent;
use crate::trends::rules::RuleSet;
use crate::{Half, Quarter, TeamCode};

/// Report section a trend belongs to, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    General,
    Spread,
    Quarter,
    Half,
    Margin,
    Totals,
    FirstScore,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::General,
        Category::Spread,
        Category::Quarter,
        Category::Half,
        Category::Margin,
        Category::Totals,
        Category::FirstScore,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Spread => "Against the spread",
            Category::Quarter => "Quarters",
            Category::Half => "Halves",
            Category::Margin => "Margins",
            Category::Totals => "Totals",
            Category::FirstScore => "First score",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One rendered trend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendLine {
    pub category: Category,
    pub text: String,
}

fn games(n: usize) -> String {
    if n == 1 {
        "1 game".to_string()
    } else {
        format!("{} games", n)
    }
}

fn pct(numerator: usize, denominator: usize) -> u32 {
    percent(numerator, denominator).unwrap_or(0)
}

/// Collects sentences whose count clears the threshold
struct Gate {
    min_occurrences: usize,
    lines: Vec<TrendLine>,
}

impl Gate {
    fn rule(&mut self, category: Category, count: usize, text: impl FnOnce() -> String) {
        if count >= self.min_occurrences {
            self.lines.push(TrendLine {
                category,
                text: text(),
            });
        }
    }
}

/// Renders trend buckets for one team
pub struct TrendFormatter<'a> {
    team: &'a TeamCode,
    rules: &'a RuleSet,
    min_occurrences: usize,
}

impl<'a> TrendFormatter<'a> {
    pub fn new(team: &'a TeamCode, rules: &'a RuleSet, min_occurrences: usize) -> Self {
        TrendFormatter {
            team,
            rules,
            min_occurrences: min_occurrences.max(1),
        }
    }

    pub fn format(&self, buckets: &TrendBuckets) -> Vec<TrendLine> {
        let mut gate = Gate {
            min_occurrences: self.min_occurrences,
            lines: Vec::new(),
        };

        self.general(&mut gate, buckets);
        self.spread(&mut gate, buckets);
        self.quarters(&mut gate, buckets);
        self.halves(&mut gate, buckets);
        self.margins(&mut gate, buckets);
        self.totals(&mut gate, buckets);
        self.first_score(&mut gate, buckets);

        gate.lines
    }

    fn general(&self, gate: &mut Gate, buckets: &TrendBuckets) {
        let team = self.team;
        let record = buckets.record();

        gate.rule(Category::General, record.games, || {
            format!(
                "{} is {} straight up in their last {} ({}%).",
                team,
                record.summary(),
                games(record.games),
                record.win_pct().unwrap_or(0)
            )
        });
        gate.rule(Category::General, record.home_games, || {
            format!(
                "{} is {}-{} at home in their last {} home {} ({}%).",
                team,
                record.home_wins,
                record.home_losses(),
                record.home_games,
                if record.home_games == 1 { "game" } else { "games" },
                record.home_win_pct().unwrap_or(0)
            )
        });
        gate.rule(Category::General, record.away_games, || {
            format!(
                "{} is {}-{} on the road in their last {} road {} ({}%).",
                team,
                record.away_wins,
                record.away_losses(),
                record.away_games,
                if record.away_games == 1 { "game" } else { "games" },
                record.away_win_pct().unwrap_or(0)
            )
        });

        let played = buckets.scoring().len();
        for &cutoff in self.rules.scoring_cutoffs {
            let count = buckets
                .scoring()
                .iter()
                .filter(|o| o.team_points >= cutoff)
                .count();
            gate.rule(Category::General, count, || {
                format!(
                    "{} has scored {} or more points in {} of their last {}.",
                    team,
                    cutoff,
                    count,
                    games(played)
                )
            });
        }
    }

    fn spread(&self, gate: &mut Gate, buckets: &TrendBuckets) {
        let team = self.team;
        let summary = buckets.spread_summary();
        let valid = summary.valid();

        gate.rule(Category::Spread, summary.covers, || {
            format!(
                "{} has covered the spread in {} of {} games against the spread ({}%).",
                team,
                summary.covers,
                valid,
                pct(summary.covers, valid)
            )
        });
        gate.rule(Category::Spread, summary.failures, || {
            format!(
                "{} has failed to cover the spread in {} of {} games against the spread ({}%).",
                team,
                summary.failures,
                valid,
                pct(summary.failures, valid)
            )
        });

        for (as_favorite, role) in [(true, "favorite"), (false, "underdog")] {
            let graded: Vec<_> = buckets
                .spread()
                .iter()
                .filter(|o| o.as_favorite() == as_favorite && !o.is_push())
                .collect();
            let covers = graded.iter().filter(|o| o.covered == Some(true)).count();
            gate.rule(Category::Spread, covers, || {
                format!(
                    "{} has covered as the {} in {} of {} ({}%).",
                    team,
                    role,
                    covers,
                    games(graded.len()),
                    pct(covers, graded.len())
                )
            });
        }

        gate.rule(Category::Spread, summary.pushes, || {
            format!(
                "{} has pushed against the spread in {} of {} with a line.",
                team,
                summary.pushes,
                games(buckets.spread().len())
            )
        });
    }

    fn quarters(&self, gate: &mut Gate, buckets: &TrendBuckets) {
        let team = self.team;
        let played = buckets.line_score_games();

        for quarter in Quarter::ALL {
            let won = buckets.quarter_outcomes(quarter).filter(|o| o.won).count();
            let lost = buckets.quarter_outcomes(quarter).filter(|o| o.lost()).count();

            gate.rule(Category::Quarter, won, || {
                format!(
                    "{} has won the {} in {} of their last {}.",
                    team,
                    quarter.label(),
                    won,
                    games(played)
                )
            });
            gate.rule(Category::Quarter, lost, || {
                format!(
                    "{} has lost the {} in {} of their last {}.",
                    team,
                    quarter.label(),
                    lost,
                    games(played)
                )
            });
        }
    }

    fn halves(&self, gate: &mut Gate, buckets: &TrendBuckets) {
        let team = self.team;
        let played = buckets.line_score_games();

        for half in Half::ALL {
            let won = buckets.half_outcomes(half).filter(|o| o.won).count();
            let lost = buckets.half_outcomes(half).filter(|o| o.lost()).count();

            gate.rule(Category::Half, won, || {
                format!(
                    "{} has won the {} in {} of their last {}.",
                    team,
                    half.label(),
                    won,
                    games(played)
                )
            });
            gate.rule(Category::Half, lost, || {
                format!(
                    "{} has lost the {} in {} of their last {}.",
                    team,
                    half.label(),
                    lost,
                    games(played)
                )
            });

            for range in self.rules.half_points {
                let count = buckets
                    .half_outcomes(half)
                    .filter(|o| range.contains(o.team_score as i32))
                    .count();
                gate.rule(Category::Half, count, || {
                    format!(
                        "{} has scored {} in the {} in {} of their last {}.",
                        team,
                        range.phrase,
                        half.label(),
                        count,
                        games(played)
                    )
                });
            }
        }
    }

    fn margins(&self, gate: &mut Gate, buckets: &TrendBuckets) {
        let team = self.team;
        let played = buckets.margins().len();

        for range in self.rules.margins {
            let count = buckets
                .margins()
                .iter()
                .filter(|o| range.contains(o.margin))
                .count();
            gate.rule(Category::Margin, count, || {
                format!(
                    "{} has {} in {} of their last {}.",
                    team,
                    range.phrase,
                    count,
                    games(played)
                )
            });
        }
    }

    fn totals(&self, gate: &mut Gate, buckets: &TrendBuckets) {
        let team = self.team;
        let graded = buckets.totals().len();
        let overs = buckets.totals().iter().filter(|o| o.went_over).count();
        let not_over = graded - overs;

        gate.rule(Category::Totals, overs, || {
            format!(
                "{} games have gone over the total in {} of {} with a posted total ({}%).",
                team,
                overs,
                games(graded),
                pct(overs, graded)
            )
        });
        gate.rule(Category::Totals, not_over, || {
            format!(
                "{} games have stayed under the total in {} of {} with a posted total ({}%).",
                team,
                not_over,
                games(graded),
                pct(not_over, graded)
            )
        });

        let played = buckets.scoring().len();
        for range in self.rules.totals {
            let count = buckets
                .scoring()
                .iter()
                .filter(|o| range.contains(o.total() as i32))
                .count();
            gate.rule(Category::Totals, count, || {
                format!(
                    "{} games have {} in {} of their last {}.",
                    team,
                    range.phrase,
                    count,
                    games(played)
                )
            });
        }
    }

    fn first_score(&self, gate: &mut Gate, buckets: &TrendBuckets) {
        let team = self.team;
        let played = buckets.first_score().len();
        let first = buckets
            .first_score()
            .iter()
            .filter(|o| o.scored_first)
            .count();
        let not_first = played - first;

        gate.rule(Category::FirstScore, first, || {
            format!(
                "{} has scored first in {} of their last {}.",
                team,
                first,
                games(played)
            )
        });
        gate.rule(Category::FirstScore, not_first, || {
            format!(
                "{} has not scored first in {} of their last {}.",
                team,
                not_first,
                games(played)
            )
        });
    }
}
