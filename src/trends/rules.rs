//! Threshold rule tables
//!
//! Fixed per-sport cutoffs and ranges the formatter checks bucket counts against.
//! Tables are listed in the order their sentences are emitted.

use crate::Sport;

/// Inclusive range over a point value, either end open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRule {
    pub min: Option<i32>,
    pub max: Option<i32>,
    /// Fragment spliced into the trend sentence
    pub phrase: &'static str,
}

impl RangeRule {
    pub const fn between(min: i32, max: i32, phrase: &'static str) -> Self {
        RangeRule {
            min: Some(min),
            max: Some(max),
            phrase,
        }
    }

    pub const fn at_least(min: i32, phrase: &'static str) -> Self {
        RangeRule {
            min: Some(min),
            max: None,
            phrase,
        }
    }

    pub const fn at_most(max: i32, phrase: &'static str) -> Self {
        RangeRule {
            min: None,
            max: Some(max),
            phrase,
        }
    }

    pub fn contains(&self, value: i32) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Rule tables for one sport
#[derive(Debug, Clone, Copy)]
pub struct RuleSet {
    /// Team points at or above each cutoff
    pub scoring_cutoffs: &'static [u32],
    /// Team points within a half
    pub half_points: &'static [RangeRule],
    /// Final margin from the team's side
    pub margins: &'static [RangeRule],
    /// Combined points of both teams
    pub totals: &'static [RangeRule],
}

pub const FOOTBALL: RuleSet = RuleSet {
    scoring_cutoffs: &[17, 21, 24, 28, 31, 35],
    half_points: &[
        RangeRule::at_most(9, "fewer than 10 points"),
        RangeRule::between(10, 16, "10-16 points"),
        RangeRule::at_least(17, "17 or more points"),
    ],
    margins: &[
        RangeRule::between(1, 7, "won by 1-7 points"),
        RangeRule::between(8, 14, "won by 8-14 points"),
        RangeRule::at_least(15, "won by 15 or more points"),
        RangeRule::between(-7, -1, "lost by 1-7 points"),
        RangeRule::between(-14, -8, "lost by 8-14 points"),
        RangeRule::at_most(-15, "lost by 15 or more points"),
    ],
    totals: &[
        RangeRule::at_most(37, "combined for 37 or fewer points"),
        RangeRule::between(38, 44, "combined for 38-44 points"),
        RangeRule::between(45, 51, "combined for 45-51 points"),
        RangeRule::at_least(52, "combined for 52 or more points"),
    ],
};

pub const BASKETBALL: RuleSet = RuleSet {
    scoring_cutoffs: &[100, 105, 110, 115, 120, 125, 130],
    half_points: &[
        RangeRule::at_most(49, "fewer than 50 points"),
        RangeRule::between(50, 59, "50-59 points"),
        RangeRule::at_least(60, "60 or more points"),
    ],
    margins: &[
        RangeRule::between(1, 5, "won by 1-5 points"),
        RangeRule::between(6, 10, "won by 6-10 points"),
        RangeRule::at_least(11, "won by 11 or more points"),
        RangeRule::between(-5, -1, "lost by 1-5 points"),
        RangeRule::between(-10, -6, "lost by 6-10 points"),
        RangeRule::at_most(-11, "lost by 11 or more points"),
    ],
    totals: &[
        RangeRule::at_most(209, "combined for 209 or fewer points"),
        RangeRule::between(210, 224, "combined for 210-224 points"),
        RangeRule::between(225, 239, "combined for 225-239 points"),
        RangeRule::at_least(240, "combined for 240 or more points"),
    ],
};

impl Sport {
    pub fn rules(self) -> &'static RuleSet {
        match self {
            Sport::Football => &FOOTBALL,
            Sport::Basketball => &BASKETBALL,
        }
    }
}
