//! Team strength ratings
//!
//! Elo ratings replayed over stored games, and the point spreads they imply.

pub mod elo;

pub use elo::{EloConfig, EloRatings};
