//! Unimatch - university recommendation engine
//!
//! This library scores a catalog of universities against a student profile,
//! sorts them into Safety, Match and Reach tiers, and selects a diversified
//! shortlist. Total scores come from a pre-trained regression model when one
//! is available and from a weighted rule-based score otherwise.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Matcher, MatchError, MatchOptions, MatchResult, ScoringPath};
pub use models::{
    Category, DimensionScores, Program, ProgramIndex, Recommendation, ScoringWeights,
    StudentProfile, University,
};
