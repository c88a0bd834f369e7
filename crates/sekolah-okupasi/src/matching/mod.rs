//! Ranking of schools by how well their graduates cover an occupation's competencies.

pub mod router;
pub mod scoring;
pub mod service;

pub use router::school_stats_router;
pub use scoring::{rank_schools, CompetencySet, MatchScore, SchoolMatch};
pub use service::{MatchError, SchoolStats, SchoolStatsService};
