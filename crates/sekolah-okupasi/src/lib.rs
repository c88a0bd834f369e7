//! Occupation competency catalog with school competency-match scoring.
//!
//! The [`catalog`] module owns the administrative model (occupations, their
//! competencies, schools and concentrations) behind the [`catalog::CatalogStore`]
//! seam. The [`matching`] module ranks schools against one occupation's
//! competency set.

pub mod catalog;
pub mod config;
pub mod error;
pub mod matching;
pub mod response;
pub mod telemetry;
