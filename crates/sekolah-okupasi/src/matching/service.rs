use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::scoring::{rank_schools, SchoolMatch};
use crate::catalog::{CatalogStore, StoreError};

/// Ranked schools for one occupation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolStats {
    pub occupation_code: String,
    pub occupation_name: String,
    pub schools: Vec<SchoolMatch>,
}

/// Computes competency-match statistics on demand; nothing is cached between calls.
pub struct SchoolStatsService<S> {
    store: Arc<S>,
}

impl<S> SchoolStatsService<S>
where
    S: CatalogStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Rank every school against the occupation with the given code.
    ///
    /// The code is matched exactly (case-sensitive). Schools are never filtered out:
    /// a school holding none of the competencies is listed with a zero percentage.
    pub fn by_occupation(&self, occupation_code: Option<&str>) -> Result<SchoolStats, MatchError> {
        let code = occupation_code
            .filter(|code| !code.trim().is_empty())
            .ok_or(MatchError::MissingOccupationCode)?;

        let occupation = self
            .store
            .find_occupation_by_code(code)?
            .ok_or_else(|| MatchError::OccupationNotFound {
                code: code.to_string(),
            })?;
        let schools = self.store.list_schools_with_competencies()?;

        let ranked = rank_schools(&occupation, schools);
        debug!(
            occupation_code = %occupation.code,
            competencies = occupation.competencies.len(),
            schools = ranked.len(),
            "school stats computed"
        );

        Ok(SchoolStats {
            occupation_code: occupation.code,
            occupation_name: occupation.name,
            schools: ranked,
        })
    }
}

/// Error raised by the school statistics service.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("Occupation code is required")]
    MissingOccupationCode,
    #[error("Occupation not found")]
    OccupationNotFound { code: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}
