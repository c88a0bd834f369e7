//! Competency-match scoring of schools against one occupation.
//!
//! The occupation's competency ids are collected into a hash set once per
//! ranking, so scoring a school costs one lookup per graduate competency it
//! holds rather than a scan of the occupation's list.

use std::collections::HashSet;

use serde::Serialize;

use crate::catalog::{CompetencyId, Occupation, School};

/// Identifiers of the competencies an occupation requires.
#[derive(Debug, Clone)]
pub struct CompetencySet<'a> {
    ids: HashSet<&'a CompetencyId>,
}

impl<'a> CompetencySet<'a> {
    pub fn of(occupation: &'a Occupation) -> Self {
        Self {
            ids: occupation
                .competencies
                .iter()
                .map(|competency| &competency.id)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Membership is by competency identity, never by unit code or name.
    pub fn contains(&self, id: &CompetencyId) -> bool {
        self.ids.contains(id)
    }

    /// Count the school's graduate competencies that belong to this set.
    ///
    /// Relies on the store keeping one graduate link per school/competency pair.
    pub fn score(&self, school: &School) -> MatchScore {
        let matching = school
            .competencies
            .iter()
            .filter(|held| self.contains(&held.competency_id))
            .count();
        MatchScore::new(saturate(matching), saturate(self.len()))
    }
}

/// Matching and required competency counts for one school.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchScore {
    pub matching: u32,
    pub total: u32,
}

impl MatchScore {
    pub fn new(matching: u32, total: u32) -> Self {
        Self { matching, total }
    }

    /// `matching / total * 100` in hundredths of a percent, rounded half-up; `0` when `total == 0`.
    ///
    /// Ties are resolved on the exact ratio, not on its binary float image, so 23/160
    /// (14.375%) yields 1438 where float `toFixed(2)` formatting would print 14.37.
    pub fn hundredths(&self) -> u64 {
        if self.total == 0 {
            return 0;
        }
        let matching = u64::from(self.matching);
        let total = u64::from(self.total);
        (matching * 20_000 + total) / (2 * total)
    }

    /// Percentage rounded to two decimal places.
    pub fn percentage(&self) -> f64 {
        self.hundredths() as f64 / 100.0
    }
}

/// School annotated with its match against one occupation. Response-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolMatch {
    #[serde(flatten)]
    pub school: School,
    pub matching_competencies: u32,
    pub total_competencies: u32,
    pub percentage: f64,
}

impl SchoolMatch {
    pub fn new(school: School, score: MatchScore) -> Self {
        Self {
            school,
            matching_competencies: score.matching,
            total_competencies: score.total,
            percentage: score.percentage(),
        }
    }

    pub fn score(&self) -> MatchScore {
        MatchScore::new(self.matching_competencies, self.total_competencies)
    }
}

/// Score every school and order them by percentage, highest first.
///
/// The sort is stable: schools with equal percentages keep retrieval order.
pub fn rank_schools(occupation: &Occupation, schools: Vec<School>) -> Vec<SchoolMatch> {
    let required = CompetencySet::of(occupation);
    let mut ranked: Vec<SchoolMatch> = schools
        .into_iter()
        .map(|school| {
            let score = required.score(&school);
            SchoolMatch::new(school, score)
        })
        .collect();

    ranked.sort_by(|a, b| b.score().hundredths().cmp(&a.score().hundredths()));
    ranked
}

fn saturate(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
