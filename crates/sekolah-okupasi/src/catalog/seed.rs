use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use super::domain::{
    AssociationRef, ConcentrationInput, Occupation, OccupationInput, SchoolInput,
};
use super::service::{CatalogError, CatalogService};
use super::store::CatalogStore;

/// Catalog snapshot loaded at startup or by the CLI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedData {
    #[serde(default)]
    pub concentrations: Vec<String>,
    #[serde(default)]
    pub occupations: Vec<OccupationInput>,
    #[serde(default)]
    pub schools: Vec<SeedSchool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSchool {
    pub name: String,
    pub city: String,
    pub address: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub student_count: u32,
    #[serde(default)]
    pub graduate_count: u32,
    #[serde(default)]
    pub external_links: Vec<String>,
    #[serde(default)]
    pub competencies: Vec<SeedCompetencyRef>,
    /// Concentration names.
    #[serde(default)]
    pub concentrations: Vec<String>,
}

/// Points at a competency by occupation code and unit code (or competency name).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedCompetencyRef {
    pub occupation: String,
    pub unit: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedSummary {
    pub concentrations: usize,
    pub occupations: usize,
    pub competencies: usize,
    pub schools: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("unable to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid seed document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("seed references unknown competency '{unit}' of occupation '{occupation}'")]
    UnknownCompetency { occupation: String, unit: String },
    #[error("seed references unknown concentration '{0}'")]
    UnknownConcentration(String),
    #[error("seed rejected by catalog: {0}")]
    Catalog(#[from] CatalogError),
}

impl SeedData {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Write the snapshot through the catalog service so every invariant is enforced.
    pub fn apply<S>(self, service: &CatalogService<S>) -> Result<SeedSummary, SeedError>
    where
        S: CatalogStore + 'static,
    {
        let mut summary = SeedSummary::default();

        let mut concentrations = HashMap::new();
        for name in self.concentrations {
            let concentration = service.create_concentration(ConcentrationInput {
                name: Some(name),
            })?;
            concentrations.insert(concentration.name.to_lowercase(), concentration.id);
            summary.concentrations += 1;
        }

        let mut occupations: HashMap<String, Occupation> = HashMap::new();
        for input in self.occupations {
            let occupation = service.create_occupation(input)?;
            summary.competencies += occupation.competencies.len();
            summary.occupations += 1;
            occupations.insert(occupation.code.clone(), occupation);
        }

        for school in self.schools {
            let competencies = school
                .competencies
                .iter()
                .map(|reference| {
                    resolve_competency(&occupations, reference).map(|id| AssociationRef { id })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let school_concentrations = school
                .concentrations
                .iter()
                .map(|name| {
                    concentrations
                        .get(&name.to_lowercase())
                        .map(|id| AssociationRef { id: id.0.clone() })
                        .ok_or_else(|| SeedError::UnknownConcentration(name.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;

            service.create_school(SchoolInput {
                name: Some(school.name),
                city: Some(school.city),
                address: Some(school.address),
                description: school.description,
                student_count: Some(school.student_count),
                graduate_count: Some(school.graduate_count),
                external_links: Some(school.external_links),
                competencies: Some(competencies),
                concentrations: Some(school_concentrations),
            })?;
            summary.schools += 1;
        }

        info!(
            concentrations = summary.concentrations,
            occupations = summary.occupations,
            competencies = summary.competencies,
            schools = summary.schools,
            "catalog seeded"
        );
        Ok(summary)
    }
}

fn resolve_competency(
    occupations: &HashMap<String, Occupation>,
    reference: &SeedCompetencyRef,
) -> Result<String, SeedError> {
    let unknown = || SeedError::UnknownCompetency {
        occupation: reference.occupation.clone(),
        unit: reference.unit.clone(),
    };
    let occupation = occupations.get(&reference.occupation).ok_or_else(unknown)?;
    occupation
        .competencies
        .iter()
        .find(|competency| competency.unit_code.as_deref() == Some(reference.unit.as_str()))
        .or_else(|| {
            occupation
                .competencies
                .iter()
                .find(|competency| competency.name == reference.unit)
        })
        .map(|competency| competency.id.0.clone())
        .ok_or_else(unknown)
}
