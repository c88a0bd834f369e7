use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for occupations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OccupationId(pub String);

/// Identifier wrapper for occupation competencies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompetencyId(pub String);

/// Identifier wrapper for schools.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchoolId(pub String);

/// Identifier wrapper for study-program concentrations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConcentrationId(pub String);

/// A coded job role together with the competencies it requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occupation {
    pub id: OccupationId,
    pub code: String,
    pub name: String,
    pub competencies: Vec<OccupationCompetency>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Occupation {
    pub fn summary(&self) -> OccupationSummary {
        OccupationSummary {
            id: self.id.clone(),
            code: self.code.clone(),
            name: self.name.clone(),
        }
    }

    pub fn competency(&self, id: &CompetencyId) -> Option<&OccupationCompetency> {
        self.competencies
            .iter()
            .find(|competency| &competency.id == id)
    }
}

/// Unit of competence owned by exactly one occupation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupationCompetency {
    pub id: CompetencyId,
    pub occupation_id: OccupationId,
    pub unit_code: Option<String>,
    pub name: String,
    pub standard_competency: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Assertion that a school's graduates hold a competency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraduateCompetency {
    pub school_id: SchoolId,
    pub competency_id: CompetencyId,
    pub competency: OccupationCompetency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concentration {
    pub id: ConcentrationId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolConcentration {
    pub school_id: SchoolId,
    pub concentration_id: ConcentrationId,
    pub concentration: Concentration,
}

/// Vocational school with its graduate competencies and concentrations eagerly loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub id: SchoolId,
    pub name: String,
    pub city: String,
    pub address: String,
    pub description: Option<String>,
    pub student_count: u32,
    pub graduate_count: u32,
    pub external_links: Vec<String>,
    pub competencies: Vec<GraduateCompetency>,
    pub concentrations: Vec<SchoolConcentration>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl School {
    /// Graduates as a share of enrolled students, `0` for schools without students.
    pub fn graduate_percent(&self) -> f64 {
        if self.student_count == 0 {
            return 0.0;
        }
        f64::from(self.graduate_count) / f64::from(self.student_count) * 100.0
    }

    pub fn view(self) -> SchoolView {
        let graduate_percent = self.graduate_percent();
        SchoolView {
            school: self,
            graduate_percent,
        }
    }
}

/// School payload exposed over the admin API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolView {
    #[serde(flatten)]
    pub school: School,
    pub graduate_percent: f64,
}

/// Lightweight occupation projection used by search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupationSummary {
    pub id: OccupationId,
    pub code: String,
    pub name: String,
}

/// Competency together with the schools whose graduates hold it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyDetail {
    #[serde(flatten)]
    pub competency: OccupationCompetency,
    pub school_ids: Vec<SchoolId>,
}

/// Validated occupation ready to be written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupationDraft {
    pub code: String,
    pub name: String,
    /// `None` keeps the stored competencies on replace.
    pub competencies: Option<Vec<CompetencyDraft>>,
}

/// Validated competency ready to be written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetencyDraft {
    pub unit_code: Option<String>,
    pub name: String,
    pub standard_competency: Option<String>,
}

/// Validated school ready to be written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolDraft {
    pub name: String,
    pub city: String,
    pub address: String,
    pub description: Option<String>,
    pub student_count: u32,
    pub graduate_count: u32,
    pub external_links: Vec<String>,
    /// `None` keeps the stored associations on replace.
    pub competency_ids: Option<Vec<CompetencyId>>,
    pub concentration_ids: Option<Vec<ConcentrationId>>,
}

/// Raw occupation payload accepted by create and update requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupationInput {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub competencies: Option<Vec<CompetencyInput>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyInput {
    #[serde(default)]
    pub unit_code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub standard_competency: Option<String>,
}

/// Raw school payload accepted by create and update requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub student_count: Option<u32>,
    #[serde(default)]
    pub graduate_count: Option<u32>,
    #[serde(default)]
    pub external_links: Option<Vec<String>>,
    #[serde(default)]
    pub competencies: Option<Vec<AssociationRef>>,
    #[serde(default)]
    pub concentrations: Option<Vec<AssociationRef>>,
}

/// `{ "id": ... }` reference used when connecting existing records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationRef {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcentrationInput {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraduateCompetencyInput {
    #[serde(default)]
    pub competency_id: Option<String>,
}
