use super::domain::{
    CompetencyDraft, CompetencyId, Concentration, GraduateCompetency, Occupation,
    OccupationCompetency, OccupationDraft, OccupationId, School, SchoolDraft, SchoolId,
};

/// Storage abstraction injected into the catalog and matching services.
///
/// Reads return records with their associations eagerly loaded. Implementations
/// enforce the uniqueness invariants (occupation code, unit code per occupation,
/// one graduate link per school/competency pair) and the relational cascades.
pub trait CatalogStore: Send + Sync {
    /// All occupations in retrieval order.
    fn list_occupations(&self) -> Result<Vec<Occupation>, StoreError>;
    fn find_occupation(&self, id: &OccupationId) -> Result<Option<Occupation>, StoreError>;
    /// Exact, case-sensitive lookup on the business code.
    fn find_occupation_by_code(&self, code: &str) -> Result<Option<Occupation>, StoreError>;
    fn insert_occupation(&self, draft: OccupationDraft) -> Result<Occupation, StoreError>;
    /// Overwrites code and name; replaces the competency list when the draft carries one.
    fn replace_occupation(
        &self,
        id: &OccupationId,
        draft: OccupationDraft,
    ) -> Result<Occupation, StoreError>;
    fn delete_occupation(&self, id: &OccupationId) -> Result<(), StoreError>;

    fn insert_competency(
        &self,
        occupation_id: &OccupationId,
        draft: CompetencyDraft,
    ) -> Result<OccupationCompetency, StoreError>;
    fn replace_competency(
        &self,
        occupation_id: &OccupationId,
        competency_id: &CompetencyId,
        draft: CompetencyDraft,
    ) -> Result<OccupationCompetency, StoreError>;
    fn delete_competency(
        &self,
        occupation_id: &OccupationId,
        competency_id: &CompetencyId,
    ) -> Result<(), StoreError>;

    /// All schools in retrieval order, graduate competencies included.
    fn list_schools_with_competencies(&self) -> Result<Vec<School>, StoreError>;
    fn find_school(&self, id: &SchoolId) -> Result<Option<School>, StoreError>;
    fn insert_school(&self, draft: SchoolDraft) -> Result<School, StoreError>;
    fn replace_school(&self, id: &SchoolId, draft: SchoolDraft) -> Result<School, StoreError>;
    fn delete_school(&self, id: &SchoolId) -> Result<(), StoreError>;
    fn add_graduate_competency(
        &self,
        school_id: &SchoolId,
        competency_id: &CompetencyId,
    ) -> Result<GraduateCompetency, StoreError>;
    fn remove_graduate_competency(
        &self,
        school_id: &SchoolId,
        competency_id: &CompetencyId,
    ) -> Result<(), StoreError>;

    fn list_concentrations(&self) -> Result<Vec<Concentration>, StoreError>;
    fn insert_concentration(&self, name: String) -> Result<Concentration, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    Conflict(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
