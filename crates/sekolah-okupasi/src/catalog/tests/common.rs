use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::catalog::domain::{
    AssociationRef, CompetencyDraft, CompetencyId, CompetencyInput, Concentration,
    GraduateCompetency, Occupation, OccupationCompetency, OccupationDraft, OccupationId,
    OccupationInput, School, SchoolDraft, SchoolId, SchoolInput,
};
use crate::catalog::store::{CatalogStore, StoreError};
use crate::catalog::{CatalogService, InMemoryCatalogStore};

pub(crate) fn build_service() -> (
    CatalogService<InMemoryCatalogStore>,
    Arc<InMemoryCatalogStore>,
) {
    let store = Arc::new(InMemoryCatalogStore::new());
    (CatalogService::new(store.clone()), store)
}

pub(crate) fn competency_input(unit_code: &str, name: &str) -> CompetencyInput {
    CompetencyInput {
        unit_code: Some(unit_code.to_string()),
        name: Some(name.to_string()),
        standard_competency: Some("SKKNI 2016-282".to_string()),
    }
}

pub(crate) fn occupation_input(code: &str, name: &str, units: &[&str]) -> OccupationInput {
    OccupationInput {
        code: Some(code.to_string()),
        name: Some(name.to_string()),
        competencies: Some(
            units
                .iter()
                .map(|unit| competency_input(unit, &format!("Competency {unit}")))
                .collect(),
        ),
    }
}

pub(crate) fn school_input(name: &str, city: &str) -> SchoolInput {
    SchoolInput {
        name: Some(name.to_string()),
        city: Some(city.to_string()),
        address: Some(format!("Jl. {name} No. 1")),
        description: Some(format!("{name} vocational school")),
        student_count: Some(200),
        graduate_count: Some(150),
        external_links: Some(vec![
            "https://example.sch.id".to_string(),
            "   ".to_string(),
        ]),
        competencies: None,
        concentrations: None,
    }
}

pub(crate) fn refs(ids: &[&CompetencyId]) -> Vec<AssociationRef> {
    ids.iter()
        .map(|id| AssociationRef { id: id.0.clone() })
        .collect()
}

pub(crate) fn unit_id(occupation: &Occupation, unit_code: &str) -> CompetencyId {
    occupation
        .competencies
        .iter()
        .find(|competency| competency.unit_code.as_deref() == Some(unit_code))
        .map(|competency| competency.id.clone())
        .expect("unit code present")
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store whose every call fails, standing in for an unreachable database.
pub(crate) struct UnavailableStore;

fn offline<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("database offline".to_string()))
}

impl CatalogStore for UnavailableStore {
    fn list_occupations(&self) -> Result<Vec<Occupation>, StoreError> {
        offline()
    }

    fn find_occupation(&self, _id: &OccupationId) -> Result<Option<Occupation>, StoreError> {
        offline()
    }

    fn find_occupation_by_code(&self, _code: &str) -> Result<Option<Occupation>, StoreError> {
        offline()
    }

    fn insert_occupation(&self, _draft: OccupationDraft) -> Result<Occupation, StoreError> {
        offline()
    }

    fn replace_occupation(
        &self,
        _id: &OccupationId,
        _draft: OccupationDraft,
    ) -> Result<Occupation, StoreError> {
        offline()
    }

    fn delete_occupation(&self, _id: &OccupationId) -> Result<(), StoreError> {
        offline()
    }

    fn insert_competency(
        &self,
        _occupation_id: &OccupationId,
        _draft: CompetencyDraft,
    ) -> Result<OccupationCompetency, StoreError> {
        offline()
    }

    fn replace_competency(
        &self,
        _occupation_id: &OccupationId,
        _competency_id: &CompetencyId,
        _draft: CompetencyDraft,
    ) -> Result<OccupationCompetency, StoreError> {
        offline()
    }

    fn delete_competency(
        &self,
        _occupation_id: &OccupationId,
        _competency_id: &CompetencyId,
    ) -> Result<(), StoreError> {
        offline()
    }

    fn list_schools_with_competencies(&self) -> Result<Vec<School>, StoreError> {
        offline()
    }

    fn find_school(&self, _id: &SchoolId) -> Result<Option<School>, StoreError> {
        offline()
    }

    fn insert_school(&self, _draft: SchoolDraft) -> Result<School, StoreError> {
        offline()
    }

    fn replace_school(&self, _id: &SchoolId, _draft: SchoolDraft) -> Result<School, StoreError> {
        offline()
    }

    fn delete_school(&self, _id: &SchoolId) -> Result<(), StoreError> {
        offline()
    }

    fn add_graduate_competency(
        &self,
        _school_id: &SchoolId,
        _competency_id: &CompetencyId,
    ) -> Result<GraduateCompetency, StoreError> {
        offline()
    }

    fn remove_graduate_competency(
        &self,
        _school_id: &SchoolId,
        _competency_id: &CompetencyId,
    ) -> Result<(), StoreError> {
        offline()
    }

    fn list_concentrations(&self) -> Result<Vec<Concentration>, StoreError> {
        offline()
    }

    fn insert_concentration(&self, _name: String) -> Result<Concentration, StoreError> {
        offline()
    }
}

/// In-memory store that counts how often the full school listing is loaded.
#[derive(Default)]
pub(crate) struct CountingStore {
    inner: InMemoryCatalogStore,
    school_loads: AtomicUsize,
}

impl CountingStore {
    pub(crate) fn school_loads(&self) -> usize {
        self.school_loads.load(Ordering::SeqCst)
    }
}

impl CatalogStore for CountingStore {
    fn list_occupations(&self) -> Result<Vec<Occupation>, StoreError> {
        self.inner.list_occupations()
    }

    fn find_occupation(&self, id: &OccupationId) -> Result<Option<Occupation>, StoreError> {
        self.inner.find_occupation(id)
    }

    fn find_occupation_by_code(&self, code: &str) -> Result<Option<Occupation>, StoreError> {
        self.inner.find_occupation_by_code(code)
    }

    fn insert_occupation(&self, draft: OccupationDraft) -> Result<Occupation, StoreError> {
        self.inner.insert_occupation(draft)
    }

    fn replace_occupation(
        &self,
        id: &OccupationId,
        draft: OccupationDraft,
    ) -> Result<Occupation, StoreError> {
        self.inner.replace_occupation(id, draft)
    }

    fn delete_occupation(&self, id: &OccupationId) -> Result<(), StoreError> {
        self.inner.delete_occupation(id)
    }

    fn insert_competency(
        &self,
        occupation_id: &OccupationId,
        draft: CompetencyDraft,
    ) -> Result<OccupationCompetency, StoreError> {
        self.inner.insert_competency(occupation_id, draft)
    }

    fn replace_competency(
        &self,
        occupation_id: &OccupationId,
        competency_id: &CompetencyId,
        draft: CompetencyDraft,
    ) -> Result<OccupationCompetency, StoreError> {
        self.inner
            .replace_competency(occupation_id, competency_id, draft)
    }

    fn delete_competency(
        &self,
        occupation_id: &OccupationId,
        competency_id: &CompetencyId,
    ) -> Result<(), StoreError> {
        self.inner.delete_competency(occupation_id, competency_id)
    }

    fn list_schools_with_competencies(&self) -> Result<Vec<School>, StoreError> {
        self.school_loads.fetch_add(1, Ordering::SeqCst);
        self.inner.list_schools_with_competencies()
    }

    fn find_school(&self, id: &SchoolId) -> Result<Option<School>, StoreError> {
        self.inner.find_school(id)
    }

    fn insert_school(&self, draft: SchoolDraft) -> Result<School, StoreError> {
        self.inner.insert_school(draft)
    }

    fn replace_school(&self, id: &SchoolId, draft: SchoolDraft) -> Result<School, StoreError> {
        self.inner.replace_school(id, draft)
    }

    fn delete_school(&self, id: &SchoolId) -> Result<(), StoreError> {
        self.inner.delete_school(id)
    }

    fn add_graduate_competency(
        &self,
        school_id: &SchoolId,
        competency_id: &CompetencyId,
    ) -> Result<GraduateCompetency, StoreError> {
        self.inner.add_graduate_competency(school_id, competency_id)
    }

    fn remove_graduate_competency(
        &self,
        school_id: &SchoolId,
        competency_id: &CompetencyId,
    ) -> Result<(), StoreError> {
        self.inner.remove_graduate_competency(school_id, competency_id)
    }

    fn list_concentrations(&self) -> Result<Vec<Concentration>, StoreError> {
        self.inner.list_concentrations()
    }

    fn insert_concentration(&self, name: String) -> Result<Concentration, StoreError> {
        self.inner.insert_concentration(name)
    }
}
