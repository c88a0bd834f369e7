use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use super::domain::{
    CompetencyDraft, CompetencyId, Concentration, ConcentrationId, GraduateCompetency,
    Occupation, OccupationCompetency, OccupationDraft, OccupationId, School, SchoolConcentration,
    SchoolDraft, SchoolId,
};
use super::store::{CatalogStore, StoreError};

/// Process-local store keeping normalized tables behind one lock.
///
/// Rows keep insertion order, which is the retrieval order reported by the
/// list operations.
#[derive(Default)]
pub struct InMemoryCatalogStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    sequence: u64,
    occupations: Vec<OccupationRow>,
    competencies: Vec<OccupationCompetency>,
    schools: Vec<SchoolRow>,
    graduate_links: Vec<(SchoolId, CompetencyId)>,
    concentrations: Vec<Concentration>,
    memberships: Vec<(SchoolId, ConcentrationId)>,
}

struct OccupationRow {
    id: OccupationId,
    code: String,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

struct SchoolRow {
    id: SchoolId,
    name: String,
    city: String,
    address: String,
    description: Option<String>,
    student_count: u32,
    graduate_count: u32,
    external_links: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("catalog lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("catalog lock poisoned".to_string()))
    }
}

impl Tables {
    fn next_id(&mut self, prefix: &str) -> String {
        self.sequence += 1;
        format!("{prefix}-{:06}", self.sequence)
    }

    fn occupation(&self, row: &OccupationRow) -> Occupation {
        Occupation {
            id: row.id.clone(),
            code: row.code.clone(),
            name: row.name.clone(),
            competencies: self
                .competencies
                .iter()
                .filter(|competency| competency.occupation_id == row.id)
                .cloned()
                .collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    fn occupation_index(&self, id: &OccupationId) -> Result<usize, StoreError> {
        self.occupations
            .iter()
            .position(|row| &row.id == id)
            .ok_or(StoreError::NotFound("occupation"))
    }

    fn school_index(&self, id: &SchoolId) -> Result<usize, StoreError> {
        self.schools
            .iter()
            .position(|row| &row.id == id)
            .ok_or(StoreError::NotFound("school"))
    }

    fn competency_index(
        &self,
        occupation_id: &OccupationId,
        competency_id: &CompetencyId,
    ) -> Result<usize, StoreError> {
        self.competencies
            .iter()
            .position(|competency| {
                &competency.id == competency_id && &competency.occupation_id == occupation_id
            })
            .ok_or(StoreError::NotFound("competency"))
    }

    fn school(
        row: &SchoolRow,
        competencies: &mut HashMap<&SchoolId, Vec<GraduateCompetency>>,
        concentrations: &mut HashMap<&SchoolId, Vec<SchoolConcentration>>,
    ) -> School {
        School {
            id: row.id.clone(),
            name: row.name.clone(),
            city: row.city.clone(),
            address: row.address.clone(),
            description: row.description.clone(),
            student_count: row.student_count,
            graduate_count: row.graduate_count,
            external_links: row.external_links.clone(),
            competencies: competencies.remove(&row.id).unwrap_or_default(),
            concentrations: concentrations.remove(&row.id).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    /// Links are grouped by school in one pass, so listing stays linear in rows plus links.
    fn schools_matching<F>(&self, mut keep: F) -> Vec<School>
    where
        F: FnMut(&SchoolRow) -> bool,
    {
        let competencies: HashMap<_, _> = self
            .competencies
            .iter()
            .map(|competency| (&competency.id, competency))
            .collect();
        let concentrations: HashMap<_, _> = self
            .concentrations
            .iter()
            .map(|concentration| (&concentration.id, concentration))
            .collect();

        let mut held: HashMap<&SchoolId, Vec<GraduateCompetency>> = HashMap::new();
        for (school_id, competency_id) in &self.graduate_links {
            if let Some(competency) = competencies.get(competency_id) {
                held.entry(school_id).or_default().push(GraduateCompetency {
                    school_id: school_id.clone(),
                    competency_id: competency_id.clone(),
                    competency: (*competency).clone(),
                });
            }
        }

        let mut joined: HashMap<&SchoolId, Vec<SchoolConcentration>> = HashMap::new();
        for (school_id, concentration_id) in &self.memberships {
            if let Some(concentration) = concentrations.get(concentration_id) {
                joined.entry(school_id).or_default().push(SchoolConcentration {
                    school_id: school_id.clone(),
                    concentration_id: concentration_id.clone(),
                    concentration: (*concentration).clone(),
                });
            }
        }

        self.schools
            .iter()
            .filter(|row| keep(*row))
            .map(|row| Self::school(row, &mut held, &mut joined))
            .collect()
    }

    fn ensure_unique_code(
        &self,
        code: &str,
        except: Option<&OccupationId>,
    ) -> Result<(), StoreError> {
        let taken = self
            .occupations
            .iter()
            .any(|row| row.code == code && Some(&row.id) != except);
        if taken {
            return Err(StoreError::Conflict(format!("occupation code '{code}'")));
        }
        Ok(())
    }

    fn ensure_unique_unit_code(
        &self,
        occupation_id: &OccupationId,
        unit_code: Option<&str>,
        except: Option<&CompetencyId>,
    ) -> Result<(), StoreError> {
        let Some(unit_code) = unit_code else {
            return Ok(());
        };
        let taken = self.competencies.iter().any(|competency| {
            &competency.occupation_id == occupation_id
                && competency.unit_code.as_deref() == Some(unit_code)
                && Some(&competency.id) != except
        });
        if taken {
            return Err(StoreError::Conflict(format!("unit code '{unit_code}'")));
        }
        Ok(())
    }

    fn push_competencies(
        &mut self,
        occupation_id: &OccupationId,
        drafts: Vec<CompetencyDraft>,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut seen = HashSet::new();
        for draft in &drafts {
            if let Some(unit_code) = draft.unit_code.as_deref() {
                if !seen.insert(unit_code) {
                    return Err(StoreError::Conflict(format!("unit code '{unit_code}'")));
                }
            }
        }

        for draft in drafts {
            let id = CompetencyId(self.next_id("cmp"));
            self.competencies.push(OccupationCompetency {
                id,
                occupation_id: occupation_id.clone(),
                unit_code: draft.unit_code,
                name: draft.name,
                standard_competency: draft.standard_competency,
                created_at: now,
                updated_at: now,
            });
        }
        Ok(())
    }

    /// Drops the occupation's competencies and every graduate link pointing at them.
    fn purge_competencies(&mut self, occupation_id: &OccupationId) {
        let removed: HashSet<CompetencyId> = self
            .competencies
            .iter()
            .filter(|competency| &competency.occupation_id == occupation_id)
            .map(|competency| competency.id.clone())
            .collect();
        self.competencies
            .retain(|competency| &competency.occupation_id != occupation_id);
        self.graduate_links
            .retain(|(_, competency_id)| !removed.contains(competency_id));
    }

    fn resolve_associations(
        &self,
        draft: &SchoolDraft,
    ) -> Result<(Option<Vec<CompetencyId>>, Option<Vec<ConcentrationId>>), StoreError> {
        let competency_ids = match &draft.competency_ids {
            Some(ids) => {
                let known: HashSet<&CompetencyId> =
                    self.competencies.iter().map(|c| &c.id).collect();
                let mut seen = HashSet::new();
                let mut resolved = Vec::new();
                for id in ids {
                    if !known.contains(id) {
                        return Err(StoreError::NotFound("competency"));
                    }
                    if seen.insert(id) {
                        resolved.push(id.clone());
                    }
                }
                Some(resolved)
            }
            None => None,
        };

        let concentration_ids = match &draft.concentration_ids {
            Some(ids) => {
                let known: HashSet<&ConcentrationId> =
                    self.concentrations.iter().map(|c| &c.id).collect();
                let mut seen = HashSet::new();
                let mut resolved = Vec::new();
                for id in ids {
                    if !known.contains(id) {
                        return Err(StoreError::NotFound("concentration"));
                    }
                    if seen.insert(id) {
                        resolved.push(id.clone());
                    }
                }
                Some(resolved)
            }
            None => None,
        };

        Ok((competency_ids, concentration_ids))
    }

    fn find_school(&self, id: &SchoolId) -> Option<School> {
        self.schools_matching(|row| &row.id == id).into_iter().next()
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn list_occupations(&self) -> Result<Vec<Occupation>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .occupations
            .iter()
            .map(|row| tables.occupation(row))
            .collect())
    }

    fn find_occupation(&self, id: &OccupationId) -> Result<Option<Occupation>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .occupations
            .iter()
            .find(|row| &row.id == id)
            .map(|row| tables.occupation(row)))
    }

    fn find_occupation_by_code(&self, code: &str) -> Result<Option<Occupation>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .occupations
            .iter()
            .find(|row| row.code == code)
            .map(|row| tables.occupation(row)))
    }

    fn insert_occupation(&self, draft: OccupationDraft) -> Result<Occupation, StoreError> {
        let mut tables = self.write()?;
        tables.ensure_unique_code(&draft.code, None)?;

        let now = Utc::now();
        let id = OccupationId(tables.next_id("occ"));
        tables.push_competencies(&id, draft.competencies.unwrap_or_default(), now)?;
        tables.occupations.push(OccupationRow {
            id,
            code: draft.code,
            name: draft.name,
            created_at: now,
            updated_at: now,
        });

        let row = tables.occupations.last().ok_or(StoreError::NotFound("occupation"))?;
        Ok(tables.occupation(row))
    }

    fn replace_occupation(
        &self,
        id: &OccupationId,
        draft: OccupationDraft,
    ) -> Result<Occupation, StoreError> {
        let mut tables = self.write()?;
        let index = tables.occupation_index(id)?;
        tables.ensure_unique_code(&draft.code, Some(id))?;

        let now = Utc::now();
        if let Some(competencies) = draft.competencies {
            let previous_competencies = tables.competencies.clone();
            let previous_links = tables.graduate_links.clone();
            tables.purge_competencies(id);
            if let Err(err) = tables.push_competencies(id, competencies, now) {
                tables.competencies = previous_competencies;
                tables.graduate_links = previous_links;
                return Err(err);
            }
        }

        let row = &mut tables.occupations[index];
        row.code = draft.code;
        row.name = draft.name;
        row.updated_at = now;

        let row = &tables.occupations[index];
        Ok(tables.occupation(row))
    }

    fn delete_occupation(&self, id: &OccupationId) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let index = tables.occupation_index(id)?;
        tables.occupations.remove(index);
        tables.purge_competencies(id);
        Ok(())
    }

    fn insert_competency(
        &self,
        occupation_id: &OccupationId,
        draft: CompetencyDraft,
    ) -> Result<OccupationCompetency, StoreError> {
        let mut tables = self.write()?;
        tables.occupation_index(occupation_id)?;
        tables.ensure_unique_unit_code(occupation_id, draft.unit_code.as_deref(), None)?;

        let now = Utc::now();
        let competency = OccupationCompetency {
            id: CompetencyId(tables.next_id("cmp")),
            occupation_id: occupation_id.clone(),
            unit_code: draft.unit_code,
            name: draft.name,
            standard_competency: draft.standard_competency,
            created_at: now,
            updated_at: now,
        };
        tables.competencies.push(competency.clone());
        Ok(competency)
    }

    fn replace_competency(
        &self,
        occupation_id: &OccupationId,
        competency_id: &CompetencyId,
        draft: CompetencyDraft,
    ) -> Result<OccupationCompetency, StoreError> {
        let mut tables = self.write()?;
        let index = tables.competency_index(occupation_id, competency_id)?;
        tables.ensure_unique_unit_code(
            occupation_id,
            draft.unit_code.as_deref(),
            Some(competency_id),
        )?;

        let competency = &mut tables.competencies[index];
        competency.unit_code = draft.unit_code;
        competency.name = draft.name;
        competency.standard_competency = draft.standard_competency;
        competency.updated_at = Utc::now();
        Ok(competency.clone())
    }

    fn delete_competency(
        &self,
        occupation_id: &OccupationId,
        competency_id: &CompetencyId,
    ) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let index = tables.competency_index(occupation_id, competency_id)?;
        tables.competencies.remove(index);
        tables
            .graduate_links
            .retain(|(_, linked)| linked != competency_id);
        Ok(())
    }

    fn list_schools_with_competencies(&self) -> Result<Vec<School>, StoreError> {
        let tables = self.read()?;
        Ok(tables.schools_matching(|_| true))
    }

    fn find_school(&self, id: &SchoolId) -> Result<Option<School>, StoreError> {
        let tables = self.read()?;
        Ok(tables.find_school(id))
    }

    fn insert_school(&self, draft: SchoolDraft) -> Result<School, StoreError> {
        let mut tables = self.write()?;
        let (competency_ids, concentration_ids) = tables.resolve_associations(&draft)?;

        let now = Utc::now();
        let id = SchoolId(tables.next_id("sch"));
        for competency_id in competency_ids.unwrap_or_default() {
            tables.graduate_links.push((id.clone(), competency_id));
        }
        for concentration_id in concentration_ids.unwrap_or_default() {
            tables.memberships.push((id.clone(), concentration_id));
        }
        tables.schools.push(SchoolRow {
            id: id.clone(),
            name: draft.name,
            city: draft.city,
            address: draft.address,
            description: draft.description,
            student_count: draft.student_count,
            graduate_count: draft.graduate_count,
            external_links: draft.external_links,
            created_at: now,
            updated_at: now,
        });

        tables.find_school(&id).ok_or(StoreError::NotFound("school"))
    }

    fn replace_school(&self, id: &SchoolId, draft: SchoolDraft) -> Result<School, StoreError> {
        let mut tables = self.write()?;
        let index = tables.school_index(id)?;
        let (competency_ids, concentration_ids) = tables.resolve_associations(&draft)?;

        if let Some(competency_ids) = competency_ids {
            tables.graduate_links.retain(|(school_id, _)| school_id != id);
            for competency_id in competency_ids {
                tables.graduate_links.push((id.clone(), competency_id));
            }
        }
        if let Some(concentration_ids) = concentration_ids {
            tables.memberships.retain(|(school_id, _)| school_id != id);
            for concentration_id in concentration_ids {
                tables.memberships.push((id.clone(), concentration_id));
            }
        }

        let row = &mut tables.schools[index];
        row.name = draft.name;
        row.city = draft.city;
        row.address = draft.address;
        row.description = draft.description;
        row.student_count = draft.student_count;
        row.graduate_count = draft.graduate_count;
        row.external_links = draft.external_links;
        row.updated_at = Utc::now();

        tables.find_school(id).ok_or(StoreError::NotFound("school"))
    }

    fn delete_school(&self, id: &SchoolId) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let index = tables.school_index(id)?;
        tables.schools.remove(index);
        tables.graduate_links.retain(|(school_id, _)| school_id != id);
        tables.memberships.retain(|(school_id, _)| school_id != id);
        Ok(())
    }

    fn add_graduate_competency(
        &self,
        school_id: &SchoolId,
        competency_id: &CompetencyId,
    ) -> Result<GraduateCompetency, StoreError> {
        let mut tables = self.write()?;
        tables.school_index(school_id)?;
        let competency = tables
            .competencies
            .iter()
            .find(|competency| &competency.id == competency_id)
            .cloned()
            .ok_or(StoreError::NotFound("competency"))?;

        let exists = tables
            .graduate_links
            .iter()
            .any(|(school, linked)| school == school_id && linked == competency_id);
        if exists {
            return Err(StoreError::Conflict(format!(
                "competency '{}' for school '{}'",
                competency_id.0, school_id.0
            )));
        }

        tables
            .graduate_links
            .push((school_id.clone(), competency_id.clone()));
        Ok(GraduateCompetency {
            school_id: school_id.clone(),
            competency_id: competency_id.clone(),
            competency,
        })
    }

    fn remove_graduate_competency(
        &self,
        school_id: &SchoolId,
        competency_id: &CompetencyId,
    ) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let index = tables
            .graduate_links
            .iter()
            .position(|(school, linked)| school == school_id && linked == competency_id)
            .ok_or(StoreError::NotFound("school competency"))?;
        tables.graduate_links.remove(index);
        Ok(())
    }

    fn list_concentrations(&self) -> Result<Vec<Concentration>, StoreError> {
        Ok(self.read()?.concentrations.clone())
    }

    fn insert_concentration(&self, name: String) -> Result<Concentration, StoreError> {
        let mut tables = self.write()?;
        let folded = name.to_lowercase();
        let taken = tables
            .concentrations
            .iter()
            .any(|concentration| concentration.name.to_lowercase() == folded);
        if taken {
            return Err(StoreError::Conflict(format!("concentration '{name}'")));
        }

        let concentration = Concentration {
            id: ConcentrationId(tables.next_id("con")),
            name,
        };
        tables.concentrations.push(concentration.clone());
        Ok(concentration)
    }
}
