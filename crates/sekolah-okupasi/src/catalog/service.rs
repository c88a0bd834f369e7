use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use super::domain::{
    CompetencyDetail, CompetencyDraft, CompetencyId, CompetencyInput, Concentration,
    ConcentrationId, ConcentrationInput, GraduateCompetency, GraduateCompetencyInput, Occupation,
    OccupationCompetency, OccupationDraft, OccupationId, OccupationInput, OccupationSummary,
    School, SchoolDraft, SchoolId, SchoolInput, SchoolView,
};
use super::pagination::{Page, PageRequest, DEFAULT_PAGE_SIZE};
use super::store::{CatalogStore, StoreError};

/// Maximum number of hits returned by the occupation type-ahead search.
pub const SEARCH_RESULT_LIMIT: usize = 10;

/// Administrative operations over the catalog, validating input before it reaches the store.
pub struct CatalogService<S> {
    store: Arc<S>,
    default_page_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupationSortKey {
    #[default]
    Code,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupationListQuery {
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub search_code: Option<String>,
    #[serde(default)]
    pub search_name: Option<String>,
    #[serde(default)]
    pub sort_by: Option<OccupationSortKey>,
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchoolListQuery {
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

impl<S> CatalogService<S>
where
    S: CatalogStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_page_size(store, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(store: Arc<S>, default_page_size: usize) -> Self {
        Self {
            store,
            default_page_size: default_page_size.max(1),
        }
    }

    pub fn list_occupations(
        &self,
        query: OccupationListQuery,
    ) -> Result<Page<Occupation>, CatalogError> {
        let search_code = non_blank(query.search_code).map(|value| value.to_lowercase());
        let search_name = non_blank(query.search_name).map(|value| value.to_lowercase());

        let mut occupations: Vec<Occupation> = self
            .store
            .list_occupations()?
            .into_iter()
            .filter(|occupation| {
                search_code
                    .as_deref()
                    .map_or(true, |needle| occupation.code.to_lowercase().contains(needle))
            })
            .filter(|occupation| {
                search_name
                    .as_deref()
                    .map_or(true, |needle| occupation.name.to_lowercase().contains(needle))
            })
            .collect();

        let sort_by = query.sort_by.unwrap_or_default();
        let sort_order = query.sort_order.unwrap_or_default();
        occupations.sort_by(|a, b| {
            let ordering = match sort_by {
                OccupationSortKey::Code => a.code.cmp(&b.code),
                OccupationSortKey::Name => a.name.cmp(&b.name),
            };
            match sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let request = PageRequest::new(query.page, query.limit, self.default_page_size);
        Ok(request.apply(occupations))
    }

    pub fn get_occupation(&self, id: &OccupationId) -> Result<Occupation, CatalogError> {
        self.store
            .find_occupation(id)?
            .ok_or(CatalogError::NotFound("occupation"))
    }

    /// Case-insensitive exact match on the occupation name.
    pub fn find_occupation_by_name(&self, name: &str) -> Result<Occupation, CatalogError> {
        let name = name.trim().to_lowercase();
        self.store
            .list_occupations()?
            .into_iter()
            .find(|occupation| occupation.name.to_lowercase() == name)
            .ok_or(CatalogError::NotFound("occupation"))
    }

    pub fn search_occupations(
        &self,
        query: Option<&str>,
    ) -> Result<Vec<OccupationSummary>, CatalogError> {
        let needle = query
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| CatalogError::InvalidInput("Search query is required".to_string()))?
            .to_lowercase();

        Ok(self
            .store
            .list_occupations()?
            .iter()
            .filter(|occupation| {
                occupation.code.to_lowercase().contains(&needle)
                    || occupation.name.to_lowercase().contains(&needle)
            })
            .take(SEARCH_RESULT_LIMIT)
            .map(Occupation::summary)
            .collect())
    }

    pub fn create_occupation(&self, input: OccupationInput) -> Result<Occupation, CatalogError> {
        let code = required("code", input.code)?;
        let name = required("name", input.name)?;
        let competencies = input
            .competencies
            .map(competency_drafts)
            .transpose()?;

        if self.store.find_occupation_by_code(&code)?.is_some() {
            return Err(CatalogError::Conflict(
                "Occupation code already exists".to_string(),
            ));
        }

        let occupation = self.store.insert_occupation(OccupationDraft {
            code,
            name,
            competencies,
        })?;
        info!(
            occupation_id = %occupation.id.0,
            code = %occupation.code,
            competencies = occupation.competencies.len(),
            "occupation created"
        );
        Ok(occupation)
    }

    /// Update code and name; a supplied competency list replaces the stored one.
    pub fn update_occupation(
        &self,
        id: &OccupationId,
        input: OccupationInput,
    ) -> Result<Occupation, CatalogError> {
        let existing = self.get_occupation(id)?;
        let code = optional_required("code", input.code)?.unwrap_or(existing.code);
        let name = optional_required("name", input.name)?.unwrap_or(existing.name);
        let competencies = input
            .competencies
            .map(competency_drafts)
            .transpose()?;

        if let Some(other) = self.store.find_occupation_by_code(&code)? {
            if &other.id != id {
                return Err(CatalogError::Conflict(
                    "Occupation code already in use".to_string(),
                ));
            }
        }

        let occupation = self.store.replace_occupation(
            id,
            OccupationDraft {
                code,
                name,
                competencies,
            },
        )?;
        info!(occupation_id = %occupation.id.0, "occupation updated");
        Ok(occupation)
    }

    pub fn delete_occupation(&self, id: &OccupationId) -> Result<(), CatalogError> {
        self.store.delete_occupation(id)?;
        info!(occupation_id = %id.0, "occupation deleted");
        Ok(())
    }

    pub fn list_competencies(
        &self,
        occupation_id: &OccupationId,
    ) -> Result<Vec<CompetencyDetail>, CatalogError> {
        let occupation = self.get_occupation(occupation_id)?;
        let schools = self.store.list_schools_with_competencies()?;
        Ok(occupation
            .competencies
            .into_iter()
            .map(|competency| competency_detail(competency, &schools))
            .collect())
    }

    pub fn get_competency(
        &self,
        occupation_id: &OccupationId,
        competency_id: &CompetencyId,
    ) -> Result<CompetencyDetail, CatalogError> {
        let occupation = self.get_occupation(occupation_id)?;
        let competency = occupation
            .competency(competency_id)
            .cloned()
            .ok_or(CatalogError::NotFound("competency"))?;
        let schools = self.store.list_schools_with_competencies()?;
        Ok(competency_detail(competency, &schools))
    }

    pub fn create_competency(
        &self,
        occupation_id: &OccupationId,
        input: CompetencyInput,
    ) -> Result<OccupationCompetency, CatalogError> {
        let draft = competency_draft(input)?;
        let occupation = self.get_occupation(occupation_id)?;
        if let Some(unit_code) = draft.unit_code.as_deref() {
            let taken = occupation
                .competencies
                .iter()
                .any(|competency| competency.unit_code.as_deref() == Some(unit_code));
            if taken {
                return Err(CatalogError::Conflict(
                    "Unit Code already exists for this occupation".to_string(),
                ));
            }
        }

        let competency = self.store.insert_competency(occupation_id, draft)?;
        info!(
            occupation_id = %occupation_id.0,
            competency_id = %competency.id.0,
            "competency created"
        );
        Ok(competency)
    }

    /// Absent fields keep their stored value; a blank unit code or standard clears it.
    pub fn update_competency(
        &self,
        occupation_id: &OccupationId,
        competency_id: &CompetencyId,
        input: CompetencyInput,
    ) -> Result<OccupationCompetency, CatalogError> {
        let occupation = self.get_occupation(occupation_id)?;
        let existing = occupation
            .competency(competency_id)
            .cloned()
            .ok_or(CatalogError::NotFound("competency"))?;

        let unit_code = match input.unit_code {
            Some(value) => non_blank(Some(value)),
            None => existing.unit_code,
        };
        let name = optional_required("name", input.name)?.unwrap_or(existing.name);
        let standard_competency = match input.standard_competency {
            Some(value) => non_blank(Some(value)),
            None => existing.standard_competency,
        };

        if let Some(unit_code) = unit_code.as_deref() {
            let taken = occupation.competencies.iter().any(|competency| {
                &competency.id != competency_id
                    && competency.unit_code.as_deref() == Some(unit_code)
            });
            if taken {
                return Err(CatalogError::Conflict(
                    "Unit Code already exists for another competency in this occupation"
                        .to_string(),
                ));
            }
        }

        Ok(self.store.replace_competency(
            occupation_id,
            competency_id,
            CompetencyDraft {
                unit_code,
                name,
                standard_competency,
            },
        )?)
    }

    pub fn delete_competency(
        &self,
        occupation_id: &OccupationId,
        competency_id: &CompetencyId,
    ) -> Result<(), CatalogError> {
        self.store.delete_competency(occupation_id, competency_id)?;
        info!(
            occupation_id = %occupation_id.0,
            competency_id = %competency_id.0,
            "competency deleted"
        );
        Ok(())
    }

    /// Filter by name/description and city; a school named exactly like the search term leads.
    pub fn list_schools(&self, query: SchoolListQuery) -> Result<Page<SchoolView>, CatalogError> {
        let search = non_blank(query.search).map(|value| value.to_lowercase());
        let city = non_blank(query.city).map(|value| value.to_lowercase());

        let mut schools: Vec<School> = self
            .store
            .list_schools_with_competencies()?
            .into_iter()
            .filter(|school| match search.as_deref() {
                Some(needle) => {
                    school.name.to_lowercase().contains(needle)
                        || school
                            .description
                            .as_deref()
                            .is_some_and(|text| text.to_lowercase().contains(needle))
                }
                None => true,
            })
            .filter(|school| {
                city.as_deref()
                    .map_or(true, |city| school.city.to_lowercase() == city)
            })
            .collect();

        schools.sort_by(|a, b| compare_schools(a, b, search.as_deref()));

        let request = PageRequest::new(query.page, query.limit, self.default_page_size);
        let page = request.apply(schools);
        Ok(Page {
            items: page.items.into_iter().map(School::view).collect(),
            meta: page.meta,
        })
    }

    pub fn get_school(&self, id: &SchoolId) -> Result<SchoolView, CatalogError> {
        self.find_school(id).map(School::view)
    }

    pub fn create_school(&self, input: SchoolInput) -> Result<SchoolView, CatalogError> {
        let draft = SchoolDraft {
            name: required("name", input.name)?,
            city: required("city", input.city)?,
            address: required("address", input.address)?,
            description: non_blank(input.description),
            student_count: input.student_count.unwrap_or(0),
            graduate_count: input.graduate_count.unwrap_or(0),
            external_links: input
                .external_links
                .map(external_links)
                .unwrap_or_default(),
            competency_ids: input.competencies.map(|refs| {
                refs.into_iter()
                    .map(|reference| CompetencyId(reference.id))
                    .collect()
            }),
            concentration_ids: input.concentrations.map(|refs| {
                refs.into_iter()
                    .map(|reference| ConcentrationId(reference.id))
                    .collect()
            }),
        };

        let school = self
            .store
            .insert_school(draft)
            .map_err(reference_error)?;
        info!(school_id = %school.id.0, name = %school.name, "school created");
        Ok(school.view())
    }

    /// Absent fields keep their stored value; supplied association lists replace the stored ones.
    pub fn update_school(
        &self,
        id: &SchoolId,
        input: SchoolInput,
    ) -> Result<SchoolView, CatalogError> {
        let existing = self.find_school(id)?;
        let draft = SchoolDraft {
            name: optional_required("name", input.name)?.unwrap_or(existing.name),
            city: optional_required("city", input.city)?.unwrap_or(existing.city),
            address: optional_required("address", input.address)?.unwrap_or(existing.address),
            description: match input.description {
                Some(value) => non_blank(Some(value)),
                None => existing.description,
            },
            student_count: input.student_count.unwrap_or(existing.student_count),
            graduate_count: input.graduate_count.unwrap_or(existing.graduate_count),
            external_links: input
                .external_links
                .map(external_links)
                .unwrap_or(existing.external_links),
            competency_ids: input.competencies.map(|refs| {
                refs.into_iter()
                    .map(|reference| CompetencyId(reference.id))
                    .collect()
            }),
            concentration_ids: input.concentrations.map(|refs| {
                refs.into_iter()
                    .map(|reference| ConcentrationId(reference.id))
                    .collect()
            }),
        };

        let school = self
            .store
            .replace_school(id, draft)
            .map_err(reference_error)?;
        info!(school_id = %school.id.0, "school updated");
        Ok(school.view())
    }

    pub fn delete_school(&self, id: &SchoolId) -> Result<(), CatalogError> {
        self.store.delete_school(id)?;
        info!(school_id = %id.0, "school deleted");
        Ok(())
    }

    pub fn list_school_competencies(
        &self,
        school_id: &SchoolId,
    ) -> Result<Vec<GraduateCompetency>, CatalogError> {
        Ok(self.find_school(school_id)?.competencies)
    }

    pub fn add_school_competency(
        &self,
        school_id: &SchoolId,
        input: GraduateCompetencyInput,
    ) -> Result<GraduateCompetency, CatalogError> {
        let competency_id = non_blank(input.competency_id)
            .map(CompetencyId)
            .ok_or_else(|| CatalogError::InvalidInput("Competency ID is required".to_string()))?;

        let link = self
            .store
            .add_graduate_competency(school_id, &competency_id)?;
        info!(
            school_id = %school_id.0,
            competency_id = %competency_id.0,
            "school competency added"
        );
        Ok(link)
    }

    pub fn remove_school_competency(
        &self,
        school_id: &SchoolId,
        competency_id: Option<&str>,
    ) -> Result<(), CatalogError> {
        let competency_id = competency_id
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| CompetencyId(value.to_string()))
            .ok_or_else(|| CatalogError::InvalidInput("Competency ID is required".to_string()))?;

        self.store
            .remove_graduate_competency(school_id, &competency_id)?;
        info!(
            school_id = %school_id.0,
            competency_id = %competency_id.0,
            "school competency removed"
        );
        Ok(())
    }

    pub fn list_concentrations(&self) -> Result<Vec<Concentration>, CatalogError> {
        Ok(self.store.list_concentrations()?)
    }

    pub fn create_concentration(
        &self,
        input: ConcentrationInput,
    ) -> Result<Concentration, CatalogError> {
        let name = required("name", input.name)?;
        Ok(self.store.insert_concentration(name)?)
    }

    fn find_school(&self, id: &SchoolId) -> Result<School, CatalogError> {
        self.store
            .find_school(id)?
            .ok_or(CatalogError::NotFound("school"))
    }
}

/// Error raised by the catalog service.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CatalogError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(detail) => Self::Conflict(format!("{detail} already exists")),
            StoreError::NotFound(entity) => Self::NotFound(entity),
            other @ StoreError::Unavailable(_) => Self::Store(other),
        }
    }
}

/// Unknown ids inside a school payload are a client mistake, not a missing resource.
fn reference_error(err: StoreError) -> CatalogError {
    match err {
        StoreError::NotFound(entity @ ("competency" | "concentration")) => {
            CatalogError::InvalidInput(format!("unknown {entity} reference"))
        }
        other => other.into(),
    }
}

fn compare_schools(a: &School, b: &School, search: Option<&str>) -> Ordering {
    let exact = |school: &School| search.is_some_and(|needle| school.name.to_lowercase() == needle);
    exact(b)
        .cmp(&exact(a))
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

fn competency_detail(competency: OccupationCompetency, schools: &[School]) -> CompetencyDetail {
    let school_ids = schools
        .iter()
        .filter(|school| {
            school
                .competencies
                .iter()
                .any(|held| held.competency_id == competency.id)
        })
        .map(|school| school.id.clone())
        .collect();
    CompetencyDetail {
        competency,
        school_ids,
    }
}

fn competency_draft(input: CompetencyInput) -> Result<CompetencyDraft, CatalogError> {
    Ok(CompetencyDraft {
        unit_code: non_blank(input.unit_code),
        name: required("competency name", input.name)?,
        standard_competency: non_blank(input.standard_competency),
    })
}

fn competency_drafts(inputs: Vec<CompetencyInput>) -> Result<Vec<CompetencyDraft>, CatalogError> {
    let drafts = inputs
        .into_iter()
        .map(competency_draft)
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::new();
    for unit_code in drafts.iter().filter_map(|draft| draft.unit_code.as_deref()) {
        if !seen.insert(unit_code) {
            return Err(CatalogError::InvalidInput(format!(
                "Unit Code '{unit_code}' is listed more than once"
            )));
        }
    }
    Ok(drafts)
}

fn external_links(links: Vec<String>) -> Vec<String> {
    links
        .into_iter()
        .filter_map(|link| non_blank(Some(link)))
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(field: &str, value: Option<String>) -> Result<String, CatalogError> {
    non_blank(value).ok_or_else(|| CatalogError::InvalidInput(format!("{field} is required")))
}

/// `None` when the field is absent, an error when it is present but blank.
fn optional_required(field: &str, value: Option<String>) -> Result<Option<String>, CatalogError> {
    match value {
        Some(value) => required(field, Some(value)).map(Some),
        None => Ok(None),
    }
}
