//! Occupation, competency, school and concentration administration.

pub mod domain;
pub mod memory;
pub mod pagination;
pub mod router;
pub mod seed;
pub mod service;
pub mod store;

#[cfg(test)]
pub(crate) mod tests;

pub use domain::{
    AssociationRef, CompetencyDetail, CompetencyId, CompetencyInput, Concentration,
    ConcentrationId, ConcentrationInput, GraduateCompetency, GraduateCompetencyInput, Occupation,
    OccupationCompetency, OccupationId, OccupationInput, OccupationSummary, School,
    SchoolConcentration, SchoolId, SchoolInput, SchoolView,
};
pub use memory::InMemoryCatalogStore;
pub use pagination::{Page, PageMeta, PageRequest};
pub use router::catalog_router;
pub use seed::{SeedData, SeedError, SeedSummary};
pub use service::{
    CatalogError, CatalogService, OccupationListQuery, OccupationSortKey, SchoolListQuery,
    SortOrder,
};
pub use store::{CatalogStore, StoreError};
