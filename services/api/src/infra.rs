use metrics_exporter_prometheus::PrometheusHandle;
use sekolah_okupasi::catalog::{CatalogService, InMemoryCatalogStore, SeedData, SeedSummary};
use sekolah_okupasi::error::AppError;
use sekolah_okupasi::matching::SchoolStatsService;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) stats: Arc<SchoolStatsService<InMemoryCatalogStore>>,
}

/// Services sharing one in-memory catalog.
pub(crate) struct Catalog {
    pub(crate) admin: Arc<CatalogService<InMemoryCatalogStore>>,
    pub(crate) stats: Arc<SchoolStatsService<InMemoryCatalogStore>>,
}

impl Catalog {
    pub(crate) fn new(page_size: usize) -> Self {
        let store = Arc::new(InMemoryCatalogStore::new());
        Self {
            admin: Arc::new(CatalogService::with_page_size(store.clone(), page_size)),
            stats: Arc::new(SchoolStatsService::new(store)),
        }
    }

    /// Build a catalog and load the snapshot at `seed_path` into it, when one is given.
    pub(crate) fn bootstrap(seed_path: Option<&Path>, page_size: usize) -> Result<Self, AppError> {
        let catalog = Self::new(page_size);
        if let Some(path) = seed_path {
            let summary = catalog.load_seed(path)?;
            info!(
                path = %path.display(),
                occupations = summary.occupations,
                schools = summary.schools,
                "seed loaded"
            );
        }
        Ok(catalog)
    }

    pub(crate) fn load_seed(&self, path: &Path) -> Result<SeedSummary, AppError> {
        let seed = SeedData::from_path(path)?;
        Ok(seed.apply(&*self.admin)?)
    }
}
