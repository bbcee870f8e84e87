//! Service catalog for the single-server simulator
//!
//! Entries keep insertion order so that a seeded [`ServiceCatalog::pick_random`]
//! picks the same service on every run.

use serde::{Deserialize, Serialize};

use crate::error::{SimulationError, SimulatorResult};
use crate::sampling::RandomSource;
use crate::types::{Service, ServiceRow};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceCatalog {
    services: Vec<Service>,
}

impl ServiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from rows, with the same rules as [`Self::bulk_load`]
    pub fn from_rows(rows: &[ServiceRow]) -> SimulatorResult<Self> {
        let mut catalog = Self::new();
        catalog.bulk_load(rows)?;
        Ok(catalog)
    }

    /// Add one service
    pub fn add_service(&mut self, code: &str, title: &str, duration: i64) -> SimulatorResult<&Service> {
        let service = Self::validate_row(code, title, duration)?;
        if self.contains(&service.code) {
            return Err(SimulationError::DuplicateCode(service.code));
        }

        self.services.push(service);
        Ok(&self.services[self.services.len() - 1])
    }

    /// Replace the whole catalog. On any failure the catalog is left
    /// unchanged and the error names the first failing row (1-based).
    pub fn bulk_load(&mut self, rows: &[ServiceRow]) -> SimulatorResult<usize> {
        if rows.is_empty() {
            return Err(SimulationError::EmptyCatalog);
        }

        let mut staged = Self::new();
        for (idx, row) in rows.iter().enumerate() {
            staged
                .add_service(&row.code, &row.title, row.duration)
                .map_err(|e| SimulationError::BulkLoad {
                    row: idx + 1,
                    source: Box::new(e),
                })?;
        }

        let count = staged.len();
        *self = staged;
        Ok(count)
    }

    /// Uniformly random entry
    pub fn pick_random(&self, rng: &mut dyn RandomSource) -> SimulatorResult<&Service> {
        if self.services.is_empty() {
            return Err(SimulationError::EmptyCatalog);
        }
        let idx = rng.pick_index(self.services.len());
        Ok(&self.services[idx])
    }

    pub fn get(&self, code: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Service> {
        self.services.iter()
    }

    pub fn clear(&mut self) {
        self.services.clear();
    }

    /// Export back to the row shape accepted by [`Self::bulk_load`]
    pub fn to_rows(&self) -> Vec<ServiceRow> {
        self.services.iter().map(ServiceRow::from).collect()
    }

    fn validate_row(code: &str, title: &str, duration: i64) -> SimulatorResult<Service> {
        let code = code.trim();
        let title = title.trim();

        if code.is_empty() {
            return Err(SimulationError::MissingField("code".to_string()));
        }
        if title.is_empty() {
            return Err(SimulationError::MissingField("title".to_string()));
        }
        if duration <= 0 || duration > i64::from(u32::MAX) {
            return Err(SimulationError::InvalidDuration {
                code: code.to_string(),
                duration,
            });
        }

        Ok(Service::new(code, title, duration as u32))
    }
}

impl<'a> IntoIterator for &'a ServiceCatalog {
    type Item = &'a Service;
    type IntoIter = std::slice::Iter<'a, Service>;

    fn into_iter(self) -> Self::IntoIter {
        self.services.iter()
    }
}
