//! Service catalog entries

use serde::{Deserialize, Serialize};

/// A service type offered by the single-server simulator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Service {
    pub code: String,
    pub title: String,
    /// Duration in minutes
    pub duration: u32,
}

impl Service {
    pub fn new(code: impl Into<String>, title: impl Into<String>, duration: u32) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            duration,
        }
    }
}

/// Unvalidated service row, as read from a sheet or request body
///
/// `duration` is signed so that non-positive values reach validation
/// instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRow {
    #[serde(alias = "Service Code", default)]
    pub code: String,
    #[serde(alias = "Service Title", default)]
    pub title: String,
    #[serde(alias = "Service Duration (minutes)", alias = "Service Duration")]
    pub duration: i64,
}

impl ServiceRow {
    pub fn new(code: impl Into<String>, title: impl Into<String>, duration: i64) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            duration,
        }
    }
}

impl From<&Service> for ServiceRow {
    fn from(service: &Service) -> Self {
        Self {
            code: service.code.clone(),
            title: service.title.clone(),
            duration: i64::from(service.duration),
        }
    }
}
