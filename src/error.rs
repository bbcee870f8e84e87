//! Error types for the queue simulator

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for simulator operations
pub type SimulatorResult<T> = Result<T, SimulationError>;

/// Main error type for simulation operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    // Catalog input errors
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Duplicate service code: {0}")]
    DuplicateCode(String),

    #[error("Invalid duration for service '{code}': {duration} (must be greater than 0)")]
    InvalidDuration { code: String, duration: i64 },

    #[error("Service catalog is empty")]
    EmptyCatalog,

    #[error("Bulk load failed at row {row}: {source}")]
    BulkLoad {
        row: usize,
        #[source]
        source: Box<SimulationError>,
    },

    // Generation input errors
    #[error("No services available to simulate")]
    NoServicesAvailable,

    #[error("Probability table '{0}' has no rows")]
    EmptyProbabilityTable(String),

    #[error("Invalid probability table '{table}': {message}")]
    InvalidProbabilityTable { table: String, message: String },

    #[error("Invalid random draw {0}: expected a value in [0, 1]")]
    InvalidDraw(f64),

    #[error("No customers were generated")]
    NoCustomers,

    #[error("Simulation clock overflowed while scheduling customer {customer_id}")]
    ClockOverflow { customer_id: u32 },

    // Computation invariant errors
    #[error("No probability row matches draw {draw} in table '{table}'")]
    NoMatchingEntry { table: String, draw: f64 },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        param: Option<String>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`SimulationError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad caller input, detected before any output is produced
    Input,
    /// A table lookup found no row; the table itself is corrupt
    Invariant,
    /// Configuration could not be loaded or is invalid
    Config,
    /// I/O or other unexpected failure
    Internal,
}

/// JSON error body returned by the HTTP adapter
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: ErrorDetail {
                message: message.to_string(),
                error_type: error_type.to_string(),
                param: None,
                code: None,
            },
        }
    }

    pub fn with_param(mut self, param: &str) -> Self {
        self.error.param = Some(param.to_string());
        self
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.error.code = Some(code.to_string());
        self
    }
}

impl SimulationError {
    /// Shorthand for an [`SimulationError::InvalidProbabilityTable`]
    pub fn invalid_table(table: &str, message: impl Into<String>) -> Self {
        Self::InvalidProbabilityTable {
            table: table.to_string(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoMatchingEntry { .. } => ErrorKind::Invariant,
            Self::Config(_) => ErrorKind::Config,
            Self::Internal(_) => ErrorKind::Internal,
            _ => ErrorKind::Input,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Input => StatusCode::BAD_REQUEST,
            ErrorKind::Invariant | ErrorKind::Config | ErrorKind::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_type(&self) -> &str {
        match self.kind() {
            ErrorKind::Input => "invalid_request_error",
            ErrorKind::Invariant => "computation_invariant_error",
            ErrorKind::Config => "configuration_error",
            ErrorKind::Internal => "internal_error",
        }
    }

    /// Stable machine-readable code for the variant
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::DuplicateCode(_) => "duplicate_code",
            Self::InvalidDuration { .. } => "invalid_duration",
            Self::EmptyCatalog => "empty_catalog",
            Self::BulkLoad { .. } => "bulk_load_failed",
            Self::NoServicesAvailable => "no_services_available",
            Self::EmptyProbabilityTable(_) => "empty_probability_table",
            Self::InvalidProbabilityTable { .. } => "invalid_probability_table",
            Self::InvalidDraw(_) => "invalid_draw",
            Self::NoCustomers => "no_customers",
            Self::ClockOverflow { .. } => "clock_overflow",
            Self::NoMatchingEntry { .. } => "no_matching_entry",
            Self::Config(_) => "config_error",
            Self::Validation { .. } => "validation_error",
            Self::Internal(_) => "internal_error",
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let mut response =
            ErrorResponse::new(self.error_type(), &self.to_string()).with_code(self.code());

        match self {
            Self::Validation { param: Some(p), .. } => {
                response = response.with_param(p);
            }
            Self::BulkLoad { row, .. } => {
                response = response.with_param(&format!("rows[{}]", row - 1));
            }
            Self::InvalidProbabilityTable { table, .. } | Self::EmptyProbabilityTable(table) => {
                response = response.with_param(table);
            }
            _ => {}
        }

        response
    }
}

impl IntoResponse for SimulationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_error_response());
        (status, body).into_response()
    }
}

impl From<std::io::Error> for SimulationError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for SimulationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation {
            message: err.to_string(),
            param: None,
        }
    }
}

impl From<serde_yaml::Error> for SimulationError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(format!("YAML parse error: {}", err))
    }
}

impl From<toml::de::Error> for SimulationError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("TOML parse error: {}", err))
    }
}
