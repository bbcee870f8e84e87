//! Single-server arrival and departure events

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which single-server variant produced a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SingleServerMode {
    /// 5 to 10 customers, no probability columns
    #[default]
    Plain,
    /// Up to 20 candidate arrivals, each admitted with a fixed probability
    Probability,
}

impl fmt::Display for SingleServerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Probability => write!(f, "probability"),
        }
    }
}

impl std::str::FromStr for SingleServerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "probability" | "prob" => Ok(Self::Probability),
            other => Err(format!("unknown single-server mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Arrival,
    Departure,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arrival => write!(f, "Arrival"),
            Self::Departure => write!(f, "Departure"),
        }
    }
}

/// Fields shared by every event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub customer_id: u32,
    pub event_type: EventType,
    pub clock_time: u32,
    pub service_code: String,
    pub service_title: String,
    pub service_duration: u32,
    pub end_time: u32,
    pub waiting_time: u32,
}

impl EventRecord {
    /// Time the customer's service began
    pub fn service_start(&self) -> u32 {
        self.end_time.saturating_sub(self.service_duration)
    }
}

/// Event emitted in probability mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbabilityEvent {
    #[serde(flatten)]
    pub record: EventRecord,
    pub arrival_probability: f64,
    pub completion_probability: f64,
}

/// A single-server event; the probability columns exist only on the
/// probability variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Event {
    Probability(ProbabilityEvent),
    Plain(EventRecord),
}

impl Event {
    pub fn record(&self) -> &EventRecord {
        match self {
            Self::Plain(r) => r,
            Self::Probability(p) => &p.record,
        }
    }

    pub fn customer_id(&self) -> u32 {
        self.record().customer_id
    }

    pub fn event_type(&self) -> EventType {
        self.record().event_type
    }

    pub fn clock_time(&self) -> u32 {
        self.record().clock_time
    }

    pub fn end_time(&self) -> u32 {
        self.record().end_time
    }

    pub fn service_code(&self) -> &str {
        &self.record().service_code
    }

    pub fn is_arrival(&self) -> bool {
        self.event_type() == EventType::Arrival
    }

    pub fn arrival_probability(&self) -> Option<f64> {
        match self {
            Self::Probability(p) => Some(p.arrival_probability),
            Self::Plain(_) => None,
        }
    }

    pub fn completion_probability(&self) -> Option<f64> {
        match self {
            Self::Probability(p) => Some(p.completion_probability),
            Self::Plain(_) => None,
        }
    }
}
