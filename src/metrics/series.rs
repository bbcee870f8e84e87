//! Time-ordered views over single-server events

use serde::{Deserialize, Serialize};

use crate::types::{Event, EventType};

/// One step of the "customers in system" series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatePoint {
    pub clock_time: u32,
    pub customer_id: u32,
    pub event_type: EventType,
    pub customers_in_system: u32,
}

/// Events ordered by clock time. Departures sort ahead of arrivals at the
/// same instant; otherwise generation order is kept.
pub fn chronological(events: &[Event]) -> Vec<Event> {
    let mut sorted = events.to_vec();
    sorted.sort_by_key(|e| (e.clock_time(), e.is_arrival()));
    sorted
}

/// Running count of customers in the system after each event
pub fn system_state_series(events: &[Event]) -> Vec<SystemStatePoint> {
    let mut in_system: u32 = 0;

    chronological(events)
        .iter()
        .map(|event| {
            match event.event_type() {
                EventType::Arrival => in_system += 1,
                EventType::Departure => in_system = in_system.saturating_sub(1),
            }
            SystemStatePoint {
                clock_time: event.clock_time(),
                customer_id: event.customer_id(),
                event_type: event.event_type(),
                customers_in_system: in_system,
            }
        })
        .collect()
}

/// Highest point of the series
pub fn peak_customers_in_system(events: &[Event]) -> u32 {
    system_state_series(events)
        .iter()
        .map(|p| p.customers_in_system)
        .max()
        .unwrap_or(0)
}
