//! Single-server event generator
//!
//! Each service code has its own implicit server: customers requesting the
//! same code queue behind each other, different codes never contend.

use std::collections::HashMap;

use tracing::debug;

use crate::catalog::ServiceCatalog;
use crate::config::SingleServerConfig;
use crate::error::{SimulationError, SimulatorResult};
use crate::sampling::{round2, RandomSource};
use crate::types::{Event, EventRecord, EventType, ProbabilityEvent, SingleServerMode};

/// How the arrival clock moves from one customer to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrivalPolicy {
    pub min_interval: u32,
    pub max_interval: u32,
    pub allow_simultaneous: bool,
}

impl ArrivalPolicy {
    pub fn from_config(config: &SingleServerConfig) -> Self {
        Self {
            min_interval: config.min_interarrival,
            max_interval: config.max_interarrival,
            allow_simultaneous: config.simultaneous_arrivals,
        }
    }

    /// Clock for the next arrival.
    ///
    /// The first customer always advances. Later customers advance when
    /// simultaneous arrivals are disabled or the coin lands heads; on tails
    /// they share the previous customer's arrival time. Returns `None` when
    /// the clock would run past `u32::MAX`.
    pub fn next_arrival_clock(&self, prev: u32, is_first: bool, rng: &mut dyn RandomSource) -> Option<u32> {
        let advance = is_first || !self.allow_simultaneous || rng.coin_flip();
        if advance {
            prev.checked_add(rng.int_inclusive(self.min_interval, self.max_interval))
        } else {
            Some(prev)
        }
    }
}

impl Default for ArrivalPolicy {
    fn default() -> Self {
        Self::from_config(&SingleServerConfig::default())
    }
}

/// Free-function form of [`ArrivalPolicy::next_arrival_clock`] with the
/// default 1..=3 minute interval and simultaneous arrivals enabled
pub fn next_arrival_clock(prev: u32, is_first: bool, rng: &mut dyn RandomSource) -> Option<u32> {
    ArrivalPolicy::default().next_arrival_clock(prev, is_first, rng)
}

/// Generates one single-server run
pub struct SingleServerGenerator<'a> {
    catalog: &'a ServiceCatalog,
    config: &'a SingleServerConfig,
    policy: ArrivalPolicy,
}

impl<'a> SingleServerGenerator<'a> {
    pub fn new(catalog: &'a ServiceCatalog, config: &'a SingleServerConfig) -> Self {
        Self {
            catalog,
            config,
            policy: ArrivalPolicy::from_config(config),
        }
    }

    pub fn with_policy(mut self, policy: ArrivalPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Produce the full event list in generation order
    pub fn generate(&self, mode: SingleServerMode, rng: &mut dyn RandomSource) -> SimulatorResult<Vec<Event>> {
        if self.catalog.is_empty() {
            return Err(SimulationError::NoServicesAvailable);
        }

        let mut run = RunState::default();

        match mode {
            SingleServerMode::Plain => {
                let count = rng.int_inclusive(self.config.min_customers, self.config.max_customers);
                for _ in 0..count {
                    self.admit(&mut run, mode, rng)?;
                }
            }
            SingleServerMode::Probability => {
                for _ in 0..self.config.candidate_ceiling {
                    if rng.next_unit() <= self.config.admission_probability {
                        self.admit(&mut run, mode, rng)?;
                    }
                }
            }
        }

        debug!(
            mode = %mode,
            customers = run.admitted,
            events = run.events.len(),
            "Single-server generation complete"
        );

        Ok(run.events)
    }

    fn admit(&self, run: &mut RunState, mode: SingleServerMode, rng: &mut dyn RandomSource) -> SimulatorResult<()> {
        run.admitted += 1;
        let customer_id = run.admitted;

        let overflow = || SimulationError::ClockOverflow { customer_id };

        run.clock = self
            .policy
            .next_arrival_clock(run.clock, customer_id == 1, rng)
            .ok_or_else(overflow)?;
        let arrival = run.clock;

        let service = self
            .catalog
            .pick_random(rng)
            .map_err(|_| SimulationError::NoServicesAvailable)?;

        let free_at = run.service_end_times.get(&service.code).copied().unwrap_or(arrival);
        let service_start = arrival.max(free_at);
        let end_time = service_start.checked_add(service.duration).ok_or_else(overflow)?;
        run.service_end_times.insert(service.code.clone(), end_time);

        let record = |event_type, clock_time| EventRecord {
            customer_id,
            event_type,
            clock_time,
            service_code: service.code.clone(),
            service_title: service.title.clone(),
            service_duration: service.duration,
            end_time,
            waiting_time: service_start - arrival,
        };
        let arrival_record = record(EventType::Arrival, arrival);
        let departure_record = record(EventType::Departure, end_time);

        match mode {
            SingleServerMode::Plain => {
                run.events.push(Event::Plain(arrival_record));
                run.events.push(Event::Plain(departure_record));
            }
            SingleServerMode::Probability => {
                let arrival_probability = round2(rng.next_unit());
                let completion_probability = self.config.completion_probability;
                for record in [arrival_record, departure_record] {
                    run.events.push(Event::Probability(ProbabilityEvent {
                        record,
                        arrival_probability,
                        completion_probability,
                    }));
                }
            }
        }

        Ok(())
    }
}

#[derive(Default)]
struct RunState {
    clock: u32,
    admitted: u32,
    service_end_times: HashMap<String, u32>,
    events: Vec<Event>,
}
