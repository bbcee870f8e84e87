//! Property-based tests for the single-server and parallel generators

use std::collections::HashMap;

use proptest::prelude::*;
use queue_simulator::catalog::ServiceCatalog;
use queue_simulator::config::SingleServerConfig;
use queue_simulator::engine::{ParallelGenerator, SingleServerGenerator};
use queue_simulator::metrics::{utilization, SingleServerMetrics};
use queue_simulator::probability::ProbabilityTable;
use queue_simulator::sampling::SeededSource;
use queue_simulator::types::{EventType, ServiceRow, SingleServerMode};

fn catalog() -> ServiceCatalog {
    ServiceCatalog::from_rows(&[
        ServiceRow::new("DEP", "Deposit", 4),
        ServiceRow::new("WDL", "Withdrawal", 3),
        ServiceRow::new("ACC", "Open Account", 6),
    ])
    .unwrap()
}

fn table(name: &str, max_key: u32) -> impl Strategy<Value = ProbabilityTable> {
    let name = name.to_string();
    prop::collection::vec(0.1f64..10.0, 1..=max_key as usize).prop_map(move |weights| {
        let pairs: Vec<(f64, f64)> = weights
            .into_iter()
            .enumerate()
            .map(|(idx, w)| ((idx + 1) as f64, w))
            .collect();
        ProbabilityTable::from_weights(&name, pairs).unwrap()
    })
}

fn mode() -> impl Strategy<Value = SingleServerMode> {
    prop_oneof![Just(SingleServerMode::Plain), Just(SingleServerMode::Probability)]
}

proptest! {
    /// Each customer yields one arrival and one departure with consistent times
    #[test]
    fn test_single_events_consistent(seed in any::<u64>(), mode in mode()) {
        let catalog = catalog();
        let config = SingleServerConfig::default();
        let mut rng = SeededSource::with_seed(seed);

        let events = SingleServerGenerator::new(&catalog, &config)
            .generate(mode, &mut rng)
            .unwrap();

        prop_assert_eq!(events.len() % 2, 0);
        for (idx, pair) in events.chunks(2).enumerate() {
            let arrival = pair[0].record();
            let departure = pair[1].record();

            prop_assert_eq!(arrival.customer_id, idx as u32 + 1);
            prop_assert_eq!(arrival.event_type, EventType::Arrival);
            prop_assert_eq!(departure.event_type, EventType::Departure);
            prop_assert_eq!(departure.clock_time, arrival.end_time);
            prop_assert_eq!(
                arrival.end_time,
                arrival.clock_time + arrival.waiting_time + arrival.service_duration
            );
        }

        if mode == SingleServerMode::Plain {
            let customers = events.len() / 2;
            prop_assert!((5..=10).contains(&customers));
        } else {
            prop_assert!(events.len() <= 40);
        }
    }

    /// Arrival clocks never go backwards
    #[test]
    fn test_single_arrivals_non_decreasing(seed in any::<u64>()) {
        let catalog = catalog();
        let config = SingleServerConfig::default();
        let mut rng = SeededSource::with_seed(seed);

        let events = SingleServerGenerator::new(&catalog, &config)
            .generate(SingleServerMode::Plain, &mut rng)
            .unwrap();

        let clocks: Vec<u32> = events
            .iter()
            .filter(|e| e.is_arrival())
            .map(|e| e.clock_time())
            .collect();
        prop_assert!(clocks.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(clocks[0] >= 1);
    }

    /// Customers of the same service code are served one at a time
    #[test]
    fn test_single_no_overlap_per_code(seed in any::<u64>()) {
        let catalog = catalog();
        let config = SingleServerConfig::default();
        let mut rng = SeededSource::with_seed(seed);

        let events = SingleServerGenerator::new(&catalog, &config)
            .generate(SingleServerMode::Plain, &mut rng)
            .unwrap();

        let mut last_end: HashMap<String, u32> = HashMap::new();
        for event in events.iter().filter(|e| e.is_arrival()) {
            let record = event.record();
            if let Some(&end) = last_end.get(&record.service_code) {
                prop_assert!(record.service_start() >= end);
            }
            last_end.insert(record.service_code.clone(), record.end_time);
        }
    }

    /// Metrics agree with the events they were computed from
    #[test]
    fn test_single_metrics_match_events(seed in any::<u64>()) {
        let catalog = catalog();
        let config = SingleServerConfig::default();
        let mut rng = SeededSource::with_seed(seed);

        let events = SingleServerGenerator::new(&catalog, &config)
            .generate(SingleServerMode::Plain, &mut rng)
            .unwrap();
        let metrics = SingleServerMetrics::compute(&events);

        prop_assert_eq!(metrics.total_customers, events.len() / 2);
        prop_assert!((0.0..=1.0).contains(&metrics.probability_of_waiting));
        prop_assert_eq!(
            metrics.makespan,
            events.iter().map(|e| e.end_time()).max().unwrap()
        );
    }

    /// Same seed, same run
    #[test]
    fn test_parallel_seeded_runs_repeat(
        seed in any::<u64>(),
        arrivals in table("arrival", 5),
        service in table("service", 6),
    ) {
        let generator = ParallelGenerator::new(&arrivals, &service);

        let a = generator.generate(&mut SeededSource::with_seed(seed)).unwrap();
        let b = generator.generate(&mut SeededSource::with_seed(seed)).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Per-customer times are consistent and each server works one customer at a time
    #[test]
    fn test_parallel_invariants(
        seed in any::<u64>(),
        arrivals in table("arrival", 5),
        service in table("service", 8),
        period in 10.0f64..240.0,
    ) {
        let outcome = ParallelGenerator::new(&arrivals, &service)
            .with_period(period)
            .generate(&mut SeededSource::with_seed(seed))
            .unwrap();

        let customers = &outcome.customers;
        prop_assert!(!customers.is_empty());

        let mut last_end = HashMap::new();
        for (idx, c) in customers.iter().enumerate() {
            prop_assert_eq!(c.customer_id, idx as u32 + 1);
            prop_assert!(c.wait_time >= 0.0);
            prop_assert!((c.service_start - (c.arrival_time + c.wait_time)).abs() < 1e-9);
            prop_assert!((c.end_time - (c.service_start + c.service_duration)).abs() < 1e-9);
            prop_assert!((c.system_time - (c.wait_time + c.service_duration)).abs() < 1e-9);

            if idx + 1 < customers.len() {
                prop_assert!(c.arrival_time < period);
            }
            if idx > 0 {
                prop_assert!(c.arrival_time > customers[idx - 1].arrival_time);
            }
            if let Some(&end) = last_end.get(&c.server) {
                prop_assert!(c.service_start >= end);
            }
            last_end.insert(c.server, c.end_time);
        }

        for server in &outcome.servers {
            let u = utilization(server, period);
            prop_assert!((0.0..=1.0).contains(&u));
        }
    }

    /// A customer only waits when both servers are busy at arrival
    #[test]
    fn test_parallel_waits_only_when_all_busy(
        seed in any::<u64>(),
        arrivals in table("arrival", 3),
        service in table("service", 10),
    ) {
        let outcome = ParallelGenerator::new(&arrivals, &service)
            .generate(&mut SeededSource::with_seed(seed))
            .unwrap();

        let mut free_at = HashMap::new();
        for c in &outcome.customers {
            if c.wait_time > 0.0 {
                for (_, &end) in free_at.iter() {
                    prop_assert!(end > c.arrival_time);
                }
            }
            free_at.insert(c.server, c.end_time);
        }
    }
}
