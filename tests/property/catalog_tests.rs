//! Property-based tests for the service catalog

use proptest::prelude::*;
use queue_simulator::catalog::ServiceCatalog;
use queue_simulator::sampling::SeededSource;
use queue_simulator::types::ServiceRow;
use queue_simulator::SimulationError;

fn unique_rows() -> impl Strategy<Value = Vec<ServiceRow>> {
    prop::collection::btree_set("[A-Z]{2,4}", 1..20).prop_flat_map(|codes| {
        let codes: Vec<String> = codes.into_iter().collect();
        let len = codes.len();
        prop::collection::vec(1i64..120, len).prop_map(move |durations| {
            codes
                .iter()
                .zip(durations)
                .map(|(code, duration)| ServiceRow::new(code.as_str(), format!("Service {}", code), duration))
                .collect()
        })
    })
}

proptest! {
    /// Bulk load keeps every row, in order
    #[test]
    fn test_bulk_load_preserves_order(rows in unique_rows()) {
        let catalog = ServiceCatalog::from_rows(&rows).unwrap();

        prop_assert_eq!(catalog.len(), rows.len());
        prop_assert_eq!(catalog.to_rows(), rows);
    }

    /// A duplicate anywhere rejects the load and names its row
    #[test]
    fn test_duplicate_rejects_whole_load(rows in unique_rows(), at in any::<prop::sample::Index>()) {
        let mut catalog = ServiceCatalog::from_rows(&[ServiceRow::new("KEEP", "Kept", 1)]).unwrap();

        let mut bad = rows.clone();
        let dup = bad[at.index(bad.len())].clone();
        bad.push(dup);

        let err = catalog.bulk_load(&bad).unwrap_err();
        match err {
            SimulationError::BulkLoad { row, .. } => prop_assert_eq!(row, bad.len()),
            other => prop_assert!(false, "unexpected error {:?}", other),
        }
        prop_assert_eq!(catalog.len(), 1);
        prop_assert!(catalog.contains("KEEP"));
    }

    /// Non-positive durations never enter the catalog
    #[test]
    fn test_non_positive_duration_rejected(duration in -1000i64..=0) {
        let mut catalog = ServiceCatalog::new();
        let result = catalog.add_service("X", "Bad", duration);

        let is_invalid_duration = matches!(result, Err(SimulationError::InvalidDuration { .. }));
        prop_assert!(is_invalid_duration);
        prop_assert!(catalog.is_empty());
    }

    /// Random picks always come from the catalog
    #[test]
    fn test_pick_random_is_member(rows in unique_rows(), seed in any::<u64>()) {
        let catalog = ServiceCatalog::from_rows(&rows).unwrap();
        let mut rng = SeededSource::with_seed(seed);

        for _ in 0..20 {
            let service = catalog.pick_random(&mut rng).unwrap();
            prop_assert!(catalog.contains(&service.code));
        }
    }
}
