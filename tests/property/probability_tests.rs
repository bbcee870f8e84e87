//! Property-based tests for probability tables and inverse-transform lookup

use proptest::prelude::*;
use queue_simulator::probability::{ProbabilityTable, DIGIT_SCALE};
use queue_simulator::SimulationError;

/// Distinct positive keys with positive weights
fn weighted_pairs() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec(0.01f64..100.0, 1..12).prop_map(|weights| {
        weights
            .into_iter()
            .enumerate()
            .map(|(idx, w)| ((idx + 1) as f64, w))
            .collect()
    })
}

fn row_index(table: &ProbabilityTable, u: f64) -> usize {
    let row = table.lookup(u).unwrap();
    table
        .rows()
        .iter()
        .position(|r| std::ptr::eq(r, row))
        .unwrap()
}

proptest! {
    /// Built tables always pass their own invariant check
    #[test]
    fn test_built_table_is_valid(pairs in weighted_pairs()) {
        let table = ProbabilityTable::from_weights("t", pairs.clone()).unwrap();

        prop_assert!(table.validate().is_ok());
        prop_assert_eq!(table.len(), pairs.len());

        let total: f64 = table.rows().iter().map(|r| r.probability).sum();
        prop_assert!((total - 1.0).abs() < 1e-9, "probabilities sum to {}", total);
    }

    /// Every digit on the 1..=100 scale belongs to exactly one row
    #[test]
    fn test_digits_partition_scale(pairs in weighted_pairs()) {
        let table = ProbabilityTable::from_weights("t", pairs).unwrap();

        for digit in 1..=DIGIT_SCALE {
            let owners = table.rows().iter().filter(|r| r.contains_digit(digit)).count();
            prop_assert_eq!(owners, 1, "digit {} owned by {} rows", digit, owners);
            prop_assert!(table.lookup_digit(digit).is_ok());
        }
    }

    /// Lookup returns the first row whose cumulative probability covers the draw
    #[test]
    fn test_lookup_is_first_covering_row(pairs in weighted_pairs(), u in 0.0f64..=1.0) {
        let table = ProbabilityTable::from_weights("t", pairs).unwrap();
        let idx = row_index(&table, u);
        let rows = table.rows();

        prop_assert!(rows[idx].cumulative_probability >= u);
        if idx > 0 {
            prop_assert!(rows[idx - 1].cumulative_probability < u);
        }
    }

    /// Larger draws never map to earlier rows
    #[test]
    fn test_lookup_is_monotone(pairs in weighted_pairs(), a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let table = ProbabilityTable::from_weights("t", pairs).unwrap();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

        prop_assert!(row_index(&table, lo) <= row_index(&table, hi));
    }

    /// Draws outside [0, 1] are rejected rather than clamped
    #[test]
    fn test_out_of_range_draw_rejected(pairs in weighted_pairs(), excess in 0.0001f64..10.0) {
        let table = ProbabilityTable::from_weights("t", pairs).unwrap();

        prop_assert!(matches!(table.lookup(1.0 + excess), Err(SimulationError::InvalidDraw(_))));
        prop_assert!(matches!(table.lookup(-excess), Err(SimulationError::InvalidDraw(_))));
    }

    /// Non-positive weights are rejected
    #[test]
    fn test_non_positive_weight_rejected(mut pairs in weighted_pairs(), bad in -10.0f64..=0.0, at in any::<prop::sample::Index>()) {
        let idx = at.index(pairs.len());
        pairs[idx].1 = bad;

        prop_assert!(ProbabilityTable::from_weights("t", pairs).is_err());
    }

    /// The expected value stays within the key range
    #[test]
    fn test_expected_value_bounded(pairs in weighted_pairs()) {
        let table = ProbabilityTable::from_weights("t", pairs.clone()).unwrap();
        let max_key = pairs.len() as f64;

        let ev = table.expected_value();
        prop_assert!(ev >= 1.0 - 1e-9 && ev <= max_key + 1e-9);
    }
}
