// Weighted random choice over frequency tables.
//
// Inversion sampling on the cumulative weight: scale a uniform draw in
// [0, 1) by the table total and walk the entries in key order until the
// running sum passes it. Zero-weight entries never advance the running sum,
// so they are unreachable, and an empty or all-zero table yields `None`
// instead of dividing by a zero total.

use std::collections::BTreeMap;

/// Pick a key from `table` with probability proportional to its weight,
/// using `rng_val` in [0, 1).
pub fn weighted_choice<K: Copy + Ord>(table: &BTreeMap<K, f64>, rng_val: f64) -> Option<K> {
    let total: f64 = table.values().filter(|w| **w > 0.0).sum();
    if total <= 0.0 {
        return None;
    }

    let target = rng_val * total;
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (&key, &weight) in table {
        if weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        last_positive = Some(key);
        if cumulative > target {
            return Some(key);
        }
    }
    // Float drift can leave the target just past the final sum.
    last_positive
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(i32, f64)]) -> BTreeMap<i32, f64> {
        entries.iter().copied().collect()
    }

    #[test]
    fn empty_and_zero_tables_yield_none() {
        assert_eq!(weighted_choice(&table(&[]), 0.5), None);
        assert_eq!(weighted_choice(&table(&[(1, 0.0), (2, 0.0)]), 0.5), None);
    }

    #[test]
    fn cumulative_inversion() {
        let t = table(&[(1, 1.0), (2, 3.0)]);
        assert_eq!(weighted_choice(&t, 0.0), Some(1));
        assert_eq!(weighted_choice(&t, 0.24), Some(1));
        assert_eq!(weighted_choice(&t, 0.25), Some(2));
        assert_eq!(weighted_choice(&t, 0.999), Some(2));
    }

    #[test]
    fn zero_weight_entries_are_unreachable() {
        let t = table(&[(1, 0.0), (2, 2.0), (3, 0.0)]);
        for i in 0..100 {
            assert_eq!(weighted_choice(&t, i as f64 / 100.0), Some(2));
        }
    }

    #[test]
    fn top_of_range_returns_last_positive() {
        let t = table(&[(1, 1.0), (2, 1.0), (3, 0.0)]);
        assert_eq!(weighted_choice(&t, 1.0), Some(2));
    }
}
