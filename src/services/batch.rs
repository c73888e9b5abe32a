use std::collections::HashSet;
use std::hash::Hash;

/// Rows per multi-row `INSERT`
pub const BATCH_SIZE: usize = 500;

/// Drop earlier items that share a key with a later one, keeping input order.
///
/// PostgreSQL refuses an `ON CONFLICT DO UPDATE` that touches the same row
/// twice in one statement, so upsert batches must be unique on the conflict
/// target. The last occurrence wins, as it would with row-by-row writes.
pub fn keep_last_by<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::with_capacity(items.len());
    let mut unique: Vec<T> = items
        .into_iter()
        .rev()
        .filter(|item| seen.insert(key(item)))
        .collect();
    unique.reverse();
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_duplicates_win() {
        let items = vec![(1, "a"), (2, "b"), (1, "c"), (3, "d"), (2, "e")];
        let unique = keep_last_by(items, |(k, _)| *k);
        assert_eq!(unique, vec![(1, "c"), (3, "d"), (2, "e")]);
    }

    #[test]
    fn unique_input_is_unchanged() {
        let items = vec![3, 1, 2];
        assert_eq!(keep_last_by(items.clone(), |i| *i), items);
    }
}
