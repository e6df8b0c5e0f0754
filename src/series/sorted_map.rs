use crate::time_key::TimeKey;

/// An ordered map from time-key to value, backed by a sorted vector.
///
/// Keys are unique and strictly increasing in iteration order. Positional access
/// (`rank_of`, `entry_at`) is what interpolation needs to pick neighbouring keys.
#[derive(Debug, Clone)]
pub struct SortedKeyMap<V> {
    entries: Vec<(TimeKey, V)>,
}

impl<V> Default for SortedKeyMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> SortedKeyMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of stored keys strictly less than `key`.
    pub fn rank_of(&self, key: TimeKey) -> usize {
        self.entries.partition_point(|(k, _)| *k < key)
    }

    fn position(&self, key: TimeKey) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&key, |(k, _)| *k)
    }

    pub fn contains_key(&self, key: TimeKey) -> bool {
        self.position(key).is_ok()
    }

    pub fn get(&self, key: TimeKey) -> Option<&V> {
        self.position(key).ok().map(|index| &self.entries[index].1)
    }

    pub fn entry_at(&self, index: usize) -> Option<(TimeKey, &V)> {
        self.entries.get(index).map(|(k, v)| (*k, v))
    }

    pub fn first_key(&self) -> Option<TimeKey> {
        self.entries.first().map(|(k, _)| *k)
    }

    pub fn last_key(&self) -> Option<TimeKey> {
        self.entries.last().map(|(k, _)| *k)
    }

    /// Inserts `value` at `key`, returning the value it replaced.
    pub fn insert(&mut self, key: TimeKey, value: V) -> Option<V> {
        // Feeds arrive in time order, so appending is the common case.
        if self.last_key().map_or(true, |last| last < key) {
            self.entries.push((key, value));
            return None;
        }
        match self.position(key) {
            Ok(index) => Some(std::mem::replace(&mut self.entries[index].1, value)),
            Err(rank) => {
                self.entries.insert(rank, (key, value));
                None
            }
        }
    }

    /// Returns the value at `key`, computing and storing it first if absent.
    ///
    /// `compute` receives the map and the rank `key` would be inserted at. It is
    /// not called when the key is already present, and a failed computation
    /// leaves the map untouched.
    pub fn get_or_compute<E, F>(&mut self, key: TimeKey, compute: F) -> Result<&V, E>
    where
        F: FnOnce(&Self, usize) -> Result<V, E>,
    {
        match self.position(key) {
            Ok(index) => Ok(&self.entries[index].1),
            Err(rank) => {
                let value = compute(self, rank)?;
                self.entries.insert(rank, (key, value));
                Ok(&self.entries[rank].1)
            }
        }
    }

    /// Keeps only the entries for which `keep` returns `true`, returning how many
    /// were removed.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(TimeKey, &V) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|(k, v)| keep(*k, v));
        before - self.entries.len()
    }

    /// Entries with keys in `start..=end`, in key order.
    pub fn range(&self, start: TimeKey, end: TimeKey) -> impl Iterator<Item = (TimeKey, &V)> {
        let from = self.rank_of(start);
        let to = self.entries.partition_point(|(k, _)| *k <= end).max(from);
        self.entries[from..to].iter().map(|(k, v)| (*k, v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (TimeKey, &V)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = TimeKey> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_of(keys: &[TimeKey]) -> SortedKeyMap<&'static str> {
        let mut map = SortedKeyMap::new();
        for &key in keys {
            map.insert(key, "v");
        }
        map
    }

    #[test]
    fn out_of_order_inserts_keep_keys_sorted() {
        let map = map_of(&[30, 10, 20, 40, 0]);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec![0, 10, 20, 30, 40]);
    }

    #[test]
    fn insert_replaces_existing_value() {
        let mut map = SortedKeyMap::new();
        assert_eq!(map.insert(5, 'a'), None);
        assert_eq!(map.insert(5, 'b'), Some('a'));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(5), Some(&'b'));
    }

    #[test]
    fn rank_counts_strictly_smaller_keys() {
        let map = map_of(&[10, 20, 30]);
        assert_eq!(map.rank_of(5), 0);
        assert_eq!(map.rank_of(10), 0);
        assert_eq!(map.rank_of(15), 1);
        assert_eq!(map.rank_of(30), 2);
        assert_eq!(map.rank_of(31), 3);
    }

    #[test]
    fn get_or_compute_only_computes_on_miss() {
        let mut map = SortedKeyMap::new();
        map.insert(10, 1);
        map.insert(30, 3);

        let hit: Result<&i32, ()> = map.get_or_compute(10, |_, _| panic!("must not compute"));
        assert_eq!(hit, Ok(&1));

        let miss: Result<&i32, ()> = map.get_or_compute(20, |m, rank| {
            assert_eq!(rank, 1);
            Ok(m.entry_at(0).unwrap().1 + m.entry_at(1).unwrap().1)
        });
        assert_eq!(miss, Ok(&4));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec![10, 20, 30]);
    }

    #[test]
    fn failed_computation_leaves_map_unchanged() {
        let mut map: SortedKeyMap<i32> = SortedKeyMap::new();
        let result = map.get_or_compute(1, |_, _| Err("nope"));
        assert_eq!(result, Err("nope"));
        assert!(map.is_empty());
    }

    #[test]
    fn retain_drops_rejected_entries_and_keeps_order() {
        let mut map = SortedKeyMap::new();
        for key in [40, 10, 30, 20] {
            map.insert(key, key % 20 == 0);
        }
        assert_eq!(map.retain(|_, even| *even), 2);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec![20, 40]);
        assert_eq!(map.rank_of(30), 1);
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let map = map_of(&[0, 10, 20, 30, 40]);
        let keys: Vec<_> = map.range(10, 30).map(|(k, _)| k).collect();
        assert_eq!(keys, vec![10, 20, 30]);
        let keys: Vec<_> = map.range(11, 29).map(|(k, _)| k).collect();
        assert_eq!(keys, vec![20]);
        assert_eq!(map.range(31, 39).count(), 0);
        assert_eq!(map.range(30, 10).count(), 0);
    }
}
