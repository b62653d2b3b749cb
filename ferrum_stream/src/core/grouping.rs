//! Key grouping for the reduce phase.
//!
//! Records must arrive with equal keys adjacent, the way a shuffle/sort step
//! delivers them. Nothing here sorts: a key that reappears after a different
//! key starts a new group.

/// Accumulates the values of the currently open group.
///
/// A group closes exactly when a record with a different key is pushed, or
/// when the input is exhausted and [`Grouper::finish`] is called.
#[derive(Debug)]
pub struct Grouper<K, V> {
    open: Option<(K, Vec<V>)>,
}

impl<K: PartialEq, V> Grouper<K, V> {
    pub fn new() -> Self {
        Grouper { open: None }
    }

    /// Adds one record. Returns the group it closed, if the key changed.
    pub fn push(&mut self, key: K, value: V) -> Option<(K, Vec<V>)> {
        if let Some((open_key, values)) = self.open.as_mut() {
            if *open_key == key {
                values.push(value);
                return None;
            }
        }
        self.open.replace((key, vec![value]))
    }

    /// Closes the open group at end of input.
    pub fn finish(&mut self) -> Option<(K, Vec<V>)> {
        self.open.take()
    }
}

impl<K: PartialEq, V> Default for Grouper<K, V> {
    fn default() -> Self {
        Grouper::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_all<K: PartialEq, V>(records: Vec<(K, V)>) -> Vec<(K, Vec<V>)> {
        let mut grouper = Grouper::new();
        let mut groups: Vec<_> = records
            .into_iter()
            .filter_map(|(key, value)| grouper.push(key, value))
            .collect();
        groups.extend(grouper.finish());
        groups
    }

    #[test]
    fn only_contiguous_keys_are_coalesced() {
        let records = vec![("A", 1), ("A", 2), ("B", 3), ("A", 4)];
        assert_eq!(
            group_all(records),
            vec![("A", vec![1, 2]), ("B", vec![3]), ("A", vec![4])]
        );
    }

    #[test]
    fn push_closes_on_key_change_and_finish_flushes() {
        let mut grouper = Grouper::new();
        assert_eq!(grouper.push("x", 1), None);
        assert_eq!(grouper.push("x", 2), None);
        assert_eq!(grouper.push("y", 3), Some(("x", vec![1, 2])));
        assert_eq!(grouper.finish(), Some(("y", vec![3])));
        assert_eq!(grouper.finish(), None);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        let records: Vec<(String, u64)> = Vec::new();
        assert!(group_all(records).is_empty());
    }
}
