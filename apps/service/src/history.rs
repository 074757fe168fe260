//! Fixed-capacity, oldest-evicting ordered log shared by every check history.

use std::collections::VecDeque;

use serde::{Serialize, Serializer};

/// Most recent checks retained per monitored website
pub const WEBSITE_HISTORY_LIMIT: usize = 50;

/// Most recent checks retained in the global history
pub const GLOBAL_HISTORY_LIMIT: usize = 100;

/// Ordered buffer holding at most `capacity` entries, oldest first.
///
/// Appending to a full log evicts from the front, so the log always holds the
/// newest `capacity` entries in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedLog<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedLog<T> {
    pub fn new(capacity: usize) -> Self {
        Self { entries: VecDeque::with_capacity(capacity), capacity }
    }

    /// Build a log from existing entries, keeping only the newest `capacity`.
    pub fn from_entries(entries: impl IntoIterator<Item = T>, capacity: usize) -> Self {
        let mut log = Self::new(capacity);
        log.extend(entries);
        log
    }

    /// Append an entry, returning how many entries were evicted to make room.
    pub fn push(&mut self, entry: T) -> usize {
        self.entries.push_back(entry);

        let mut evicted = 0;
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            evicted += 1;
        }
        evicted
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recently appended entry
    pub fn last(&self) -> Option<&T> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.entries.iter().cloned().collect()
    }
}

impl<T> Extend<T> for BoundedLog<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for entry in iter {
            self.push(entry);
        }
    }
}

impl<'a, T> IntoIterator for &'a BoundedLog<T> {
    type Item = &'a T;
    type IntoIter = std::collections::vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// Serialized as a plain sequence; capacity is a property of the owner, not the data.
impl<T: Serialize> Serialize for BoundedLog<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_evicts_oldest() {
        let mut log = BoundedLog::new(3);

        assert_eq!(log.push(1), 0);
        assert_eq!(log.push(2), 0);
        assert_eq!(log.push(3), 0);
        assert_eq!(log.push(4), 1);

        assert_eq!(log.len(), 3);
        assert_eq!(log.to_vec(), vec![2, 3, 4]);
        assert_eq!(log.last(), Some(&4));
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut log = BoundedLog::new(GLOBAL_HISTORY_LIMIT);
        for i in 0..250 {
            log.push(i);
            assert!(log.len() <= GLOBAL_HISTORY_LIMIT);
        }

        let expected: Vec<i32> = (150..250).collect();
        assert_eq!(log.to_vec(), expected);
    }

    #[test]
    fn test_from_entries_keeps_newest() {
        let log = BoundedLog::from_entries(0..60, WEBSITE_HISTORY_LIMIT);

        assert_eq!(log.len(), WEBSITE_HISTORY_LIMIT);
        assert_eq!(log.iter().next(), Some(&10));
        assert_eq!(log.last(), Some(&59));
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let log = BoundedLog::from_entries(vec!["a", "b"], 5);
        let json = serde_json::to_string(&log).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
    }

    #[test]
    fn test_empty_log() {
        let log: BoundedLog<u8> = BoundedLog::new(2);
        assert!(log.is_empty());
        assert_eq!(log.last(), None);
    }
}
