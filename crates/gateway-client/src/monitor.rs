//! Bounded, pausable buffer backing the sentence monitor.

use std::collections::VecDeque;

/// Fixed-capacity ordered log of received records.
///
/// Insertion order is display order; once capacity is exceeded the oldest
/// entries are evicted first, synchronously with the push. Overflow is not
/// an error, it is the design. The log never inspects its records.
#[derive(Debug)]
pub struct BoundedLog<T> {
    entries: VecDeque<T>,
    capacity: usize,
    paused: bool,
}

impl<T> BoundedLog<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            paused: false,
        }
    }

    /// Append a record unless paused, evicting from the front past capacity.
    pub fn push(&mut self, record: T) {
        if self.paused {
            return;
        }
        self.entries.push_back(record);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Stop `push` from having effect; buffered records are kept.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Empty the log immediately, independent of pause state.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T: Clone> BoundedLog<T> {
    /// The current ordered contents, oldest first.
    pub fn snapshot(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_most_recent_up_to_capacity() {
        let mut log = BoundedLog::new(3);
        for i in 0..10 {
            log.push(i);
            assert!(log.len() <= 3);
        }
        assert_eq!(log.snapshot(), vec![7, 8, 9]);
    }

    #[test]
    fn test_order_is_arrival_order() {
        let mut log = BoundedLog::new(100);
        log.push("$GPRMC");
        log.push("$GPGGA");
        log.push("$IIMWV");
        assert_eq!(log.snapshot(), vec!["$GPRMC", "$GPGGA", "$IIMWV"]);
    }

    #[test]
    fn test_pause_drops_pushes_and_keeps_buffer() {
        let mut log = BoundedLog::new(10);
        log.push(1);
        log.push(2);

        log.pause();
        log.push(3);
        log.push(4);
        assert_eq!(log.snapshot(), vec![1, 2]);

        log.resume();
        log.push(5);
        assert_eq!(log.snapshot(), vec![1, 2, 5]);
    }

    #[test]
    fn test_clear_works_while_paused() {
        let mut log = BoundedLog::new(10);
        log.push(1);
        log.pause();
        log.clear();
        assert!(log.is_empty());
        assert!(log.is_paused());
    }

    #[test]
    fn test_snapshot_does_not_mutate() {
        let mut log = BoundedLog::new(2);
        log.push("a");
        log.push("b");
        let first = log.snapshot();
        let second = log.snapshot();
        assert_eq!(first, second);
        assert_eq!(log.len(), 2);
    }
}
