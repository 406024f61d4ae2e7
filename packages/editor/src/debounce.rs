//! Debounced commits
//!
//! Field edits are held back until the field has been quiet for a while. The
//! debouncer owns no timer: callers pass the current instant in, either on a
//! periodic [`Debouncer::take_due`] or when a host timer armed with the
//! returned token fires ([`Debouncer::take_if_current`]).

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Pending<V> {
    value: V,
    due: Instant,
    token: u64,
}

#[derive(Debug)]
pub struct Debouncer<K, V> {
    quiet: Duration,
    pending: BTreeMap<K, Pending<V>>,
    next_token: u64,
}

impl<K: Ord + Clone, V> Debouncer<K, V> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: BTreeMap::new(),
            next_token: 0,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Hold `value` for `key`, superseding whatever was pending for it.
    /// Returns the token identifying this schedule.
    pub fn schedule(&mut self, key: K, value: V, now: Instant) -> u64 {
        self.next_token += 1;
        let token = self.next_token;
        self.pending.insert(
            key,
            Pending {
                value,
                due: now + self.quiet,
                token,
            },
        );
        token
    }

    /// Remove every entry whose quiet period has passed, oldest first
    pub fn take_due(&mut self, now: Instant) -> Vec<(K, V)> {
        let due: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.due <= now)
            .map(|(key, _)| key.clone())
            .collect();
        self.take_keys(due)
    }

    /// Timer callback form: yields the value only if `token` is still the
    /// latest schedule for `key`
    pub fn take_if_current(&mut self, key: &K, token: u64) -> Option<V> {
        match self.pending.get(key) {
            Some(pending) if pending.token == token => self.pending.remove(key).map(|p| p.value),
            _ => None,
        }
    }

    /// Remove everything, oldest first
    pub fn flush(&mut self) -> Vec<(K, V)> {
        let keys: Vec<K> = self.pending.keys().cloned().collect();
        self.take_keys(keys)
    }

    pub fn cancel(&mut self, key: &K) -> Option<V> {
        self.pending.remove(key).map(|pending| pending.value)
    }

    /// Drop pending entries whose key fails `keep`
    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) {
        self.pending.retain(|key, _| keep(key));
    }

    /// The value waiting for `key`, if any
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.pending.get(key).map(|pending| &pending.value)
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending.values().map(|pending| pending.due).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn take_keys(&mut self, keys: Vec<K>) -> Vec<(K, V)> {
        let mut taken: Vec<(u64, K, V)> = keys
            .into_iter()
            .filter_map(|key| {
                let pending = self.pending.remove(&key)?;
                Some((pending.token, key, pending.value))
            })
            .collect();
        taken.sort_by_key(|(token, _, _)| *token);
        taken.into_iter().map(|(_, key, value)| (key, value)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(300);

    #[test]
    fn test_commits_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        debouncer.schedule("title", "H", start);

        assert!(debouncer.take_due(start + Duration::from_millis(100)).is_empty());
        assert_eq!(debouncer.take_due(start + QUIET), vec![("title", "H")]);
        assert!(debouncer.is_empty());
    }

    #[test]
    fn test_later_edit_supersedes() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        let first = debouncer.schedule("title", "H", start);
        let second = debouncer.schedule("title", "Hi", start + Duration::from_millis(200));

        assert_eq!(debouncer.take_if_current(&"title", first), None);
        // the quiet period restarts with every edit
        assert!(debouncer.take_due(start + QUIET).is_empty());
        assert_eq!(debouncer.take_if_current(&"title", second), Some("Hi"));
    }

    #[test]
    fn test_flush_keeps_schedule_order() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        debouncer.schedule("b", 1, start);
        debouncer.schedule("a", 2, start);

        assert_eq!(debouncer.next_due(), Some(start + QUIET));
        assert_eq!(debouncer.flush(), vec![("b", 1), ("a", 2)]);
    }
}
