//! Activity listener bookkeeping
//!
//! While a session is live the console listens to every activity source.
//! Listeners are registered once per login and removed exactly once on
//! logout, so repeated logouts or teardown never double-remove and a new
//! login never stacks a second set on top of the first.

use catalyst_api::ActivityKind;
use catalyst_util::ListenerId;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct ActivityListeners {
    next_id: u64,
    active: BTreeMap<ActivityKind, ListenerId>,
    removed_total: u64,
}

impl ActivityListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for every activity source that lacks one.
    /// Returns the listeners created by this call.
    pub fn register_all(&mut self) -> Vec<ListenerId> {
        let mut created = Vec::new();
        for kind in ActivityKind::ALL {
            if self.active.contains_key(&kind) {
                continue;
            }
            self.next_id += 1;
            let id = ListenerId::new(self.next_id);
            self.active.insert(kind, id);
            created.push(id);
        }

        if !created.is_empty() {
            debug!(count = created.len(), "Activity listeners registered");
        }
        created
    }

    /// Remove every registered listener. Returns the listeners removed,
    /// which is empty when nothing was registered.
    pub fn deregister_all(&mut self) -> Vec<ListenerId> {
        let removed: Vec<ListenerId> = std::mem::take(&mut self.active).into_values().collect();
        self.removed_total += removed.len() as u64;

        if !removed.is_empty() {
            debug!(count = removed.len(), "Activity listeners removed");
        }
        removed
    }

    pub fn is_listening(&self, kind: ActivityKind) -> bool {
        self.active.contains_key(&kind)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Listeners removed over the lifetime of this registry
    pub fn removed_total(&self) -> u64 {
        self.removed_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all_sources() {
        let mut listeners = ActivityListeners::new();
        let created = listeners.register_all();

        assert_eq!(created.len(), 4);
        for kind in ActivityKind::ALL {
            assert!(listeners.is_listening(kind));
        }
    }

    #[test]
    fn test_register_twice_does_not_stack() {
        let mut listeners = ActivityListeners::new();
        listeners.register_all();
        assert!(listeners.register_all().is_empty());
        assert_eq!(listeners.active_count(), 4);
    }

    #[test]
    fn test_deregister_exactly_once() {
        let mut listeners = ActivityListeners::new();
        listeners.register_all();

        assert_eq!(listeners.deregister_all().len(), 4);
        assert!(listeners.deregister_all().is_empty());
        assert_eq!(listeners.removed_total(), 4);
        assert!(!listeners.is_listening(ActivityKind::KeyPress));
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut listeners = ActivityListeners::new();
        let first = listeners.register_all();
        listeners.deregister_all();
        let second = listeners.register_all();

        assert!(first.iter().all(|id| !second.contains(id)));
    }
}
