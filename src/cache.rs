//! Process-wide cache of completed imports, keyed by source path.
//!
//! Each path holds at most one entry at a time. An entry starts as
//! `InProgress` when an import begins parsing and becomes `Built` when the
//! import commits its scene tree. A second import for the same path that runs
//! while the first is still parsing awaits the entry's event instead of
//! polling; the owning import signals it on commit and on failure. A failed
//! import removes its entry so waiters can retry with a fresh parse.
//!
//! The cache is shared by all concurrent imports on the single scheduler
//! thread; no operation suspends while a borrow is held.

use std::{collections::HashMap, rc::Rc};

use futures_intrusive::sync::LocalManualResetEvent;

use crate::data_structures::scene_graph::SceneNodeRef;

pub enum CacheEntry {
    /// An import for this path is running; the event resolves when it commits
    /// or fails.
    InProgress(Rc<LocalManualResetEvent>),
    Built(SceneNodeRef),
}

#[derive(Default)]
pub struct ImportCache {
    entries: HashMap<String, CacheEntry>,
    instance_counts: HashMap<String, u32>,
}

impl ImportCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built scene tree for a path, if a completed import exists.
    pub fn try_get_built(&self, path: &str) -> Option<SceneNodeRef> {
        match self.entries.get(path) {
            Some(CacheEntry::Built(node)) => Some(node.clone()),
            _ => None,
        }
    }

    pub fn is_in_progress(&self, path: &str) -> bool {
        matches!(self.entries.get(path), Some(CacheEntry::InProgress(_)))
    }

    /// The event a waiter subscribes to while another import for this path is
    /// still running.
    pub fn in_progress_event(&self, path: &str) -> Option<Rc<LocalManualResetEvent>> {
        match self.entries.get(path) {
            Some(CacheEntry::InProgress(event)) => Some(event.clone()),
            _ => None,
        }
    }

    /// Mark a path as having an import in flight and return the entry's event.
    ///
    /// An existing in-progress entry is kept (its event is shared); a built
    /// entry is overwritten, which is how a re-import with reuse disabled
    /// starts a new entry cycle for the path.
    pub fn mark_in_progress(&mut self, path: &str) -> Rc<LocalManualResetEvent> {
        if let Some(CacheEntry::InProgress(event)) = self.entries.get(path) {
            return event.clone();
        }
        let event = Rc::new(LocalManualResetEvent::new(false));
        self.entries
            .insert(path.to_string(), CacheEntry::InProgress(event.clone()));
        event
    }

    /// Resolve a path's entry to a built scene tree and wake any waiters.
    pub fn commit_built(&mut self, path: &str, node: SceneNodeRef) {
        if let Some(CacheEntry::InProgress(event)) =
            self.entries.insert(path.to_string(), CacheEntry::Built(node))
        {
            event.set();
        }
    }

    /// Remove a path's in-progress entry after a failed import and wake any
    /// waiters so they can retry. A built entry is left untouched.
    pub fn clear_in_progress(&mut self, path: &str) {
        if self.is_in_progress(path) {
            if let Some(CacheEntry::InProgress(event)) = self.entries.remove(path) {
                event.set();
            }
        }
    }

    /// Count one more duplicate instance created from this path's entry.
    pub fn bump_and_get_instance_count(&mut self, path: &str) -> u32 {
        let count = self.instance_counts.entry(path.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.instance_counts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data_structures::scene_graph::ContainerNode, sched::block_on};

    #[test]
    fn entry_transitions_from_absent_to_built() {
        let mut cache = ImportCache::new();
        assert!(cache.try_get_built("/models/cube.obj").is_none());

        let event = cache.mark_in_progress("/models/cube.obj");
        assert!(cache.is_in_progress("/models/cube.obj"));
        assert!(cache.try_get_built("/models/cube.obj").is_none());

        cache.commit_built("/models/cube.obj", ContainerNode::new_ref("cube"));
        assert!(!cache.is_in_progress("/models/cube.obj"));
        assert!(cache.try_get_built("/models/cube.obj").is_some());
        // Waiters resume once the entry is built.
        block_on(event.wait());
    }

    #[test]
    fn mark_in_progress_shares_the_event() {
        let mut cache = ImportCache::new();
        let first = cache.mark_in_progress("/models/cube.obj");
        let second = cache.mark_in_progress("/models/cube.obj");
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn clear_in_progress_removes_entry_and_wakes_waiters() {
        let mut cache = ImportCache::new();
        let event = cache.mark_in_progress("/models/cube.obj");
        cache.clear_in_progress("/models/cube.obj");
        assert!(cache.is_empty());
        block_on(event.wait());
    }

    #[test]
    fn instance_counter_is_per_path() {
        let mut cache = ImportCache::new();
        assert_eq!(cache.bump_and_get_instance_count("a"), 1);
        assert_eq!(cache.bump_and_get_instance_count("a"), 2);
        assert_eq!(cache.bump_and_get_instance_count("b"), 1);
    }
}
