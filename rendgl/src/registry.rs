//! Process-wide record of which thread owns which context.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    thread::{self, ThreadId},
};

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::util::typedefs::FastHashMap;

/// Identity of a [`Context`](crate::Context), unique for the lifetime of the process.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    pub fn get(self) -> u64 {
        self.0
    }
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);
static REGISTRY: Lazy<Mutex<FastHashMap<ThreadId, ContextId>>> = Lazy::new(|| Mutex::new(FastHashMap::default()));

pub(crate) fn allocate() -> ContextId {
    ContextId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Claims the calling thread's slot. Returns the existing owner if the slot is taken.
pub(crate) fn register(id: ContextId) -> Result<(), ContextId> {
    let mut registry = REGISTRY.lock();
    match registry.get(&thread::current().id()) {
        Some(&existing) => Err(existing),
        None => {
            registry.insert(thread::current().id(), id);
            Ok(())
        }
    }
}

/// Frees the calling thread's slot, but only if `id` still owns it.
pub(crate) fn unregister(id: ContextId) -> bool {
    let mut registry = REGISTRY.lock();
    let thread = thread::current().id();
    if registry.get(&thread) == Some(&id) {
        registry.remove(&thread);
        true
    } else {
        false
    }
}

pub(crate) fn current() -> Option<ContextId> {
    REGISTRY.lock().get(&thread::current().id()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_is_exclusive_per_thread() {
        let first = allocate();
        let second = allocate();
        assert_ne!(first, second);

        assert_eq!(current(), None);
        assert_eq!(register(first), Ok(()));
        assert_eq!(register(second), Err(first));
        assert_eq!(current(), Some(first));

        assert!(!unregister(second));
        assert_eq!(current(), Some(first));
        assert!(unregister(first));
        assert_eq!(current(), None);
    }

    #[test]
    fn threads_have_separate_slots() {
        let id = allocate();
        register(id).unwrap();

        let other = thread::spawn(|| {
            let id = allocate();
            let registered = register(id);
            let seen = current();
            unregister(id);
            (registered, seen == Some(id))
        })
        .join()
        .unwrap();
        assert_eq!(other, (Ok(()), true));

        assert_eq!(current(), Some(id));
        unregister(id);
    }
}
