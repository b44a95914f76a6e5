//! Listener registry
//!
//! Owned by an engine rather than held in a global: listeners are added
//! against a skeleton when the program is set up and removed explicitly.
//! Notification may happen concurrently from many tasks.

use crate::interpreter::types::{Event, SkeletonId, SkeletonKind};
use crate::skeletons::Skeleton;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Receiver of skeleton events
pub trait Listener: Send + Sync {
    /// Skeleton kind this listener is written for; `None` accepts any
    fn kind(&self) -> Option<SkeletonKind> {
        None
    }

    fn on_event(&self, event: &Event);
}

impl<F> Listener for F
where
    F: Fn(&Event) + Send + Sync,
{
    fn on_event(&self, event: &Event) {
        self(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Listener for {listener:?} skeletons cannot be added to a {skeleton:?} skeleton")]
    BadListener {
        listener: SkeletonKind,
        skeleton: SkeletonKind,
    },
}

type Entry = (ListenerId, Arc<dyn Listener>);

pub struct ListenerRegistry {
    by_skeleton: RwLock<HashMap<SkeletonId, Vec<Entry>>>,
    generic: RwLock<Vec<Entry>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            by_skeleton: RwLock::new(HashMap::new()),
            generic: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> ListenerId {
        ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Listen to events of one skeleton node
    pub fn add_listener<L>(&self, skeleton: &Skeleton, listener: L) -> Result<ListenerId, RegistryError>
    where
        L: Listener + 'static,
    {
        if let Some(kind) = listener.kind() {
            if kind != skeleton.kind() {
                return Err(RegistryError::BadListener {
                    listener: kind,
                    skeleton: skeleton.kind(),
                });
            }
        }

        let id = self.next_id();
        let listener: Arc<dyn Listener> = Arc::new(listener);
        self.by_skeleton
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(skeleton.id())
            .or_default()
            .push((id, listener));
        Ok(id)
    }

    /// Listen to every event of every skeleton
    pub fn add_generic_listener<L>(&self, listener: L) -> ListenerId
    where
        L: Listener + 'static,
    {
        let id = self.next_id();
        let listener: Arc<dyn Listener> = Arc::new(listener);
        self.generic
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    /// Returns false if no listener had this id
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut generic = self.generic.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(pos) = generic.iter().position(|(lid, _)| *lid == id) {
            generic.remove(pos);
            return true;
        }
        drop(generic);

        let mut by_skeleton = self.by_skeleton.write().unwrap_or_else(PoisonError::into_inner);
        for entries in by_skeleton.values_mut() {
            if let Some(pos) = entries.iter().position(|(lid, _)| *lid == id) {
                entries.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        let generic = self.generic.read().unwrap_or_else(PoisonError::into_inner).len();
        let scoped: usize = self
            .by_skeleton
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Vec::len)
            .sum();
        generic + scoped
    }

    /// Deliver to the listeners of the innermost traced skeleton, then to
    /// generic listeners
    pub fn notify(&self, event: &Event) {
        // Collect under the lock, call outside it, so a listener may
        // register or remove listeners
        let mut targets: Vec<Arc<dyn Listener>> = Vec::new();
        if let Some(element) = event.trace.last() {
            let by_skeleton = self.by_skeleton.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entries) = by_skeleton.get(&element.skeleton) {
                targets.extend(entries.iter().map(|(_, l)| l.clone()));
            }
        }
        targets.extend(
            self.generic
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .map(|(_, l)| l.clone()),
        );

        for listener in targets {
            listener.on_event(event);
        }
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}
