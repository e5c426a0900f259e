//! Host-facing event types and capabilities used by the unsaved-changes guard

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

/// Called when a flag goes from clean to dirty
pub type DirtyWatcher = Arc<dyn Fn() + Send + Sync>;

/// Modified-but-unsaved marker owned by the data-binding layer
///
/// Clones share the same flag.
#[derive(Clone, Default)]
pub struct DirtyFlag(Arc<DirtyState>);

#[derive(Default)]
struct DirtyState {
    dirty: AtomicBool,
    watchers: RwLock<Vec<Weak<dyn Fn() + Send + Sync>>>,
}

impl DirtyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the form modified. Watchers run on the clean to dirty edge only.
    pub fn mark_dirty(&self) {
        if !self.0.dirty.swap(true, Ordering::SeqCst) {
            self.notify();
        }
    }

    pub fn mark_clean(&self) {
        self.0.dirty.store(false, Ordering::SeqCst);
    }

    pub fn is_dirty(&self) -> bool {
        self.0.dirty.load(Ordering::SeqCst)
    }

    /// Watch clean to dirty transitions
    ///
    /// Only a weak reference is kept; the watcher stops firing once the
    /// caller drops its `Arc`.
    pub fn on_dirty(&self, watcher: &DirtyWatcher) {
        self.0.watchers.write().push(Arc::downgrade(watcher));
    }

    fn notify(&self) {
        let live: Vec<DirtyWatcher> = {
            let watchers = self.0.watchers.read();
            watchers.iter().filter_map(Weak::upgrade).collect()
        };
        if live.len() != self.0.watchers.read().len() {
            self.0.watchers.write().retain(|watcher| watcher.strong_count() > 0);
        }
        // no lock held, a watcher may touch the flag again
        for watcher in live {
            watcher();
        }
    }
}

impl std::fmt::Debug for DirtyFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DirtyFlag").field(&self.is_dirty()).finish()
    }
}

/// Blocking yes/no prompt
pub trait ConfirmDialog: Send + Sync {
    /// Returns true when the user agrees to leave
    fn confirm(&self, message: &str) -> bool;
}

/// Dialog that always gives the same answer, for headless hosts
#[derive(Clone, Copy, Debug)]
pub struct FixedAnswer(pub bool);

impl ConfirmDialog for FixedAnswer {
    fn confirm(&self, message: &str) -> bool {
        tracing::debug!("Auto-answering '{}' with {}", message, self.0);
        self.0
    }
}

/// Cancelable notification that the view is about to change
#[derive(Debug, Clone, Default)]
pub struct NavigationEvent {
    pub target: Option<String>,
    prevented: bool,
}

impl NavigationEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            prevented: false,
        }
    }

    /// Cancel the navigation; the view does not change
    pub fn prevent_default(&mut self) {
        self.prevented = true;
    }

    pub fn is_prevented(&self) -> bool {
        self.prevented
    }
}

/// Window or tab close notification
///
/// Setting a return value asks the host to show its own native prompt.
/// Whether and how that prompt appears is up to the host.
#[derive(Debug, Clone, Default)]
pub struct UnloadEvent {
    return_value: Option<String>,
}

impl UnloadEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_return_value(&mut self, message: impl Into<String>) {
        self.return_value = Some(message.into());
    }

    pub fn return_value(&self) -> Option<&str> {
        self.return_value.as_deref()
    }
}

pub type UnloadListener = Arc<dyn Fn(&mut UnloadEvent) + Send + Sync>;

type ListenerList = RwLock<Vec<(u64, UnloadListener)>>;

/// The host window's close-listener list
#[derive(Clone, Default)]
pub struct UnloadListeners {
    listeners: Arc<ListenerList>,
    next_id: Arc<AtomicU64>,
}

impl UnloadListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener. It stays attached until the handle is dropped.
    pub fn attach(&self, listener: UnloadListener) -> ListenerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.write().push((id, listener));
        ListenerHandle {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Deliver a close event to every attached listener
    pub fn dispatch(&self, event: &mut UnloadEvent) {
        // snapshot so a listener may attach or detach while running
        let snapshot: Vec<UnloadListener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }
}

/// Detaches its listener on drop
pub struct ListenerHandle {
    id: u64,
    listeners: Weak<ListenerList>,
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.write().retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirty_flag_shared() {
        let flag = DirtyFlag::new();
        let view = flag.clone();
        assert!(!view.is_dirty());
        flag.mark_dirty();
        assert!(view.is_dirty());
        view.mark_clean();
        assert!(!flag.is_dirty());
    }

    #[test]
    fn test_dirty_watcher_fires_on_transition() {
        let flag = DirtyFlag::new();
        let hits = Arc::new(AtomicU64::new(0));
        let counter = hits.clone();
        let watcher: DirtyWatcher = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        flag.on_dirty(&watcher);

        flag.mark_dirty();
        flag.mark_dirty();
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        flag.mark_clean();
        flag.clone().mark_dirty();
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        drop(watcher);
        flag.mark_clean();
        flag.mark_dirty();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(flag.0.watchers.read().is_empty());
    }

    #[test]
    fn test_navigation_prevent() {
        let mut event = NavigationEvent::to("/patients/3");
        assert!(!event.is_prevented());
        event.prevent_default();
        assert!(event.is_prevented());
        assert_eq!(event.target.as_deref(), Some("/patients/3"));
    }

    #[test]
    fn test_listener_detached_on_drop() {
        let listeners = UnloadListeners::new();
        let handle = listeners.attach(Arc::new(|event: &mut UnloadEvent| {
            event.set_return_value("bye");
        }));
        assert_eq!(listeners.len(), 1);

        let mut event = UnloadEvent::new();
        listeners.dispatch(&mut event);
        assert_eq!(event.return_value(), Some("bye"));

        drop(handle);
        assert!(listeners.is_empty());
        let mut event = UnloadEvent::new();
        listeners.dispatch(&mut event);
        assert_eq!(event.return_value(), None);
    }

    #[test]
    fn test_handle_outlives_window() {
        let listeners = UnloadListeners::new();
        let handle = listeners.attach(Arc::new(|_: &mut UnloadEvent| {}));
        drop(listeners);
        drop(handle);
    }

    #[test]
    fn test_fixed_answer() {
        assert!(FixedAnswer(true).confirm("leave?"));
        assert!(!FixedAnswer(false).confirm("leave?"));
    }
}
