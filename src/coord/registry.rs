//! Registry of lifecycle action callbacks, one entry per form
//!
//! Re-registering a form appends to its entry. Lookups return the first
//! callback registered under a name, so later duplicates are kept but never
//! reached.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::coord::types::{ActionKind, FormAction, FormId};

/// Callbacks registered for one form
#[derive(Clone, Debug)]
pub struct ActionEntry {
    pub form: FormId,
    pub callbacks: Vec<FormAction>,
}

/// Registry for form actions
#[derive(Clone)]
pub struct ActionRegistry {
    entries: Arc<RwLock<HashMap<FormId, ActionEntry>>>,
}

impl ActionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register actions for a form, creating its entry on first sight
    pub fn register(&self, form: FormId, actions: impl IntoIterator<Item = FormAction>) {
        let mut entries = self.entries.write();
        let entry = entries.entry(form).or_insert_with(|| ActionEntry {
            form,
            callbacks: Vec::new(),
        });
        let before = entry.callbacks.len();
        entry.callbacks.extend(actions);
        tracing::debug!(
            "Registered {} action(s) for form {} ({} total)",
            entry.callbacks.len() - before,
            form,
            entry.callbacks.len()
        );
    }

    /// Get the first action registered under `kind` for `form`
    pub fn lookup(&self, form: &FormId, kind: ActionKind) -> Option<FormAction> {
        let entries = self.entries.read();
        entries
            .get(form)?
            .callbacks
            .iter()
            .find(|action| action.kind == kind)
            .cloned()
    }

    /// Check if a form has an entry
    pub fn contains(&self, form: &FormId) -> bool {
        self.entries.read().contains_key(form)
    }

    /// Action names registered for a form, in registration order
    pub fn list(&self, form: &FormId) -> Vec<ActionKind> {
        let entries = self.entries.read();
        entries
            .get(form)
            .map(|entry| entry.callbacks.iter().map(|action| action.kind).collect())
            .unwrap_or_default()
    }

    /// Drop a form's entry
    pub fn remove(&self, form: &FormId) -> Option<ActionEntry> {
        self.entries.write().remove(form)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(kind: ActionKind, hits: &Arc<AtomicUsize>) -> FormAction {
        let hits = hits.clone();
        FormAction::new(kind, move || {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_lookup_unknown_form() {
        let registry = ActionRegistry::new();
        assert!(registry.lookup(&FormId::new(), ActionKind::Save).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_creates_then_appends() {
        let registry = ActionRegistry::new();
        let form = FormId::new();
        registry.register(form, vec![FormAction::save(|| {})]);
        registry.register(form, vec![FormAction::edit(|| {}), FormAction::delete(|| {})]);

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.list(&form),
            vec![ActionKind::Save, ActionKind::Edit, ActionKind::Delete]
        );
        assert!(registry.lookup(&form, ActionKind::Cancel).is_none());
    }

    #[test]
    fn test_first_registration_wins() {
        let registry = ActionRegistry::new();
        let form = FormId::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        registry.register(form, vec![counting(ActionKind::Save, &first)]);
        registry.register(form, vec![counting(ActionKind::Save, &second)]);

        registry.lookup(&form, ActionKind::Save).unwrap().invoke();

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
        assert_eq!(registry.list(&form), vec![ActionKind::Save, ActionKind::Save]);
    }

    #[test]
    fn test_empty_registration_still_creates_entry() {
        let registry = ActionRegistry::new();
        let form = FormId::new();
        registry.register(form, Vec::new());
        assert!(registry.contains(&form));
        assert!(registry.list(&form).is_empty());
    }

    #[test]
    fn test_remove() {
        let registry = ActionRegistry::new();
        let form = FormId::new();
        registry.register(form, vec![FormAction::cancel(|| {})]);
        assert!(registry.remove(&form).is_some());
        assert!(registry.lookup(&form, ActionKind::Cancel).is_none());
        assert!(registry.remove(&form).is_none());
    }
}
