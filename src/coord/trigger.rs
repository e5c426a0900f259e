//! Per-form trigger overrides
//!
//! Unlike actions, a trigger map is replaced wholesale on re-registration.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::coord::types::{ActionKind, FormId, TriggerMap};

#[derive(Clone)]
pub struct TriggerRegistry {
    maps: Arc<RwLock<HashMap<FormId, TriggerMap>>>,
}

impl TriggerRegistry {
    pub fn new() -> Self {
        Self {
            maps: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Store `triggers` for `form`, overwriting any earlier map
    pub fn register(&self, form: FormId, triggers: TriggerMap) {
        let replaced = self.maps.write().insert(form, triggers).is_some();
        if replaced {
            tracing::debug!("Replaced trigger map for form {}", form);
        }
    }

    /// Update a single override, creating the map if the form has none
    pub fn set(&self, form: FormId, kind: ActionKind, value: Option<bool>) {
        self.maps.write().entry(form).or_default().set(kind, value);
    }

    /// Whether `kind` is permitted on `form`. Defaults to true.
    pub fn is_permitted(&self, form: &FormId, kind: ActionKind) -> bool {
        self.maps
            .read()
            .get(form)
            .and_then(|map| map.get(kind))
            .unwrap_or(true)
    }

    pub fn get(&self, form: &FormId) -> Option<TriggerMap> {
        self.maps.read().get(form).cloned()
    }

    pub fn remove(&self, form: &FormId) -> Option<TriggerMap> {
        self.maps.write().remove(form)
    }
}

impl Default for TriggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
