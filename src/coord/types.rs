//! Core types shared by the registries, the coordinator and the guard
//!
//! Forms are referred to by identity only: two handles are the same form iff
//! they were cloned from the same `FormId::new()` call.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::core::errors::FormError;

/// Opaque, stable identity of one form instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FormId(Uuid);

impl FormId {
    /// Allocate a fresh identity
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FormId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The fixed lifecycle vocabulary shared by every form
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Edit,
    Cancel,
    Save,
    Delete,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Edit,
        ActionKind::Cancel,
        ActionKind::Save,
        ActionKind::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Edit => "edit",
            ActionKind::Cancel => "cancel",
            ActionKind::Save => "save",
            ActionKind::Delete => "delete",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "edit" => Ok(ActionKind::Edit),
            "cancel" => Ok(ActionKind::Cancel),
            "save" => Ok(ActionKind::Save),
            "delete" => Ok(ActionKind::Delete),
            other => Err(FormError::UnknownAction {
                name: other.to_string(),
            }),
        }
    }
}

/// Zero-argument procedure bound by the hosting view
pub type ActionCallback = Arc<dyn Fn() + Send + Sync>;

/// One named lifecycle action and its callback
#[derive(Clone)]
pub struct FormAction {
    pub kind: ActionKind,
    pub callback: ActionCallback,
}

impl FormAction {
    pub fn new(kind: ActionKind, callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            kind,
            callback: Arc::new(callback),
        }
    }

    pub fn edit(callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self::new(ActionKind::Edit, callback)
    }

    pub fn cancel(callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self::new(ActionKind::Cancel, callback)
    }

    pub fn save(callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self::new(ActionKind::Save, callback)
    }

    pub fn delete(callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self::new(ActionKind::Delete, callback)
    }

    /// Run the callback
    pub fn invoke(&self) {
        (self.callback)()
    }
}

impl fmt::Debug for FormAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormAction").field("kind", &self.kind).finish_non_exhaustive()
    }
}

/// Ordered action list handed to the coordinator at registration
#[derive(Clone, Debug, Default)]
pub struct FormActions {
    actions: Vec<FormAction>,
}

impl FormActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, action: FormAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn save(self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.with(FormAction::save(callback))
    }

    pub fn edit(self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.with(FormAction::edit(callback))
    }

    pub fn cancel(self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.with(FormAction::cancel(callback))
    }

    pub fn delete(self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.with(FormAction::delete(callback))
    }

    /// Add an action by its string name. Names outside the vocabulary are dropped.
    pub fn named(self, name: &str, callback: impl Fn() + Send + Sync + 'static) -> Self {
        match name.parse::<ActionKind>() {
            Ok(kind) => self.with(FormAction::new(kind, callback)),
            Err(err) => {
                tracing::debug!("Dropping action binding: {}", err);
                self
            }
        }
    }

    /// Push an optional binding, skipping absent ones
    pub fn push_optional(&mut self, kind: ActionKind, callback: Option<ActionCallback>) {
        if let Some(callback) = callback {
            self.actions.push(FormAction { kind, callback });
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn into_vec(self) -> Vec<FormAction> {
        self.actions
    }
}

impl From<Vec<FormAction>> for FormActions {
    fn from(actions: Vec<FormAction>) -> Self {
        Self { actions }
    }
}

impl IntoIterator for FormActions {
    type Item = FormAction;
    type IntoIter = std::vec::IntoIter<FormAction>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.into_iter()
    }
}

/// Per-action override table. An absent or null entry means "permitted".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TriggerMap {
    entries: BTreeMap<ActionKind, Option<bool>>,
}

impl TriggerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: ActionKind, value: bool) -> Self {
        self.entries.insert(kind, Some(value));
        self
    }

    pub fn set(&mut self, kind: ActionKind, value: Option<bool>) {
        self.entries.insert(kind, value);
    }

    /// The explicit override for `kind`, if any
    pub fn get(&self, kind: ActionKind) -> Option<bool> {
        self.entries.get(&kind).copied().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for TriggerMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: BTreeMap<String, Option<bool>> = BTreeMap::deserialize(deserializer)?;
        let mut map = TriggerMap::new();
        for (name, value) in raw {
            match name.parse::<ActionKind>() {
                Ok(kind) => map.set(kind, value),
                Err(_) => tracing::warn!("Ignoring trigger for unknown action '{}'", name),
            }
        }
        Ok(map)
    }
}
