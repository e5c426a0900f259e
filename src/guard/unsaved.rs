//! Per-form unsaved-changes guard
//!
//! Watches one form's dirty flag and, when the user is about to leave the
//! form, either saves it silently, asks the user, or lets the host warn on
//! window close.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::coord::coordinator::FormCoordinator;
use crate::coord::types::{ActionCallback, ActionKind, FormId};
use crate::core::config::GuardConfig;

use super::events::{
    ConfirmDialog, DirtyFlag, DirtyWatcher, FixedAnswer, ListenerHandle, NavigationEvent,
    UnloadEvent, UnloadListeners,
};
use super::hooks::{GuardDecision, NavigationHook};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardState {
    Clean,
    Dirty,
}

pub struct UnsavedChangesGuard {
    form: FormId,
    dirty: DirtyFlag,
    save: Option<ActionCallback>,
    policy: GuardConfig,
    coordinator: FormCoordinator,
    dialog: Arc<dyn ConfirmDialog>,
    unload: Mutex<Option<ListenerHandle>>,
    // Save trigger value to put back once the form is edited after an autosave
    suppressed_save: Arc<Mutex<Option<Option<bool>>>>,
    // Kept alive here; the dirty flag only holds it weakly
    _on_dirty: DirtyWatcher,
}

impl UnsavedChangesGuard {
    /// Guard `form`. Until a dialog is supplied the user is assumed to stay.
    pub fn new(
        form: FormId,
        coordinator: FormCoordinator,
        dirty: DirtyFlag,
        policy: GuardConfig,
    ) -> Self {
        let suppressed_save = Arc::new(Mutex::new(None));
        let on_dirty: DirtyWatcher = {
            let suppressed_save = suppressed_save.clone();
            let coordinator = coordinator.clone();
            Arc::new(move || {
                let previous = suppressed_save.lock().take();
                if let Some(previous) = previous {
                    coordinator.set_trigger(form, ActionKind::Save, previous);
                    tracing::debug!("Form {} edited again, save trigger restored", form);
                }
            })
        };
        dirty.on_dirty(&on_dirty);

        Self {
            form,
            dirty,
            save: None,
            policy,
            coordinator,
            dialog: Arc::new(FixedAnswer(false)),
            unload: Mutex::new(None),
            suppressed_save,
            _on_dirty: on_dirty,
        }
    }

    /// Callback used for autosave
    pub fn with_save(mut self, save: ActionCallback) -> Self {
        self.save = Some(save);
        self
    }

    pub fn with_dialog(mut self, dialog: Arc<dyn ConfirmDialog>) -> Self {
        self.dialog = dialog;
        self
    }

    /// Attach the window-close listener. Calling it again is a no-op.
    ///
    /// The listener is detached when the guard is dropped or deactivated.
    pub fn activate(&self, listeners: &UnloadListeners) {
        let mut unload = self.unload.lock();
        if unload.is_some() {
            return;
        }
        let dirty = self.dirty.clone();
        let message = self.policy.quit_confirmation_message.clone();
        *unload = Some(listeners.attach(Arc::new(move |event: &mut UnloadEvent| {
            if dirty.is_dirty() {
                event.set_return_value(message.clone());
            }
        })));
        tracing::debug!("Unsaved-changes guard active for form {}", self.form);
    }

    pub fn deactivate(&self) {
        self.unload.lock().take();
    }

    pub fn is_active(&self) -> bool {
        self.unload.lock().is_some()
    }

    pub fn form(&self) -> FormId {
        self.form
    }

    pub fn dirty(&self) -> &DirtyFlag {
        &self.dirty
    }

    pub fn state(&self) -> GuardState {
        if self.dirty.is_dirty() {
            GuardState::Dirty
        } else {
            GuardState::Clean
        }
    }

    /// Decide what to do with a dirty form that is losing focus
    ///
    /// With autosave configured the form is saved and marked clean, and its
    /// save trigger is turned off until the form is edited again. Otherwise
    /// the user is asked only when `ask_user` is set.
    pub fn resolve(&self, ask_user: bool) -> GuardDecision {
        if !self.dirty.is_dirty() {
            return GuardDecision::Proceed;
        }

        if self.policy.save_on_lost_focus {
            match &self.save {
                Some(save) => {
                    save();
                    self.dirty.mark_clean();
                    self.suppress_save_trigger();
                    tracing::info!("Form {} saved on lost focus", self.form);
                    return GuardDecision::AutoSaved;
                }
                None => {
                    tracing::warn!("Form {} has save_on_lost_focus but no save binding", self.form);
                }
            }
        }

        if !ask_user {
            return GuardDecision::Proceed;
        }

        if self.dialog.confirm(&self.policy.quit_confirmation_message) {
            GuardDecision::Proceed
        } else {
            GuardDecision::Blocked
        }
    }
}

impl UnsavedChangesGuard {
    fn suppress_save_trigger(&self) {
        let previous = self
            .coordinator
            .triggers(&self.form)
            .and_then(|map| map.get(ActionKind::Save));
        let mut suppressed = self.suppressed_save.lock();
        if suppressed.is_none() {
            *suppressed = Some(previous);
        }
        drop(suppressed);
        self.coordinator.set_trigger(self.form, ActionKind::Save, Some(false));
    }
}

impl NavigationHook for UnsavedChangesGuard {
    fn on_tab_change(&self) -> GuardDecision {
        // only the tab being left holds a visible form
        if !self.coordinator.is_visible(&self.form) {
            return GuardDecision::Skipped;
        }
        self.resolve(false)
    }

    fn on_navigation_start(&self, event: &mut NavigationEvent) -> GuardDecision {
        let decision = self.resolve(true);
        if decision.is_blocked() {
            event.prevent_default();
            tracing::info!("Form {} has unsaved changes, staying on the page", self.form);
        }
        decision
    }
}

impl std::fmt::Debug for UnsavedChangesGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnsavedChangesGuard")
            .field("form", &self.form)
            .field("state", &self.state())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
