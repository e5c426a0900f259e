// Core infrastructure modules
pub mod core {
    pub mod config;
    pub mod errors;
    pub mod logging;
}

pub mod coord;   // Form registry, triggers and active-form resolution
pub mod guard;   // Unsaved-changes guard
pub mod control; // Per-form mounting
pub mod index;   // Index rebuild collaborator

// Re-exports for convenience
pub use crate::core::config::{CoordinatorConfig, EditFormConfig, GuardConfig, LoggingConfig};
pub use crate::core::errors::{FormError, Result};
pub use coord::{
    ActionKind, ActiveContext, ActiveFormResolver, FormAction, FormActions, FormCoordinator,
    FormId, TriggerMap, VisibilityProvider,
};
pub use guard::{
    ConfirmDialog, DirtyFlag, GuardDecision, GuardSet, GuardState, NavigationEvent, UnloadEvent,
    UnloadListeners, UnsavedChangesGuard,
};
pub use control::{ControlContext, EditFormControl, FormBindings};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_form_manager() {
        let visible = ActiveContext::new();
        let coordinator = FormCoordinator::new(Arc::new(visible.clone()));
        let saved = Arc::new(AtomicUsize::new(0));

        let patient = FormId::new();
        let counter = saved.clone();
        coordinator.add(
            patient,
            FormActions::new().save(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
            None,
        );

        assert!(!coordinator.is_available());
        visible.show(patient);
        assert!(coordinator.is_available());
        assert!(coordinator.is_action_available(ActionKind::Save));

        coordinator.call_action(ActionKind::Save).unwrap();
        assert_eq!(saved.load(Ordering::SeqCst), 1);
    }
}
