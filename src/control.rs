//! Edit-form control: wires one form instance into the coordinator and
//! arms its unsaved-changes guard for as long as the instance lives.

use std::sync::Arc;

use crate::coord::coordinator::{FormCoordinator, PendingRegistration};
use crate::coord::types::{ActionCallback, ActionKind, FormActions, FormId, TriggerMap};
use crate::core::config::GuardConfig;
use crate::guard::{ConfirmDialog, DirtyFlag, GuardSet, UnloadListeners, UnsavedChangesGuard};

/// What the hosting view binds on a form
#[derive(Clone, Default)]
pub struct FormBindings {
    pub save: Option<ActionCallback>,
    pub edit: Option<ActionCallback>,
    pub cancel: Option<ActionCallback>,
    pub delete: Option<ActionCallback>,
    pub trigger: Option<TriggerMap>,
    /// Overrides the application-wide autosave policy for this form
    pub save_on_lost_focus: Option<bool>,
    pub dirty: DirtyFlag,
}

impl FormBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.save = Some(Arc::new(callback));
        self
    }

    pub fn edit(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.edit = Some(Arc::new(callback));
        self
    }

    pub fn cancel(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.cancel = Some(Arc::new(callback));
        self
    }

    pub fn delete(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.delete = Some(Arc::new(callback));
        self
    }

    pub fn trigger(mut self, trigger: TriggerMap) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn save_on_lost_focus(mut self, enabled: bool) -> Self {
        self.save_on_lost_focus = Some(enabled);
        self
    }

    pub fn dirty(mut self, dirty: DirtyFlag) -> Self {
        self.dirty = dirty;
        self
    }

    /// Bound callbacks in save, edit, cancel, delete order
    pub fn actions(&self) -> FormActions {
        let mut actions = FormActions::new();
        actions.push_optional(ActionKind::Save, self.save.clone());
        actions.push_optional(ActionKind::Edit, self.edit.clone());
        actions.push_optional(ActionKind::Cancel, self.cancel.clone());
        actions.push_optional(ActionKind::Delete, self.delete.clone());
        actions
    }
}

/// Host services every control needs
#[derive(Clone)]
pub struct ControlContext {
    pub coordinator: FormCoordinator,
    pub guards: GuardSet,
    pub unload: UnloadListeners,
    pub dialog: Arc<dyn ConfirmDialog>,
    pub policy: GuardConfig,
}

/// One mounted form instance
///
/// Dropping it detaches the close listener and unregisters the form.
pub struct EditFormControl {
    form: FormId,
    coordinator: FormCoordinator,
    guard: Arc<UnsavedChangesGuard>,
    // Set by mount_deferred until the control goes away
    pending: Option<PendingRegistration>,
}

impl EditFormControl {
    /// Register immediately
    pub fn mount(ctx: &ControlContext, bindings: FormBindings) -> Self {
        let form = FormId::new();
        ctx.coordinator.add(form, bindings.actions(), bindings.trigger.clone());
        Self::arm(ctx, form, bindings)
    }

    /// Register on the next scheduling tick, once the view is attached
    ///
    /// Without a tokio runtime this registers immediately. Dropping the
    /// control before the tick cancels the registration.
    pub fn mount_deferred(ctx: &ControlContext, bindings: FormBindings) -> Self {
        let form = FormId::new();
        let pending = ctx
            .coordinator
            .add_deferred(form, bindings.actions(), bindings.trigger.clone());
        let mut control = Self::arm(ctx, form, bindings);
        control.pending = Some(pending);
        control
    }

    fn arm(ctx: &ControlContext, form: FormId, bindings: FormBindings) -> Self {
        let mut policy = ctx.policy.clone();
        if let Some(enabled) = bindings.save_on_lost_focus {
            policy.save_on_lost_focus = enabled;
        }

        let mut guard =
            UnsavedChangesGuard::new(form, ctx.coordinator.clone(), bindings.dirty, policy)
                .with_dialog(ctx.dialog.clone());
        if let Some(save) = bindings.save {
            guard = guard.with_save(save);
        }
        let guard = Arc::new(guard);
        guard.activate(&ctx.unload);
        ctx.guards.register(&guard);

        Self {
            form,
            coordinator: ctx.coordinator.clone(),
            guard,
            pending: None,
        }
    }

    pub fn form(&self) -> FormId {
        self.form
    }

    pub fn guard(&self) -> &Arc<UnsavedChangesGuard> {
        &self.guard
    }

    pub fn dirty(&self) -> &DirtyFlag {
        self.guard.dirty()
    }
}

impl Drop for EditFormControl {
    fn drop(&mut self) {
        self.guard.deactivate();
        if let Some(pending) = &self.pending {
            pending.cancel();
        }
        self.coordinator.unregister(&self.form);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::resolver::ActiveContext;
    use crate::guard::FixedAnswer;
    use pretty_assertions::assert_eq;

    fn context() -> (ControlContext, ActiveContext) {
        let visible = ActiveContext::new();
        let ctx = ControlContext {
            coordinator: FormCoordinator::new(Arc::new(visible.clone())),
            guards: GuardSet::new(),
            unload: UnloadListeners::new(),
            dialog: Arc::new(FixedAnswer(false)),
            policy: GuardConfig::default(),
        };
        (ctx, visible)
    }

    #[test]
    fn test_bindings_order_and_omission() {
        let bindings = FormBindings::new().delete(|| {}).save(|| {}).cancel(|| {});
        let kinds: Vec<_> = bindings.actions().into_iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![ActionKind::Save, ActionKind::Cancel, ActionKind::Delete]);
    }

    #[test]
    fn test_mount_and_drop() {
        let (ctx, visible) = context();
        let control = EditFormControl::mount(&ctx, FormBindings::new().edit(|| {}));
        visible.show(control.form());

        assert!(ctx.coordinator.is_action_available(ActionKind::Edit));
        assert_eq!(ctx.unload.len(), 1);
        assert_eq!(ctx.guards.len(), 1);

        drop(control);
        assert!(ctx.coordinator.is_empty());
        assert!(ctx.unload.is_empty());
        assert!(ctx.guards.is_empty());
    }

    #[test]
    fn test_per_form_autosave_override() {
        let (ctx, _visible) = context();
        let control = EditFormControl::mount(
            &ctx,
            FormBindings::new().save(|| {}).save_on_lost_focus(true),
        );
        control.dirty().mark_dirty();

        let mut event = crate::guard::NavigationEvent::new();
        let decisions = ctx.guards.navigation_start(&mut event);
        assert_eq!(decisions, vec![crate::guard::GuardDecision::AutoSaved]);
        assert!(!event.is_prevented());
    }

    #[tokio::test]
    async fn test_drop_before_deferred_registration() {
        let (ctx, visible) = context();
        let control = EditFormControl::mount_deferred(&ctx, FormBindings::new().save(|| {}));
        let form = control.form();
        visible.show(form);
        drop(control);

        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
        assert!(!ctx.coordinator.contains(&form));
        assert!(ctx.coordinator.is_empty());
        assert!(!ctx.coordinator.is_action_available(ActionKind::Save));
        assert!(ctx.coordinator.triggers(&form).is_none());
    }

    #[test]
    fn test_mount_deferred_without_runtime() {
        let (ctx, visible) = context();
        let control = EditFormControl::mount_deferred(&ctx, FormBindings::new().edit(|| {}));
        visible.show(control.form());
        assert!(ctx.coordinator.is_action_available(ActionKind::Edit));

        drop(control);
        assert!(ctx.coordinator.is_empty());
    }
}
