//! FormCoordinator - the public façade
//!
//! Composes the action registry, the trigger registry and the active-form
//! resolver. One coordinator is built at application start and a clone of it
//! is handed to every form controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::core::config::CoordinatorConfig;
use crate::core::errors::{FormError, Result};
use crate::coord::registry::ActionRegistry;
use crate::coord::resolver::{ActiveFormResolver, VisibilityProvider};
use crate::coord::trigger::TriggerRegistry;
use crate::coord::types::{ActionKind, FormAction, FormActions, FormId, TriggerMap};

/// Coordinator for the set of editable forms sharing one action bar
#[derive(Clone)]
pub struct FormCoordinator {
    // Registration order; the position is the form index
    forms: Arc<RwLock<Vec<FormId>>>,
    actions: ActionRegistry,
    triggers: TriggerRegistry,
    resolver: ActiveFormResolver,
    // Last value computed by is_available()
    available: Arc<AtomicBool>,
}

impl FormCoordinator {
    /// Create a coordinator polling `visibility` for the active form
    pub fn new(visibility: Arc<dyn VisibilityProvider>) -> Self {
        Self::with_config(visibility, &CoordinatorConfig::default())
    }

    pub fn with_config(
        visibility: Arc<dyn VisibilityProvider>,
        config: &CoordinatorConfig,
    ) -> Self {
        Self {
            forms: Arc::new(RwLock::new(Vec::new())),
            actions: ActionRegistry::new(),
            triggers: TriggerRegistry::new(),
            resolver: ActiveFormResolver::new(visibility)
                .with_anomaly_warnings(config.warn_on_multiple_active),
            available: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register a form with its actions and optional trigger map
    ///
    /// A known form gets the new actions appended; a supplied trigger map
    /// replaces the previous one.
    pub fn add(
        &self,
        form: FormId,
        actions: impl Into<FormActions>,
        triggers: Option<TriggerMap>,
    ) {
        {
            let mut forms = self.forms.write();
            if !forms.contains(&form) {
                forms.push(form);
                tracing::debug!("Form {} registered at index {}", form, forms.len() - 1);
            }
        }
        self.actions.register(form, actions.into());
        if let Some(triggers) = triggers {
            self.triggers.register(form, triggers);
        }
    }

    /// Register on the next scheduling tick
    ///
    /// Lets the caller finish attaching the form to the view before the
    /// first visibility query. Outside a tokio runtime the form is
    /// registered right away.
    pub fn add_deferred(
        &self,
        form: FormId,
        actions: FormActions,
        triggers: Option<TriggerMap>,
    ) -> PendingRegistration {
        let cancelled = Arc::new(Mutex::new(false));
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::debug!("No tokio runtime, registering form {} immediately", form);
                self.add(form, actions, triggers);
                return PendingRegistration {
                    cancelled,
                    task: None,
                };
            }
        };

        let coordinator = self.clone();
        let flag = cancelled.clone();
        let task = handle.spawn(async move {
            tokio::task::yield_now().await;
            // held across add so cancel() cannot slip in between
            let cancelled = flag.lock();
            if *cancelled {
                tracing::debug!("Deferred registration of form {} canceled", form);
                return;
            }
            coordinator.add(form, actions, triggers);
        });

        PendingRegistration {
            cancelled,
            task: Some(task),
        }
    }

    /// Forget a form: identity, actions and triggers
    pub fn unregister(&self, form: &FormId) -> bool {
        let removed = {
            let mut forms = self.forms.write();
            let before = forms.len();
            forms.retain(|known| known != form);
            forms.len() != before
        };
        self.actions.remove(form);
        self.triggers.remove(form);
        if removed {
            tracing::debug!("Form {} unregistered", form);
        }
        removed
    }

    /// The form currently considered the user's focus
    pub fn active_form(&self) -> Option<FormId> {
        // snapshot, the provider may call back into the coordinator
        let forms = self.forms.read().clone();
        self.resolver.resolve_active(forms.iter())
    }

    /// Whether any registered form is active. Caches the answer for `available()`.
    pub fn is_available(&self) -> bool {
        let available = self.active_form().is_some();
        self.available.store(available, Ordering::Relaxed);
        available
    }

    /// Value computed by the last `is_available()` call
    pub fn available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    /// Whether `kind` is registered on the active form and not disabled by a trigger
    pub fn is_action_available(&self, kind: ActionKind) -> bool {
        let Some(form) = self.active_form() else {
            return false;
        };
        self.actions.lookup(&form, kind).is_some() && self.triggers.is_permitted(&form, kind)
    }

    /// The callback `call_action` would run, if any
    pub fn action_callback(&self, kind: ActionKind) -> Option<FormAction> {
        let form = self.active_form()?;
        self.actions.lookup(&form, kind)
    }

    /// Run `kind` on the active form
    ///
    /// Only presence is checked here, triggers are not; callers are expected
    /// to have asked `is_action_available` first.
    pub fn call_action(&self, kind: ActionKind) -> Result<()> {
        let form = self.active_form();
        let action = form
            .and_then(|form| self.actions.lookup(&form, kind))
            .ok_or_else(|| FormError::unregistered(kind, form))?;
        tracing::debug!("Calling {} on form {:?}", kind, form);
        // no lock is held here, the callback may re-enter the coordinator
        action.invoke();
        Ok(())
    }

    /// Update a single trigger entry on `form`
    pub fn set_trigger(&self, form: FormId, kind: ActionKind, value: Option<bool>) {
        self.triggers.set(form, kind, value);
    }

    pub fn triggers(&self, form: &FormId) -> Option<TriggerMap> {
        self.triggers.get(form)
    }

    /// Action names registered for `form`, in registration order
    pub fn registered_actions(&self, form: &FormId) -> Vec<ActionKind> {
        self.actions.list(form)
    }

    pub fn contains(&self, form: &FormId) -> bool {
        self.forms.read().contains(form)
    }

    /// Registered forms in registration order
    pub fn forms(&self) -> Vec<FormId> {
        self.forms.read().clone()
    }

    pub fn len(&self) -> usize {
        self.forms.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.read().is_empty()
    }

    pub fn is_visible(&self, form: &FormId) -> bool {
        self.resolver.is_visible(form)
    }
}

/// A registration scheduled by `add_deferred`
///
/// Dropping it leaves the registration to happen; `cancel` stops it.
pub struct PendingRegistration {
    cancelled: Arc<Mutex<bool>>,
    task: Option<JoinHandle<()>>,
}

impl PendingRegistration {
    /// Make sure the form is not registered by this call
    ///
    /// If the registration already ran, the caller still has to unregister.
    pub fn cancel(&self) {
        *self.cancelled.lock() = true;
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.lock()
    }
}
