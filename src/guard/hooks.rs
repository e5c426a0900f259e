//! Broadcasting view-change events to every mounted guard
//!
//! Hooks decide synchronously, within the same dispatch, so a navigation can
//! still be canceled when they return.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use super::events::NavigationEvent;

/// Outcome of one guard handling one event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Nothing to protect, or the user agreed to leave
    Proceed,
    /// The form was saved silently and marked clean
    AutoSaved,
    /// The user declined to leave; the navigation is canceled
    Blocked,
    /// The event did not concern this guard's form
    Skipped,
}

impl GuardDecision {
    pub fn is_blocked(&self) -> bool {
        matches!(self, GuardDecision::Blocked)
    }
}

/// Handler for the two in-app view-change events
pub trait NavigationHook: Send + Sync {
    /// A tab or context switch; cannot be prevented
    fn on_tab_change(&self) -> GuardDecision;

    /// The router is about to change view; may call `prevent_default`
    fn on_navigation_start(&self, event: &mut NavigationEvent) -> GuardDecision;
}

/// Every live guard in the application
///
/// Holds weak references, so a guard dropped with its form simply stops
/// receiving events.
#[derive(Clone, Default)]
pub struct GuardSet {
    hooks: Arc<RwLock<Vec<Weak<dyn NavigationHook>>>>,
}

impl GuardSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H: NavigationHook + 'static>(&self, hook: &Arc<H>) {
        let hook: Arc<dyn NavigationHook> = hook.clone();
        self.hooks.write().push(Arc::downgrade(&hook));
    }

    fn live(&self) -> Vec<Arc<dyn NavigationHook>> {
        let mut hooks = self.hooks.write();
        hooks.retain(|hook| hook.strong_count() > 0);
        hooks.iter().filter_map(Weak::upgrade).collect()
    }

    /// Broadcast a tab change; every guard gets a chance to autosave
    pub fn tab_change(&self) -> Vec<GuardDecision> {
        self.live().iter().map(|hook| hook.on_tab_change()).collect()
    }

    /// Broadcast a navigation start
    ///
    /// Stops at the first guard that cancels the navigation, so the user is
    /// prompted at most once per attempt.
    pub fn navigation_start(&self, event: &mut NavigationEvent) -> Vec<GuardDecision> {
        let mut decisions = Vec::new();
        for hook in self.live() {
            let decision = hook.on_navigation_start(event);
            decisions.push(decision);
            if event.is_prevented() {
                tracing::info!("Navigation to {:?} canceled", event.target);
                break;
            }
        }
        decisions
    }

    pub fn len(&self) -> usize {
        self.live().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
