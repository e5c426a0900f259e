//! Active form resolution
//!
//! The active form is recomputed on every query from the host's notion of
//! visibility. Forms are swapped in and out of view without telling the
//! registry, so there is no activate/deactivate protocol to keep in sync.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::errors::FormError;
use crate::coord::types::FormId;

/// Host capability answering "is this form presently rendered and not hidden"
pub trait VisibilityProvider: Send + Sync {
    fn is_visible(&self, form: &FormId) -> bool;
}

impl<F> VisibilityProvider for F
where
    F: Fn(&FormId) -> bool + Send + Sync,
{
    fn is_visible(&self, form: &FormId) -> bool {
        self(form)
    }
}

/// Explicit visible-set for hosts without a rendering engine to poll
///
/// The UI framework calls `show`/`hide` as views change; clones share state.
#[derive(Clone, Default)]
pub struct ActiveContext {
    visible: Arc<RwLock<HashSet<FormId>>>,
}

impl ActiveContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&self, form: FormId) {
        self.visible.write().insert(form);
    }

    pub fn hide(&self, form: &FormId) {
        self.visible.write().remove(form);
    }

    /// Make `form` the only visible form
    pub fn show_only(&self, form: FormId) {
        let mut visible = self.visible.write();
        visible.clear();
        visible.insert(form);
    }

    pub fn clear(&self) {
        self.visible.write().clear();
    }
}

impl VisibilityProvider for ActiveContext {
    fn is_visible(&self, form: &FormId) -> bool {
        self.visible.read().contains(form)
    }
}

/// Picks the first visible form in registration order
#[derive(Clone)]
pub struct ActiveFormResolver {
    visibility: Arc<dyn VisibilityProvider>,
    warn_on_multiple: bool,
}

impl ActiveFormResolver {
    pub fn new(visibility: Arc<dyn VisibilityProvider>) -> Self {
        Self {
            visibility,
            warn_on_multiple: true,
        }
    }

    pub fn with_anomaly_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_multiple = enabled;
        self
    }

    pub fn visibility(&self) -> &Arc<dyn VisibilityProvider> {
        &self.visibility
    }

    pub fn is_visible(&self, form: &FormId) -> bool {
        self.visibility.is_visible(form)
    }

    /// Resolve the active form among `forms`
    ///
    /// When several forms are visible the first one wins and the anomaly is
    /// logged; only one form is managed at a time.
    pub fn resolve_active<'a>(&self, forms: impl IntoIterator<Item = &'a FormId>) -> Option<FormId> {
        let mut visible = forms.into_iter().filter(|form| self.visibility.is_visible(form));
        let chosen = *visible.next()?;

        if self.warn_on_multiple {
            let others = visible.count();
            if others > 0 {
                let anomaly = FormError::MultipleActiveForms {
                    visible: others + 1,
                    chosen,
                };
                tracing::warn!(category = anomaly.category(), "{}", anomaly);
            }
        }

        Some(chosen)
    }
}
