//! Search-index rebuild trigger
//!
//! A single fire-and-forget request whose only observable result is two
//! flags. Nothing in the form coordination layer depends on it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::errors::{FormError, Result};

/// Backend call that rebuilds the index
#[async_trait]
pub trait IndexRebuilder: Send + Sync {
    async fn rebuild(&self) -> anyhow::Result<()>;
}

/// Runs a rebuild and exposes `finished` / `failed` to the UI
#[derive(Clone)]
pub struct RebuildIndexController {
    rebuilder: Arc<dyn IndexRebuilder>,
    finished: Arc<AtomicBool>,
    failed: Arc<AtomicBool>,
}

impl RebuildIndexController {
    pub fn new(rebuilder: Arc<dyn IndexRebuilder>) -> Self {
        Self {
            rebuilder,
            finished: Arc::new(AtomicBool::new(false)),
            failed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Issue the request once. Sets exactly one of the two flags; no retry.
    pub async fn rebuild(&self) -> Result<()> {
        match self.rebuilder.rebuild().await {
            Ok(()) => {
                self.finished.store(true, Ordering::SeqCst);
                tracing::info!("Index rebuild finished");
                Ok(())
            }
            Err(e) => {
                self.failed.store(true, Ordering::SeqCst);
                tracing::error!("Index rebuild failed: {}", e);
                Err(FormError::from(e))
            }
        }
    }

    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct Scripted {
        ok: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl IndexRebuilder for Scripted {
        async fn rebuild(&self) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.ok {
                Ok(())
            } else {
                anyhow::bail!("HTTP 500")
            }
        }
    }

    #[tokio::test]
    async fn test_rebuild_success() {
        let controller = RebuildIndexController::new(Arc::new(Scripted {
            ok: true,
            calls: AtomicUsize::new(0),
        }));
        assert!(!controller.finished());
        controller.rebuild().await.unwrap();
        assert!(controller.finished());
        assert!(!controller.failed());
    }

    #[tokio::test]
    async fn test_rebuild_failure_no_retry() {
        let backend = Arc::new(Scripted {
            ok: false,
            calls: AtomicUsize::new(0),
        });
        let controller = RebuildIndexController::new(backend.clone());
        let err = controller.rebuild().await.unwrap_err();

        assert_eq!(err.category(), "index");
        assert!(controller.failed());
        assert!(!controller.finished());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }
}
