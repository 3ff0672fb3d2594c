use std::sync::Arc;

use futures::future::select_all;
use tokio::sync::watch;

/// Trips an [`AbortSignal`]. Cloning shares the same underlying flag.
#[derive(Clone, Debug)]
pub struct AbortHandle {
    tx: Arc<watch::Sender<bool>>,
}

/// Cooperative cancellation signal threaded through every suspension point.
///
/// A signal may observe several sources (see [`AbortSignal::child`]); it counts as aborted as soon
/// as any source trips. A signal with no sources never aborts.
#[derive(Clone, Debug)]
pub struct AbortSignal {
    sources: Vec<watch::Receiver<bool>>,
}

impl AbortHandle {
    pub fn new() -> (Self, AbortSignal) {
        let (tx, rx) = watch::channel(false);
        (
            Self { tx: Arc::new(tx) },
            AbortSignal { sources: vec![rx] },
        )
    }

    pub fn abort(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }

    /// Whether both handles trip the same flag.
    pub fn same(&self, other: &AbortHandle) -> bool {
        Arc::ptr_eq(&self.tx, &other.tx)
    }

    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            sources: vec![self.tx.subscribe()],
        }
    }
}

impl AbortSignal {
    pub fn never() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.sources.iter().any(|rx| *rx.borrow())
    }

    /// Resolve once any source trips. Pends forever when no source can trip anymore.
    pub async fn aborted(&self) {
        if self.is_aborted() {
            return;
        }
        if self.sources.is_empty() {
            return std::future::pending().await;
        }
        let waits = self
            .sources
            .iter()
            .cloned()
            .map(|rx| Box::pin(wait_tripped(rx)));
        select_all(waits).await;
    }

    /// Derive a signal that trips with `self` or with the returned handle.
    pub fn child(&self) -> (AbortHandle, AbortSignal) {
        let (handle, own) = AbortHandle::new();
        let mut sources = self.sources.clone();
        sources.extend(own.sources);
        (handle, AbortSignal { sources })
    }
}

async fn wait_tripped(mut rx: watch::Receiver<bool>) {
    if rx.wait_for(|aborted| *aborted).await.is_err() {
        // Sender dropped without tripping: this source can no longer fire.
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/signal.rs"]
mod tests;
