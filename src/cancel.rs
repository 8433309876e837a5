// ABOUTME: Run-level cancellation signal built on a tokio watch channel.
// ABOUTME: Observable at every poll tick, not only at trigger time.

use tokio::sync::watch;

/// Create a linked cancel handle/token pair.
///
/// The handle side cancels; the token side is cloned into whatever needs to
/// observe cancellation. Dropping the handle without cancelling leaves the
/// tokens armed-but-silent (they never fire).
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// The cancelling side, held by the entry point (e.g. a ctrl-c task).
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// The observing side, passed through the orchestrator into each poll loop.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested. Never resolves if the
    /// handle is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_observes_cancel() {
        let (handle, token) = cancel_pair();
        assert!(!token.is_cancelled());

        handle.cancel();
        assert!(token.is_cancelled());
        token.cancelled().await;
    }

    #[tokio::test]
    async fn dropped_handle_never_fires() {
        let (handle, token) = cancel_pair();
        drop(handle);

        assert!(!token.is_cancelled());
        let waited = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            token.cancelled(),
        )
        .await;
        assert!(waited.is_err(), "cancelled() must not resolve");
    }
}
