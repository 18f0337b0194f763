//! Cooperative cancellation over a `watch::Receiver<bool>`.

use tokio::sync::watch;

/// Resolve once `shutdown` reports `true`.
///
/// A dropped sender means nobody can cancel any more, so the future then
/// never resolves.
pub async fn requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Non-blocking check of the current shutdown flag.
#[must_use]
pub fn is_requested(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow()
}
