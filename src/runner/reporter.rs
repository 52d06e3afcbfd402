use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{Scope, ScopedJoinHandle};
use std::time::Duration;

use crate::report::ReportSink;

pub(super) const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Increments the completed-test counter on every exit path of a worker.
pub(super) struct CountOnDrop<'a>(pub(super) &'a AtomicUsize);

impl Drop for CountOnDrop<'_> {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::Release);
    }
}

/// Periodic progress poller living inside a thread scope.
pub(super) struct ProgressReporter<'scope> {
    stop: Sender<()>,
    handle: ScopedJoinHandle<'scope, ()>,
}

impl<'scope> ProgressReporter<'scope> {
    pub(super) fn spawn<'env>(
        scope: &'scope Scope<'scope, 'env>,
        sink: &'env dyn ReportSink,
        completed: &'env AtomicUsize,
        total: usize,
    ) -> Self {
        let (stop, stopped) = mpsc::channel::<()>();
        let handle = scope.spawn(move || {
            loop {
                sink.progress(fraction(completed.load(Ordering::Acquire), total));
                match stopped.recv_timeout(PROGRESS_INTERVAL) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            sink.progress(fraction(completed.load(Ordering::Acquire), total));
        });
        Self { stop, handle }
    }

    /// Signals the poller and waits for it.
    pub(super) fn stop(self) {
        let _ = self.stop.send(());
        if self.handle.join().is_err() {
            tracing::error!("progress reporter panicked");
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn fraction(done: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        (done.min(total) as f64) / (total as f64)
    }
}
