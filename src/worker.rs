use std::cell::Cell;
use std::future::Future;
use std::io;
use std::sync::mpsc;

use tokio::runtime::{Builder, Handle};
use tokio::sync::oneshot;

use crate::error::RusotoLogsError;

thread_local! {
    static ON_WORKER: Cell<bool> = Cell::new(false);
}

/// A current-thread runtime driven on its own OS thread.
///
/// Rusoto needs a tokio reactor while the handlers are called synchronously, so
/// remote calls are spawned here and the caller waits for the result.
pub struct Worker {
    runtime_handle: Handle,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Worker {
    pub fn spawn() -> io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let runtime_handle = runtime.handle().clone();
        let (shutdown, stopped) = oneshot::channel::<()>();
        std::thread::Builder::new()
            .name("rusoto-logs-worker".to_string())
            .spawn(move || {
                ON_WORKER.with(|flag| flag.set(true));
                runtime.block_on(async move {
                    let _ = stopped.await;
                });
            })?;
        Ok(Self {
            runtime_handle,
            shutdown: Some(shutdown),
        })
    }

    /// Whether the current thread is the one driving a worker runtime.
    pub fn is_current_thread() -> bool {
        ON_WORKER.with(|flag| flag.get())
    }

    /// Runs `future` on the worker and blocks until it completes.
    pub fn block_on<F, T>(&self, future: F) -> Result<T, RusotoLogsError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (sender, receiver) = mpsc::sync_channel(1);
        self.runtime_handle.spawn(async move {
            let _ = sender.send(future.await);
        });
        receiver.recv().map_err(|_| RusotoLogsError::WorkerStopped)
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}
