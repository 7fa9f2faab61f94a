use std::sync::Arc;

use parking_lot::Mutex;
use rusoto_logs::{InputLogEvent, LogGroup, LogStream};

use crate::client::LogsApi;
use crate::delivery::Delivery;
use crate::error::RusotoLogsError;
use crate::record::LogRecord;
use crate::worker::Worker;
use crate::CLOUDWATCH_MAX_BATCH_EVENTS_LENGTH;

/// Sends a batch of entries to the destination.
///
/// Implementations report delivery failures themselves; an error means the
/// destination could not be provisioned.
pub trait Deliver: Send + Sync {
    fn deliver(&self, events: Vec<InputLogEvent>) -> Result<(), RusotoLogsError>;

    /// Whether records emitted on the current thread may be delivered at all.
    fn accepts(&self) -> bool {
        true
    }
}

impl<D> Deliver for Arc<D>
where
    D: Deliver + ?Sized,
{
    fn deliver(&self, events: Vec<InputLogEvent>) -> Result<(), RusotoLogsError> {
        (**self).deliver(events)
    }

    fn accepts(&self) -> bool {
        (**self).accepts()
    }
}

/// The handler side of the host logging contract.
pub trait Emit {
    fn emit(&self, record: LogRecord) -> Result<(), RusotoLogsError>;
}

/// Blocking delivery to the log service through a [`Worker`].
pub struct RemoteDelivery<C> {
    delivery: Arc<Delivery<C>>,
    worker: Worker,
}

impl<C> RemoteDelivery<C>
where
    C: LogsApi + 'static,
{
    pub fn new(delivery: Delivery<C>, worker: Worker) -> Self {
        Self {
            delivery: Arc::new(delivery),
            worker,
        }
    }

    pub fn log_group(&self) -> &str {
        self.delivery.provisioner().log_group()
    }

    pub fn log_stream(&self) -> &str {
        self.delivery.provisioner().log_stream()
    }

    pub fn ensure_group(&self) -> Result<LogGroup, RusotoLogsError> {
        let delivery = self.delivery.clone();
        self.worker
            .block_on(async move { delivery.provisioner().ensure_group().await })?
    }

    pub fn ensure_stream(&self) -> Result<LogStream, RusotoLogsError> {
        let delivery = self.delivery.clone();
        self.worker
            .block_on(async move { delivery.provisioner().ensure_stream().await })?
    }
}

impl<C> Deliver for RemoteDelivery<C>
where
    C: LogsApi + 'static,
{
    fn deliver(&self, events: Vec<InputLogEvent>) -> Result<(), RusotoLogsError> {
        // Waiting on the worker from the worker itself never returns.
        if Worker::is_current_thread() {
            eprintln!(
                "Dropping {} log events sent from the log worker thread",
                events.len()
            );
            return Ok(());
        }
        let delivery = self.delivery.clone();
        match self
            .worker
            .block_on(async move { delivery.send(events).await })
        {
            Ok(result) => result,
            Err(err) => {
                eprintln!("Failed to deliver log events: {}", err);
                Ok(())
            }
        }
    }

    /// Records produced by the transport itself are refused, they would loop back here.
    fn accepts(&self) -> bool {
        !Worker::is_current_thread()
    }
}

struct Shared<D, F> {
    delivery: D,
    format: F,
}

impl<D, F> Shared<D, F>
where
    F: Fn(&LogRecord) -> String,
{
    fn event(&self, record: LogRecord) -> InputLogEvent {
        record.into_event(&self.format)
    }
}

/// Sends every record as soon as it is emitted.
pub struct ImmediateHandler<D, F> {
    shared: Arc<Shared<D, F>>,
}

impl<D, F> Clone for ImmediateHandler<D, F> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<D, F> ImmediateHandler<D, F>
where
    D: Deliver,
    F: Fn(&LogRecord) -> String + Send + Sync,
{
    pub fn new(delivery: D, format: F) -> Self {
        Self {
            shared: Arc::new(Shared { delivery, format }),
        }
    }

    pub fn delivery(&self) -> &D {
        &self.shared.delivery
    }
}

impl<D, F> Emit for ImmediateHandler<D, F>
where
    D: Deliver,
    F: Fn(&LogRecord) -> String + Send + Sync,
{
    fn emit(&self, record: LogRecord) -> Result<(), RusotoLogsError> {
        if !self.shared.delivery.accepts() {
            return Ok(());
        }
        let event = self.shared.event(record);
        self.shared.delivery.deliver(vec![event])
    }
}

/// Collects records and sends them in batches.
///
/// A batch goes out once `flush_threshold` records are pending or when
/// [`flush`](Self::flush) is called. Nothing flushes in the background, so call
/// `flush` before shutting down.
pub struct BufferedHandler<D, F> {
    shared: Arc<Shared<D, F>>,
    pending: Arc<Mutex<Vec<InputLogEvent>>>,
    flush_threshold: usize,
}

impl<D, F> Clone for BufferedHandler<D, F> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            pending: self.pending.clone(),
            flush_threshold: self.flush_threshold,
        }
    }
}

impl<D, F> BufferedHandler<D, F>
where
    D: Deliver,
    F: Fn(&LogRecord) -> String + Send + Sync,
{
    pub fn new(delivery: D, format: F, flush_threshold: usize) -> Self {
        let flush_threshold = flush_threshold.max(1).min(CLOUDWATCH_MAX_BATCH_EVENTS_LENGTH);
        Self {
            shared: Arc::new(Shared { delivery, format }),
            pending: Arc::new(Mutex::new(Vec::with_capacity(flush_threshold))),
            flush_threshold,
        }
    }

    pub fn delivery(&self) -> &D {
        &self.shared.delivery
    }

    pub fn flush_threshold(&self) -> usize {
        self.flush_threshold
    }

    /// Number of records waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Sends all pending records and empties the buffer, whatever the outcome.
    pub fn flush(&self) -> Result<(), RusotoLogsError> {
        let events = std::mem::take(&mut *self.pending.lock());
        self.send(events)
    }

    fn send(&self, mut events: Vec<InputLogEvent>) -> Result<(), RusotoLogsError> {
        if events.is_empty() {
            return Ok(());
        }
        // Concurrent emitters can push out of order; the service rejects such batches.
        events.sort_by_key(|event| event.timestamp);
        self.shared.delivery.deliver(events)
    }
}

impl<D, F> Emit for BufferedHandler<D, F>
where
    D: Deliver,
    F: Fn(&LogRecord) -> String + Send + Sync,
{
    fn emit(&self, record: LogRecord) -> Result<(), RusotoLogsError> {
        if !self.shared.delivery.accepts() {
            return Ok(());
        }
        let event = self.shared.event(record);
        let full = {
            let mut pending = self.pending.lock();
            pending.push(event);
            if pending.len() >= self.flush_threshold {
                Some(std::mem::take(&mut *pending))
            } else {
                None
            }
        };
        match full {
            Some(events) => self.send(events),
            None => Ok(()),
        }
    }
}
