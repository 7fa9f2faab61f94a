//! Forwards log records to CloudWatch Logs, creating the log group and log
//! stream when they are missing.
//!
//! [`ImmediateHandler`] sends every record on its own, [`BufferedHandler`]
//! sends them in batches and must be flushed before the process exits. Both
//! plug into `tracing_subscriber::fmt` as a `MakeWriter`. Delivery failures are
//! reported on stderr and never reach the caller; only failing to provision
//! the destination does.

mod builder;
mod client;
mod delivery;
mod error;
mod handler;
mod provision;
mod record;
#[cfg(test)]
mod testing;
mod worker;
mod writer;

const CLOUDWATCH_MAX_BATCH_EVENTS_LENGTH: usize = 10_000;
const DEFAULT_FLUSH_THRESHOLD: usize = 10;

pub use builder::RusotoLogsHandlerBuilder;
pub use client::LogsApi;
pub use delivery::{Delivery, SendError};
pub use error::{ErrorKind, Resource, RusotoLogsError};
pub use handler::{BufferedHandler, Deliver, Emit, ImmediateHandler, RemoteDelivery};
pub use provision::Provisioner;
pub use record::{message_only, BoxFormat, LogRecord};
pub use worker::Worker;
pub use writer::RusotoLogsWriter;

pub fn handler(log_group: &str, log_stream: &str) -> RusotoLogsHandlerBuilder<(), BoxFormat> {
    RusotoLogsHandlerBuilder::new(log_group, log_stream)
}
