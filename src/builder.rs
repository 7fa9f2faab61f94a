use std::sync::Arc;

use rusoto_core::Region;
use rusoto_logs::CloudWatchLogsClient;

use crate::client::LogsApi;
use crate::delivery::Delivery;
use crate::error::RusotoLogsError;
use crate::handler::{BufferedHandler, ImmediateHandler, RemoteDelivery};
use crate::provision::Provisioner;
use crate::record::{message_only, BoxFormat, LogRecord};
use crate::worker::Worker;
use crate::DEFAULT_FLUSH_THRESHOLD;

pub struct RusotoLogsHandlerBuilder<C, F> {
    client: Arc<C>,
    log_group: String,
    log_stream: String,
    format: F,
    flush_threshold: usize,
}

impl RusotoLogsHandlerBuilder<(), BoxFormat> {
    pub fn new(log_group: &str, log_stream: &str) -> Self {
        Self {
            client: Arc::new(()),
            log_group: log_group.to_string(),
            log_stream: log_stream.to_string(),
            format: Box::new(message_only),
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
        }
    }
}

impl<C, F> RusotoLogsHandlerBuilder<C, F> {
    pub fn with_client<C2>(self, client: C2) -> RusotoLogsHandlerBuilder<C2, F>
    where
        C2: LogsApi + 'static,
    {
        RusotoLogsHandlerBuilder {
            client: Arc::new(client),
            log_group: self.log_group,
            log_stream: self.log_stream,
            format: self.format,
            flush_threshold: self.flush_threshold,
        }
    }

    /// Uses a client for the region configured in the environment.
    pub fn default_client(self) -> RusotoLogsHandlerBuilder<CloudWatchLogsClient, F> {
        self.region(Region::default())
    }

    pub fn region(self, region: Region) -> RusotoLogsHandlerBuilder<CloudWatchLogsClient, F> {
        self.with_client(CloudWatchLogsClient::new(region))
    }

    pub fn format<F2>(self, format: F2) -> RusotoLogsHandlerBuilder<C, F2>
    where
        F2: Fn(&LogRecord) -> String + Send + Sync,
    {
        RusotoLogsHandlerBuilder {
            client: self.client,
            log_group: self.log_group,
            log_stream: self.log_stream,
            format,
            flush_threshold: self.flush_threshold,
        }
    }

    /// Batch size of the buffered handler, kept within `1..=10_000`.
    pub fn flush_threshold(mut self, flush_threshold: usize) -> Self {
        self.flush_threshold = flush_threshold;
        self
    }
}

impl<C, F> RusotoLogsHandlerBuilder<C, F>
where
    C: LogsApi + 'static,
    F: Fn(&LogRecord) -> String + Send + Sync,
{
    fn remote_delivery(&self) -> Result<RemoteDelivery<C>, RusotoLogsError> {
        let provisioner = Provisioner::new(self.client.clone(), &self.log_group, &self.log_stream);
        Ok(RemoteDelivery::new(
            Delivery::new(provisioner),
            Worker::spawn()?,
        ))
    }

    pub fn build_immediate(self) -> Result<ImmediateHandler<RemoteDelivery<C>, F>, RusotoLogsError> {
        let delivery = self.remote_delivery()?;
        Ok(ImmediateHandler::new(delivery, self.format))
    }

    pub fn build_buffered(self) -> Result<BufferedHandler<RemoteDelivery<C>, F>, RusotoLogsError> {
        let delivery = self.remote_delivery()?;
        Ok(BufferedHandler::new(
            delivery,
            self.format,
            self.flush_threshold,
        ))
    }
}
