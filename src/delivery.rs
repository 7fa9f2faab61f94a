use std::error::Error;
use std::fmt;

use async_recursion::async_recursion;
use rusoto_logs::{InputLogEvent, PutLogEventsResponse};

use crate::client::LogsApi;
use crate::error::{ErrorKind, RusotoLogsError};
use crate::provision::Provisioner;

/// Sends log events to the bound stream, recreating the stream once if it went missing.
pub struct Delivery<C> {
    provisioner: Provisioner<C>,
}

impl<C> Delivery<C> {
    pub fn new(provisioner: Provisioner<C>) -> Self {
        Self { provisioner }
    }

    pub fn provisioner(&self) -> &Provisioner<C> {
        &self.provisioner
    }
}

impl<C> Delivery<C>
where
    C: LogsApi + 'static,
{
    /// Best-effort delivery.
    ///
    /// Remote failures are reported on stderr and swallowed. The only error returned
    /// is a failure to recreate a missing stream.
    pub async fn send(&self, events: Vec<InputLogEvent>) -> Result<(), RusotoLogsError> {
        match self.try_send(events).await {
            Ok(()) => Ok(()),
            Err(SendError::Provisioning(err)) => Err(err),
            Err(SendError::Delivery(err)) => {
                eprintln!(
                    "Failed to put log events to {}/{}: {}",
                    self.provisioner.log_group(),
                    self.provisioner.log_stream(),
                    err
                );
                Ok(())
            }
        }
    }

    /// Same as [`send`](Self::send) but hands every failure back to the caller.
    pub async fn try_send(&self, events: Vec<InputLogEvent>) -> Result<(), SendError> {
        self.try_send_inner(events, false).await
    }

    #[async_recursion]
    async fn try_send_inner(
        &self,
        mut events: Vec<InputLogEvent>,
        retried: bool,
    ) -> Result<(), SendError> {
        if events.is_empty() {
            return Ok(());
        }
        let attempt = if retried {
            std::mem::take(&mut events)
        } else {
            events.clone()
        };
        let result = self
            .provisioner
            .client()
            .put_events(
                self.provisioner.log_group(),
                self.provisioner.log_stream(),
                attempt,
            )
            .await;
        match result {
            Ok(response) => {
                report_rejected(&response);
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound && !retried => {
                self.provisioner
                    .ensure_stream()
                    .await
                    .map_err(SendError::Provisioning)?;
                self.try_send_inner(events, true).await
            }
            Err(err) => Err(SendError::Delivery(err)),
        }
    }
}

#[derive(Debug)]
pub enum SendError {
    /// The stream was missing and could not be recreated.
    Provisioning(RusotoLogsError),
    Delivery(RusotoLogsError),
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SendError::Provisioning(err) => write!(f, "failed to recreate log stream: {}", err),
            SendError::Delivery(err) => write!(f, "{}", err),
        }
    }
}

impl Error for SendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SendError::Provisioning(err) | SendError::Delivery(err) => Some(err),
        }
    }
}

impl SendError {
    pub fn into_inner(self) -> RusotoLogsError {
        match self {
            SendError::Provisioning(err) | SendError::Delivery(err) => err,
        }
    }
}

fn report_rejected(response: &PutLogEventsResponse) {
    if let Some(info) = &response.rejected_log_events_info {
        eprintln!(
            "Some log events were rejected (too new from {:?}, too old until {:?}, expired until {:?})",
            info.too_new_log_event_start_index,
            info.too_old_log_event_end_index,
            info.expired_log_event_end_index
        );
    }
}
