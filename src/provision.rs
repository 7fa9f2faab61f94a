use std::sync::Arc;

use async_recursion::async_recursion;
use rusoto_logs::{LogGroup, LogStream};

use crate::client::LogsApi;
use crate::error::{ErrorKind, Resource, RusotoLogsError};

/// Makes sure the bound log group and log stream exist, creating them on demand.
pub struct Provisioner<C> {
    client: Arc<C>,
    log_group: String,
    log_stream: String,
}

impl<C> Provisioner<C> {
    pub fn new(client: Arc<C>, log_group: &str, log_stream: &str) -> Self {
        Self {
            client,
            log_group: log_group.to_string(),
            log_stream: log_stream.to_string(),
        }
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    pub fn log_group(&self) -> &str {
        &self.log_group
    }

    pub fn log_stream(&self) -> &str {
        &self.log_stream
    }
}

impl<C> Provisioner<C>
where
    C: LogsApi + 'static,
{
    /// Creates the log group unless it already exists and returns its descriptor.
    pub async fn ensure_group(&self) -> Result<LogGroup, RusotoLogsError> {
        match self.client.create_group(&self.log_group).await {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {}
            Err(err) => return Err(err),
        }
        self.client
            .describe_groups(&self.log_group)
            .await?
            .into_iter()
            .find(|group| group.log_group_name.as_deref() == Some(self.log_group.as_str()))
            .ok_or_else(|| RusotoLogsError::Missing {
                resource: Resource::LogGroup,
                name: self.log_group.clone(),
            })
    }

    /// Creates the log stream unless it already exists and returns its descriptor.
    ///
    /// A missing log group is created first, then stream creation is retried once.
    pub async fn ensure_stream(&self) -> Result<LogStream, RusotoLogsError> {
        self.ensure_stream_inner(false).await
    }

    #[async_recursion]
    async fn ensure_stream_inner(&self, retried: bool) -> Result<LogStream, RusotoLogsError> {
        match self
            .client
            .create_stream(&self.log_group, &self.log_stream)
            .await
        {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {}
            Err(err) if err.kind() == ErrorKind::NotFound && !retried => {
                self.ensure_group().await?;
                return self.ensure_stream_inner(true).await;
            }
            Err(err) => return Err(err),
        }
        self.client
            .describe_streams(&self.log_group, &self.log_stream)
            .await?
            .into_iter()
            .find(|stream| stream.log_stream_name.as_deref() == Some(self.log_stream.as_str()))
            .ok_or_else(|| RusotoLogsError::Missing {
                resource: Resource::LogStream,
                name: self.log_stream.clone(),
            })
    }
}
