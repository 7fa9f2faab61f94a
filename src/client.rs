use async_trait::async_trait;
use rusoto_logs::{
    CloudWatchLogs, CreateLogGroupRequest, CreateLogStreamRequest, DescribeLogGroupsRequest,
    DescribeLogStreamsRequest, InputLogEvent, LogGroup, LogStream, PutLogEventsRequest,
    PutLogEventsResponse,
};

use crate::error::RusotoLogsError;

/// The remote operations the handlers rely on.
///
/// Every [`CloudWatchLogs`] client implements this, so a
/// `rusoto_logs::CloudWatchLogsClient` can be handed over as-is.
#[async_trait]
pub trait LogsApi: Send + Sync {
    async fn create_group(&self, log_group: &str) -> Result<(), RusotoLogsError>;

    async fn create_stream(&self, log_group: &str, log_stream: &str)
        -> Result<(), RusotoLogsError>;

    /// Lists every group whose name starts with `prefix`.
    async fn describe_groups(&self, prefix: &str) -> Result<Vec<LogGroup>, RusotoLogsError>;

    /// Lists every stream of `log_group` whose name starts with `prefix`.
    async fn describe_streams(
        &self,
        log_group: &str,
        prefix: &str,
    ) -> Result<Vec<LogStream>, RusotoLogsError>;

    async fn put_events(
        &self,
        log_group: &str,
        log_stream: &str,
        events: Vec<InputLogEvent>,
    ) -> Result<PutLogEventsResponse, RusotoLogsError>;
}

#[async_trait]
impl<C> LogsApi for C
where
    C: CloudWatchLogs + Send + Sync,
{
    async fn create_group(&self, log_group: &str) -> Result<(), RusotoLogsError> {
        let request = CreateLogGroupRequest {
            log_group_name: log_group.to_string(),
            ..Default::default()
        };
        CloudWatchLogs::create_log_group(self, request).await?;
        Ok(())
    }

    async fn create_stream(
        &self,
        log_group: &str,
        log_stream: &str,
    ) -> Result<(), RusotoLogsError> {
        let request = CreateLogStreamRequest {
            log_group_name: log_group.to_string(),
            log_stream_name: log_stream.to_string(),
            ..Default::default()
        };
        CloudWatchLogs::create_log_stream(self, request).await?;
        Ok(())
    }

    async fn describe_groups(&self, prefix: &str) -> Result<Vec<LogGroup>, RusotoLogsError> {
        let mut groups = Vec::new();
        let mut next_token = None;
        loop {
            let request = DescribeLogGroupsRequest {
                log_group_name_prefix: Some(prefix.to_string()),
                next_token: next_token.take(),
                ..Default::default()
            };
            let response = CloudWatchLogs::describe_log_groups(self, request).await?;
            groups.extend(response.log_groups.unwrap_or_default());
            match response.next_token {
                Some(token) => next_token = Some(token),
                None => return Ok(groups),
            }
        }
    }

    async fn describe_streams(
        &self,
        log_group: &str,
        prefix: &str,
    ) -> Result<Vec<LogStream>, RusotoLogsError> {
        let mut streams = Vec::new();
        let mut next_token = None;
        loop {
            let request = DescribeLogStreamsRequest {
                log_group_name: log_group.to_string(),
                log_stream_name_prefix: Some(prefix.to_string()),
                next_token: next_token.take(),
                ..Default::default()
            };
            let response = CloudWatchLogs::describe_log_streams(self, request).await?;
            streams.extend(response.log_streams.unwrap_or_default());
            match response.next_token {
                Some(token) => next_token = Some(token),
                None => return Ok(streams),
            }
        }
    }

    async fn put_events(
        &self,
        log_group: &str,
        log_stream: &str,
        events: Vec<InputLogEvent>,
    ) -> Result<PutLogEventsResponse, RusotoLogsError> {
        // Sequence tokens are ignored by the service now.
        let request = PutLogEventsRequest {
            log_events: events,
            log_group_name: log_group.to_string(),
            log_stream_name: log_stream.to_string(),
            sequence_token: None,
            ..Default::default()
        };
        Ok(CloudWatchLogs::put_log_events(self, request).await?)
    }
}
