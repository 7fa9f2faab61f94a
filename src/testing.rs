//! In-memory stand-ins for the remote service and for delivery.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusoto_core::RusotoError;
use rusoto_logs::{
    CreateLogGroupError, CreateLogStreamError, DescribeLogStreamsError, InputLogEvent, LogGroup,
    LogStream, PutLogEventsError, PutLogEventsResponse,
};

use crate::client::LogsApi;
use crate::error::RusotoLogsError;
use crate::handler::Deliver;

pub fn event(timestamp: i64, message: &str) -> InputLogEvent {
    InputLogEvent {
        timestamp,
        message: message.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateGroup(String),
    CreateStream(String, String),
    DescribeGroups(String),
    DescribeStreams(String, String),
    Put(String, String, usize),
}

#[derive(Default)]
struct State {
    groups: BTreeMap<String, BTreeMap<String, Vec<InputLogEvent>>>,
    calls: Vec<Call>,
    create_group_failures: VecDeque<RusotoLogsError>,
    create_stream_failures: VecDeque<RusotoLogsError>,
    put_failures: VecDeque<RusotoLogsError>,
    reversed_listing: bool,
    hide_listings: bool,
}

/// Behaves like the log service: names are unique, listings are prefix filtered.
#[derive(Clone, Default)]
pub struct FakeLogs {
    state: Arc<Mutex<State>>,
}

impl FakeLogs {
    pub fn with_stream(self, log_group: &str, log_stream: &str) -> Self {
        self.state
            .lock()
            .groups
            .entry(log_group.to_string())
            .or_default()
            .insert(log_stream.to_string(), Vec::new());
        self
    }

    /// Lists descriptors in reverse name order.
    pub fn reversed_listing(self) -> Self {
        self.state.lock().reversed_listing = true;
        self
    }

    /// Describe calls return nothing, as if the listing lagged behind creation.
    pub fn hiding_listings(self) -> Self {
        self.state.lock().hide_listings = true;
        self
    }

    pub fn fail_next_create_group(&self, err: RusotoLogsError) {
        self.state.lock().create_group_failures.push_back(err);
    }

    pub fn fail_next_create_stream(&self, err: RusotoLogsError) {
        self.state.lock().create_stream_failures.push_back(err);
    }

    pub fn fail_next_put(&self, err: RusotoLogsError) {
        self.state.lock().put_failures.push_back(err);
    }

    pub fn delete_stream(&self, log_group: &str, log_stream: &str) {
        if let Some(streams) = self.state.lock().groups.get_mut(log_group) {
            streams.remove(log_stream);
        }
    }

    pub fn has_group(&self, log_group: &str) -> bool {
        self.state.lock().groups.contains_key(log_group)
    }

    pub fn has_stream(&self, log_group: &str, log_stream: &str) -> bool {
        self.state
            .lock()
            .groups
            .get(log_group)
            .map_or(false, |streams| streams.contains_key(log_stream))
    }

    pub fn events(&self, log_group: &str, log_stream: &str) -> Vec<InputLogEvent> {
        self.state
            .lock()
            .groups
            .get(log_group)
            .and_then(|streams| streams.get(log_stream))
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn put_batches(&self) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Put(_, _, len) => Some(len),
                _ => None,
            })
            .collect()
    }
}

fn listing<T>(
    names: Vec<&String>,
    reversed: bool,
    hidden: bool,
    make: impl Fn(&str) -> T,
) -> Vec<T> {
    if hidden {
        return Vec::new();
    }
    let mut items: Vec<T> = names.into_iter().map(|name| make(name.as_str())).collect();
    if reversed {
        items.reverse();
    }
    items
}

#[async_trait]
impl LogsApi for FakeLogs {
    async fn create_group(&self, log_group: &str) -> Result<(), RusotoLogsError> {
        let mut state = self.state.lock();
        state.calls.push(Call::CreateGroup(log_group.to_string()));
        if let Some(err) = state.create_group_failures.pop_front() {
            return Err(err);
        }
        if state.groups.contains_key(log_group) {
            return Err(RusotoError::Service(CreateLogGroupError::ResourceAlreadyExists(
                log_group.to_string(),
            ))
            .into());
        }
        state.groups.insert(log_group.to_string(), BTreeMap::new());
        Ok(())
    }

    async fn create_stream(
        &self,
        log_group: &str,
        log_stream: &str,
    ) -> Result<(), RusotoLogsError> {
        let mut state = self.state.lock();
        state.calls.push(Call::CreateStream(
            log_group.to_string(),
            log_stream.to_string(),
        ));
        if let Some(err) = state.create_stream_failures.pop_front() {
            return Err(err);
        }
        let streams = match state.groups.get_mut(log_group) {
            Some(streams) => streams,
            None => {
                return Err(RusotoError::Service(CreateLogStreamError::ResourceNotFound(
                    log_group.to_string(),
                ))
                .into())
            }
        };
        if streams.contains_key(log_stream) {
            return Err(RusotoError::Service(CreateLogStreamError::ResourceAlreadyExists(
                log_stream.to_string(),
            ))
            .into());
        }
        streams.insert(log_stream.to_string(), Vec::new());
        Ok(())
    }

    async fn describe_groups(&self, prefix: &str) -> Result<Vec<LogGroup>, RusotoLogsError> {
        let mut state = self.state.lock();
        state.calls.push(Call::DescribeGroups(prefix.to_string()));
        let names = state
            .groups
            .keys()
            .filter(|name| name.starts_with(prefix))
            .collect();
        Ok(listing(
            names,
            state.reversed_listing,
            state.hide_listings,
            |name| LogGroup {
                log_group_name: Some(name.to_string()),
                arn: Some(format!("arn:aws:logs:local:0:log-group:{}", name)),
                ..Default::default()
            },
        ))
    }

    async fn describe_streams(
        &self,
        log_group: &str,
        prefix: &str,
    ) -> Result<Vec<LogStream>, RusotoLogsError> {
        let mut state = self.state.lock();
        state.calls.push(Call::DescribeStreams(
            log_group.to_string(),
            prefix.to_string(),
        ));
        let streams = match state.groups.get(log_group) {
            Some(streams) => streams,
            None => {
                return Err(RusotoError::Service(DescribeLogStreamsError::ResourceNotFound(
                    log_group.to_string(),
                ))
                .into())
            }
        };
        let names = streams
            .keys()
            .filter(|name| name.starts_with(prefix))
            .collect();
        Ok(listing(
            names,
            state.reversed_listing,
            state.hide_listings,
            |name| LogStream {
                log_stream_name: Some(name.to_string()),
                ..Default::default()
            },
        ))
    }

    async fn put_events(
        &self,
        log_group: &str,
        log_stream: &str,
        events: Vec<InputLogEvent>,
    ) -> Result<PutLogEventsResponse, RusotoLogsError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Put(
            log_group.to_string(),
            log_stream.to_string(),
            events.len(),
        ));
        if let Some(err) = state.put_failures.pop_front() {
            return Err(err);
        }
        if events
            .windows(2)
            .any(|pair| pair[1].timestamp < pair[0].timestamp)
        {
            return Err(RusotoError::Service(PutLogEventsError::InvalidParameter(
                "Log events in a single PutLogEvents request must be in chronological order"
                    .to_string(),
            ))
            .into());
        }
        match state
            .groups
            .get_mut(log_group)
            .and_then(|streams| streams.get_mut(log_stream))
        {
            Some(stored) => {
                stored.extend(events);
                Ok(PutLogEventsResponse::default())
            }
            None => Err(RusotoError::Service(PutLogEventsError::ResourceNotFound(
                log_stream.to_string(),
            ))
            .into()),
        }
    }
}

/// Records every batch instead of sending it.
#[derive(Default)]
pub struct RecordingDelivery {
    batches: Mutex<Vec<Vec<InputLogEvent>>>,
    failures: Mutex<VecDeque<RusotoLogsError>>,
}

impl RecordingDelivery {
    pub fn batches(&self) -> Vec<Vec<InputLogEvent>> {
        self.batches.lock().clone()
    }

    pub fn fail_next(&self, err: RusotoLogsError) {
        self.failures.lock().push_back(err);
    }
}

impl Deliver for RecordingDelivery {
    fn deliver(&self, events: Vec<InputLogEvent>) -> Result<(), RusotoLogsError> {
        self.batches.lock().push(events);
        match self.failures.lock().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
