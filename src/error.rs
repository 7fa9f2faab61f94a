use std::error::Error;
use std::fmt;
use std::io;

use rusoto_core::RusotoError;
use rusoto_logs::{
    CreateLogGroupError, CreateLogStreamError, DescribeLogGroupsError, DescribeLogStreamsError,
    PutLogEventsError,
};

/// How a failed remote call should be treated by provisioning and delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AlreadyExists,
    NotFound,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    LogGroup,
    LogStream,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Resource::LogGroup => f.write_str("log group"),
            Resource::LogStream => f.write_str("log stream"),
        }
    }
}

#[derive(Debug)]
pub enum RusotoLogsError {
    RusotoError(RusotoError<std::convert::Infallible>),
    CreateLogGroupError(CreateLogGroupError),
    CreateLogStreamError(CreateLogStreamError),
    DescribeLogGroupsError(DescribeLogGroupsError),
    DescribeLogStreamsError(DescribeLogStreamsError),
    PutLogEventsError(PutLogEventsError),
    /// The resource was provisioned but no descriptor with the exact name was listed.
    Missing { resource: Resource, name: String },
    Runtime(io::Error),
    WorkerStopped,
}

impl RusotoLogsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RusotoLogsError::CreateLogGroupError(CreateLogGroupError::ResourceAlreadyExists(_))
            | RusotoLogsError::CreateLogStreamError(
                CreateLogStreamError::ResourceAlreadyExists(_),
            ) => ErrorKind::AlreadyExists,
            RusotoLogsError::CreateLogStreamError(CreateLogStreamError::ResourceNotFound(_))
            | RusotoLogsError::DescribeLogStreamsError(
                DescribeLogStreamsError::ResourceNotFound(_),
            )
            | RusotoLogsError::PutLogEventsError(PutLogEventsError::ResourceNotFound(_)) => {
                ErrorKind::NotFound
            }
            _ => ErrorKind::Other,
        }
    }
}

macro_rules! impl_from_rusoto_error {
    ($service_error:ident) => {
        impl From<RusotoError<$service_error>> for RusotoLogsError {
            fn from(error: RusotoError<$service_error>) -> Self {
                match error {
                    RusotoError::Service(error) => Self::$service_error(error),
                    RusotoError::HttpDispatch(err) => {
                        Self::RusotoError(RusotoError::HttpDispatch(err))
                    }
                    RusotoError::Credentials(err) => {
                        Self::RusotoError(RusotoError::Credentials(err))
                    }
                    RusotoError::Validation(msg) => Self::RusotoError(RusotoError::Validation(msg)),
                    RusotoError::ParseError(msg) => Self::RusotoError(RusotoError::ParseError(msg)),
                    RusotoError::Unknown(resp) => Self::RusotoError(RusotoError::Unknown(resp)),
                    RusotoError::Blocking => Self::RusotoError(RusotoError::Blocking),
                }
            }
        }
    };
}

impl_from_rusoto_error!(CreateLogGroupError);
impl_from_rusoto_error!(CreateLogStreamError);
impl_from_rusoto_error!(DescribeLogGroupsError);
impl_from_rusoto_error!(DescribeLogStreamsError);
impl_from_rusoto_error!(PutLogEventsError);

impl From<io::Error> for RusotoLogsError {
    fn from(error: io::Error) -> Self {
        Self::Runtime(error)
    }
}

impl fmt::Display for RusotoLogsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RusotoLogsError::RusotoError(err) => write!(f, "{}", err),
            RusotoLogsError::CreateLogGroupError(err) => write!(f, "{}", err),
            RusotoLogsError::CreateLogStreamError(err) => write!(f, "{}", err),
            RusotoLogsError::DescribeLogGroupsError(err) => write!(f, "{}", err),
            RusotoLogsError::DescribeLogStreamsError(err) => write!(f, "{}", err),
            RusotoLogsError::PutLogEventsError(err) => write!(f, "{}", err),
            RusotoLogsError::Missing { resource, name } => {
                write!(f, "{} {:?} is not listed after provisioning", resource, name)
            }
            RusotoLogsError::Runtime(err) => write!(f, "failed to start log worker: {}", err),
            RusotoLogsError::WorkerStopped => f.write_str("log worker stopped before replying"),
        }
    }
}

impl Error for RusotoLogsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RusotoLogsError::RusotoError(ref err) => Error::source(err),
            RusotoLogsError::CreateLogGroupError(ref err) => Error::source(err),
            RusotoLogsError::CreateLogStreamError(ref err) => Error::source(err),
            RusotoLogsError::DescribeLogGroupsError(ref err) => Error::source(err),
            RusotoLogsError::DescribeLogStreamsError(ref err) => Error::source(err),
            RusotoLogsError::PutLogEventsError(ref err) => Error::source(err),
            RusotoLogsError::Runtime(ref err) => Some(err),
            RusotoLogsError::Missing { .. } | RusotoLogsError::WorkerStopped => None,
        }
    }
}
