//! Error types for fabricheck.
//!
//! Only the connection layers produce these errors. [`DeviceSession`]
//! converts every one of them into either a [`ConnectFault`] or an error
//! text before it reaches a check.
//!
//! [`DeviceSession`]: crate::session::DeviceSession

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for fabricheck operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Driver-level errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Platform/vendor errors
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Inventory loading errors
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
}

impl Error {
    /// Classify an error raised while opening a connection.
    ///
    /// Authentication failures are reported separately from everything
    /// else so a skip reason can tell "wrong credentials" from "host down".
    pub fn connect_fault_kind(&self) -> ConnectFaultKind {
        match self {
            Error::Transport(TransportError::AuthenticationFailed { .. })
            | Error::Transport(TransportError::Key(_))
            | Error::Driver(DriverError::PrivilegeAcquisitionFailed { .. }) => {
                ConnectFaultKind::Authentication
            }
            _ => ConnectFaultKind::Transport,
        }
    }
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Host presented a key that differs from known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// Host is not in known_hosts and verification is strict
    #[error("Host key for {host}:{port} is unknown")]
    HostKeyUnknown { host: String, port: u16 },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Connection was closed unexpectedly
    #[error("Connection disconnected")]
    Disconnected,

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Channel layer errors (prompt matching, PTY operations).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Prompt was not seen before the deadline
    #[error("Pattern not found within {0:?}")]
    PatternTimeout(Duration),

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// An earlier read gave up before its prompt; later output cannot be
    /// attributed to a command
    #[error("Session out of sync after an unanswered command")]
    OutOfSync,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),
}

/// Driver layer errors (command execution, privilege escalation).
#[derive(Error, Debug)]
pub enum DriverError {
    /// Driver not connected
    #[error("Driver not connected - call open() first")]
    NotConnected,

    /// Failed to acquire target privilege level
    #[error("Failed to acquire privilege level '{target}'")]
    PrivilegeAcquisitionFailed { target: String },

    /// Unknown privilege level detected
    #[error("Unknown privilege level from prompt: '{prompt}'")]
    UnknownPrivilege { prompt: String },
}

/// Platform/vendor definition errors.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// No platform is registered under this name
    #[error("Unknown platform '{name}'")]
    UnknownPlatform { name: String },

    /// A prompt pattern failed to compile
    #[error("Invalid prompt pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Inventory loading errors.
#[derive(Error, Debug)]
pub enum InventoryError {
    /// Inventory file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Inventory document is not valid JSON for the expected layout
    #[error("Malformed inventory: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two devices claim the same role
    #[error("Duplicate role '{role}'")]
    DuplicateRole { role: String },

    /// A device has no usable credentials
    #[error("Device '{role}' has neither a password nor a private key")]
    MissingCredentials { role: String },
}

/// Why a connection attempt did not produce a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectFaultKind {
    /// The device rejected the credentials or the enable secret.
    Authentication,
    /// Anything below authentication: DNS, TCP, SSH handshake, timeouts.
    Transport,
}

impl fmt::Display for ConnectFaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectFaultKind::Authentication => write!(f, "authentication fault"),
            ConnectFaultKind::Transport => write!(f, "transport fault"),
        }
    }
}

/// A failed connection attempt, as seen by the fixture layer.
///
/// This is a value, not an error to propagate: fixtures turn it into a
/// skip reason for every check that depends on the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectFault {
    /// Host that could not be reached.
    pub host: String,
    /// Fault classification.
    pub kind: ConnectFaultKind,
    /// Underlying error text.
    pub message: String,
}

impl ConnectFault {
    /// Build a fault from a connection error.
    pub fn from_error(host: impl Into<String>, error: &Error) -> Self {
        Self {
            host: host.into(),
            kind: error.connect_fault_kind(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for ConnectFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cannot connect to {}: {}", self.host, self.message)
    }
}

/// Result type alias using fabricheck's Error.
pub type Result<T> = std::result::Result<T, Error>;
