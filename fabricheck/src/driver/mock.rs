//! Scripted in-memory connector for tests.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{Connection, ConnectionProfile, Connector, Response};
use crate::error::{ChannelError, Result, TransportError};
use crate::inventory::DeviceIdentity;

/// How a scripted connect attempt fails.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ConnectFailure {
    Authentication,
    Unreachable,
}

/// How a scripted command fails. Either leaves the connection unusable.
#[derive(Debug, Clone, Copy)]
pub(crate) enum CommandFailure {
    Timeout,
    SessionDropped,
}

/// Scripted behavior of one device.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockDevice {
    connect_failure: Option<ConnectFailure>,
    outputs: HashMap<String, String>,
    failures: HashMap<String, CommandFailure>,
}

impl MockDevice {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn output(mut self, command: &str, output: &str) -> Self {
        self.outputs.insert(command.to_string(), output.to_string());
        self
    }

    pub(crate) fn command_failure(mut self, command: &str, failure: CommandFailure) -> Self {
        self.failures.insert(command.to_string(), failure);
        self
    }

    pub(crate) fn connect_failure(mut self, failure: ConnectFailure) -> Self {
        self.connect_failure = Some(failure);
        self
    }
}

/// What happened to one host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct HostStats {
    pub(crate) connects: usize,
    pub(crate) closes: usize,
    pub(crate) commands: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MockConnector {
    devices: HashMap<String, MockDevice>,
    stats: Arc<Mutex<HashMap<String, HostStats>>>,
}

impl MockConnector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn device(mut self, host: &str, device: MockDevice) -> Self {
        self.devices.insert(host.to_string(), device);
        self
    }

    pub(crate) fn stats(&self, host: &str) -> HostStats {
        self.stats
            .lock()
            .unwrap()
            .get(host)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, host: &str, update: impl FnOnce(&mut HostStats)) {
        update(self.stats.lock().unwrap().entry(host.to_string()).or_default());
    }
}

impl Connector for MockConnector {
    type Connection = MockConnection;

    async fn connect(
        &self,
        identity: &DeviceIdentity,
        profile: &ConnectionProfile,
    ) -> Result<MockConnection> {
        self.record(&identity.host, |s| s.connects += 1);

        let Some(device) = self.devices.get(&identity.host) else {
            return Err(TransportError::ConnectionFailed {
                host: identity.host.clone(),
                port: profile.port,
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            }
            .into());
        };

        match device.connect_failure {
            Some(ConnectFailure::Authentication) => Err(TransportError::AuthenticationFailed {
                user: identity.credentials.username.clone(),
            }
            .into()),
            Some(ConnectFailure::Unreachable) => Err(TransportError::Timeout(profile.timeout()).into()),
            None => Ok(MockConnection {
                host: identity.host.clone(),
                device: device.clone(),
                stats: self.stats.clone(),
                broken: None,
            }),
        }
    }
}

pub(crate) struct MockConnection {
    host: String,
    device: MockDevice,
    stats: Arc<Mutex<HashMap<String, HostStats>>>,
    broken: Option<CommandFailure>,
}

impl MockConnection {
    fn record(&self, update: impl FnOnce(&mut HostStats)) {
        update(self.stats.lock().unwrap().entry(self.host.clone()).or_default());
    }
}

impl Connection for MockConnection {
    async fn send_command(&mut self, command: &str) -> Result<Response> {
        match self.broken {
            Some(CommandFailure::Timeout) => return Err(ChannelError::OutOfSync.into()),
            Some(CommandFailure::SessionDropped) => return Err(ChannelError::Closed.into()),
            None => {}
        }
        self.record(|s| s.commands.push(command.to_string()));

        if let Some(&failure) = self.device.failures.get(command) {
            self.broken = Some(failure);
            return Err(match failure {
                CommandFailure::Timeout => ChannelError::PatternTimeout(Duration::from_secs(60)).into(),
                CommandFailure::SessionDropped => ChannelError::Closed.into(),
            });
        }

        let prompt = format!("{}#", self.host);
        Ok(match self.device.outputs.get(command) {
            Some(output) => Response::new(command, output.as_str(), prompt, Duration::ZERO),
            None => {
                let output = format!("% Invalid input (at token 0: '{command}')");
                Response::new(command, output.as_str(), prompt, Duration::ZERO)
                    .with_failure("% Invalid input")
            }
        })
    }

    fn is_alive(&self) -> bool {
        self.broken.is_none()
    }

    async fn close(self) -> Result<()> {
        self.record(|s| s.closes += 1);
        Ok(())
    }
}
