//! Per-device session lifecycle.
//!
//! A [`DeviceSession`] owns at most one live connection to one device. No
//! error leaves this module: a failed connect is a [`ConnectFault`] value,
//! and anything that goes wrong while running a command becomes the text
//! of the [`CommandResult`].

use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::driver::{Connection, ConnectionProfile, Connector};
use crate::error::{ConnectFault, DriverError, TransportError};
use crate::inventory::DeviceIdentity;

/// Prefix of the text synthesized for a failed command.
pub const COMMAND_ERROR_PREFIX: &str = "Error executing command: ";

/// Text returned by one command, or the captured failure.
///
/// Checks treat both the same way: a captured failure simply will not
/// contain the markers they look for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    command: String,
    text: String,
    faulted: bool,
}

impl CommandResult {
    /// Output produced by the device.
    pub fn output(command: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            text: text.into(),
            faulted: false,
        }
    }

    /// A failure captured while issuing the command.
    pub fn fault(command: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            command: command.into(),
            text: format!("{COMMAND_ERROR_PREFIX}{error}"),
            faulted: true,
        }
    }

    /// The command that was issued.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Device output or error text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the text is a captured failure rather than device output.
    pub fn is_fault(&self) -> bool {
        self.faulted
    }
}

impl AsRef<str> for CommandResult {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One remote management connection to one device.
///
/// Sessions must be closed with [`disconnect`](Self::disconnect); there is
/// no async drop. Dropping a connected session only logs a warning.
pub struct DeviceSession<C: Connector> {
    identity: DeviceIdentity,
    profile: ConnectionProfile,
    connector: Arc<C>,
    connection: Option<C::Connection>,
}

impl<C: Connector> DeviceSession<C> {
    /// Create a disconnected session.
    pub fn new(identity: DeviceIdentity, profile: ConnectionProfile, connector: Arc<C>) -> Self {
        Self {
            identity,
            profile,
            connector,
            connection: None,
        }
    }

    /// Device this session talks to.
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Management address.
    pub fn host(&self) -> &str {
        &self.identity.host
    }

    /// Whether a connection handle is held.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Open the connection. Does nothing if already connected.
    pub async fn connect(&mut self) -> Result<(), ConnectFault> {
        if self.connection.is_some() {
            return Ok(());
        }

        info!(
            "Connecting to {} ({}, {})",
            self.identity.role, self.identity.host, self.identity.platform
        );
        match self.connector.connect(&self.identity, &self.profile).await {
            Ok(connection) => {
                self.connection = Some(connection);
                Ok(())
            }
            Err(e) => {
                let fault = ConnectFault::from_error(&self.identity.host, &e);
                warn!("{} ({})", fault, fault.kind);
                Err(fault)
            }
        }
    }

    /// Close the connection if one is held.
    pub async fn disconnect(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        debug!("Disconnecting from {}", self.identity.host);
        if let Err(e) = connection.close().await {
            warn!("Error closing session to {}: {}", self.identity.host, e);
        }
    }

    /// Issue a command verbatim and return its output.
    ///
    /// Connects first when no connection is held. A connection that died or
    /// lost track of its prompt is not reused or reopened: every later
    /// command returns error text.
    pub async fn send_command(&mut self, command: &str) -> CommandResult {
        if self.connection.is_none() {
            if let Err(fault) = self.connect().await {
                return CommandResult::fault(command, fault);
            }
        }

        let Some(connection) = self.connection.as_mut() else {
            return CommandResult::fault(command, DriverError::NotConnected);
        };
        if !connection.is_alive() {
            debug!("{}: session lost, not sending '{}'", self.identity.host, command);
            return CommandResult::fault(command, TransportError::Disconnected);
        }

        debug!("{} -> {}", self.identity.host, command);
        match connection.send_command(command).await {
            Ok(response) => {
                if let Some(marker) = &response.failure {
                    debug!("{}: '{}' output carries '{}'", self.identity.host, command, marker);
                }
                CommandResult::output(command, response.output)
            }
            Err(e) => {
                warn!("{}: '{}' failed: {}", self.identity.host, command, e);
                CommandResult::fault(command, e)
            }
        }
    }
}

impl<C: Connector> Drop for DeviceSession<C> {
    fn drop(&mut self) {
        if self.connection.is_some() {
            warn!(
                "Session to {} dropped while connected; call disconnect() first",
                self.identity.host
            );
        }
    }
}

impl<C: Connector> fmt::Debug for DeviceSession<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSession")
            .field("role", &self.identity.role)
            .field("host", &self.identity.host)
            .field("connected", &self.connection.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::{CommandFailure, ConnectFailure, MockConnector, MockDevice};
    use crate::error::ConnectFaultKind;
    use crate::inventory::Inventory;

    fn session(connector: &Arc<MockConnector>, role: &str) -> DeviceSession<MockConnector> {
        let identity = Inventory::lab().get(role).unwrap().clone();
        DeviceSession::new(identity, ConnectionProfile::default(), connector.clone())
    }

    #[tokio::test]
    async fn test_send_command_connects_lazily_once() {
        let connector = Arc::new(MockConnector::new().device(
            "172.20.20.2",
            MockDevice::new()
                .output("show bgp summary", "4 peers Established")
                .output("show bgp neighbors", "BGP state is Established"),
        ));
        let mut session = session(&connector, "dc1-spine1");
        assert!(!session.is_connected());

        let result = session.send_command("show bgp summary").await;
        assert_eq!(result.text(), "4 peers Established");
        assert!(!result.is_fault());
        session.send_command("show bgp neighbors").await;

        let stats = connector.stats("172.20.20.2");
        assert_eq!(stats.connects, 1);
        assert_eq!(stats.commands, vec!["show bgp summary", "show bgp neighbors"]);

        session.disconnect().await;
    }

    #[tokio::test]
    async fn test_connect_is_idempotent() {
        let connector = Arc::new(MockConnector::new().device("172.20.20.2", MockDevice::new()));
        let mut session = session(&connector, "dc1-spine1");

        session.connect().await.unwrap();
        session.connect().await.unwrap();
        assert_eq!(connector.stats("172.20.20.2").connects, 1);

        session.disconnect().await;
    }

    #[tokio::test]
    async fn test_connect_auth_fault_is_typed() {
        let connector = Arc::new(MockConnector::new().device(
            "172.20.20.4",
            MockDevice::new().connect_failure(ConnectFailure::Authentication),
        ));
        let mut session = session(&connector, "dc1-leaf1");

        let fault = session.connect().await.unwrap_err();
        assert_eq!(fault.kind, ConnectFaultKind::Authentication);
        assert_eq!(fault.host, "172.20.20.4");
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn test_connect_transport_fault_is_typed() {
        let connector = Arc::new(MockConnector::new().device(
            "172.20.20.8",
            MockDevice::new().connect_failure(ConnectFailure::Unreachable),
        ));
        let mut session = session(&connector, "dc2-spine1");

        let fault = session.connect().await.unwrap_err();
        assert_eq!(fault.kind, ConnectFaultKind::Transport);
    }

    #[tokio::test]
    async fn test_lazy_connect_failure_becomes_text() {
        let connector = Arc::new(MockConnector::new());
        let mut session = session(&connector, "dc1-spine1");

        let result = session.send_command("show bgp summary").await;
        assert!(result.is_fault());
        assert!(result.text().starts_with(COMMAND_ERROR_PREFIX));
        assert!(result.text().contains("172.20.20.2"));
        assert!(connector.stats("172.20.20.2").commands.is_empty());
    }

    #[tokio::test]
    async fn test_command_fault_becomes_text() {
        let connector = Arc::new(MockConnector::new().device(
            "172.20.20.4",
            MockDevice::new().command_failure("show interface Vxlan1", CommandFailure::Timeout),
        ));
        let mut session = session(&connector, "dc1-leaf1");

        let result = session.send_command("show interface Vxlan1").await;
        assert!(result.is_fault());
        assert_eq!(result.command(), "show interface Vxlan1");
        assert!(result.text().starts_with("Error executing command: "));
        assert!(result.text().contains("Pattern not found"));
        assert!(session.is_connected());

        session.disconnect().await;
    }

    #[tokio::test]
    async fn test_command_after_timeout_never_sees_stale_output() {
        let connector = Arc::new(MockConnector::new().device(
            "172.20.20.2",
            MockDevice::new()
                .command_failure("ping 10.0.0.1 count 5", CommandFailure::Timeout)
                .output("ping 10.0.0.2 count 5", "5 packets transmitted, 0 received, 100% packet loss"),
        ));
        let mut session = session(&connector, "dc1-spine1");

        let first = session.send_command("ping 10.0.0.1 count 5").await;
        assert!(first.is_fault());
        assert!(first.text().contains("Pattern not found"));

        let second = session.send_command("ping 10.0.0.2 count 5").await;
        assert!(second.is_fault());
        assert_eq!(second.text(), "Error executing command: Connection disconnected");
        assert!(!second.text().contains("packet loss"));

        session.disconnect().await;
        let stats = connector.stats("172.20.20.2");
        assert_eq!(stats.commands, vec!["ping 10.0.0.1 count 5"]);
        assert_eq!(stats.connects, 1);
        assert_eq!(stats.closes, 1);
    }

    #[tokio::test]
    async fn test_failure_marker_output_is_returned_verbatim() {
        let connector = Arc::new(MockConnector::new().device("172.20.20.4", MockDevice::new()));
        let mut session = session(&connector, "dc1-leaf1");

        let result = session.send_command("show bgp evpn routez").await;
        assert!(!result.is_fault());
        assert!(result.text().starts_with("% Invalid input"));

        session.disconnect().await;
    }

    #[tokio::test]
    async fn test_disconnect_never_connected_is_noop() {
        let connector = Arc::new(MockConnector::new().device("172.20.20.2", MockDevice::new()));
        let mut session = session(&connector, "dc1-spine1");

        session.disconnect().await;
        assert_eq!(connector.stats("172.20.20.2"), Default::default());
    }

    #[tokio::test]
    async fn test_disconnect_closes_once() {
        let connector = Arc::new(MockConnector::new().device("172.20.20.2", MockDevice::new()));
        let mut session = session(&connector, "dc1-spine1");

        session.connect().await.unwrap();
        session.disconnect().await;
        session.disconnect().await;

        assert_eq!(connector.stats("172.20.20.2").closes, 1);
        assert!(!session.is_connected());
    }

    #[test]
    fn test_command_result_display() {
        let result = CommandResult::fault("ping 10.0.1.10 count 5", "Channel closed");
        assert_eq!(result.to_string(), "Error executing command: Channel closed");
        assert_eq!(result.as_ref(), result.text());
    }
}
