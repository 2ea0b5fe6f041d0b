//! The fixed connection profile every device session is opened with.

use std::path::PathBuf;
use std::time::Duration;

use crate::inventory::DeviceIdentity;
use crate::platform::PlatformDefinition;
use crate::transport::{HostKeyVerification, SshConfig};

/// Connection settings shared by every device in a run.
///
/// Slow virtual CLIs (cEOS under load) answer late, so every timeout is
/// the base timeout multiplied by `delay_factor`.
#[derive(Debug, Clone)]
pub struct ConnectionProfile {
    /// SSH port.
    pub port: u16,

    /// Timeout before the delay factor is applied.
    pub base_timeout: Duration,

    /// Response-timing multiplier.
    pub delay_factor: u32,

    /// Host key verification mode.
    pub host_key_verification: HostKeyVerification,

    /// known_hosts file, when verification is enabled.
    pub known_hosts_path: Option<PathBuf>,
}

impl Default for ConnectionProfile {
    fn default() -> Self {
        Self {
            port: 22,
            base_timeout: Duration::from_secs(30),
            delay_factor: 2,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }
}

impl ConnectionProfile {
    /// Set the SSH port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the base timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.base_timeout = timeout;
        self
    }

    /// Set the response-timing multiplier. Zero is treated as one.
    pub fn with_delay_factor(mut self, factor: u32) -> Self {
        self.delay_factor = factor.max(1);
        self
    }

    /// Set host key verification.
    pub fn with_host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Use a specific known_hosts file.
    pub fn with_known_hosts(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Effective timeout for connects and for each command.
    pub fn timeout(&self) -> Duration {
        self.base_timeout * self.delay_factor.max(1)
    }

    /// SSH settings for one device.
    pub fn ssh_config(&self, identity: &DeviceIdentity, platform: &PlatformDefinition) -> SshConfig {
        SshConfig {
            host: identity.host.clone(),
            port: self.port,
            username: identity.credentials.username.clone(),
            auth: identity.credentials.auth.clone(),
            timeout: self.timeout(),
            terminal_width: platform.terminal_width,
            terminal_height: platform.terminal_height,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path.clone(),
        }
    }
}
