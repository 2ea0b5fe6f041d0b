//! SSH connection that works with any platform definition.

use std::time::{Duration, Instant};

use log::{debug, warn};
use regex::bytes::Regex;
use secrecy::{ExposeSecret, SecretString};

use super::profile::ConnectionProfile;
use super::response::Response;
use super::{Connection, Connector};
use crate::error::{DriverError, PlatformError, Result};
use crate::inventory::DeviceIdentity;
use crate::platform::PlatformDefinition;
use crate::transport::SshTransport;

/// Opens [`SshConnection`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct SshConnector;

impl Connector for SshConnector {
    type Connection = SshConnection;

    async fn connect(
        &self,
        identity: &DeviceIdentity,
        profile: &ConnectionProfile,
    ) -> Result<SshConnection> {
        SshConnection::open(identity, profile).await
    }
}

/// A live CLI session on one device, sitting at the platform's default
/// privilege level.
///
/// Handles:
/// - prompt detection after every command
/// - `enable` with the device secret
/// - the platform's session setup commands
/// - output normalisation and failure markers
pub struct SshConnection {
    /// Management address, for logging.
    host: String,

    /// Platform definition.
    platform: PlatformDefinition,

    /// SSH transport.
    transport: SshTransport,

    /// Combined prompt pattern for all privilege levels.
    prompt_pattern: Regex,

    /// Per-read timeout.
    timeout: Duration,

    /// Current privilege level name.
    current_privilege: Option<String>,
}

impl SshConnection {
    /// Connect, reach the default privilege level, and run the platform's
    /// on-open commands.
    pub async fn open(identity: &DeviceIdentity, profile: &ConnectionProfile) -> Result<Self> {
        let platform = identity.platform.definition();
        let prompt_pattern = platform.prompt_pattern().map_err(PlatformError::from)?;
        let transport = SshTransport::connect(profile.ssh_config(identity, &platform)).await?;

        let mut connection = Self {
            host: identity.host.clone(),
            platform,
            transport,
            prompt_pattern,
            timeout: profile.timeout(),
            current_privilege: None,
        };

        let prompt = connection.read_until_prompt().await?;
        connection.update_privilege(&prompt);
        debug!(
            "{}: initial prompt '{}' ({:?})",
            connection.host, prompt, connection.current_privilege
        );

        connection
            .acquire_default_privilege(&identity.credentials.secret)
            .await?;

        for command in connection.platform.on_open_commands.clone() {
            connection.send_command(&command).await?;
        }

        Ok(connection)
    }

    /// Current privilege level name.
    pub fn current_privilege(&self) -> Option<&str> {
        self.current_privilege.as_deref()
    }

    /// Read until any prompt, returning the prompt line.
    async fn read_until_prompt(&mut self) -> Result<String> {
        let data = self
            .transport
            .read_until_pattern(&self.prompt_pattern, self.timeout)
            .await?;
        Ok(last_line(&String::from_utf8_lossy(&data)))
    }

    fn update_privilege(&mut self, prompt: &str) {
        if let Some(level) = self.platform.determine_privilege(prompt) {
            self.current_privilege = Some(level.name.clone());
        }
    }

    /// Escalate from the parent level into the default level.
    async fn acquire_default_privilege(&mut self, secret: &SecretString) -> Result<()> {
        let target = self.platform.default_privilege.clone();
        if self.current_privilege.as_deref() == Some(target.as_str()) {
            return Ok(());
        }

        let level = self
            .platform
            .get_privilege(&target)
            .cloned()
            .ok_or_else(|| DriverError::UnknownPrivilege {
                prompt: target.clone(),
            })?;

        let Some(escalation) = level
            .escalation
            .as_ref()
            .filter(|_| level.is_entered_from(self.current_privilege.as_deref()))
        else {
            return Err(DriverError::PrivilegeAcquisitionFailed { target }.into());
        };

        debug!("{}: escalating to {} with '{}'", self.host, target, escalation.command);
        self.transport.send(&escalation.command).await?;

        match &escalation.secret_prompt {
            Some(secret_prompt) => {
                let either = Regex::new(&format!(
                    "(?:{})|(?:{})",
                    secret_prompt.as_str(),
                    self.prompt_pattern.as_str()
                ))
                .map_err(PlatformError::from)?;

                let data = self.transport.read_until_pattern(&either, self.timeout).await?;
                let line = last_line(&String::from_utf8_lossy(&data));
                if secret_prompt.is_match(line.as_bytes()) {
                    self.transport.send(secret.expose_secret()).await?;
                    let prompt = self.read_until_prompt().await?;
                    self.update_privilege(&prompt);
                } else {
                    self.update_privilege(&line);
                }
            }
            None => {
                let prompt = self.read_until_prompt().await?;
                self.update_privilege(&prompt);
            }
        }

        if self.current_privilege.as_deref() != Some(target.as_str()) {
            return Err(DriverError::PrivilegeAcquisitionFailed { target }.into());
        }
        Ok(())
    }
}

impl Connection for SshConnection {
    async fn send_command(&mut self, command: &str) -> Result<Response> {
        let start = Instant::now();

        self.transport.send(command).await?;
        let data = self
            .transport
            .read_until_pattern(&self.prompt_pattern, self.timeout)
            .await?;

        let elapsed = start.elapsed();
        let raw = String::from_utf8_lossy(&data);
        let prompt = last_line(&raw);
        self.update_privilege(&prompt);

        let output = self.platform.normalize_output(&raw, command);
        let failure = self.platform.detect_failure(&output).map(str::to_string);
        let response = Response::new(command, output, prompt, elapsed);

        Ok(match failure {
            Some(marker) => {
                warn!("{}: '{}' returned '{}'", self.host, command, marker);
                response.with_failure(marker)
            }
            None => response,
        })
    }

    fn is_alive(&self) -> bool {
        self.transport.is_alive()
    }

    async fn close(self) -> Result<()> {
        debug!("{}: closing session", self.host);
        self.transport.close().await
    }
}

/// Last non-empty line of some output, trimmed.
fn last_line(output: &str) -> String {
    output
        .trim_end()
        .rsplit('\n')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}
