//! SSH connection configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

/// How server host keys are checked against known_hosts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HostKeyVerification {
    /// The device must already be in known_hosts with the same key.
    Strict,

    /// Unknown devices are learned; a changed key is rejected.
    AcceptNew,

    /// No checking. Lab fabrics are redeployed with fresh keys.
    #[default]
    Disabled,
}

impl FromStr for HostKeyVerification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" | "yes" => Ok(Self::Strict),
            "accept-new" => Ok(Self::AcceptNew),
            "off" | "no" | "disabled" => Ok(Self::Disabled),
            other => Err(format!(
                "unknown host key mode '{other}' (expected strict, accept-new or off)"
            )),
        }
    }
}

/// Everything needed to open one device's SSH session.
#[derive(Debug, Clone)]
pub struct SshConfig {
    /// Management address.
    pub host: String,

    pub port: u16,

    pub username: String,

    pub auth: AuthMethod,

    /// Connect timeout, and the SSH inactivity timeout.
    pub timeout: Duration,

    /// PTY size requested from the device.
    pub terminal_width: u32,
    pub terminal_height: u32,

    pub host_key_verification: HostKeyVerification,

    /// known_hosts file; the user's default file when unset.
    pub known_hosts_path: Option<PathBuf>,
}

impl SshConfig {
    /// `host:port`, for logging.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// SSH login method. Secrets stay wrapped until the handshake.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    Password(SecretString),

    PrivateKey {
        path: PathBuf,
        passphrase: Option<SecretString>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = SshConfig {
            host: "172.20.20.2".to_string(),
            port: 22,
            username: "admin".to_string(),
            auth: AuthMethod::Password(SecretString::from("admin")),
            timeout: Duration::from_secs(60),
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        };
        assert_eq!(config.socket_addr(), "172.20.20.2:22");
    }

    #[test]
    fn test_host_key_mode_from_str() {
        assert_eq!("strict".parse(), Ok(HostKeyVerification::Strict));
        assert_eq!("accept-new".parse(), Ok(HostKeyVerification::AcceptNew));
        assert_eq!("off".parse(), Ok(HostKeyVerification::Disabled));
        assert!("maybe".parse::<HostKeyVerification>().is_err());
    }

    #[test]
    fn test_password_is_redacted_in_debug() {
        let auth = AuthMethod::Password(SecretString::from("hunter2"));
        assert!(!format!("{auth:?}").contains("hunter2"));
    }
}
