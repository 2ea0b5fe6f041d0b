//! SSH transport layer wrapping russh.
//!
//! Connection setup, authentication, host key checks and the raw
//! read-until-prompt loop over one PTY shell channel.

pub mod config;
mod ssh;

pub use config::{AuthMethod, HostKeyVerification, SshConfig};
pub use ssh::SshTransport;
