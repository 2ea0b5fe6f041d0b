//! Device connections.
//!
//! [`Connector`] and [`Connection`] are the seam between the validation
//! harness and the remote management transport. The harness only needs to
//! open a connection for a [`DeviceIdentity`], send one command at a time,
//! and close it. [`SshConnector`] is the real implementation; tests use a
//! scripted connector instead.

mod generic;
#[cfg(test)]
pub(crate) mod mock;
mod profile;
mod response;

pub use generic::{SshConnection, SshConnector};
pub use profile::ConnectionProfile;
pub use response::Response;

use std::future::Future;

use crate::error::Result;
use crate::inventory::DeviceIdentity;

/// An open CLI session on one device.
pub trait Connection: Send {
    /// Send a command and wait for the prompt.
    ///
    /// Output that matches a platform failure marker is still `Ok`; the
    /// marker is recorded in [`Response::failure`].
    fn send_command(&mut self, command: &str) -> impl Future<Output = Result<Response>> + Send;

    /// Check if the underlying session is still running.
    fn is_alive(&self) -> bool;

    /// Close the session.
    fn close(self) -> impl Future<Output = Result<()>> + Send
    where
        Self: Sized;
}

/// Opens connections to devices.
///
/// Connect errors are classified with
/// [`Error::connect_fault_kind`](crate::Error::connect_fault_kind).
pub trait Connector: Send + Sync {
    /// Connection type produced by this connector.
    type Connection: Connection;

    /// Open a connection using the given profile.
    fn connect(
        &self,
        identity: &DeviceIdentity,
        profile: &ConnectionProfile,
    ) -> impl Future<Output = Result<Self::Connection>> + Send;
}
