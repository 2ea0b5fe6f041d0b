//! Semantic fabric queries over a device session.
//!
//! Each query is a fixed EOS command. Nothing is parsed or cached here:
//! every call is a fresh round trip and returns the raw text.

use std::fmt;

use crate::driver::Connector;
use crate::session::{CommandResult, DeviceSession};

/// CLI command templates, EOS dialect.
pub mod commands {
    use std::fmt;

    pub const BGP_SUMMARY: &str = "show bgp summary";
    pub const BGP_NEIGHBORS: &str = "show bgp neighbors";
    pub const VXLAN_INTERFACE: &str = "show interface Vxlan1";
    pub const EVPN_ROUTES: &str = "show bgp evpn routes";
    pub const EVPN_MAC_IP_ROUTES: &str = "show bgp evpn route-type mac-ip";
    pub const INTERFACE_STATUS: &str = "show interfaces status";
    pub const IP_INTERFACE_BRIEF: &str = "show ip interface brief";

    /// Five-packet ping.
    pub fn ping(target: impl fmt::Display) -> String {
        format!("ping {target} count 5")
    }
}

/// Fabric queries against one device.
pub struct FabricProbe<C: Connector> {
    session: DeviceSession<C>,
}

impl<C: Connector> FabricProbe<C> {
    pub fn new(session: DeviceSession<C>) -> Self {
        Self { session }
    }

    /// Role of the device, e.g. `dc1-leaf1`.
    pub fn role(&self) -> &str {
        &self.session.identity().role
    }

    /// Management address.
    pub fn host(&self) -> &str {
        self.session.host()
    }

    /// Name used in check messages, e.g. `DC1 Leaf1`.
    pub fn display_name(&self) -> String {
        self.session.identity().display_name()
    }

    pub fn session(&self) -> &DeviceSession<C> {
        &self.session
    }

    /// BGP summary (`show bgp summary`).
    pub async fn get_bgp_summary(&mut self) -> CommandResult {
        self.session.send_command(commands::BGP_SUMMARY).await
    }

    /// BGP neighbor detail (`show bgp neighbors`).
    pub async fn get_bgp_neighbors(&mut self) -> CommandResult {
        self.session.send_command(commands::BGP_NEIGHBORS).await
    }

    /// VXLAN tunnel interface state (`show interface Vxlan1`).
    pub async fn get_vxlan_interface(&mut self) -> CommandResult {
        self.session.send_command(commands::VXLAN_INTERFACE).await
    }

    /// All EVPN routes (`show bgp evpn routes`).
    pub async fn get_evpn_routes(&mut self) -> CommandResult {
        self.session.send_command(commands::EVPN_ROUTES).await
    }

    /// EVPN type-2 routes (`show bgp evpn route-type mac-ip`).
    pub async fn get_evpn_mac_ip_routes(&mut self) -> CommandResult {
        self.session.send_command(commands::EVPN_MAC_IP_ROUTES).await
    }

    /// Physical interface status (`show interfaces status`).
    pub async fn get_interface_status(&mut self) -> CommandResult {
        self.session.send_command(commands::INTERFACE_STATUS).await
    }

    /// Layer-3 interfaces (`show ip interface brief`).
    pub async fn get_ip_interface_brief(&mut self) -> CommandResult {
        self.session.send_command(commands::IP_INTERFACE_BRIEF).await
    }

    /// Ping a target five times (`ping <target> count 5`).
    pub async fn ping(&mut self, target: impl fmt::Display) -> CommandResult {
        self.session.send_command(&commands::ping(target)).await
    }

    /// Any other command, verbatim.
    pub async fn send_command(&mut self, command: &str) -> CommandResult {
        self.session.send_command(command).await
    }

    /// Close the underlying session.
    pub async fn disconnect(&mut self) {
        self.session.disconnect().await;
    }
}

impl<C: Connector> fmt::Debug for FabricProbe<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FabricProbe")
            .field("session", &self.session)
            .finish()
    }
}
