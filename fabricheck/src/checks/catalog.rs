//! The default two-datacenter fabric suite.

use std::net::{IpAddr, Ipv4Addr};

use super::{CheckGroup, CheckKind, Suite};
use crate::inventory::Inventory;

/// Group names in execution order.
pub const GROUPS: [&str; 6] = [
    "underlay",
    "overlay",
    "interfaces",
    "reachability",
    "symmetric_irb",
    "smoke",
];

/// Established peers each spine is expected to have.
const SPINE_PEERS: usize = 4;

/// Tenant VLAN stretched between the datacenters, and its VNI.
const TENANT_VLAN: u16 = 100;
const TENANT_VNI: u32 = 10100;

/// DC2 leaf loopback, used when the inventory does not carry one.
const REMOTE_VTEP: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 1, 10));

fn role(name: &str) -> String {
    name.to_string()
}

/// Build the default suite for the given inventory.
///
/// Smoke reachability pings every loopback the inventory knows.
pub fn fabric_suite(inventory: &Inventory) -> Suite {
    let remote_vtep = inventory.loopback("dc2-leaf1").unwrap_or(REMOTE_VTEP);
    let bgp_established = |name: &str| CheckKind::BgpPeersEstablished {
        role: role(name),
        expected: SPINE_PEERS,
    };
    let interfaces = |name: &str, required: &[&str], forbid_notconnect: bool| CheckKind::InterfacesUp {
        role: role(name),
        required: required.iter().map(|s| s.to_string()).collect(),
        forbid_notconnect,
    };
    let loopback1 = |name: &str| CheckKind::RoutingLoopback {
        role: role(name),
        interface: "Loopback1".to_string(),
    };

    Suite::new()
        .group(
            CheckGroup::new("underlay")
                .check("dc1_spine1_bgp_established", bgp_established("dc1-spine1"))
                .check("dc1_spine2_bgp_established", bgp_established("dc1-spine2"))
                .check("dc2_spine1_bgp_established", bgp_established("dc2-spine1"))
                .check(
                    "inter_dc_bgp_established",
                    CheckKind::BgpNeighborsEstablished {
                        role: role("dc1-spine1"),
                        message: "Inter-DC BGP not established".to_string(),
                    },
                ),
        )
        .group(
            CheckGroup::new("overlay")
                .check(
                    "dc1_spine1_evpn_routes",
                    CheckKind::EvpnRoutes {
                        role: role("dc1-spine1"),
                        vni: TENANT_VNI,
                    },
                )
                .check(
                    "dc1_leaf1_vxlan_interface",
                    CheckKind::VxlanInterface {
                        role: role("dc1-leaf1"),
                    },
                )
                .check(
                    "dc2_leaf1_vxlan_interface",
                    CheckKind::VxlanInterface {
                        role: role("dc2-leaf1"),
                    },
                ),
        )
        .group(
            CheckGroup::new("interfaces")
                .check("dc1_spine1_interfaces_up", interfaces("dc1-spine1", &["Ethernet1"], true))
                .check(
                    "dc1_leaf1_interfaces_up",
                    interfaces("dc1-leaf1", &["Ethernet1", "Ethernet2"], false),
                )
                .check("dc2_leaf1_interfaces_up", interfaces("dc2-leaf1", &["Ethernet1"], false)),
        )
        .group(
            CheckGroup::new("reachability")
                .check(
                    "dc1_to_dc2_vxlan_tunnel",
                    CheckKind::Reachability {
                        role: role("dc1-leaf1"),
                        target: remote_vtep,
                        message: "VXLAN tunnel between DCs not working".to_string(),
                    },
                )
                .check(
                    "tenant_vlan_extension",
                    CheckKind::TenantVlanExtension {
                        local: role("dc1-leaf1"),
                        remote: role("dc2-leaf1"),
                        vni: TENANT_VNI,
                        vlan: TENANT_VLAN,
                    },
                ),
        )
        .group(
            CheckGroup::new("symmetric_irb")
                .check("dc1_leaf1_loopback1", loopback1("dc1-leaf1"))
                .check("dc2_leaf1_loopback1", loopback1("dc2-leaf1")),
        )
        .group(
            CheckGroup::new("smoke")
                .check(
                    "all_loopbacks_reachable",
                    CheckKind::LoopbacksReachable {
                        role: role("dc1-spine1"),
                        targets: inventory.loopbacks(),
                    },
                )
                .check(
                    "fabric_convergence",
                    CheckKind::FabricConvergence {
                        role: role("dc1-spine1"),
                    },
                ),
        )
}
