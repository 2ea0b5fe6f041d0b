//! Fabric checks.
//!
//! Assertions are plain functions over CLI text returning a [`Verdict`].
//! [`CheckKind`] binds each assertion to the probe queries that feed it, and
//! [`Check::run`] evaluates one against a [`FixtureScope`].

mod catalog;
pub mod interfaces;
pub mod markers;
pub mod overlay;
pub mod reachability;
pub mod underlay;

pub use catalog::{GROUPS, fabric_suite};

use std::net::IpAddr;

use crate::driver::Connector;
use crate::harness::{FixtureScope, Outcome};
use crate::inventory::display_name;

/// `Ok` when the invariant holds, otherwise the failure message.
pub type Verdict = Result<(), String>;

/// What a check asserts, and against which roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckKind {
    /// At least `expected` Established peers in the BGP summary.
    BgpPeersEstablished { role: String, expected: usize },

    /// `show bgp neighbors` reports an Established session.
    BgpNeighborsEstablished { role: String, message: String },

    /// EVPN routes carry the VNI.
    EvpnRoutes { role: String, vni: u32 },

    /// The Vxlan1 interface exists.
    VxlanInterface { role: String },

    /// Required interfaces are listed, optionally with none down.
    InterfacesUp {
        role: String,
        required: Vec<String>,
        forbid_notconnect: bool,
    },

    /// A ping from `role` to `target` loses nothing.
    Reachability {
        role: String,
        target: IpAddr,
        message: String,
    },

    /// The VNI is advertised by `local` and learned by `remote`.
    TenantVlanExtension {
        local: String,
        remote: String,
        vni: u32,
        vlan: u16,
    },

    /// The symmetric IRB routing loopback exists.
    RoutingLoopback { role: String, interface: String },

    /// Every target loopback answers a ping from `role`.
    LoopbacksReachable { role: String, targets: Vec<IpAddr> },

    /// Every BGP peer of `role` is Established.
    FabricConvergence { role: String },
}

impl CheckKind {
    /// Roles whose fixtures must be available before the check runs.
    pub fn roles(&self) -> Vec<&str> {
        match self {
            CheckKind::TenantVlanExtension { local, remote, .. } => vec![local.as_str(), remote.as_str()],
            CheckKind::BgpPeersEstablished { role, .. }
            | CheckKind::BgpNeighborsEstablished { role, .. }
            | CheckKind::EvpnRoutes { role, .. }
            | CheckKind::VxlanInterface { role }
            | CheckKind::InterfacesUp { role, .. }
            | CheckKind::Reachability { role, .. }
            | CheckKind::RoutingLoopback { role, .. }
            | CheckKind::LoopbacksReachable { role, .. }
            | CheckKind::FabricConvergence { role } => vec![role.as_str()],
        }
    }
}

/// A named assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub name: String,
    pub kind: CheckKind,
}

impl Check {
    pub fn new(name: impl Into<String>, kind: CheckKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Resolve fixtures, issue the queries and evaluate the assertion.
    pub async fn run<C: Connector>(&self, scope: &mut FixtureScope<'_, C>) -> Outcome {
        if let Err(reason) = scope.resolve(&self.kind.roles()).await {
            return Outcome::Skipped { reason };
        }

        macro_rules! probe {
            ($role:expr) => {
                match scope.probe($role) {
                    Some(probe) => probe,
                    None => {
                        return Outcome::Skipped {
                            reason: format!("Fixture {} is not available", $role),
                        }
                    }
                }
            };
        }

        let verdict = match &self.kind {
            CheckKind::BgpPeersEstablished { role, expected } => {
                let probe = probe!(role);
                let summary = probe.get_bgp_summary().await;
                underlay::bgp_peers_established(summary.text(), &probe.display_name(), *expected)
            }
            CheckKind::BgpNeighborsEstablished { role, message } => {
                let neighbors = probe!(role).get_bgp_neighbors().await;
                underlay::bgp_neighbors_established(neighbors.text(), message)
            }
            CheckKind::EvpnRoutes { role, vni } => {
                let probe = probe!(role);
                let routes = probe.get_evpn_routes().await;
                overlay::evpn_routes_present(routes.text(), &probe.display_name(), *vni)
            }
            CheckKind::VxlanInterface { role } => {
                let probe = probe!(role);
                let output = probe.get_vxlan_interface().await;
                overlay::vxlan_interface_present(output.text(), &probe.display_name())
            }
            CheckKind::InterfacesUp {
                role,
                required,
                forbid_notconnect,
            } => {
                let probe = probe!(role);
                let status = probe.get_interface_status().await;
                let device = probe.display_name();
                interfaces::interfaces_present(status.text(), &device, required).and_then(|()| {
                    if *forbid_notconnect {
                        interfaces::no_interface_down(status.text(), &device)
                    } else {
                        Ok(())
                    }
                })
            }
            CheckKind::Reachability {
                role,
                target,
                message,
            } => {
                let output = probe!(role).ping(target).await;
                reachability::ping_success(output.text(), message)
            }
            CheckKind::TenantVlanExtension {
                local,
                remote,
                vni,
                vlan,
            } => {
                let advertised = probe!(local).get_evpn_mac_ip_routes().await;
                let learned = probe!(remote).get_evpn_mac_ip_routes().await;

                let failures: Vec<String> = [
                    overlay::vni_present(
                        advertised.text(),
                        *vni,
                        &format!("VLAN{vlan} not advertised from {}", datacenter(local)),
                    ),
                    overlay::vni_present(
                        learned.text(),
                        *vni,
                        &format!("VLAN{vlan} not learned in {}", datacenter(remote)),
                    ),
                ]
                .into_iter()
                .filter_map(Result::err)
                .collect();

                if failures.is_empty() {
                    Ok(())
                } else {
                    Err(failures.join("; "))
                }
            }
            CheckKind::RoutingLoopback { role, interface } => {
                let probe = probe!(role);
                let brief = probe.get_ip_interface_brief().await;
                reachability::routing_loopback_present(brief.text(), &probe.display_name(), interface)
            }
            CheckKind::LoopbacksReachable { role, targets } => {
                let probe = probe!(role);
                let mut results = Vec::with_capacity(targets.len());
                for target in targets {
                    results.push((*target, probe.ping(target).await));
                }
                reachability::all_reachable(&results)
            }
            CheckKind::FabricConvergence { role } => {
                let summary = probe!(role).get_bgp_summary().await;
                underlay::bgp_converged(summary.text())
            }
        };

        verdict.into()
    }
}

/// Checks sharing one fixture scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckGroup {
    pub name: String,
    pub checks: Vec<Check>,
}

impl CheckGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            checks: Vec::new(),
        }
    }

    pub fn check(mut self, name: impl Into<String>, kind: CheckKind) -> Self {
        self.checks.push(Check::new(name, kind));
        self
    }
}

/// Ordered check groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suite {
    pub groups: Vec<CheckGroup>,
}

impl Suite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(mut self, group: CheckGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Keep only the named groups, in suite order. An empty filter keeps all.
    pub fn filter<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        if !names.is_empty() {
            self.groups
                .retain(|g| names.iter().any(|n| n.as_ref() == g.name));
        }
        self
    }

    /// Total number of checks.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.checks.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Datacenter part of a role, e.g. `DC1` for `dc1-leaf1`.
fn datacenter(role: &str) -> String {
    let site = role.split(['-', '_']).next().unwrap_or(role);
    display_name(site)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::driver::ConnectionProfile;
    use crate::driver::mock::{MockConnector, MockDevice};
    use crate::inventory::Inventory;

    const MAC_IP: &str = " * >      RD: 10.0.0.10:10100 mac-ip 0050.7966.6801";

    async fn run_one(connector: MockConnector, kind: CheckKind) -> (Outcome, Arc<MockConnector>) {
        let connector = Arc::new(connector);
        let inventory = Inventory::lab();
        let profile = ConnectionProfile::default();
        let mut scope = FixtureScope::new(connector.clone(), &inventory, &profile);
        let outcome = Check::new("check", kind).run(&mut scope).await;
        scope.teardown().await;
        (outcome, connector)
    }

    fn tenant() -> CheckKind {
        CheckKind::TenantVlanExtension {
            local: "dc1-leaf1".to_string(),
            remote: "dc2-leaf1".to_string(),
            vni: 10100,
            vlan: 100,
        }
    }

    #[test]
    fn test_roles() {
        assert_eq!(tenant().roles(), vec!["dc1-leaf1", "dc2-leaf1"]);
        let kind = CheckKind::VxlanInterface {
            role: "dc1-leaf1".to_string(),
        };
        assert_eq!(kind.roles(), vec!["dc1-leaf1"]);
    }

    #[test]
    fn test_datacenter() {
        assert_eq!(datacenter("dc1-leaf1"), "DC1");
        assert_eq!(datacenter("dc2-spine1"), "DC2");
    }

    #[tokio::test]
    async fn test_tenant_extension_both_sides() {
        let connector = MockConnector::new()
            .device("172.20.20.4", MockDevice::new().output("show bgp evpn route-type mac-ip", MAC_IP))
            .device("172.20.20.10", MockDevice::new().output("show bgp evpn route-type mac-ip", MAC_IP));
        let (outcome, _) = run_one(connector, tenant()).await;
        assert_eq!(outcome, Outcome::Passed);
    }

    #[tokio::test]
    async fn test_tenant_extension_sides_asserted_independently() {
        let connector = MockConnector::new()
            .device("172.20.20.4", MockDevice::new().output("show bgp evpn route-type mac-ip", MAC_IP))
            .device("172.20.20.10", MockDevice::new().output("show bgp evpn route-type mac-ip", ""));
        let (outcome, _) = run_one(connector, tenant()).await;
        assert_eq!(
            outcome,
            Outcome::Failed {
                message: "VLAN100 not learned in DC2".to_string()
            }
        );

        let connector = MockConnector::new()
            .device("172.20.20.4", MockDevice::new().output("show bgp evpn route-type mac-ip", ""))
            .device("172.20.20.10", MockDevice::new().output("show bgp evpn route-type mac-ip", MAC_IP));
        let (outcome, _) = run_one(connector, tenant()).await;
        assert_eq!(
            outcome,
            Outcome::Failed {
                message: "VLAN100 not advertised from DC1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_multi_role_check_skips_before_any_command() {
        let connector = MockConnector::new().device(
            "172.20.20.4",
            MockDevice::new().output("show bgp evpn route-type mac-ip", MAC_IP),
        );
        let (outcome, connector) = run_one(connector, tenant()).await;

        assert!(matches!(&outcome, Outcome::Skipped { reason } if reason.contains("172.20.20.10")));
        assert!(connector.stats("172.20.20.4").commands.is_empty());
        assert_eq!(connector.stats("172.20.20.4").closes, 1);
    }

    #[tokio::test]
    async fn test_interfaces_up_checks_presence_before_notconnect() {
        let status = "Et1   to-spine1   connected   routed\nEt3   host1   notconnect   100";
        let kind = CheckKind::InterfacesUp {
            role: "dc1-leaf1".to_string(),
            required: vec!["Ethernet1".to_string(), "Ethernet2".to_string()],
            forbid_notconnect: true,
        };
        let connector = MockConnector::new().device(
            "172.20.20.4",
            MockDevice::new().output("show interfaces status", status),
        );
        let (outcome, _) = run_one(connector, kind).await;
        assert_eq!(
            outcome,
            Outcome::Failed {
                message: "Ethernet2 not found on DC1 Leaf1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_loopbacks_reachable_pings_each_target() {
        let ok = "5 packets transmitted, 5 received, 0% packet loss, time 16ms";
        let kind = CheckKind::LoopbacksReachable {
            role: "dc1-spine1".to_string(),
            targets: vec!["10.0.0.1".parse().unwrap(), "10.0.1.10".parse().unwrap()],
        };
        let connector = MockConnector::new().device(
            "172.20.20.2",
            MockDevice::new().output("ping 10.0.0.1 count 5", ok),
        );
        let (outcome, connector) = run_one(connector, kind).await;

        assert_eq!(
            outcome,
            Outcome::Failed {
                message: "Cannot reach loopback 10.0.1.10".to_string()
            }
        );
        assert_eq!(
            connector.stats("172.20.20.2").commands,
            vec!["ping 10.0.0.1 count 5", "ping 10.0.1.10 count 5"]
        );
    }

    #[test]
    fn test_suite_filter() {
        let suite = Suite::new()
            .group(CheckGroup::new("underlay").check(
                "convergence",
                CheckKind::FabricConvergence {
                    role: "dc1-spine1".to_string(),
                },
            ))
            .group(CheckGroup::new("overlay"));

        assert_eq!(suite.clone().filter::<&str>(&[]).groups.len(), 2);
        let filtered = suite.filter(&["overlay"]);
        assert_eq!(filtered.groups.len(), 1);
        assert_eq!(filtered.groups[0].name, "overlay");
        assert!(filtered.is_empty());
    }
}
