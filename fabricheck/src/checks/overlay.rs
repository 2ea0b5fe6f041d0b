//! EVPN/VXLAN overlay assertions.

use super::Verdict;
use super::markers::{contains_interface, contains_number};

/// EVPN route output mentions the VNI.
pub fn evpn_routes_present(routes: &str, device: &str, vni: u32) -> Verdict {
    if contains_number(routes, &vni.to_string()) {
        Ok(())
    } else {
        Err(format!("No EVPN routes found on {device}"))
    }
}

/// `show interface Vxlan1` describes the tunnel interface.
pub fn vxlan_interface_present(output: &str, device: &str) -> Verdict {
    if contains_interface(output, "Vxlan1") {
        Ok(())
    } else {
        Err(format!("VXLAN interface not configured on {device}"))
    }
}

/// A VNI appears in MAC-IP route output on one side of the DCI.
pub fn vni_present(routes: &str, vni: u32, message: &str) -> Verdict {
    if contains_number(routes, &vni.to_string()) {
        Ok(())
    } else {
        Err(message.to_string())
    }
}
