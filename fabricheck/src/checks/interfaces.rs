//! Interface health assertions.

use super::Verdict;
use super::markers::contains_interface;

/// Every required interface is listed. Fails on the first missing one.
pub fn interfaces_present(status: &str, device: &str, required: &[String]) -> Verdict {
    match required.iter().find(|name| !contains_interface(status, name)) {
        Some(missing) => Err(format!("{missing} not found on {device}")),
        None => Ok(()),
    }
}

/// No interface reports a not-connected state.
pub fn no_interface_down(status: &str, device: &str) -> Verdict {
    let status = status.to_lowercase();
    if status.contains("notconnect") || status.contains("not connected") {
        Err(format!("Some interfaces are down on {device}"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEAF_STATUS: &str = "\
Port       Name        Status       Vlan     Duplex Speed  Type            Flags Encapsulation
Et1        to-spine1   connected    routed   full   1G     EbraTestPhyPort
Et2        to-spine2   connected    routed   full   1G     EbraTestPhyPort
Et3        host1       notconnect   100      full   1G     EbraTestPhyPort";

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_required_interfaces_present() {
        assert_eq!(
            interfaces_present(LEAF_STATUS, "DC1 Leaf1", &names(&["Ethernet1", "Ethernet2"])),
            Ok(())
        );
    }

    #[test]
    fn test_missing_ethernet2_named() {
        let status = "Et1        to-spine1   connected    routed";
        assert_eq!(
            interfaces_present(status, "DC1 Leaf1", &names(&["Ethernet1", "Ethernet2"])),
            Err("Ethernet2 not found on DC1 Leaf1".to_string())
        );
    }

    #[test]
    fn test_notconnect_detected() {
        assert_eq!(
            no_interface_down(LEAF_STATUS, "DC1 Leaf1"),
            Err("Some interfaces are down on DC1 Leaf1".to_string())
        );
        let spine = "Et1   to-leaf1   connected   routed\nEt2   to-leaf2   connected   routed";
        assert_eq!(no_interface_down(spine, "DC1 Spine1"), Ok(()));
    }
}
