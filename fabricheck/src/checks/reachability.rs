//! Inter-DC reachability and routing-symmetry assertions.

use std::net::IpAddr;

use super::Verdict;
use super::markers::{contains_interface, ping_succeeded};

/// Ping output shows every packet answered.
pub fn ping_success(output: &str, message: &str) -> Verdict {
    if ping_succeeded(output) {
        Ok(())
    } else {
        Err(message.to_string())
    }
}

/// Every loopback answered. `results` pairs each target with its ping output.
pub fn all_reachable<S: AsRef<str>>(results: &[(IpAddr, S)]) -> Verdict {
    let unreachable: Vec<String> = results
        .iter()
        .filter(|(_, output)| !ping_succeeded(output.as_ref()))
        .map(|(target, _)| target.to_string())
        .collect();

    match unreachable.as_slice() {
        [] => Ok(()),
        [one] => Err(format!("Cannot reach loopback {one}")),
        many => Err(format!("Cannot reach loopbacks {}", many.join(", "))),
    }
}

/// The symmetric IRB routing loopback exists on a leaf.
pub fn routing_loopback_present(output: &str, device: &str, interface: &str) -> Verdict {
    if contains_interface(output, interface) {
        Ok(())
    } else {
        Err(format!("{interface} not configured on {device}"))
    }
}
