//! BGP underlay assertions.

use super::Verdict;
use super::markers::{contains_token, count_established_peers, non_established_peers};

/// At least `expected` distinct neighbors report Established in `show bgp summary`.
pub fn bgp_peers_established(summary: &str, device: &str, expected: usize) -> Verdict {
    if count_established_peers(summary) >= expected {
        Ok(())
    } else {
        Err(format!("BGP peers not established on {device}"))
    }
}

/// `show bgp neighbors` reports an Established session.
pub fn bgp_neighbors_established(neighbors: &str, message: &str) -> Verdict {
    if contains_token(neighbors, "Established") {
        Ok(())
    } else {
        Err(message.to_string())
    }
}

/// Every peer in `show bgp summary` is Established.
pub fn bgp_converged(summary: &str) -> Verdict {
    if count_established_peers(summary) > 0 && non_established_peers(summary).is_empty() {
        Ok(())
    } else {
        Err("BGP has not converged".to_string())
    }
}
