//! Marker matching over raw CLI text.
//!
//! Plain substring tests are too loose for CLI output: `Ethernet1` is a
//! substring of `Ethernet10` and `0% packet loss` of `100% packet loss`.
//! These helpers match whole tokens and whole numbers instead.

use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::LazyLock;

use regex::Regex;

static PACKET_LOSS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)% packet loss").unwrap());

static SUCCESS_RATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)success rate is (\d+) percent").unwrap());

/// BGP FSM states other than Established.
const NON_ESTABLISHED_STATES: [&str; 5] = ["Idle", "Connect", "Active", "OpenSent", "OpenConfirm"];

/// Long interface prefixes and the short forms EOS prints in tables.
const INTERFACE_ABBREVIATIONS: [(&str, &str); 6] = [
    ("Ethernet", "Et"),
    ("Loopback", "Lo"),
    ("Port-Channel", "Po"),
    ("Management", "Ma"),
    ("Vxlan", "Vx"),
    ("Vlan", "Vl"),
];

/// Split a line into tokens, dropping separators and trailing punctuation.
pub fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '(' | ')' | '[' | ']' | '|' | '"'))
        .map(|token| token.trim_end_matches([':', '.']))
        .filter(|token| !token.is_empty())
}

/// Whether any whole token equals `token`.
pub fn contains_token(text: &str, token: &str) -> bool {
    text.lines().any(|line| tokens(line).any(|t| t == token))
}

/// Whether the interface appears as a token, in long or short form.
pub fn contains_interface(text: &str, name: &str) -> bool {
    let short = INTERFACE_ABBREVIATIONS
        .iter()
        .find_map(|(long, short)| name.strip_prefix(long).map(|rest| format!("{short}{rest}")));

    text.lines().any(|line| {
        tokens(line).any(|t| {
            t.eq_ignore_ascii_case(name)
                || short.as_deref().is_some_and(|s| t.eq_ignore_ascii_case(s))
        })
    })
}

/// Whether `number` occurs with no digit directly before or after it.
pub fn contains_number(text: &str, number: &str) -> bool {
    let bytes = text.as_bytes();
    text.match_indices(number).any(|(start, matched)| {
        let end = start + matched.len();
        let before = start.checked_sub(1).map(|i| bytes[i]);
        let after = bytes.get(end).copied();
        !before.is_some_and(|b| b.is_ascii_digit()) && !after.is_some_and(|b| b.is_ascii_digit())
    })
}

/// Packet loss percentage reported by ping, if any.
pub fn packet_loss(text: &str) -> Option<f64> {
    PACKET_LOSS
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

/// Whether ping output reports every packet answered.
pub fn ping_succeeded(text: &str) -> bool {
    if let Some(loss) = packet_loss(text) {
        return loss == 0.0;
    }
    SUCCESS_RATE
        .captures(text)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .is_some_and(|rate| rate == 100)
}

/// Number of distinct neighbors reporting Established.
///
/// A neighbor is the address leading its row. Multi-AFI summaries repeat a
/// neighbor once per address family, so rows are not peers.
pub fn count_established_peers(text: &str) -> usize {
    text.lines()
        .filter(|line| tokens(line).any(|t| t == "Established"))
        .filter_map(|line| tokens(line).next()?.parse::<IpAddr>().ok())
        .collect::<HashSet<_>>()
        .len()
}

/// Lines reporting a peer in any state other than Established.
pub fn non_established_peers(text: &str) -> Vec<&str> {
    text.lines()
        .filter(|line| tokens(line).any(|t| NON_ESTABLISHED_STATES.contains(&t)))
        .collect()
}
