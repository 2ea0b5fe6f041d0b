//! Arista EOS platform definition.
//!
//! Fabric checks only need the operational modes:
//! - `exec` - User EXEC mode with `>` prompt
//! - `privilege_exec` - Privileged EXEC mode with `#` prompt, entered with
//!   `enable` and the device secret
//!
//! # Prompt Examples
//!
//! ```text
//! dc1-leaf1>                         # exec mode
//! dc1-leaf1#                         # privilege_exec mode
//! dc1-leaf1(config)#                 # config mode, never matched
//! ```

use crate::platform::{PlatformDefinition, PrivilegeLevel};

/// Create the Arista EOS platform definition.
///
/// Uses `(?mi)` flags for multiline (^ matches line start) and
/// case-insensitive matching.
pub fn platform() -> PlatformDefinition {
    let exec = PrivilegeLevel::new("exec", r"(?mi)^[\w.\-@()/: ]{1,63}>\s?$").unwrap();

    let privilege_exec = PrivilegeLevel::new("privilege_exec", r"(?mi)^[\w.\-@/: ]{1,63}#\s?$")
        .unwrap()
        .below("exec")
        .entered_with_secret("enable", r"(?mi)^password:\s?$")
        .unwrap()
        .excluding("(config");

    PlatformDefinition::new("arista_eos")
        .with_privilege(exec)
        .with_privilege(privilege_exec)
        .with_default_privilege("privilege_exec")
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Error")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Invalid input")
        .with_failure_pattern("% Unavailable command")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 32767")
        .with_terminal_size(32767, 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arista_platform() {
        let platform = platform();
        assert_eq!(platform.name, "arista_eos");
        assert_eq!(platform.privilege_levels.len(), 2);
        assert_eq!(platform.default_privilege, "privilege_exec");
    }

    #[test]
    fn test_exec_prompt_match() {
        let platform = platform();
        let exec = platform.get_privilege("exec").unwrap();

        assert!(exec.matches("dc1-leaf1>"));
        assert!(exec.matches("dc1-leaf1> "));
        assert!(exec.matches("admin@dc2-spine1>"));
        assert!(!exec.matches("dc1-leaf1#"));
    }

    #[test]
    fn test_privilege_exec_prompt_match() {
        let platform = platform();
        let priv_exec = platform.get_privilege("privilege_exec").unwrap();

        assert!(priv_exec.matches("dc1-spine1#"));
        assert!(priv_exec.matches("dc1-spine1# "));
        assert!(!priv_exec.matches("dc1-spine1(config)#"));
        assert!(!priv_exec.matches("dc1-spine1(config-if-Et1)#"));
        assert!(!priv_exec.matches("dc1-spine1>"));
    }

    #[test]
    fn test_prompt_found_after_output() {
        let pattern = platform().prompt_pattern().unwrap();
        assert!(pattern.is_match(b"Vxlan1 is up, line protocol is up\ndc1-leaf1#"));
        assert!(!pattern.is_match(b"Vxlan1 is up, line protocol is up\n"));
    }

    #[test]
    fn test_enable_requires_secret() {
        let platform = platform();
        let priv_exec = platform.get_privilege("privilege_exec").unwrap();
        let escalation = priv_exec.escalation.as_ref().unwrap();
        assert_eq!(escalation.command, "enable");
        let auth = escalation.secret_prompt.as_ref().unwrap();
        assert!(auth.is_match(b"Password:"));
        assert!(auth.is_match(b"password: "));
    }

    #[test]
    fn test_failure_patterns() {
        let platform = platform();
        assert_eq!(
            platform.detect_failure("% Invalid input (at token 2: 'evpnn')"),
            Some("% Invalid input")
        );
    }

    #[test]
    fn test_on_open_commands() {
        let platform = platform();
        assert_eq!(
            platform.on_open_commands,
            vec!["terminal length 0".to_string(), "terminal width 32767".to_string()]
        );
    }
}
