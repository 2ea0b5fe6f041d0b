//! Platform definition for vendor-specific configurations.

use indexmap::IndexMap;
use regex::bytes::Regex;

use super::privilege_level::PrivilegeLevel;

/// Everything the SSH connection needs to know about a CLI dialect.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Platform name (e.g., "arista_eos").
    pub name: String,

    /// Privilege levels for this platform, root first.
    pub privilege_levels: IndexMap<String, PrivilegeLevel>,

    /// Privilege level commands are run from.
    pub default_privilege: String,

    /// Patterns that indicate command failure.
    pub failed_when_contains: Vec<String>,

    /// Commands to run once the session reaches the default privilege.
    pub on_open_commands: Vec<String>,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,
}

impl PlatformDefinition {
    /// Create a new platform definition with minimal required fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            privilege_levels: IndexMap::new(),
            default_privilege: String::new(),
            failed_when_contains: vec![],
            on_open_commands: vec![],
            terminal_width: 511,
            terminal_height: 24,
        }
    }

    /// Add a privilege level.
    pub fn with_privilege(mut self, level: PrivilegeLevel) -> Self {
        self.privilege_levels.insert(level.name.clone(), level);
        self
    }

    /// Set the default privilege level.
    pub fn with_default_privilege(mut self, name: impl Into<String>) -> Self {
        self.default_privilege = name.into();
        self
    }

    /// Add a failure pattern.
    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    /// Add an on_open command.
    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// Set terminal dimensions.
    pub fn with_terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Get a privilege level by name.
    pub fn get_privilege(&self, name: &str) -> Option<&PrivilegeLevel> {
        self.privilege_levels.get(name)
    }

    /// Build a regex matching the prompt of any privilege level.
    pub fn prompt_pattern(&self) -> Result<Regex, regex::Error> {
        let combined = self
            .privilege_levels
            .values()
            .map(|level| format!("(?:{})", level.prompt.as_str()))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&combined)
    }

    /// Determine the privilege level a prompt belongs to.
    pub fn determine_privilege(&self, prompt: &str) -> Option<&PrivilegeLevel> {
        self.privilege_levels
            .values()
            .find(|level| level.matches(prompt))
    }

    /// Return the first failure marker present in the output.
    pub fn detect_failure(&self, output: &str) -> Option<&str> {
        self.failed_when_contains
            .iter()
            .find(|pattern| output.contains(pattern.as_str()))
            .map(String::as_str)
    }

    /// Strip the command echo and the trailing prompt from raw output.
    pub fn normalize_output(&self, raw: &str, command: &str) -> String {
        let raw = raw.replace('\r', "");
        let output = raw.trim_start_matches('\n');
        let output = output
            .strip_prefix(command)
            .unwrap_or(output)
            .trim_start_matches('\n');

        // The last line is the prompt.
        match memchr::memrchr(b'\n', output.as_bytes()) {
            Some(pos) => output[..pos].to_string(),
            None if self.determine_privilege(output.trim_end()).is_some() => String::new(),
            None => output.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple() -> PlatformDefinition {
        PlatformDefinition::new("test")
            .with_privilege(PrivilegeLevel::new("exec", r"(?m)^\w+>\s?$").unwrap())
            .with_privilege(
                PrivilegeLevel::new("privilege_exec", r"(?m)^\w+#\s?$")
                    .unwrap()
                    .below("exec"),
            )
            .with_failure_pattern("% Invalid input")
    }

    #[test]
    fn test_normalize_strips_echo_and_prompt() {
        let platform = simple();
        let raw = "show bgp summary\r\nBGP summary information\r\nNeighbor 10.0.0.1\r\nspine1#";
        assert_eq!(
            platform.normalize_output(raw, "show bgp summary"),
            "BGP summary information\nNeighbor 10.0.0.1"
        );
    }

    #[test]
    fn test_normalize_empty_output() {
        let platform = simple();
        assert_eq!(platform.normalize_output("terminal length 0\r\nspine1#", "terminal length 0"), "");
        assert_eq!(platform.normalize_output("spine1#", "terminal length 0"), "");
    }

    #[test]
    fn test_detect_failure() {
        let platform = simple();
        assert_eq!(
            platform.detect_failure("% Invalid input (at token 1: 'bgpp')"),
            Some("% Invalid input")
        );
        assert_eq!(platform.detect_failure("BGP summary information"), None);
    }

    #[test]
    fn test_determine_privilege() {
        let platform = simple();
        assert_eq!(platform.determine_privilege("spine1>").unwrap().name, "exec");
        assert_eq!(
            platform.determine_privilege("spine1#").unwrap().name,
            "privilege_exec"
        );
        assert!(platform.determine_privilege("login:").is_none());
    }

    #[test]
    fn test_combined_prompt_pattern() {
        let pattern = simple().prompt_pattern().unwrap();
        assert!(pattern.is_match(b"output\nspine1#"));
        assert!(pattern.is_match(b"output\nspine1>"));
        assert!(!pattern.is_match(b"Password:"));
    }
}
