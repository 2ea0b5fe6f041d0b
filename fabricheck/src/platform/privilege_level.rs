//! CLI modes a session can sit in.

use regex::bytes::Regex;

/// How a mode is entered from its parent.
#[derive(Debug, Clone)]
pub struct Escalation {
    /// Command sent at the parent prompt, e.g. `enable`.
    pub command: String,

    /// Prompt asking for the device secret, when the command needs one.
    pub secret_prompt: Option<Regex>,
}

/// One CLI mode, recognised by its prompt.
///
/// Modes form a chain rooted at the login mode. Every other mode names
/// its parent and the [`Escalation`] that leads into it.
#[derive(Debug, Clone)]
pub struct PrivilegeLevel {
    /// Mode name, e.g. `privilege_exec`.
    pub name: String,

    /// Prompt of this mode.
    pub prompt: Regex,

    /// Mode this one is entered from.
    pub parent: Option<String>,

    pub escalation: Option<Escalation>,

    /// Markers that rule a prompt out even when [`prompt`](Self::prompt)
    /// matches. EOS ends both privileged and configuration prompts in `#`.
    pub excluded: Vec<String>,
}

impl PrivilegeLevel {
    pub fn new(name: impl Into<String>, prompt: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            prompt: Regex::new(prompt)?,
            parent: None,
            escalation: None,
            excluded: Vec::new(),
        })
    }

    pub fn below(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Entered by sending `command` with no secret.
    pub fn entered_with(mut self, command: impl Into<String>) -> Self {
        self.escalation = Some(Escalation {
            command: command.into(),
            secret_prompt: None,
        });
        self
    }

    /// Entered by sending `command` and answering `secret_prompt`.
    pub fn entered_with_secret(
        mut self,
        command: impl Into<String>,
        secret_prompt: &str,
    ) -> Result<Self, regex::Error> {
        self.escalation = Some(Escalation {
            command: command.into(),
            secret_prompt: Some(Regex::new(secret_prompt)?),
        });
        Ok(self)
    }

    pub fn excluding(mut self, marker: impl Into<String>) -> Self {
        self.excluded.push(marker.into());
        self
    }

    /// Whether a prompt line belongs to this mode.
    pub fn matches(&self, prompt: &str) -> bool {
        !self.excluded.iter().any(|marker| prompt.contains(marker.as_str()))
            && self.prompt.is_match(prompt.as_bytes())
    }

    /// Whether this mode is entered directly from `mode`.
    pub fn is_entered_from(&self, mode: Option<&str>) -> bool {
        self.parent.is_some() && self.parent.as_deref() == mode
    }
}
