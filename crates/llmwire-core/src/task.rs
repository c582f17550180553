//! Task model shared by both transports

use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of LLM task.
///
/// Carries the one-byte identifier used by the binary protocol and selects
/// the HTTP endpoint and JSON shape for the SSE protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    /// Single prompt
    Prompt,
    /// Fill in the middle (FIM)
    FillInMiddle,
}

impl TaskKind {
    /// Wire identifier written after the `BeginOfRequest` tag
    pub const fn wire_id(self) -> u8 {
        match self {
            Self::Prompt => 0x01,
            Self::FillInMiddle => 0x02,
        }
    }

    /// Look up a kind by its wire identifier
    pub fn from_wire_id(id: u8) -> Option<Self> {
        match id {
            0x01 => Some(Self::Prompt),
            0x02 => Some(Self::FillInMiddle),
            _ => None,
        }
    }

    /// Human-readable title
    pub fn title(self) -> &'static str {
        match self {
            Self::Prompt => "Prompt",
            Self::FillInMiddle => "Fill-in-Middle",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One request to the inference server.
///
/// A task is immutable once built. The constructors guarantee that a
/// fill-in-middle task always carries a prefix and a suffix (possibly empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    kind: TaskKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fim_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fim_suffix: Option<String>,
}

impl Task {
    /// Create a prompt task
    pub fn prompt(system_prompt: Option<String>, prompt: impl Into<String>) -> Self {
        Self {
            kind: TaskKind::Prompt,
            system_prompt,
            prompt: Some(prompt.into()),
            fim_prefix: None,
            fim_suffix: None,
        }
    }

    /// Create a fill-in-middle task.
    ///
    /// `prompt` is optional instruction text layered on top of the FIM context.
    pub fn fill_in_middle(
        system_prompt: Option<String>,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        prompt: Option<String>,
    ) -> Self {
        Self {
            kind: TaskKind::FillInMiddle,
            system_prompt,
            prompt,
            fim_prefix: Some(prefix.into()),
            fim_suffix: Some(suffix.into()),
        }
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub fn prompt_text(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn fim_prefix(&self) -> Option<&str> {
        self.fim_prefix.as_deref()
    }

    pub fn fim_suffix(&self) -> Option<&str> {
        self.fim_suffix.as_deref()
    }

    /// Check the FIM invariant.
    ///
    /// Tasks built through the constructors always pass; deserialized tasks
    /// may not.
    pub fn validate(&self) -> ClientResult<()> {
        if self.kind == TaskKind::FillInMiddle
            && (self.fim_prefix.is_none() || self.fim_suffix.is_none())
        {
            return Err(ClientError::config(
                "Fill-in-Middle task requires both a prefix and a suffix",
            ));
        }
        Ok(())
    }
}
