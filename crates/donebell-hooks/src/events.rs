//! Hook names and the payloads delivered to them.

use serde::{Deserialize, Serialize};

use donebell_types::{Event, ToolExecuteInput, ToolExecuteOutput};

/// Hooks a plugin can expose in its handler table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookName {
    /// Every host lifecycle event.
    Event,
    /// After any tool call completes.
    ToolExecuteAfter,
}

impl HookName {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookName::Event => "event",
            HookName::ToolExecuteAfter => "tool.execute.after",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "event" => Some(HookName::Event),
            "tool.execute.after" => Some(HookName::ToolExecuteAfter),
            _ => None,
        }
    }
}

/// Data handed to a hook handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HookPayload {
    Event {
        event: Event,
    },
    ToolExecuteAfter {
        input: ToolExecuteInput,
        output: ToolExecuteOutput,
    },
}

impl HookPayload {
    /// The hook this payload is routed to.
    pub fn hook(&self) -> HookName {
        match self {
            HookPayload::Event { .. } => HookName::Event,
            HookPayload::ToolExecuteAfter { .. } => HookName::ToolExecuteAfter,
        }
    }
}
