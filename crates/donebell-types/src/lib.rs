use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Display name used when neither the project nor the directory yields one.
pub const UNKNOWN_PROJECT: &str = "Unknown Project";

// ──────────────────── Plugin Context ────────────────────

/// Project metadata handed over by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// Human-readable project name, if the host knows one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Any other host-provided project fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Everything the host passes to the plugin factory at load time.
///
/// `client` and `worktree` are opaque to this plugin and are only kept so the
/// context can be logged and round-tripped unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginContext {
    #[serde(default)]
    pub project: Option<ProjectInfo>,
    /// Absolute working directory of the host session.
    #[serde(default)]
    pub directory: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub worktree: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub client: Value,
}

impl PluginContext {
    /// Build a context from a directory and optional project name.
    pub fn new(directory: impl Into<String>, project_name: Option<String>) -> Self {
        Self {
            project: project_name.map(|name| ProjectInfo {
                name: Some(name),
                extra: Map::new(),
            }),
            directory: directory.into(),
            ..Default::default()
        }
    }

    /// Resolve the display name of the project.
    ///
    /// Prefers a non-empty `project.name`, then the last non-empty segment of
    /// `directory`, then [`UNKNOWN_PROJECT`].
    pub fn project_name(&self) -> String {
        if let Some(name) = self
            .project
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .filter(|n| !n.is_empty())
        {
            return name.to_string();
        }

        self.directory
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(UNKNOWN_PROJECT)
            .to_string()
    }
}

// ──────────────────── Events ────────────────────

/// A lifecycle event emitted by the host.
///
/// Only `type` is interpreted; every other field is carried along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl Event {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            rest: Map::new(),
        }
    }

    pub fn kind(&self) -> EventKind {
        EventKind::from(self.event_type.as_str())
    }
}

/// The event types this plugin reacts to. Everything else is `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// The session went idle: the agent finished responding.
    SessionIdle,
    /// A single message finished processing.
    MessageDone,
    Other(String),
}

impl From<&str> for EventKind {
    fn from(s: &str) -> Self {
        match s {
            "session.idle" => EventKind::SessionIdle,
            "message.done" => EventKind::MessageDone,
            other => EventKind::Other(other.to_string()),
        }
    }
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::SessionIdle => "session.idle",
            EventKind::MessageDone => "message.done",
            EventKind::Other(s) => s,
        }
    }
}

// ──────────────────── Tool Execution ────────────────────

/// Input record of a completed tool call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolExecuteInput {
    /// Tool name (e.g. "bash", "read").
    #[serde(default)]
    pub tool: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Output record of a completed tool call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolExecuteOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ──────────────────── Notifications ────────────────────

/// How much the plugin reports about its own activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    /// Log every event, tool execution and delivery outcome.
    #[default]
    Verbose,
    /// No logging; the notification command's output is suppressed.
    Silent,
}

impl LogMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogMode::Verbose => "verbose",
            LogMode::Silent => "silent",
        }
    }
}

impl fmt::Display for LogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verbose" => Ok(LogMode::Verbose),
            "silent" | "quiet" => Ok(LogMode::Silent),
            other => Err(format!("unknown log mode: {other} (expected verbose or silent)")),
        }
    }
}

/// A single push notification, as passed to the notification command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub message: String,
    pub title: String,
    /// 0 = normal, 1 = high.
    pub priority: i32,
    pub sound: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "urlTitle")]
    pub url_title: String,
}

impl NotificationRequest {
    /// A high-priority request with the default `pushover` sound and no link.
    pub fn new(message: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            title: title.into(),
            priority: 1,
            sound: "pushover".to_string(),
            url: String::new(),
            url_title: String::new(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = sound.into();
        self
    }

    /// Positional arguments in the order the notification command expects:
    /// message, title, priority, sound, url, url title.
    pub fn to_args(&self) -> Vec<String> {
        vec![
            self.message.clone(),
            self.title.clone(),
            self.priority.to_string(),
            self.sound.clone(),
            self.url.clone(),
            self.url_title.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_name_prefers_project() {
        let ctx: PluginContext = serde_json::from_str(
            r#"{"project":{"name":"Acme","id":"p1"},"directory":"/home/u/acme"}"#,
        )
        .unwrap();
        assert_eq!(ctx.project_name(), "Acme");
    }

    #[test]
    fn test_project_name_falls_back_to_directory() {
        let ctx: PluginContext =
            serde_json::from_str(r#"{"project":null,"directory":"/x/y/my-proj"}"#).unwrap();
        assert_eq!(ctx.project_name(), "my-proj");

        let ctx = PluginContext::new("/x/y/my-proj/", Some(String::new()));
        assert_eq!(ctx.project_name(), "my-proj");
    }

    #[test]
    fn test_project_name_unknown() {
        assert_eq!(PluginContext::new("", None).project_name(), UNKNOWN_PROJECT);
        assert_eq!(PluginContext::new("/", None).project_name(), UNKNOWN_PROJECT);
        let ctx: PluginContext = serde_json::from_str("{}").unwrap();
        assert_eq!(ctx.project_name(), UNKNOWN_PROJECT);
    }

    #[test]
    fn test_event_kind() {
        assert_eq!(Event::new("session.idle").kind(), EventKind::SessionIdle);
        assert_eq!(Event::new("message.done").kind(), EventKind::MessageDone);
        assert_eq!(
            Event::new("file.edited").kind(),
            EventKind::Other("file.edited".into())
        );
        assert_eq!(EventKind::Other("x".into()).as_str(), "x");
    }

    #[test]
    fn test_event_keeps_extra_fields() {
        let json = r#"{"type":"session.idle","properties":{"sessionID":"s1"}}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, "session.idle");
        assert_eq!(event.rest["properties"]["sessionID"], "s1");

        let back = serde_json::to_value(&event).unwrap();
        assert_eq!(back["type"], "session.idle");
        assert_eq!(back["properties"]["sessionID"], "s1");
    }

    #[test]
    fn test_log_mode_parse() {
        assert_eq!("verbose".parse::<LogMode>().unwrap(), LogMode::Verbose);
        assert_eq!(" Silent ".parse::<LogMode>().unwrap(), LogMode::Silent);
        assert!("loud".parse::<LogMode>().is_err());
        assert_eq!(serde_json::to_string(&LogMode::Silent).unwrap(), "\"silent\"");
    }

    #[test]
    fn test_notification_args() {
        let req = NotificationRequest::new("Agent completed response in Acme", "OpenCode Complete")
            .with_sound("bike");
        assert_eq!(
            req.to_args(),
            vec![
                "Agent completed response in Acme",
                "OpenCode Complete",
                "1",
                "bike",
                "",
                ""
            ]
        );

        let req = NotificationRequest::new("m", "t").with_priority(0);
        assert_eq!(req.to_args()[2], "0");
        assert_eq!(req.sound, "pushover");
    }

    #[test]
    fn test_tool_output_success_optional() {
        let out: ToolExecuteOutput =
            serde_json::from_str(r#"{"title":"ls","output":"a\nb"}"#).unwrap();
        assert!(out.success.is_none());
        assert_eq!(out.extra["title"], "ls");

        let input: ToolExecuteInput =
            serde_json::from_str(r#"{"tool":"bash","callID":"c1"}"#).unwrap();
        assert_eq!(input.tool, "bash");
    }
}
