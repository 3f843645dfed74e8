use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};

use donebell_config::NotifierConfig;
use donebell_hooks::{ProcessInvoker, plugin_factory};
use donebell_types::{Event, PluginContext};

/// Dispatch one event through a freshly built handler table.
///
/// Delivery failures are handled inside the table, so this only fails on bad
/// input (unreadable stdin, malformed event JSON, no current directory).
pub async fn run_emit(
    config: NotifierConfig,
    event_type: String,
    directory: Option<String>,
    project: Option<String>,
) -> anyhow::Result<()> {
    let event = if event_type == "-" {
        read_event(tokio::io::stdin()).await?
    } else {
        Event::new(event_type)
    };

    let directory = match directory {
        Some(dir) => dir,
        None => std::env::current_dir()?.to_string_lossy().into_owned(),
    };
    let context = PluginContext::new(directory, project);

    let table = plugin_factory(context, &config, Arc::new(ProcessInvoker));
    table.emit_event(event).await;
    Ok(())
}

/// Read an event object from a stream until EOF.
async fn read_event<R: AsyncRead + Unpin>(mut reader: R) -> anyhow::Result<Event> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw).await?;
    parse_event(&raw)
}

/// Accepts either a bare event (`{"type": ...}`) or the hook envelope
/// (`{"event": {"type": ...}}`).
fn parse_event(raw: &str) -> anyhow::Result<Event> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let inner = match value.get("event") {
        Some(event) if event.is_object() => event.clone(),
        _ => value,
    };
    Ok(serde_json::from_value(inner)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use donebell_types::EventKind;

    #[test]
    fn test_parse_bare_event() {
        let event = parse_event(r#"{"type":"session.idle","properties":{}}"#).unwrap();
        assert_eq!(event.kind(), EventKind::SessionIdle);
    }

    #[test]
    fn test_parse_envelope() {
        let event = parse_event(r#"{"event":{"type":"message.done"}}"#).unwrap();
        assert_eq!(event.kind(), EventKind::MessageDone);
    }

    #[tokio::test]
    async fn test_read_event_from_stream() {
        let input = br#"{"event":{"type":"session.idle","properties":{"sessionID":"s1"}}}
"#;
        let event = read_event(&input[..]).await.unwrap();
        assert_eq!(event.kind(), EventKind::SessionIdle);
        assert_eq!(event.rest["properties"]["sessionID"], "s1");

        assert!(read_event(&b""[..]).await.is_err());
    }

    #[test]
    fn test_parse_missing_type() {
        assert!(parse_event(r#"{"properties":{}}"#).is_err());
        assert!(parse_event("not json").is_err());
    }
}
