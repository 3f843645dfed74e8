//! Handler table: the hooks a plugin instance exposes to its host.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use donebell_config::NotifierConfig;
use donebell_types::{Event, LogMode, PluginContext, ToolExecuteInput, ToolExecuteOutput};

use crate::events::{HookName, HookPayload};
use crate::invoker::ShellInvoker;
use crate::notifier::CompletionNotifier;

/// Async hook handler function type.
pub type HookHandler =
    Arc<dyn Fn(HookPayload) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Maps hook names to handlers.
pub struct HandlerTable {
    handlers: HashMap<HookName, Vec<HookHandler>>,
}

impl HandlerTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for a hook.
    pub fn on(&mut self, hook: HookName, handler: HookHandler) {
        self.handlers.entry(hook).or_default().push(handler);
    }

    /// Whether any handler is registered for `hook`.
    pub fn has(&self, hook: HookName) -> bool {
        self.handlers.get(&hook).is_some_and(|h| !h.is_empty())
    }

    /// Names of the registered hooks, in a stable order.
    pub fn hooks(&self) -> Vec<&'static str> {
        [HookName::Event, HookName::ToolExecuteAfter]
            .into_iter()
            .filter(|h| self.has(*h))
            .map(|h| h.as_str())
            .collect()
    }

    /// Dispatch a payload to every handler of its hook.
    ///
    /// Handlers run one after another and are awaited before this returns.
    /// Payloads for hooks with no handlers are dropped.
    pub async fn emit(&self, payload: HookPayload) {
        let Some(handler_list) = self.handlers.get(&payload.hook()) else {
            return;
        };
        for handler in handler_list {
            handler(payload.clone()).await;
        }
    }

    pub async fn emit_event(&self, event: Event) {
        self.emit(HookPayload::Event { event }).await;
    }

    pub async fn emit_tool_execute_after(
        &self,
        input: ToolExecuteInput,
        output: ToolExecuteOutput,
    ) {
        self.emit(HookPayload::ToolExecuteAfter { input, output }).await;
    }
}

impl Default for HandlerTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the completion-notification handler table for a host context.
///
/// `event` is always registered; `tool.execute.after` only in verbose mode.
pub fn plugin_factory(
    context: PluginContext,
    config: &NotifierConfig,
    invoker: Arc<dyn ShellInvoker>,
) -> HandlerTable {
    if config.mode == LogMode::Verbose {
        tracing::info!(
            project = %context.project_name(),
            directory = %context.directory,
            "Completion notification plugin initialized"
        );
    }

    let notifier = Arc::new(CompletionNotifier::new(context, config, invoker));
    let mut table = HandlerTable::new();

    let n = notifier.clone();
    table.on(
        HookName::Event,
        Arc::new(move |payload: HookPayload| {
            let n = n.clone();
            Box::pin(async move {
                if let HookPayload::Event { event } = payload {
                    n.handle_event(&event).await;
                }
            })
        }),
    );

    if notifier.mode() == LogMode::Verbose {
        let n = notifier.clone();
        table.on(
            HookName::ToolExecuteAfter,
            Arc::new(move |payload: HookPayload| {
                let n = n.clone();
                Box::pin(async move {
                    if let HookPayload::ToolExecuteAfter { input, output } = payload {
                        n.handle_tool_execute_after(&input, &output).await;
                    }
                })
            }),
        );
    }

    table
}
