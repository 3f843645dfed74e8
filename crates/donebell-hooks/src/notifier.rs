//! Turning lifecycle events into notification commands.

use std::sync::Arc;

use donebell_config::{CommandConfig, NotifierConfig};
use donebell_types::{
    Event, EventKind, LogMode, NotificationRequest, PluginContext, ToolExecuteInput,
    ToolExecuteOutput,
};

use crate::error::DeliveryError;
use crate::invoker::{CommandInvocation, InvocationOutput, ShellInvoker};

const IDLE_TITLE_VERBOSE: &str = "OpenCode Completion";
const IDLE_TITLE_SILENT: &str = "OpenCode Complete";
const MESSAGE_DONE_TITLE: &str = "OpenCode Task Done";

/// Sends a push notification when the agent finishes work.
///
/// Delivery is best effort: every failure of the notification command is
/// caught here and never reaches the host. In [`LogMode::Verbose`] failures
/// are logged at `error`; in [`LogMode::Silent`] they are discarded.
pub struct CompletionNotifier {
    context: PluginContext,
    mode: LogMode,
    command: CommandConfig,
    invoker: Arc<dyn ShellInvoker>,
}

impl CompletionNotifier {
    pub fn new(
        context: PluginContext,
        config: &NotifierConfig,
        invoker: Arc<dyn ShellInvoker>,
    ) -> Self {
        Self {
            context,
            mode: config.mode,
            command: config.command.clone(),
            invoker,
        }
    }

    pub fn mode(&self) -> LogMode {
        self.mode
    }

    pub fn context(&self) -> &PluginContext {
        &self.context
    }

    fn verbose(&self) -> bool {
        self.mode == LogMode::Verbose
    }

    fn default_sound(&self) -> &'static str {
        match self.mode {
            LogMode::Verbose => "pushover",
            LogMode::Silent => "bike",
        }
    }

    /// The notification an event kind maps to, if any.
    pub fn request_for(&self, kind: &EventKind) -> Option<NotificationRequest> {
        match kind {
            EventKind::SessionIdle => {
                let title = match self.mode {
                    LogMode::Verbose => IDLE_TITLE_VERBOSE,
                    LogMode::Silent => IDLE_TITLE_SILENT,
                };
                let message = format!(
                    "Agent completed response in {}",
                    self.context.project_name()
                );
                Some(
                    NotificationRequest::new(message, title)
                        .with_priority(1)
                        .with_sound(self.default_sound()),
                )
            }
            EventKind::MessageDone if self.verbose() => {
                let message = format!(
                    "Message processing completed in {}",
                    self.context.project_name()
                );
                Some(
                    NotificationRequest::new(message, MESSAGE_DONE_TITLE)
                        .with_priority(0)
                        .with_sound("pushover"),
                )
            }
            EventKind::MessageDone | EventKind::Other(_) => None,
        }
    }

    /// Handle one host event. Never fails.
    pub async fn handle_event(&self, event: &Event) {
        if self.verbose() {
            tracing::info!(
                event_type = %event.event_type,
                payload = %serde_json::to_string(event).unwrap_or_default(),
                "Event received"
            );
        }

        if let Some(request) = self.request_for(&event.kind()) {
            self.send(&request).await;
        }
    }

    /// Observe a finished tool call. Only logs, and only in verbose mode.
    pub async fn handle_tool_execute_after(
        &self,
        input: &ToolExecuteInput,
        output: &ToolExecuteOutput,
    ) {
        if !self.verbose() {
            return;
        }

        tracing::info!(
            tool = %input.tool,
            input = %serde_json::to_string(input).unwrap_or_default(),
            output = %serde_json::to_string(output).unwrap_or_default(),
            "Tool executed"
        );

        if input.tool == "bash" && output.success == Some(true) {
            // Bash completions are observed but not notified.
            tracing::trace!("bash tool completed; no notification configured");
        }
    }

    /// Send a notification, swallowing any delivery failure.
    pub async fn send(&self, request: &NotificationRequest) {
        if self.verbose() {
            tracing::info!(
                "Sending notification: {} - {}",
                request.title,
                request.message
            );
        }

        match self.try_send(request).await {
            Ok(output) => {
                if self.verbose() {
                    tracing::info!("Notification sent successfully");
                    if !output.stdout.trim().is_empty() {
                        tracing::debug!(stdout = %output.stdout.trim(), "notification command output");
                    }
                }
            }
            Err(e) => {
                if self.verbose() {
                    tracing::error!(error = %e, "Failed to send notification");
                }
            }
        }
    }

    /// Send a notification and report the outcome.
    pub async fn try_send(
        &self,
        request: &NotificationRequest,
    ) -> Result<InvocationOutput, DeliveryError> {
        let invocation = self.invocation_for(request);
        self.invoker.run(&invocation).await
    }

    /// The full command line for a request.
    pub fn invocation_for(&self, request: &NotificationRequest) -> CommandInvocation {
        let mut args = self.command.args.clone();
        args.extend(request.to_args());
        CommandInvocation::new(self.command.program.clone(), args).quiet(!self.verbose())
    }
}
