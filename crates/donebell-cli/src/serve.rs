use std::sync::Arc;

use donebell_config::NotifierConfig;
use donebell_hooks::{HandlerTable, ProcessInvoker, ShellInvoker, plugin_factory};
use donebell_plugin_sdk::{PluginContext, PluginFactory, run_plugin};
use donebell_types::LogMode;

/// The completion-notification plugin as served to a host.
pub struct CompletionNotificationPlugin {
    config: NotifierConfig,
    invoker: Arc<dyn ShellInvoker>,
}

impl CompletionNotificationPlugin {
    pub fn new(config: NotifierConfig, invoker: Arc<dyn ShellInvoker>) -> Self {
        Self { config, invoker }
    }
}

#[async_trait::async_trait]
impl PluginFactory for CompletionNotificationPlugin {
    fn name(&self) -> &str {
        "completion-notification"
    }

    fn quiet(&self) -> bool {
        self.config.mode == LogMode::Silent
    }

    async fn create(&self, context: PluginContext) -> anyhow::Result<HandlerTable> {
        Ok(plugin_factory(context, &self.config, self.invoker.clone()))
    }
}

pub async fn run_serve(config: NotifierConfig) -> anyhow::Result<()> {
    tracing::debug!(mode = %config.mode, "Serving plugin on stdio");
    let plugin = CompletionNotificationPlugin::new(config, Arc::new(ProcessInvoker));
    run_plugin(&plugin).await
}
