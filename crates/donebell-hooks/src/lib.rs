//! donebell-hooks: completion notifications for agent lifecycle events.
//!
//! The host hands the plugin a [`PluginContext`](donebell_types::PluginContext)
//! once; [`plugin_factory`] turns it into a [`HandlerTable`] whose hooks react
//! to `session.idle` / `message.done` events by running the notification
//! command through a [`ShellInvoker`].

pub mod error;
pub mod events;
pub mod invoker;
pub mod notifier;
pub mod registry;

pub use error::DeliveryError;
pub use events::{HookName, HookPayload};
pub use invoker::{CommandInvocation, InvocationOutput, ProcessInvoker, ShellInvoker};
pub use notifier::CompletionNotifier;
pub use registry::{HandlerTable, HookHandler, plugin_factory};
