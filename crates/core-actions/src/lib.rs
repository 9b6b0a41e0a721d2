//! core-actions: action descriptors, the resolver, plugins and the dispatcher.
//!
//! Actions are data: an id, the modes they are valid in, a trigger
//! [`Pattern`](core_keymap::Pattern) and a few behaviour flags. What an action
//! actually does is up to the [`EditorHost`] it is dispatched to.
//!
//! * [`registry`]: builds the frozen, per-mode action list and resolves keys
//!   against it.
//! * [`plugin`]: contract for contributing `<plug>` actions with default keys.
//! * [`dispatcher`]: the per-chord loop tying remappers, resolver and host
//!   together.

mod descriptor;
pub mod dispatcher;
pub mod plugin;
pub mod registry;

pub use descriptor::{ActionDescriptor, ActionFlags};
pub use dispatcher::{
    ActionContext, ActionResult, EditorHost, GuardToken, KeyDispatcher, KeyOutcome, RemapGuard,
};
pub use plugin::{ActionPlugin, PluginAction};
pub use registry::{ActionRegistry, RegistryBuilder, Resolution};
