//! Action registry and incremental resolver.
//!
//! Descriptors are registered once at startup through [`RegistryBuilder`]
//! (plugin contributions included) and frozen into an [`ActionRegistry`]
//! indexed by mode. Resolution is stateless: given the effective mode, the
//! keys since the last matched action and the recorded state, it answers
//! whether an action matched, could still match, or never will.

use ahash::AHashMap;
use core_keymap::Chord;
use core_remap::PluginBinding;
use core_state::{Mode, RecordedState};
use tracing::{debug, trace};

use crate::plugin::{ActionPlugin, accept};
use crate::{ActionDescriptor, ActionFlags};

/// Answer for the keys typed so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    Matched(&'a ActionDescriptor),
    /// Some action could still match with more keys.
    Waiting,
    NoMatch,
}

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    descriptors: Vec<ActionDescriptor>,
    plugin_bindings: Vec<PluginBinding>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a descriptor. Earlier registrations win ties during resolution.
    pub fn register(&mut self, descriptor: ActionDescriptor) -> &mut Self {
        trace!(target: "actions.resolve", id = descriptor.id.as_str(), "action_registered");
        self.descriptors.push(descriptor);
        self
    }

    /// Register every valid action a plugin offers, collecting its default bindings.
    pub fn register_plugin(&mut self, plugin: &dyn ActionPlugin) -> &mut Self {
        let name = plugin.name();
        let mut accepted = 0usize;
        for action in plugin.actions() {
            if let Some((descriptor, bindings)) = accept(name, action) {
                self.descriptors.push(descriptor);
                self.plugin_bindings.extend(bindings);
                accepted += 1;
            }
        }
        debug!(
            target: "actions.plugin",
            plugin = name,
            actions = accepted,
            bindings = self.plugin_bindings.len(),
            "plugin_registered"
        );
        self
    }

    /// Freeze the registry. Returns the plugin default bindings for the remap
    /// tables, which are built next.
    pub fn build(self) -> (ActionRegistry, Vec<PluginBinding>) {
        let mut by_mode: AHashMap<Mode, Vec<usize>> = AHashMap::new();
        for (idx, descriptor) in self.descriptors.iter().enumerate() {
            for mode in &descriptor.modes {
                let list = by_mode.entry(*mode).or_default();
                if !list.contains(&idx) {
                    list.push(idx);
                }
            }
        }
        debug!(
            target: "actions.resolve",
            actions = self.descriptors.len(),
            modes = by_mode.len(),
            "registry_built"
        );
        (
            ActionRegistry {
                descriptors: self.descriptors,
                by_mode,
            },
            self.plugin_bindings,
        )
    }
}

/// Frozen, per-mode ordered list of descriptors.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    descriptors: Vec<ActionDescriptor>,
    by_mode: AHashMap<Mode, Vec<usize>>,
}

impl ActionRegistry {
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ActionDescriptor> {
        self.descriptors.iter().find(|d| d.id == id)
    }

    /// Descriptors valid in `mode`, in registration order.
    pub fn for_mode(&self, mode: Mode) -> impl Iterator<Item = &ActionDescriptor> {
        self.by_mode
            .get(&mode)
            .into_iter()
            .flatten()
            .map(|&idx| &self.descriptors[idx])
    }

    /// First full match wins; otherwise `Waiting` if any prefix is consistent.
    pub fn resolve(&self, mode: Mode, keys: &[Chord], recorded: &RecordedState) -> Resolution<'_> {
        let mut waiting = false;
        for descriptor in self.for_mode(mode) {
            if !gate_passes(descriptor, keys, recorded) {
                continue;
            }
            if descriptor.pattern.matches(keys) {
                trace!(target: "actions.resolve", mode = mode.name(), id = descriptor.id.as_str(), "action_matched");
                return Resolution::Matched(descriptor);
            }
            if !waiting && descriptor.pattern.could_match(keys) {
                waiting = true;
            }
        }
        if waiting {
            Resolution::Waiting
        } else {
            trace!(target: "actions.resolve", mode = mode.name(), keys = keys.len(), "no_action_matches");
            Resolution::NoMatch
        }
    }
}

fn gate_passes(descriptor: &ActionDescriptor, keys: &[Chord], recorded: &RecordedState) -> bool {
    if descriptor.flags.contains(ActionFlags::MUST_BE_FIRST_KEY)
        && (recorded.command_without_count_prefix().len() > keys.len() || recorded.operator.is_some())
    {
        return false;
    }
    // A leading `0` is a motion, not a count.
    if descriptor.is_count() && recorded.count == 0 && keys.first().is_some_and(|k| k.as_str() == "0") {
        return false;
    }
    true
}
