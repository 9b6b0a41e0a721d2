//! Plugin registration contract.
//!
//! A plugin contributes actions whose trigger is a single `<plug>...`
//! placeholder chord, plus optional default key sequences. Defaults become
//! non-recursive remaps `default -> placeholder` in every mode group the
//! action is valid in; users can rebind them through configuration, which
//! is layered on top when the remap tables are built.

use core_keymap::{KeySequence, Pattern};
use core_remap::PluginBinding;
use core_state::ModeGroup;
use tracing::warn;

use crate::ActionDescriptor;

/// One action offered by a plugin.
#[derive(Debug, Clone)]
pub struct PluginAction {
    pub descriptor: ActionDescriptor,
    /// Key sequences bound to the placeholder by default. May be empty.
    pub default_keys: Vec<KeySequence>,
}

impl PluginAction {
    pub fn new(descriptor: ActionDescriptor) -> Self {
        Self {
            descriptor,
            default_keys: Vec::new(),
        }
    }

    pub fn with_default(mut self, keys: &str) -> Self {
        self.default_keys.push(KeySequence::parse(keys));
        self
    }
}

/// Implemented by anything that contributes actions at startup.
pub trait ActionPlugin {
    /// Stable identifier (used for logs and recorded on contributed entries).
    fn name(&self) -> &str;
    /// Actions to register. Called once while the registry is being built.
    fn actions(&self) -> Vec<PluginAction>;
}

impl<T: ActionPlugin + ?Sized> ActionPlugin for &T {
    fn name(&self) -> &str {
        (**self).name()
    }
    fn actions(&self) -> Vec<PluginAction> {
        (**self).actions()
    }
}

/// Validate one plugin action and derive its default bindings.
///
/// Returns `None` (after logging) when the trigger is not a single
/// `<plug>` placeholder sequence.
pub(crate) fn accept(plugin: &str, action: PluginAction) -> Option<(ActionDescriptor, Vec<PluginBinding>)> {
    let PluginAction {
        mut descriptor,
        default_keys,
    } = action;
    let single_slot = matches!(&descriptor.pattern, Pattern::Sequence(slots) if slots.len() == 1);
    let placeholder = match descriptor.pattern.leading_chord() {
        Some(chord) if single_slot && descriptor.pattern.is_plugin_trigger() => chord.clone(),
        _ => {
            warn!(
                target: "actions.plugin",
                plugin,
                action = descriptor.id.as_str(),
                "plugin_action_skipped_invalid_trigger"
            );
            return None;
        }
    };
    descriptor.plugin = Some(plugin.to_string());

    let mut groups: Vec<ModeGroup> = Vec::new();
    for mode in &descriptor.modes {
        let group = ModeGroup::for_mode(*mode);
        if !groups.contains(&group) {
            groups.push(group);
        }
    }

    let mut bindings = Vec::with_capacity(default_keys.len() * groups.len());
    for keys in &default_keys {
        for group in &groups {
            bindings.push(PluginBinding {
                plugin: plugin.to_string(),
                group: *group,
                before: keys.clone(),
                placeholder: placeholder.clone(),
            });
        }
    }
    Some((descriptor, bindings))
}
