use core_keymap::Chord;
use tracing::trace;

use crate::Mode;

/// Keys and pending state of the command currently being typed.
///
/// `command_list` holds every chord of the in-progress command including count
/// digits; `action_keys` holds only the chords since the last matched action
/// and is what the resolver matches against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedState {
    pub command_list: Vec<Chord>,
    pub action_keys: Vec<Chord>,
    /// Pending numeric prefix; 0 when none was typed.
    pub count: u32,
    /// Id of the operator waiting for a motion.
    pub operator: Option<String>,
    /// Cleared after a broken potential remap so replaying the same keys does
    /// not start buffering on the first key again.
    pub allow_potential_remap_on_first_key: bool,
    /// Batch held back while a remap scope waits for more keys or its timeout.
    pub buffered_keys: Vec<Chord>,
    /// The most recently matched action was a count digit.
    pub last_action_was_count: bool,
}

impl Default for RecordedState {
    fn default() -> Self {
        Self {
            command_list: Vec::new(),
            action_keys: Vec::new(),
            count: 0,
            operator: None,
            allow_potential_remap_on_first_key: true,
            buffered_keys: Vec::new(),
            last_action_was_count: false,
        }
    }
}

impl RecordedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operators only pend in Normal mode; visual operators apply immediately.
    pub fn is_operator_pending(&self, mode: Mode) -> bool {
        self.operator.is_some() && mode == Mode::Normal
    }

    /// Mode the resolver is consulted with.
    pub fn effective_mode(&self, mode: Mode) -> Mode {
        if self.is_operator_pending(mode) {
            Mode::OperatorPending
        } else {
            mode
        }
    }

    /// The command list with any leading count digits removed.
    pub fn command_without_count_prefix(&self) -> &[Chord] {
        let start = self
            .command_list
            .iter()
            .position(|c| !c.is_digit())
            .unwrap_or(self.command_list.len());
        &self.command_list[start..]
    }

    /// Fold one more digit into the pending count.
    pub fn push_count_digit(&mut self, digit: u32) {
        self.count = self.count.saturating_mul(10).saturating_add(digit);
        self.last_action_was_count = true;
    }

    /// Forget the keys typed so far without touching count or operator.
    pub fn reset_command_list(&mut self) {
        self.command_list.clear();
        self.action_keys.clear();
    }

    /// Start over after a completed or abandoned command.
    pub fn reset(&mut self) {
        trace!(
            target: "actions.dispatch",
            keys = self.command_list.len(),
            count = self.count,
            "recorded_state_reset"
        );
        *self = Self::default();
    }
}
