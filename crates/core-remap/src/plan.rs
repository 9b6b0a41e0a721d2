use std::time::Instant;

use core_keymap::{Chord, KeySequence, join_chords};

use crate::RemapCommand;

/// Result of offering the current batch to the remappers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemapOutcome {
    /// No scope claimed the batch; resolve it as actions.
    NotHandled,
    /// A scope is holding the batch for more keys. `deadline` is when the
    /// flush chord should be injected (`None`: only the next key ends it).
    Buffered { deadline: Option<Instant> },
    /// The batch was consumed; the caller executes the plan.
    Handled(ReplayPlan),
}

impl RemapOutcome {
    pub fn is_handled(&self) -> bool {
        !matches!(self, RemapOutcome::NotHandled)
    }
}

/// One unit of replay work, executed in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayStep {
    /// Feed chords back through full dispatch.
    Keys(Vec<Chord>),
    /// Feed one chord with the remap guard engaged (recursive `ab -> abcd`).
    ShieldedKey(Chord),
}

/// What to do with a consumed batch.
///
/// `steps` hold one repetition of the expansion and run `repeat` times; the
/// pending count is folded into `repeat` rather than into the step list.
/// Bound `commands` run once after the last repetition. `shielded` plans run
/// steps and commands with the remap guard engaged (the plan came from a
/// non-recursive table). `remaining` keys are replayed after the guard has
/// been released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayPlan {
    pub trigger: Option<KeySequence>,
    pub shielded: bool,
    pub steps: Vec<ReplayStep>,
    pub repeat: u32,
    pub commands: Vec<RemapCommand>,
    pub remaining: Vec<Chord>,
}

impl Default for ReplayPlan {
    fn default() -> Self {
        Self {
            trigger: None,
            shielded: false,
            steps: Vec::new(),
            repeat: 1,
            commands: Vec::new(),
            remaining: Vec::new(),
        }
    }
}

impl ReplayPlan {
    /// Nothing left to do (a flush arrived with an empty batch).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replay raw keys unshielded after a broken potential remap.
    pub fn resend(keys: Vec<Chord>) -> Self {
        Self {
            steps: vec![ReplayStep::Keys(keys)],
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.commands.is_empty() && self.remaining.is_empty()
    }

    /// Flattened key text of one repetition, for traces.
    pub fn key_text(&self) -> String {
        let mut out = String::new();
        for step in &self.steps {
            match step {
                ReplayStep::Keys(keys) => out.push_str(&join_chords(keys)),
                ReplayStep::ShieldedKey(key) => out.push_str(key.as_str()),
            }
        }
        out
    }
}
