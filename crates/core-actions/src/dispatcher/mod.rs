//! Key dispatch: remappers first, then the action resolver.
//!
//! Every chord, whether typed, replayed from a remap, or the synthetic flush
//! chord injected when a buffering deadline passes, goes through
//! [`KeyDispatcher::handle_key_at`]:
//!
//! 1. The chord is appended to the recorded command list.
//! 2. Unless the remap guard is engaged (or the chord is a `0` continuing a
//!    count), the remappers see the batch. They may hold it back, or consume
//!    it and return a replay plan, which is executed depth-first by feeding
//!    its chords back through this same function.
//! 3. An unclaimed flush chord releases the key that was being held.
//! 4. Anything else is resolved against the action registry in the effective
//!    mode; matches run through the [`EditorHost`], dead ends are passed
//!    through to it.
//!
//! The dispatcher never sleeps. Hosts ask for [`KeyDispatcher::next_deadline`]
//! and call [`KeyDispatcher::poll_timers`] (or send
//! [`InputEvent::TimeoutElapsed`]) once it has passed.
//!
//! Init order: the registry (with plugins) is built first because plugin
//! default bindings feed the remap tables; the tables are then built from
//! configuration with those defaults underneath.

mod guard;
mod host;

pub use guard::{GuardToken, RemapGuard};
pub use host::{ActionContext, ActionResult, EditorHost};

use std::time::Instant;

use core_config::ConfigFile;
use core_events::InputEvent;
use core_keymap::{Chord, join_chords, normalize_key, tokenize_key_sequence};
use core_remap::{
    PluginBinding, RemapCommand, RemapOutcome, RemapTables, Remappers, ReplayPlan, ReplayStep,
};
use core_state::{Mode, RecordedState};
use tracing::{debug, info, trace, warn};

use crate::{ActionDescriptor, ActionFlags};
use crate::registry::{ActionRegistry, RegistryBuilder, Resolution};

/// What became of one chord.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// A remap consumed the batch and its plan has been executed.
    Remapped,
    /// A remap scope is holding the batch. `deadline` is when the host should
    /// poll the timers again (`None`: no timeout, wait for the next key).
    Buffered { deadline: Option<Instant> },
    /// An action ran (by id).
    Action(String),
    /// An operator is now waiting for its motion (by id).
    OperatorPending(String),
    /// A count digit was folded in; carries the pending count.
    Count(u32),
    /// An action could still match once more keys arrive.
    Waiting,
    /// Nothing matched; the keys went to [`EditorHost::pass_through`].
    PassedThrough,
    /// A flush arrived with nothing held back.
    Dropped,
    /// A host event switched modes (mouse selection).
    ModeChanged(Mode),
}

pub struct KeyDispatcher<H: EditorHost> {
    registry: ActionRegistry,
    remappers: Remappers,
    plugin_bindings: Vec<PluginBinding>,
    recorded: RecordedState,
    mode: Mode,
    guard: RemapGuard,
    host: H,
    leader: String,
    mouse_selection_enters_visual: bool,
    /// Chords of the current command that reached the resolver.
    resolved: Vec<Chord>,
    last_repeatable: Option<Vec<Chord>>,
}

impl<H: EditorHost> KeyDispatcher<H> {
    /// Assemble a dispatcher from already-built parts. `leader` is only used
    /// to normalize text passed to [`Self::handle_text_at`].
    pub fn new(registry: ActionRegistry, remappers: Remappers, host: H, leader: &str) -> Self {
        Self {
            registry,
            remappers,
            plugin_bindings: Vec::new(),
            recorded: RecordedState::new(),
            mode: Mode::Normal,
            guard: RemapGuard::new(),
            host,
            leader: normalize_key(leader, "\\"),
            mouse_selection_enters_visual: true,
            resolved: Vec::new(),
            last_repeatable: None,
        }
    }

    /// Build the registry (plugins included), then the remap tables from
    /// configuration layered over the plugin defaults.
    pub fn from_config(config: &ConfigFile, builder: RegistryBuilder, host: H) -> Self {
        let (registry, plugin_bindings) = builder.build();
        let tables = RemapTables::from_config(&config.bindings, &config.input.leader, &plugin_bindings);
        let remappers = Remappers::new(tables, config.input.flush_after());
        let mut dispatcher = Self::new(registry, remappers, host, &config.input.leader);
        dispatcher.plugin_bindings = plugin_bindings;
        dispatcher.mouse_selection_enters_visual = config.input.mouse_selection_enters_visual;
        info!(
            target: "actions.dispatch",
            actions = dispatcher.registry.len(),
            remaps = dispatcher.remappers.tables().total_entries(),
            leader = dispatcher.leader.as_str(),
            "dispatcher_ready"
        );
        dispatcher
    }

    /// Rebuild the remap tables and input settings from new configuration.
    /// Anything buffered is dropped.
    pub fn apply_config(&mut self, config: &ConfigFile) {
        let tables = RemapTables::from_config(&config.bindings, &config.input.leader, &self.plugin_bindings);
        self.remappers.replace_tables(tables);
        self.remappers.set_flush_after(config.input.flush_after());
        self.leader = normalize_key(&config.input.leader, "\\");
        self.mouse_selection_enters_visual = config.input.mouse_selection_enters_visual;
        self.finish_command();
        info!(target: "config", remaps = self.remappers.tables().total_entries(), "config_applied");
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!(target: "actions.dispatch", from = self.mode.name(), to = mode.name(), "mode_changed");
            self.mode = mode;
        }
    }

    pub fn recorded(&self) -> &RecordedState {
        &self.recorded
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn remappers(&self) -> &Remappers {
        &self.remappers
    }

    pub fn guard(&self) -> &RemapGuard {
        &self.guard
    }

    /// Keys of the last completed repeatable command.
    pub fn last_repeatable(&self) -> Option<&[Chord]> {
        self.last_repeatable.as_deref()
    }

    /// Earliest instant at which [`Self::poll_timers`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.remappers.next_deadline()
    }

    pub fn handle_key_at(&mut self, chord: Chord, now: Instant) -> KeyOutcome {
        // Any armed timer belongs to keys this chord is about to extend or break.
        self.remappers.cancel_timers();
        let held = std::mem::take(&mut self.recorded.buffered_keys);
        let had_buffered = !held.is_empty();
        // A held key must reach the remappers first, even when it follows a count.
        let continues_count = !had_buffered && self.recorded.last_action_was_count && chord.as_str() == "0";
        self.recorded.command_list.push(chord.clone());

        if !self.guard.is_engaged() && !continues_count {
            let batch = if self.recorded.is_operator_pending(self.mode) {
                // Held keys were never resolved, so they are not in the action keys.
                let mut keys = if had_buffered { held } else { self.recorded.action_keys.clone() };
                keys.push(chord.clone());
                keys
            } else {
                self.recorded.command_list.clone()
            };
            match self.remappers.send_key(&batch, self.mode, &mut self.recorded, now) {
                RemapOutcome::Buffered { deadline } => {
                    trace!(target: "actions.dispatch", key = chord.as_str(), "key_buffered");
                    return KeyOutcome::Buffered { deadline };
                }
                RemapOutcome::Handled(plan) => {
                    self.recorded.buffered_keys.clear();
                    self.execute_plan(plan, now);
                    return KeyOutcome::Remapped;
                }
                RemapOutcome::NotHandled => self.recorded.buffered_keys.clear(),
            }
        }

        if chord.is_flush() {
            self.recorded.command_list.pop();
            let held = self.recorded.command_list.last().cloned();
            return match held {
                // The buffered key is already in the command list.
                Some(held) if had_buffered => self.resolve_action(held),
                _ => {
                    trace!(target: "actions.dispatch", "flush_dropped");
                    KeyOutcome::Dropped
                }
            };
        }
        self.resolve_action(chord)
    }

    pub fn handle_keys_at(&mut self, chords: impl IntoIterator<Item = Chord>, now: Instant) -> Vec<KeyOutcome> {
        chords
            .into_iter()
            .map(|chord| self.handle_key_at(chord, now))
            .collect()
    }

    /// Tokenize and normalize flat key text (`"3dw<Esc>"`, `"<leader>f"`),
    /// then dispatch each chord.
    pub fn handle_text_at(&mut self, text: &str, now: Instant) -> Vec<KeyOutcome> {
        let chords: Vec<Chord> = tokenize_key_sequence(text)
            .iter()
            .map(|c| Chord::new(normalize_key(c.as_str(), &self.leader)))
            .collect();
        self.handle_keys_at(chords, now)
    }

    /// Fire due timers by injecting the flush chord. `None` when nothing was due.
    pub fn poll_timers(&mut self, now: Instant) -> Option<KeyOutcome> {
        if !self.remappers.fire_due(now) {
            return None;
        }
        debug!(
            target: "remap.timer",
            buffered = join_chords(&self.recorded.buffered_keys).as_str(),
            "buffer_timeout_fired"
        );
        Some(self.handle_key_at(Chord::flush(), now))
    }

    /// Accept a host input event. Key presses are dispatched at their own
    /// timestamp; other events use `now`.
    pub fn handle_event(&mut self, event: InputEvent, now: Instant) -> Option<KeyOutcome> {
        match event {
            InputEvent::KeyPress(key) => {
                let chord = Chord::from(&key.token);
                Some(self.handle_key_at(chord, key.timestamp))
            }
            InputEvent::TimeoutElapsed(at) => self.poll_timers(at.max(now)),
            InputEvent::Mouse(mouse) => {
                if mouse.is_selection_drag() && self.mouse_selection_enters_visual && self.mode == Mode::Normal {
                    self.remappers.cancel_timers();
                    self.finish_command();
                    self.set_mode(Mode::Visual);
                    Some(KeyOutcome::ModeChanged(Mode::Visual))
                } else {
                    None
                }
            }
        }
    }

    /// Replay the last repeatable command without remapping it again.
    pub fn repeat_last_at(&mut self, now: Instant) -> Vec<KeyOutcome> {
        let Some(keys) = self.last_repeatable.clone() else {
            return Vec::new();
        };
        debug!(target: "actions.dispatch", keys = join_chords(&keys).as_str(), "repeat_last");
        let _shield = self.guard.engage();
        self.handle_keys_at(keys, now)
    }

    fn resolve_action(&mut self, chord: Chord) -> KeyOutcome {
        self.resolved.push(chord.clone());
        self.recorded.action_keys.push(chord);
        let mode = self.recorded.effective_mode(self.mode);
        let descriptor = match self.registry.resolve(mode, &self.recorded.action_keys, &self.recorded) {
            Resolution::Matched(descriptor) => descriptor.clone(),
            Resolution::Waiting => return KeyOutcome::Waiting,
            Resolution::NoMatch => {
                debug!(
                    target: "actions.dispatch",
                    mode = mode.name(),
                    keys = join_chords(&self.recorded.command_list).as_str(),
                    "keys_passed_through"
                );
                self.host.pass_through(&self.recorded.command_list);
                self.finish_command();
                return KeyOutcome::PassedThrough;
            }
        };

        if descriptor.is_count() {
            let digit = self
                .recorded
                .action_keys
                .last()
                .and_then(|c| c.as_str().chars().next())
                .and_then(|c| c.to_digit(10))
                .unwrap_or(0);
            self.recorded.push_count_digit(digit);
            self.recorded.action_keys.clear();
            return KeyOutcome::Count(self.recorded.count);
        }
        self.recorded.last_action_was_count = false;

        if descriptor.is_operator() && self.mode == Mode::Normal && self.recorded.operator.is_none() {
            debug!(target: "actions.dispatch", operator = descriptor.id.as_str(), "operator_pending");
            self.recorded.operator = Some(descriptor.id.clone());
            self.recorded.action_keys.clear();
            return KeyOutcome::OperatorPending(descriptor.id);
        }

        let ctx = ActionContext {
            mode: self.mode,
            keys: &self.recorded.action_keys,
            count: self.recorded.count,
            operator: self.recorded.operator.as_deref(),
        };
        debug!(
            target: "actions.dispatch",
            action = descriptor.id.as_str(),
            count = ctx.count,
            operator = ctx.operator.unwrap_or(""),
            "action_run"
        );
        let result = self.host.run_action(&descriptor, &ctx);
        if result == ActionResult::Pending {
            self.recorded.action_keys.clear();
            return KeyOutcome::Action(descriptor.id);
        }
        if let ActionResult::EnterMode(next) = result {
            self.set_mode(next);
        }
        if self.is_repeatable(&descriptor) {
            self.last_repeatable = Some(std::mem::take(&mut self.resolved));
        }
        self.finish_command();
        KeyOutcome::Action(descriptor.id)
    }

    /// The action itself, or the operator it completes, is dot-repeatable.
    fn is_repeatable(&self, descriptor: &ActionDescriptor) -> bool {
        let operator = self
            .recorded
            .operator
            .as_deref()
            .and_then(|id| self.registry.get(id));
        descriptor
            .flags
            .union(operator.map_or(ActionFlags::empty(), |op| op.flags))
            .contains(ActionFlags::DOT_REPEATABLE)
    }

    fn finish_command(&mut self) {
        self.recorded.reset();
        self.resolved.clear();
    }

    fn execute_plan(&mut self, plan: ReplayPlan, now: Instant) {
        let ReplayPlan {
            trigger,
            shielded,
            steps,
            repeat,
            commands,
            remaining,
        } = plan;
        if let Some(trigger) = &trigger {
            trace!(target: "actions.dispatch", trigger = %trigger, shielded, repeat, "replay_start");
        }
        {
            let _shield = shielded.then(|| self.guard.engage());
            for _ in 0..repeat {
                for step in &steps {
                    match step {
                        ReplayStep::Keys(keys) => {
                            for key in keys {
                                self.handle_key_at(key.clone(), now);
                            }
                        }
                        ReplayStep::ShieldedKey(key) => {
                            let _first = self.guard.engage();
                            self.handle_key_at(key.clone(), now);
                        }
                    }
                }
            }
            for command in &commands {
                self.run_command(command);
            }
        }
        for key in remaining {
            self.handle_key_at(key, now);
        }
    }

    fn run_command(&mut self, command: &RemapCommand) {
        let result = match command {
            RemapCommand::Ex(text) => self.host.run_ex_command(text),
            RemapCommand::Host { name, args } => self.host.execute_command(name, args),
        };
        match result {
            Ok(()) => debug!(target: "remap.command", command = ?command, "remap_command_ran"),
            Err(e) => warn!(target: "remap.command", command = ?command, error = %e, "remap_command_failed"),
        }
    }
}

impl<H: EditorHost + std::fmt::Debug> std::fmt::Debug for KeyDispatcher<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyDispatcher")
            .field("mode", &self.mode)
            .field("recorded", &self.recorded)
            .field("guard", &self.guard.is_engaged())
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}
