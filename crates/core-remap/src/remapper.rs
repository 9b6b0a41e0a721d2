//! Per-scope remap state machine and the ordered scope list.
//!
//! A scope is one (mode group × recursion) table plus its buffering state.
//! Every batch is the recorded command list so far (only the keys typed since
//! the operator while one is pending); a scope either ignores
//! it, buffers it (a longer trigger could still arrive), or consumes it and
//! returns a [`ReplayPlan`].
//!
//! Buffering flags:
//! * ambiguous: a trigger matched exactly but a longer one could still match
//!   (`aa` mapped, `aaaa` mapped, `aaa` typed).
//! * potential: no exact match yet, only longer triggers could match.
//!
//! When buffering breaks (a key that extends nothing, or the flush chord after
//! the timeout), an ambiguous scope re-searches the batch prefixes for the
//! remembered trigger and replays the rest; a merely potential scope resends
//! the raw batch with first-key buffering disallowed so it cannot loop.

use std::time::{Duration, Instant};

use core_keymap::{Chord, join_chords};
use core_state::{Mode, ModeGroup, RecordedState};
use tracing::{debug, trace};

use crate::plan::{RemapOutcome, ReplayPlan, ReplayStep};
use crate::table::{RemapEntry, RemapTables};
use crate::timer::FlushTimer;

#[derive(Debug, Clone)]
pub struct RemapperState {
    group: ModeGroup,
    recursive: bool,
    timer: FlushTimer,
    has_ambiguous_remap: bool,
    has_potential_remap: bool,
    is_potential_remap: bool,
}

impl RemapperState {
    pub fn new(group: ModeGroup, recursive: bool) -> Self {
        Self {
            group,
            recursive,
            timer: FlushTimer::new(),
            has_ambiguous_remap: false,
            has_potential_remap: false,
            is_potential_remap: false,
        }
    }

    pub fn group(&self) -> ModeGroup {
        self.group
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    /// The last batch could become a remap with more keys.
    pub fn is_potential_remap(&self) -> bool {
        self.is_potential_remap
    }

    pub fn has_ambiguous_remap(&self) -> bool {
        self.has_ambiguous_remap
    }

    pub fn has_potential_remap(&self) -> bool {
        self.has_potential_remap
    }

    pub fn timer(&self) -> &FlushTimer {
        &self.timer
    }

    fn scope_name(&self) -> &'static str {
        match (self.group, self.recursive) {
            (ModeGroup::Insert, true) => "insert",
            (ModeGroup::Insert, false) => "insert_nonrecursive",
            (ModeGroup::Normal, true) => "normal",
            (ModeGroup::Normal, false) => "normal_nonrecursive",
            (ModeGroup::Visual, true) => "visual",
            (ModeGroup::Visual, false) => "visual_nonrecursive",
            (ModeGroup::CommandLine, true) => "command_line",
            (ModeGroup::CommandLine, false) => "command_line_nonrecursive",
            (ModeGroup::OperatorPending, true) => "operator_pending",
            (ModeGroup::OperatorPending, false) => "operator_pending_nonrecursive",
        }
    }

    pub fn send_key(
        &mut self,
        keys: &[Chord],
        mode: Mode,
        tables: &RemapTables,
        recorded: &mut RecordedState,
        flush_after: Option<Duration>,
        now: Instant,
    ) -> RemapOutcome {
        self.is_potential_remap = false;
        let allow_first_key = recorded.allow_potential_remap_on_first_key;
        let mut allow_buffering = true;
        let mut remaining: Vec<Chord> = Vec::new();

        if !self.group.contains(mode) {
            return RemapOutcome::NotHandled;
        }

        let table = tables.table(self.group, self.recursive);
        let batch = keys;
        let mut keys = keys.to_vec();
        if keys.last().is_some_and(Chord::is_flush) {
            // Timeout elapsed: nothing may start another one.
            keys.pop();
            allow_buffering = false;
        }
        if keys.is_empty() {
            return RemapOutcome::Handled(ReplayPlan::empty());
        }

        let scope = self.scope_name();
        trace!(target: "remap", scope, mode = mode.name(), keys = join_chords(&keys).as_str(), "remap_lookup");

        let mut remapping = table.find_matching(&keys, mode);
        let text = join_chords(&keys);
        let mut is_potential = table.has_extension_of(&text);
        let sibling_potential = !is_potential
            && tables
                .table(self.group, !self.recursive)
                .has_key_starting_with(&text);

        self.is_potential_remap = is_potential && allow_buffering && allow_first_key;

        if remapping.is_none()
            && (self.has_ambiguous_remap || self.has_potential_remap)
            && (!(is_potential || sibling_potential) || !allow_buffering)
            && keys.len() > 1
        {
            if self.has_ambiguous_remap {
                let (min_len, _) = table.len_range();
                for n in (min_len.max(1)..keys.len()).rev() {
                    if let Some(entry) = table.find_matching(&keys[..n], mode) {
                        remapping = Some(entry);
                        is_potential = false;
                        self.is_potential_remap = false;
                        // Includes a trailing flush chord when the timeout fired.
                        remaining = batch
                            .get(entry.before.len()..)
                            .map(<[Chord]>::to_vec)
                            .unwrap_or_default();
                        break;
                    }
                }
                self.has_ambiguous_remap = false;
            }
            if remapping.is_none() {
                if !allow_buffering {
                    // Resend the flush so the replay does not wait again.
                    keys.push(Chord::flush());
                    debug!(target: "remap", scope, "timed_out_buffer_replayed");
                }
                debug!(target: "remap", scope, keys = join_chords(&keys).as_str(), "potential_remap_broken");
                self.has_potential_remap = false;
                recorded.allow_potential_remap_on_first_key = false;
                recorded.reset_command_list();
                return RemapOutcome::Handled(ReplayPlan::resend(keys));
            }
        }

        if is_potential && allow_buffering && allow_first_key {
            if let Some(entry) = remapping {
                self.has_ambiguous_remap = true;
                debug!(target: "remap", scope, before = %entry.before, "ambiguous_remap_buffered");
            } else {
                self.has_potential_remap = true;
                debug!(target: "remap", scope, keys = text.as_str(), "potential_remap_buffered");
            }
            recorded.buffered_keys = keys;
            let deadline = self.timer.arm(now, flush_after);
            return RemapOutcome::Buffered { deadline };
        }

        if let Some(entry) = remapping {
            self.has_ambiguous_remap = false;
            self.has_potential_remap = false;
            let plan = self.plan_for(entry, allow_buffering, remaining, recorded);
            debug!(
                target: "remap",
                scope,
                before = %entry.before,
                replay = plan.key_text().as_str(),
                repeat = plan.repeat,
                commands = entry.commands.len(),
                remaining = plan.remaining.len(),
                "remap_matched"
            );
            return RemapOutcome::Handled(plan);
        }

        self.has_potential_remap = false;
        RemapOutcome::NotHandled
    }

    fn plan_for(
        &self,
        entry: &RemapEntry,
        allow_buffering: bool,
        remaining: Vec<Chord>,
        recorded: &mut RecordedState,
    ) -> ReplayPlan {
        let mut after = entry.after.clone();
        if !allow_buffering && let Some(after) = after.as_mut() {
            after.push(Chord::flush());
        }

        // Vi compatible: when the expansion starts with the trigger, its first
        // chord is not remapped again (`map ab abcd`).
        let skip_first = self.recursive
            && after
                .as_ref()
                .is_some_and(|a| a.text().starts_with(&entry.before.text()));

        recorded.reset_command_list();
        let mut steps = Vec::new();
        let mut repeat = 1;
        if let Some(after) = after.as_deref() {
            repeat = recorded.count.max(1);
            recorded.count = 0;
            match after.split_first() {
                Some((first, rest)) if skip_first => {
                    steps.push(ReplayStep::ShieldedKey(first.clone()));
                    if !rest.is_empty() {
                        steps.push(ReplayStep::Keys(rest.to_vec()));
                    }
                }
                _ => steps.push(ReplayStep::Keys(after.to_vec())),
            }
        }

        ReplayPlan {
            trigger: Some(entry.before.clone()),
            shielded: !self.recursive,
            steps,
            repeat,
            commands: entry.commands.clone(),
            remaining,
        }
    }

    fn reset(&mut self) {
        self.timer.cancel();
        self.has_ambiguous_remap = false;
        self.has_potential_remap = false;
        self.is_potential_remap = false;
    }
}

// -------------------------------------------------------------------------------------------------
// Remappers
// -------------------------------------------------------------------------------------------------
/// Every remap scope in lookup order, plus the tables they consult.
#[derive(Debug, Clone)]
pub struct Remappers {
    tables: RemapTables,
    scopes: Vec<RemapperState>,
    operator_pending_scopes: Vec<RemapperState>,
    flush_after: Option<Duration>,
}

impl Remappers {
    pub fn new(tables: RemapTables, flush_after: Option<Duration>) -> Self {
        let mut scopes = Vec::with_capacity(8);
        for recursive in [true, false] {
            for group in [
                ModeGroup::Insert,
                ModeGroup::Normal,
                ModeGroup::Visual,
                ModeGroup::CommandLine,
            ] {
                scopes.push(RemapperState::new(group, recursive));
            }
        }
        let operator_pending_scopes = vec![
            RemapperState::new(ModeGroup::OperatorPending, true),
            RemapperState::new(ModeGroup::OperatorPending, false),
        ];
        Self {
            tables,
            scopes,
            operator_pending_scopes,
            flush_after,
        }
    }

    pub fn tables(&self) -> &RemapTables {
        &self.tables
    }

    pub fn flush_after(&self) -> Option<Duration> {
        self.flush_after
    }

    /// Swap in rebuilt tables; all buffering state starts over.
    pub fn replace_tables(&mut self, tables: RemapTables) {
        self.tables = tables;
        self.all_scopes_mut().for_each(RemapperState::reset);
        debug!(target: "remap", entries = self.tables.total_entries(), "remap_tables_replaced");
    }

    pub fn set_flush_after(&mut self, flush_after: Option<Duration>) {
        self.flush_after = flush_after;
    }

    /// Offer the batch to each scope in order; the first that claims it wins.
    pub fn send_key(
        &mut self,
        keys: &[Chord],
        mode: Mode,
        recorded: &mut RecordedState,
        now: Instant,
    ) -> RemapOutcome {
        let scopes = if recorded.is_operator_pending(mode) {
            &mut self.operator_pending_scopes
        } else {
            &mut self.scopes
        };
        for scope in scopes.iter_mut() {
            let outcome = scope.send_key(keys, mode, &self.tables, recorded, self.flush_after, now);
            if outcome.is_handled() {
                return outcome;
            }
        }
        RemapOutcome::NotHandled
    }

    /// Any scope is waiting for a longer trigger.
    pub fn is_potential_remap(&self) -> bool {
        self.scopes.iter().any(RemapperState::is_potential_remap)
    }

    /// Earliest armed deadline across scopes.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.all_scopes().filter_map(|s| s.timer.deadline()).min()
    }

    pub fn has_armed_timer(&self) -> bool {
        self.all_scopes().any(|s| s.timer.is_armed())
    }

    /// Disarm every due timer. Returns `true` when at least one fired.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        let mut fired = false;
        for scope in self.all_scopes_mut() {
            fired |= scope.timer.fire_if_due(now);
        }
        fired
    }

    /// A new key arrived: nothing buffered so far may flush on its own.
    pub fn cancel_timers(&mut self) {
        self.all_scopes_mut().for_each(|s| {
            s.timer.cancel();
        });
    }

    pub fn scope_states(&self) -> impl Iterator<Item = &RemapperState> {
        self.all_scopes()
    }

    fn all_scopes(&self) -> impl Iterator<Item = &RemapperState> {
        self.scopes.iter().chain(self.operator_pending_scopes.iter())
    }

    fn all_scopes_mut(&mut self) -> impl Iterator<Item = &mut RemapperState> {
        self.scopes
            .iter_mut()
            .chain(self.operator_pending_scopes.iter_mut())
    }
}
