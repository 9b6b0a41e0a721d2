//! Remap tables: one per (mode group × recursion) pair.
//!
//! Entries are keyed by the concatenated canonical text of their `before`
//! sequence. Key lengths for the suffix search are tracked in chords, so
//! `<C-w>j` has length 2 no matter how many bytes its text takes.

use ahash::AHashMap;
use core_config::{BindingEntry, BindingsConfig, CommandSpec, KeySpec};
use core_keymap::{Chord, KeySequence, join_chords, normalize_key, tokenize_key_sequence};
use core_state::{Mode, ModeGroup};
use thiserror::Error;
use tracing::{debug, warn};

/// A command run after (or instead of) replaying `after`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemapCommand {
    /// Ex command text, stored without the leading `:`.
    Ex(String),
    /// Host command with arguments.
    Host { name: String, args: Vec<String> },
}

impl RemapCommand {
    pub fn from_spec(spec: &CommandSpec) -> Self {
        match spec {
            CommandSpec::Text(text) => match text.strip_prefix(':') {
                Some(ex) => RemapCommand::Ex(ex.to_string()),
                None => RemapCommand::Host {
                    name: text.clone(),
                    args: Vec::new(),
                },
            },
            CommandSpec::Host { command, args } => match command.strip_prefix(':') {
                Some(ex) => RemapCommand::Ex(ex.to_string()),
                None => RemapCommand::Host {
                    name: command.clone(),
                    args: args.clone(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapEntry {
    pub before: KeySequence,
    pub after: Option<KeySequence>,
    pub commands: Vec<RemapCommand>,
    pub recursive: bool,
    /// Plugin that contributed this entry as a default binding.
    pub plugin: Option<String>,
}

impl RemapEntry {
    pub fn new(before: KeySequence, after: Option<KeySequence>, recursive: bool) -> Self {
        Self {
            before,
            after,
            commands: Vec::new(),
            recursive,
            plugin: None,
        }
    }

    pub fn with_commands(mut self, commands: Vec<RemapCommand>) -> Self {
        self.commands = commands;
        self
    }

    /// Canonical table key.
    pub fn key(&self) -> String {
        self.before.text()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("remap trigger is empty")]
    EmptyTrigger,
    #[error("remap `{before}` has neither `after` keys nor commands")]
    NoEffect { before: String },
}

/// Default binding contributed by a plugin action: `before` replays the
/// action's `<plug>` placeholder chord, non-recursively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginBinding {
    pub plugin: String,
    pub group: ModeGroup,
    pub before: KeySequence,
    pub placeholder: Chord,
}

// -------------------------------------------------------------------------------------------------
// RemapTable
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone)]
pub struct RemapTable {
    group: ModeGroup,
    recursive: bool,
    entries: AHashMap<String, RemapEntry>,
    min_len: usize,
    max_len: usize,
}

impl RemapTable {
    pub fn new(group: ModeGroup, recursive: bool) -> Self {
        Self {
            group,
            recursive,
            entries: AHashMap::new(),
            min_len: 0,
            max_len: 0,
        }
    }

    pub fn group(&self) -> ModeGroup {
        self.group
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shortest and longest trigger, in chords. `(0, 0)` when empty.
    pub fn len_range(&self) -> (usize, usize) {
        (self.min_len, self.max_len)
    }

    pub fn get(&self, key: &str) -> Option<&RemapEntry> {
        self.entries.get(key)
    }

    pub fn entries(&self) -> impl Iterator<Item = &RemapEntry> {
        self.entries.values()
    }

    /// Insert an entry, replacing (and returning) one with the same trigger.
    pub fn insert(&mut self, mut entry: RemapEntry) -> Result<Option<RemapEntry>, TableError> {
        if entry.before.is_empty() {
            return Err(TableError::EmptyTrigger);
        }
        if entry.after.as_ref().is_none_or(|a| a.is_empty()) && entry.commands.is_empty() {
            return Err(TableError::NoEffect {
                before: entry.key(),
            });
        }
        entry.recursive = self.recursive;
        let replaced = self.entries.insert(entry.key(), entry);
        self.recompute_lengths();
        Ok(replaced)
    }

    fn recompute_lengths(&mut self) {
        let lens = self.entries.values().map(|e| e.before.len());
        self.min_len = lens.clone().min().unwrap_or(0);
        self.max_len = lens.max().unwrap_or(0);
    }

    /// Some trigger strictly extends `text`.
    pub fn has_extension_of(&self, text: &str) -> bool {
        !text.is_empty()
            && self
                .entries
                .keys()
                .any(|k| k.len() > text.len() && k.starts_with(text))
    }

    /// Some trigger starts with `text` (equal included).
    pub fn has_key_starting_with(&self, text: &str) -> bool {
        !text.is_empty() && self.entries.keys().any(|k| k.starts_with(text))
    }

    /// Exact-match search over suffixes of `keys`, longest first.
    ///
    /// Outside insert-like modes a suffix only counts when everything before
    /// it is a count prefix; the first trigger hit with other leading keys
    /// ends the search with no match.
    pub fn find_matching(&self, keys: &[Chord], mode: Mode) -> Option<&RemapEntry> {
        if self.entries.is_empty() {
            return None;
        }
        let start = keys.len().min(self.max_len);
        let end = self.min_len.max(1);
        for n in (end..=start).rev() {
            let split = keys.len() - n;
            let probe = join_chords(&keys[split..]);
            let Some(entry) = self.entries.get(&probe) else {
                continue;
            };
            if !mode.is_insert_like() && !keys[..split].iter().all(Chord::is_digit) {
                debug!(
                    target: "remap",
                    probe = probe.as_str(),
                    preceding = split,
                    "remap_needs_exact_prefix"
                );
                return None;
            }
            return Some(entry);
        }
        None
    }
}

// -------------------------------------------------------------------------------------------------
// RemapTables
// -------------------------------------------------------------------------------------------------
/// All ten tables, indexed by group and recursion.
#[derive(Debug, Clone)]
pub struct RemapTables {
    tables: Vec<RemapTable>,
}

impl Default for RemapTables {
    fn default() -> Self {
        Self::new()
    }
}

fn index_of(group: ModeGroup, recursive: bool) -> usize {
    let g = match group {
        ModeGroup::Insert => 0,
        ModeGroup::Normal => 1,
        ModeGroup::Visual => 2,
        ModeGroup::CommandLine => 3,
        ModeGroup::OperatorPending => 4,
    };
    g * 2 + usize::from(!recursive)
}

impl RemapTables {
    pub fn new() -> Self {
        let mut tables = Vec::with_capacity(ModeGroup::ALL.len() * 2);
        for group in ModeGroup::ALL {
            tables.push(RemapTable::new(group, true));
            tables.push(RemapTable::new(group, false));
        }
        Self { tables }
    }

    pub fn table(&self, group: ModeGroup, recursive: bool) -> &RemapTable {
        &self.tables[index_of(group, recursive)]
    }

    pub fn table_mut(&mut self, group: ModeGroup, recursive: bool) -> &mut RemapTable {
        &mut self.tables[index_of(group, recursive)]
    }

    pub fn total_entries(&self) -> usize {
        self.tables.iter().map(RemapTable::len).sum()
    }

    /// Build tables from plugin defaults, then user bindings on top.
    ///
    /// A user binding with the same trigger as a plugin default replaces it.
    /// Invalid bindings are skipped with a warning.
    pub fn from_config(bindings: &BindingsConfig, leader: &str, defaults: &[PluginBinding]) -> Self {
        let mut tables = Self::new();
        let leader = normalize_key(leader, "\\");

        for default in defaults {
            let before: KeySequence = default
                .before
                .iter()
                .map(|c| Chord::new(normalize_key(c.as_str(), &leader)))
                .collect();
            let mut entry = RemapEntry::new(
                before,
                Some(KeySequence::new(vec![default.placeholder.clone()])),
                false,
            );
            entry.plugin = Some(default.plugin.clone());
            if let Err(e) = tables.table_mut(default.group, false).insert(entry) {
                warn!(target: "remap", plugin = default.plugin.as_str(), error = %e, "plugin_binding_skipped");
            }
        }

        for group in ModeGroup::ALL {
            for recursive in [true, false] {
                let table = tables.table_mut(group, recursive);
                for binding in config_entries(bindings, group, recursive) {
                    let entry = entry_from_binding(binding, &leader, recursive);
                    let key = entry.key();
                    match table.insert(entry) {
                        Ok(Some(replaced)) => debug!(
                            target: "remap",
                            group = group.name(),
                            recursive,
                            before = key.as_str(),
                            plugin = replaced.plugin.as_deref().unwrap_or(""),
                            "binding_replaced"
                        ),
                        Ok(None) => {}
                        Err(e) => warn!(
                            target: "remap",
                            group = group.name(),
                            recursive,
                            error = %e,
                            "binding_skipped"
                        ),
                    }
                }
            }
        }
        debug!(target: "remap", entries = tables.total_entries(), "remap_tables_built");
        tables
    }
}

fn config_entries(b: &BindingsConfig, group: ModeGroup, recursive: bool) -> &[BindingEntry] {
    match (group, recursive) {
        (ModeGroup::Insert, true) => &b.insert,
        (ModeGroup::Insert, false) => &b.insert_nonrecursive,
        (ModeGroup::Normal, true) => &b.normal,
        (ModeGroup::Normal, false) => &b.normal_nonrecursive,
        (ModeGroup::Visual, true) => &b.visual,
        (ModeGroup::Visual, false) => &b.visual_nonrecursive,
        (ModeGroup::CommandLine, true) => &b.command_line,
        (ModeGroup::CommandLine, false) => &b.command_line_nonrecursive,
        (ModeGroup::OperatorPending, true) => &b.operator_pending,
        (ModeGroup::OperatorPending, false) => &b.operator_pending_nonrecursive,
    }
}

/// Normalize user key text into a chord sequence.
///
/// List items are single keys in any accepted spelling; a plain string is
/// tokenized first and each chord normalized.
pub fn keys_from_spec(spec: &KeySpec, leader: &str) -> KeySequence {
    match spec {
        KeySpec::List(items) => items
            .iter()
            .map(|raw| Chord::new(normalize_key(raw, leader)))
            .collect(),
        KeySpec::Text(text) => {
            let keys: KeySequence = tokenize_key_sequence(text)
                .iter()
                .map(|c| Chord::new(normalize_key(c.as_str(), leader)))
                .collect();
            if keys.len() > 1 && keys[0].as_str().eq_ignore_ascii_case("<plug>") {
                // `"<plug>name"` splits into `<plug>` and letters; only `["<plug>name"]` is one chord.
                warn!(target: "remap", keys = text.as_str(), "plug_placeholder_split");
            }
            keys
        }
    }
}

fn entry_from_binding(binding: &BindingEntry, leader: &str, recursive: bool) -> RemapEntry {
    RemapEntry::new(
        keys_from_spec(&binding.before, leader),
        binding.after.as_ref().map(|a| keys_from_spec(a, leader)),
        recursive,
    )
    .with_commands(binding.commands.iter().map(RemapCommand::from_spec).collect())
}
