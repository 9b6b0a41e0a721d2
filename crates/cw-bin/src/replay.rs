//! Scripted replay of key input against a demo action set.
//!
//! Each script item is either key text (`"jj"`, `"<leader>w"`, `"3dw"`) or a
//! pause written `@<ms>` that advances the simulated clock and fires any
//! buffering deadline that has passed.

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use anyhow::Result;
use core_actions::{
    ActionContext, ActionDescriptor, ActionResult, EditorHost, KeyDispatcher, KeyOutcome,
    RegistryBuilder,
};
use core_config::ConfigFile;
use core_keymap::{Chord, Pattern, join_chords, normalize_key, printable_key, tokenize_key_sequence};
use core_state::Mode;

/// Host that turns every callback into a transcript line.
#[derive(Debug, Default)]
pub struct TraceHost {
    pub lines: Vec<String>,
    leader: String,
}

impl TraceHost {
    fn show(&self, keys: &[Chord]) -> String {
        keys.iter()
            .map(|c| printable_key(c.as_str(), &self.leader))
            .collect()
    }
}

impl EditorHost for TraceHost {
    fn run_action(&mut self, action: &ActionDescriptor, ctx: &ActionContext<'_>) -> ActionResult {
        let mut line = format!("action {} [{}]", action.id, self.show(ctx.keys));
        if ctx.count > 0 {
            let _ = write!(line, " count={}", ctx.count);
        }
        if let Some(op) = ctx.operator {
            let _ = write!(line, " operator={op}");
        }
        self.lines.push(line);
        match action.id.as_str() {
            "insert" | "append" => ActionResult::EnterMode(Mode::Insert),
            "visual" => ActionResult::EnterMode(Mode::Visual),
            "escape" => ActionResult::EnterMode(Mode::Normal),
            "register" => ActionResult::Pending,
            _ => ActionResult::Done,
        }
    }

    fn execute_command(&mut self, name: &str, args: &[String]) -> Result<()> {
        self.lines.push(format!("command {name} {}", args.join(" ")).trim_end().to_string());
        Ok(())
    }

    fn run_ex_command(&mut self, text: &str) -> Result<()> {
        self.lines.push(format!("ex :{text}"));
        Ok(())
    }

    fn pass_through(&mut self, keys: &[Chord]) {
        let shown = self.show(keys);
        self.lines.push(format!("unmatched [{shown}]"));
    }
}

/// A compact vi-flavoured action set, enough to exercise counts, operators
/// and multi-key commands.
pub fn demo_registry() -> RegistryBuilder {
    let normalish = [Mode::Normal, Mode::OperatorPending, Mode::Visual];
    let mut b = RegistryBuilder::new();
    b.register(ActionDescriptor::count_digit())
        .register(ActionDescriptor::keys("line_start", &normalish, "0").motion())
        .register(ActionDescriptor::new("left", &normalish, Pattern::any_of(["h", "<left>"])).motion())
        .register(ActionDescriptor::new("down", &normalish, Pattern::any_of(["j", "<down>"])).motion())
        .register(ActionDescriptor::new("up", &normalish, Pattern::any_of(["k", "<up>"])).motion())
        .register(ActionDescriptor::new("right", &normalish, Pattern::any_of(["l", "<right>"])).motion())
        .register(ActionDescriptor::keys("word", &normalish, "w").motion())
        .register(ActionDescriptor::keys("word_end", &normalish, "e").motion())
        .register(ActionDescriptor::keys("goto_top", &normalish, "gg").motion())
        .register(ActionDescriptor::keys("find_char", &normalish, "f<character>").motion())
        .register(ActionDescriptor::keys("insert", &[Mode::Normal], "i").must_be_first_key())
        .register(ActionDescriptor::keys("append", &[Mode::Normal], "a").must_be_first_key())
        .register(ActionDescriptor::keys("visual", &[Mode::Normal], "v").must_be_first_key())
        .register(
            ActionDescriptor::keys("delete", &[Mode::Normal, Mode::Visual], "d")
                .operator()
                .dot_repeatable(),
        )
        .register(
            ActionDescriptor::keys("change", &[Mode::Normal, Mode::Visual], "c")
                .operator()
                .dot_repeatable(),
        )
        .register(ActionDescriptor::keys("delete_char", &[Mode::Normal], "x").dot_repeatable())
        .register(ActionDescriptor::keys("register", &[Mode::Normal], "\"<alpha>"))
        .register(ActionDescriptor::keys("set_mark", &[Mode::Normal], "m<alpha>"))
        .register(ActionDescriptor::new(
            "escape",
            &[Mode::Insert, Mode::Replace, Mode::Visual, Mode::VisualLine, Mode::VisualBlock],
            Pattern::any_of(["<Esc>", "<C-[>"]),
        ))
        .register(ActionDescriptor::keys("insert_char", &[Mode::Insert, Mode::Replace], "<character>"));
    b
}

/// Feed a script through a fresh dispatcher and return the transcript.
pub fn run_script(config: &ConfigFile, mode: Mode, script: &[String]) -> Vec<String> {
    let host = TraceHost {
        lines: Vec::new(),
        leader: config.input.leader.clone(),
    };
    let mut dispatcher = KeyDispatcher::from_config(config, demo_registry(), host);
    dispatcher.set_mode(mode);

    let mut transcript = Vec::new();
    let mut now = Instant::now();
    for item in script {
        let outcomes = match pause_ms(item) {
            Some(ms) => {
                now += Duration::from_millis(ms);
                dispatcher.poll_timers(now).into_iter().collect()
            }
            None => dispatcher.handle_text_at(item, now),
        };
        transcript.append(&mut dispatcher.host_mut().lines);
        for outcome in outcomes {
            if let Some(line) = describe(&outcome) {
                transcript.push(line);
            }
        }
    }
    if let Some(deadline) = dispatcher.next_deadline() {
        let left = deadline.saturating_duration_since(now);
        transcript.push(format!("still buffered ({} ms left)", left.as_millis()));
    }
    transcript.push(format!("mode {}", dispatcher.mode()));
    transcript
}

fn pause_ms(item: &str) -> Option<u64> {
    item.strip_prefix('@')?.parse().ok()
}

fn describe(outcome: &KeyOutcome) -> Option<String> {
    match outcome {
        KeyOutcome::Buffered { deadline: Some(_) } => Some("buffered".into()),
        KeyOutcome::Buffered { deadline: None } => Some("buffered (no timeout)".into()),
        KeyOutcome::OperatorPending(op) => Some(format!("operator {op} pending")),
        KeyOutcome::Count(n) => Some(format!("count {n}")),
        KeyOutcome::Waiting => Some("waiting".into()),
        KeyOutcome::ModeChanged(mode) => Some(format!("mode -> {mode}")),
        KeyOutcome::Dropped => Some("flush dropped".into()),
        // The host already logged these.
        KeyOutcome::Remapped | KeyOutcome::Action(_) | KeyOutcome::PassedThrough => None,
    }
}

/// Chords as they would be typed, for the `--tokens` listing.
pub fn token_listing(text: &str, leader: &str) -> String {
    let leader = normalize_key(leader, "\\");
    let chords: Vec<Chord> = tokenize_key_sequence(text)
        .iter()
        .map(|c| Chord::new(normalize_key(c.as_str(), &leader)))
        .collect();
    let joined = join_chords(&chords);
    let shown: Vec<String> = chords
        .iter()
        .map(|c| printable_key(c.as_str(), &leader))
        .collect();
    format!("{} chords: {} ({:?})", chords.len(), shown.join(" "), joined)
}
