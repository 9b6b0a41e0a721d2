#![allow(dead_code)] // Shared across many integration tests; each test binary uses a subset of helpers.

use anyhow::{Result, bail};
use core_actions::{
    ActionContext, ActionDescriptor, ActionPlugin, ActionResult, EditorHost, KeyDispatcher,
    PluginAction, RegistryBuilder,
};
use core_keymap::{Chord, Pattern, join_chords};
use core_state::Mode;

/// One `run_action` call as the host saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ran {
    pub id: String,
    pub keys: String,
    pub count: u32,
    pub operator: Option<String>,
}

/// Host that records everything and performs nothing.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub ran: Vec<Ran>,
    /// Host commands as `name arg...`, ex commands as `:text`. Failed ones included.
    pub commands: Vec<String>,
    pub passed: Vec<String>,
    /// Host command names that return an error.
    pub failing: Vec<String>,
}

impl RecordingHost {
    pub fn ids(&self) -> Vec<&str> {
        self.ran.iter().map(|r| r.id.as_str()).collect()
    }

    /// Keys of every text-producing action, concatenated.
    pub fn typed(&self) -> String {
        self.ran
            .iter()
            .filter(|r| r.id == "letter" || r.id == "insert_char")
            .map(|r| r.keys.as_str())
            .collect()
    }
}

impl EditorHost for RecordingHost {
    fn run_action(&mut self, action: &ActionDescriptor, ctx: &ActionContext<'_>) -> ActionResult {
        self.ran.push(Ran {
            id: action.id.clone(),
            keys: join_chords(ctx.keys),
            count: ctx.count,
            operator: ctx.operator.map(str::to_string),
        });
        match action.id.as_str() {
            "insert" => ActionResult::EnterMode(Mode::Insert),
            "escape" => ActionResult::EnterMode(Mode::Normal),
            "register" => ActionResult::Pending,
            _ => ActionResult::Done,
        }
    }

    fn execute_command(&mut self, name: &str, args: &[String]) -> Result<()> {
        let mut line = name.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.commands.push(line);
        if self.failing.iter().any(|f| f == name) {
            bail!("command {name} failed");
        }
        Ok(())
    }

    fn run_ex_command(&mut self, text: &str) -> Result<()> {
        self.commands.push(format!(":{text}"));
        Ok(())
    }

    fn pass_through(&mut self, keys: &[Chord]) {
        self.passed.push(join_chords(keys));
    }
}

/// A small vi-like action set.
///
/// `letter` stands in for any single-letter command that completes at once;
/// `q` and control chords are deliberately left unbound.
pub fn standard_registry() -> RegistryBuilder {
    let pending = [Mode::Normal, Mode::OperatorPending];
    let mut b = RegistryBuilder::new();
    b.register(ActionDescriptor::count_digit())
        .register(ActionDescriptor::keys("line_start", &pending, "0").motion())
        .register(ActionDescriptor::keys("escape", &[Mode::Insert, Mode::Visual], "<Esc>"))
        .register(ActionDescriptor::keys("insert", &[Mode::Normal], "i").must_be_first_key())
        .register(
            ActionDescriptor::keys("delete", &[Mode::Normal, Mode::Visual], "d")
                .operator()
                .dot_repeatable(),
        )
        .register(ActionDescriptor::keys("word", &pending, "w").motion())
        .register(ActionDescriptor::keys("word_end", &pending, "e").motion())
        .register(ActionDescriptor::keys("goto_top", &[Mode::Normal], "gg").motion())
        .register(ActionDescriptor::keys("register", &[Mode::Normal], "\"<alpha>"))
        .register(ActionDescriptor::new(
            "letter",
            &[Mode::Normal, Mode::Visual],
            Pattern::any_of(["a", "b", "c", "x", "y", "z", "X", "Y", "Z", "j", "k"]),
        ))
        .register(ActionDescriptor::keys("insert_char", &[Mode::Insert], "<character>"));
    b
}

pub struct Sneak;

impl ActionPlugin for Sneak {
    fn name(&self) -> &str {
        "sneak"
    }

    fn actions(&self) -> Vec<PluginAction> {
        vec![
            PluginAction::new(ActionDescriptor::placeholder(
                "sneak_forward",
                &[Mode::Normal, Mode::Visual],
                "<plug>sneak_s",
            ))
            .with_default("s")
            .with_default("<leader>s"),
            PluginAction::new(ActionDescriptor::placeholder(
                "sneak_backward",
                &[Mode::Normal],
                "<plug>sneak_S",
            )),
        ]
    }
}

pub fn dispatcher(toml: &str) -> KeyDispatcher<RecordingHost> {
    dispatcher_with(toml, standard_registry())
}

pub fn dispatcher_with(toml: &str, builder: RegistryBuilder) -> KeyDispatcher<RecordingHost> {
    let config = core_config::parse_str(toml).expect("test config parses");
    KeyDispatcher::from_config(&config, builder, RecordingHost::default())
}

pub fn chord(text: &str) -> Chord {
    Chord::from(text)
}
