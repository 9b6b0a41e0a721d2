use anyhow::Result;
use core_keymap::Chord;
use core_state::Mode;

use crate::ActionDescriptor;

/// What the dispatcher knows about the command when an action runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionContext<'a> {
    /// Mode the dispatcher is in (not the effective operator-pending mode).
    pub mode: Mode,
    /// Keys that matched the action.
    pub keys: &'a [Chord],
    /// Pending count, 0 when none was typed.
    pub count: u32,
    /// Operator waiting for this motion, if any.
    pub operator: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionResult {
    /// The command is complete; recorded state resets.
    Done,
    /// The action consumed its keys but the command goes on (register
    /// selection, for instance). Count and operator are kept.
    Pending,
    /// Complete, and the editor is now in another mode.
    EnterMode(Mode),
}

/// The editor side of dispatch.
///
/// Everything that touches buffers, windows or the command line lives behind
/// this trait; the dispatcher only decides what should happen.
pub trait EditorHost {
    fn run_action(&mut self, action: &ActionDescriptor, ctx: &ActionContext<'_>) -> ActionResult;

    /// Run a named host command bound to a remap.
    fn execute_command(&mut self, name: &str, args: &[String]) -> Result<()>;

    /// Run an ex command (text without the leading `:`).
    fn run_ex_command(&mut self, text: &str) -> Result<()>;

    /// Keys that matched no action, for the host to handle natively.
    fn pass_through(&mut self, keys: &[Chord]);
}
