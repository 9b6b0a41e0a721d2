use core_keymap::{Chord, Pattern};
use core_state::Mode;

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ActionFlags: u8 {
        /// Only valid as the first action of a command (no operator pending,
        /// nothing but a count typed before it).
        const MUST_BE_FIRST_KEY = 1;
        /// Can follow an operator (`w` in `dw`).
        const MOTION = 2;
        /// Waits for a motion in Normal mode.
        const OPERATOR = 4;
        /// Completed commands are remembered for repetition.
        const DOT_REPEATABLE = 8;
        /// Folds a digit into the pending count instead of running.
        const COUNT = 16;
    }
}

/// Static description of one action: where it is valid and what triggers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub id: String,
    pub modes: Vec<Mode>,
    pub pattern: Pattern,
    pub flags: ActionFlags,
    /// Plugin that contributed the action, if any.
    pub plugin: Option<String>,
}

impl ActionDescriptor {
    pub fn new(id: impl Into<String>, modes: &[Mode], pattern: Pattern) -> Self {
        Self {
            id: id.into(),
            modes: modes.to_vec(),
            pattern,
            flags: ActionFlags::empty(),
            plugin: None,
        }
    }

    /// Shorthand for a single-sequence trigger in flat notation.
    pub fn keys(id: impl Into<String>, modes: &[Mode], keys: &str) -> Self {
        Self::new(id, modes, Pattern::parse(keys))
    }

    /// Plugin action triggered by one `<plug>name` placeholder chord. The
    /// placeholder is kept whole rather than tokenized.
    pub fn placeholder(id: impl Into<String>, modes: &[Mode], placeholder: &str) -> Self {
        Self::new(id, modes, Pattern::from_chords(&[Chord::from(placeholder)]))
    }

    /// The count digit action (`<number>`), valid wherever counts are typed.
    pub fn count_digit() -> Self {
        Self::keys(
            "count",
            &[
                Mode::Normal,
                Mode::Visual,
                Mode::VisualLine,
                Mode::VisualBlock,
                Mode::OperatorPending,
            ],
            "<number>",
        )
        .with_flags(ActionFlags::COUNT)
    }

    pub fn with_flags(mut self, flags: ActionFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn must_be_first_key(self) -> Self {
        self.with_flags(ActionFlags::MUST_BE_FIRST_KEY)
    }

    pub fn motion(self) -> Self {
        self.with_flags(ActionFlags::MOTION)
    }

    pub fn operator(self) -> Self {
        self.with_flags(ActionFlags::OPERATOR)
    }

    pub fn dot_repeatable(self) -> Self {
        self.with_flags(ActionFlags::DOT_REPEATABLE)
    }

    pub fn is_valid_in(&self, mode: Mode) -> bool {
        self.modes.contains(&mode)
    }

    pub fn is_operator(&self) -> bool {
        self.flags.contains(ActionFlags::OPERATOR)
    }

    pub fn is_count(&self) -> bool {
        self.flags.contains(ActionFlags::COUNT)
    }
}
