//! Modal state shared by the remap engine, the action resolver and the dispatcher.
//!
//! * [`Mode`]: the editor mode the host reports, plus the `OperatorPending`
//!   pseudo-mode the resolver is consulted with while an operator waits for a
//!   motion.
//! * [`ModeGroup`]: the sets of modes one remap table applies to.
//! * [`RecordedState`]: the keys of the command currently being typed, the
//!   pending count and operator, and the remap buffering flags.
//!
//! None of this is thread-safe or needs to be: the dispatcher owns one
//! `RecordedState` and processes each chord to completion before the next.

pub mod recorded;

pub use recorded::RecordedState;

/// Current editor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Normal command/navigation mode.
    Normal,
    /// Insert text mode.
    Insert,
    /// Overtype mode; shares the insert remap tables.
    Replace,
    /// Character-wise selection.
    Visual,
    /// Line-wise selection.
    VisualLine,
    /// Block selection.
    VisualBlock,
    /// Typing an ex command after `:`.
    CommandlineInProgress,
    /// Typing a search pattern after `/` or `?`.
    SearchInProgress,
    /// Pseudo-mode: Normal with an operator pending. Never reported by the
    /// host; derived by [`RecordedState::effective_mode`].
    OperatorPending,
}

impl Mode {
    pub fn is_visual(self) -> bool {
        matches!(self, Mode::Visual | Mode::VisualLine | Mode::VisualBlock)
    }

    pub fn is_insert_like(self) -> bool {
        matches!(self, Mode::Insert | Mode::Replace)
    }

    /// Stable lower-case name used in logs and configuration.
    pub fn name(self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Insert => "insert",
            Mode::Replace => "replace",
            Mode::Visual => "visual",
            Mode::VisualLine => "visual_line",
            Mode::VisualBlock => "visual_block",
            Mode::CommandlineInProgress => "command_line",
            Mode::SearchInProgress => "search",
            Mode::OperatorPending => "operator_pending",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// -------------------------------------------------------------------------------------------------
// Mode Groups
// -------------------------------------------------------------------------------------------------
/// A set of modes sharing one pair of remap tables (recursive + non-recursive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeGroup {
    Insert,
    Normal,
    Visual,
    CommandLine,
    /// Consulted only while an operator is pending in Normal mode.
    OperatorPending,
}

impl ModeGroup {
    /// Groups in remapper scope order.
    pub const ALL: [ModeGroup; 5] = [
        ModeGroup::Insert,
        ModeGroup::Normal,
        ModeGroup::Visual,
        ModeGroup::CommandLine,
        ModeGroup::OperatorPending,
    ];

    /// Host modes this group's tables apply to.
    pub fn modes(self) -> &'static [Mode] {
        match self {
            ModeGroup::Insert => &[Mode::Insert, Mode::Replace],
            ModeGroup::Normal => &[Mode::Normal],
            ModeGroup::Visual => &[Mode::Visual, Mode::VisualLine, Mode::VisualBlock],
            ModeGroup::CommandLine => &[Mode::CommandlineInProgress, Mode::SearchInProgress],
            ModeGroup::OperatorPending => &[Mode::Normal],
        }
    }

    pub fn contains(self, mode: Mode) -> bool {
        self.modes().contains(&mode)
    }

    /// The group whose tables a descriptor valid in `mode` contributes to.
    pub fn for_mode(mode: Mode) -> ModeGroup {
        match mode {
            Mode::Insert | Mode::Replace => ModeGroup::Insert,
            Mode::Normal => ModeGroup::Normal,
            Mode::Visual | Mode::VisualLine | Mode::VisualBlock => ModeGroup::Visual,
            Mode::CommandlineInProgress | Mode::SearchInProgress => ModeGroup::CommandLine,
            Mode::OperatorPending => ModeGroup::OperatorPending,
        }
    }

    /// Configuration table name (`normal`, `insert`, ...).
    pub fn name(self) -> &'static str {
        match self {
            ModeGroup::Insert => "insert",
            ModeGroup::Normal => "normal",
            ModeGroup::Visual => "visual",
            ModeGroup::CommandLine => "command_line",
            ModeGroup::OperatorPending => "operator_pending",
        }
    }
}
