//! core-remap: user key remapping ahead of action resolution.
//!
//! Raw chords are offered to the remap scopes before the action resolver sees
//! them. A scope may hold keys back while a longer trigger could still arrive
//! (arming a [`FlushTimer`]), and once a trigger completes it returns a
//! [`ReplayPlan`] describing which chords to feed back and which commands to
//! run. The crate performs no I/O and never sleeps: executing plans and
//! polling deadlines is the dispatcher's job.
//!
//! Layers:
//! * [`table`]: entries, per (group × recursion) tables, construction from
//!   configuration and plugin default bindings.
//! * [`timer`]: the deadline a buffered batch flushes at.
//! * [`remapper`]: the per-scope state machine and the ordered scope list.
//! * [`plan`]: outcomes and replay plans.

pub mod plan;
pub mod remapper;
pub mod table;
pub mod timer;

pub use plan::{RemapOutcome, ReplayPlan, ReplayStep};
pub use remapper::{RemapperState, Remappers};
pub use table::{
    PluginBinding, RemapCommand, RemapEntry, RemapTable, RemapTables, TableError, keys_from_spec,
};
pub use timer::FlushTimer;
