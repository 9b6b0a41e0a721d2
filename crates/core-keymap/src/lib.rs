//! core-keymap: chord notation, tokenization and trigger pattern matching.
//!
//! Everything in this crate is pure and deterministic: results depend only on
//! the arguments. Logging happens at TRACE for normalization decisions so the
//! remap and resolver layers can be debugged with `RUST_LOG=input=trace`.
//!
//! Layers (leaf first):
//! * [`Chord`] / [`KeySequence`]: canonical key tokens and ordered lists of them.
//! * [`notation`]: collapses user spellings (`<ctrl+x>`, `<c-x>`) into one form.
//! * [`tokenize`]: splits flat strings such as `"abc<Esc>d"` into chords.
//! * [`pattern`]: wildcard-aware trigger patterns with full and prefix matching.

mod chord;
#[cfg(feature = "events")]
mod from_events;
pub mod notation;
pub mod pattern;
pub mod tokenize;

pub use chord::{Chord, FLUSH_CHORD, KeySequence, join_chords};
pub use notation::{is_control_key, normalize_key, printable_key, to_control_character};
pub use pattern::{KeyPattern, Pattern};
pub use tokenize::tokenize_key_sequence;
