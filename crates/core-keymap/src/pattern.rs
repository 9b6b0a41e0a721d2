//! Trigger patterns and the single matcher used by every action.
//!
//! A [`Pattern`] is either one slot sequence or a set of alternatives. Each
//! slot is a literal chord or one of four wildcard classes. Matching is
//! symmetric: a concrete sequence may itself carry wildcard chords (for
//! example a recorded `<any>`), and a wildcard on either side is honoured.
//!
//! Two operations:
//! * [`Pattern::matches`]: full match, lengths must be equal.
//! * [`Pattern::could_match`]: prefix consistency, used by the resolver to
//!   decide whether to keep waiting for more keys.

use smallvec::{SmallVec, smallvec};

use crate::notation::is_control_key;
use crate::tokenize::tokenize_key_sequence;
use crate::Chord;

// -------------------------------------------------------------------------------------------------
// Slots
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPattern {
    Literal(Chord),
    /// `<any>`: one arbitrary chord.
    Any,
    /// `<number>`: a single ASCII digit.
    Digit,
    /// `<alpha>`: a single ASCII letter.
    Alpha,
    /// `<character>`: any chord that is not a control key.
    NonControl,
}

impl KeyPattern {
    /// Interpret chord text, recognising the wildcard spellings.
    pub fn from_chord(chord: &Chord) -> Self {
        match chord.as_str() {
            "<any>" => KeyPattern::Any,
            "<number>" => KeyPattern::Digit,
            "<alpha>" => KeyPattern::Alpha,
            "<character>" => KeyPattern::NonControl,
            _ => KeyPattern::Literal(chord.clone()),
        }
    }

    fn literal(&self) -> Option<&Chord> {
        match self {
            KeyPattern::Literal(c) => Some(c),
            _ => None,
        }
    }

    /// Does a wildcard class accept the concrete chord?
    fn accepts(&self, chord: &Chord) -> bool {
        match self {
            KeyPattern::Any => true,
            KeyPattern::Digit => chord.is_digit(),
            KeyPattern::Alpha => chord.is_alpha(),
            KeyPattern::NonControl => !is_control_key(chord.as_str()),
            KeyPattern::Literal(c) => c == chord,
        }
    }
}

fn slots_match(left: &KeyPattern, right: &KeyPattern) -> bool {
    if matches!(left, KeyPattern::Any) || matches!(right, KeyPattern::Any) {
        return true;
    }
    match (left.literal(), right.literal()) {
        (Some(l), Some(r)) => l == r,
        (None, Some(r)) => left.accepts(r),
        (Some(l), None) => right.accepts(l),
        // Two wildcard classes only agree with themselves.
        (None, None) => left == right,
    }
}

fn sequence_matches(slots: &[KeyPattern], keys: &[Chord]) -> bool {
    slots.len() == keys.len()
        && slots
            .iter()
            .zip(keys)
            .all(|(slot, key)| slots_match(slot, &KeyPattern::from_chord(key)))
}

// -------------------------------------------------------------------------------------------------
// Pattern
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pattern {
    Sequence(Vec<KeyPattern>),
    Alternatives(SmallVec<[Vec<KeyPattern>; 2]>),
}

impl Pattern {
    /// Build a pattern from flat notation, e.g. `"g<any>"` or `"<C-w>j"`.
    pub fn parse(text: &str) -> Self {
        Pattern::Sequence(parse_slots(text))
    }

    /// Build a pattern matching any of the given notations.
    pub fn any_of<I, S>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Pattern::Alternatives(
            alternatives
                .into_iter()
                .map(|a| parse_slots(a.as_ref()))
                .collect(),
        )
    }

    pub fn from_chords(chords: &[Chord]) -> Self {
        Pattern::Sequence(chords.iter().map(KeyPattern::from_chord).collect())
    }

    pub fn alternatives(&self) -> SmallVec<[&[KeyPattern]; 2]> {
        match self {
            Pattern::Sequence(s) => smallvec![s.as_slice()],
            Pattern::Alternatives(alts) => alts.iter().map(Vec::as_slice).collect(),
        }
    }

    /// Full match: some alternative has exactly `keys.len()` slots, all agreeing.
    pub fn matches(&self, keys: &[Chord]) -> bool {
        self.alternatives()
            .iter()
            .any(|alt| sequence_matches(alt, keys))
    }

    /// Prefix match: `keys` is consistent with some completion of an alternative.
    ///
    /// Each alternative is truncated to the prefix length and compared slot by
    /// slot, wildcards included. An alternative shorter than the prefix cannot
    /// be completed and is skipped.
    pub fn could_match(&self, keys: &[Chord]) -> bool {
        self.alternatives()
            .iter()
            .filter(|alt| alt.len() >= keys.len())
            .any(|alt| sequence_matches(&alt[..keys.len()], keys))
    }

    /// Placeholder trigger contributed by a plugin (`<plug>...`).
    pub fn is_plugin_trigger(&self) -> bool {
        match self {
            Pattern::Sequence(slots) => slots
                .first()
                .and_then(KeyPattern::literal)
                .is_some_and(|c| c.as_str().to_lowercase().starts_with("<plug>")),
            Pattern::Alternatives(_) => false,
        }
    }

    /// First slot as a literal chord, if any.
    pub fn leading_chord(&self) -> Option<&Chord> {
        match self {
            Pattern::Sequence(slots) => slots.first().and_then(KeyPattern::literal),
            Pattern::Alternatives(alts) => alts.first()?.first().and_then(KeyPattern::literal),
        }
    }
}

fn parse_slots(text: &str) -> Vec<KeyPattern> {
    tokenize_key_sequence(text)
        .iter()
        .map(KeyPattern::from_chord)
        .collect()
}
