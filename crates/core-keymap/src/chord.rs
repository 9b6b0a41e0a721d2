use std::fmt;
use std::ops::Deref;

use crate::tokenize::tokenize_key_sequence;

/// Reserved chord appended to a batch whose buffering timeout already elapsed.
pub const FLUSH_CHORD: &str = "<BufferedKeys>";

/// One atomic keypress in canonical text form.
///
/// Either a single character (`"j"`, `" "`, `"\n"`) or a bracketed name
/// (`"<Esc>"`, `"<C-c>"`). Equality is exact string equality, so callers are
/// expected to run raw user text through [`crate::normalize_key`] first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Chord(String);

impl Chord {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The synthetic flush signal.
    pub fn flush() -> Self {
        Self(FLUSH_CHORD.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_flush(&self) -> bool {
        self.0 == FLUSH_CHORD
    }

    /// Single ASCII digit (`0`..=`9`).
    pub fn is_digit(&self) -> bool {
        self.single_char().is_some_and(|c| c.is_ascii_digit())
    }

    /// Single ASCII letter.
    pub fn is_alpha(&self) -> bool {
        self.single_char().is_some_and(|c| c.is_ascii_alphabetic())
    }

    fn single_char(&self) -> Option<char> {
        let mut chars = self.0.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Chord {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Chord {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<char> for Chord {
    fn from(c: char) -> Self {
        Self(c.to_string())
    }
}

impl AsRef<str> for Chord {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Concatenate chords into the text form used as remap table keys.
pub fn join_chords(chords: &[Chord]) -> String {
    let mut out = String::with_capacity(chords.iter().map(|c| c.0.len()).sum());
    for c in chords {
        out.push_str(&c.0);
    }
    out
}

/// Ordered, finite list of chords.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeySequence(Vec<Chord>);

impl KeySequence {
    pub fn new(chords: Vec<Chord>) -> Self {
        Self(chords)
    }

    /// Tokenize flat notation (`"d<C-c>"`) into a sequence.
    pub fn parse(text: &str) -> Self {
        Self(tokenize_key_sequence(text))
    }

    /// Concatenated canonical text.
    pub fn text(&self) -> String {
        join_chords(&self.0)
    }

    pub fn push(&mut self, chord: Chord) {
        self.0.push(chord);
    }

    pub fn into_vec(self) -> Vec<Chord> {
        self.0
    }
}

impl Deref for KeySequence {
    type Target = [Chord];

    fn deref(&self) -> &[Chord] {
        &self.0
    }
}

impl From<Vec<Chord>> for KeySequence {
    fn from(v: Vec<Chord>) -> Self {
        Self(v)
    }
}

impl FromIterator<Chord> for KeySequence {
    fn from_iter<I: IntoIterator<Item = Chord>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.0 {
            f.write_str(c.as_str())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_and_alpha_classes() {
        assert!(Chord::from('5').is_digit());
        assert!(!Chord::from("<Esc>").is_digit());
        assert!(Chord::from('g').is_alpha());
        assert!(!Chord::from('5').is_alpha());
        assert!(!Chord::from("é").is_alpha());
    }

    #[test]
    fn flush_chord_is_reserved() {
        assert!(Chord::flush().is_flush());
        assert!(!Chord::from("<Esc>").is_flush());
    }

    #[test]
    fn sequence_text_concatenates() {
        let seq = KeySequence::parse("a<C-c>b");
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.text(), "a<C-c>b");
        assert_eq!(seq.to_string(), "a<C-c>b");
    }
}
