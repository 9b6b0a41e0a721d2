//! Flat string to chord tokenization.
//!
//! `"abc<Esc>d<C-c>"` becomes `["a", "b", "c", "<Esc>", "d", "<C-c>"]`.
//! Malformed brackets never fail: a nested `<` flushes what was accumulated as
//! literal characters and restarts, and an unterminated bracket at the end is
//! emitted character by character (e.g. a lone `<` used as a shift operator).

use crate::Chord;

pub fn tokenize_key_sequence(sequence: &str) -> Vec<Chord> {
    let mut in_bracket = false;
    let mut key = String::new();
    let mut result = Vec::with_capacity(sequence.len());

    for ch in sequence.chars() {
        if ch == '<' {
            if in_bracket {
                push_literal(&mut result, &key);
                key.clear();
            } else {
                in_bracket = true;
            }
        }
        key.push(ch);

        if ch == '>' {
            in_bracket = false;
        }
        if in_bracket {
            continue;
        }

        result.push(Chord::new(std::mem::take(&mut key)));
    }

    if in_bracket {
        push_literal(&mut result, &key);
    }
    result
}

fn push_literal(out: &mut Vec<Chord>, text: &str) {
    out.extend(text.chars().map(Chord::from));
}
