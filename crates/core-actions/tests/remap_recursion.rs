mod common;
use common::*;

use core_actions::KeyOutcome;
use core_state::Mode;
use pretty_assertions::assert_eq;
use std::time::Instant;

#[test]
fn nonrecursive_self_reference_does_not_loop() {
    let mut d = dispatcher(
        r#"
[[bindings.normal_nonrecursive]]
before = "x"
after = "xy"
"#,
    );
    assert_eq!(d.handle_key_at(chord("x"), Instant::now()), KeyOutcome::Remapped);
    assert_eq!(d.host().typed(), "xy");
    assert!(!d.guard().is_engaged());
}

#[test]
fn recursive_expansion_skips_only_its_first_chord() {
    let mut d = dispatcher(
        r#"
[[bindings.insert]]
before = "ab"
after = "abcd"

[[bindings.insert]]
before = "bc"
after = "Z"
"#,
    );
    d.set_mode(Mode::Insert);
    let outcomes = d.handle_text_at("ab", Instant::now());
    assert_eq!(outcomes.last(), Some(&KeyOutcome::Remapped));
    // `a` is shielded, `bcd` is remapped again (`bc` -> `Z`).
    assert_eq!(d.host().typed(), "aZd");
    assert!(!d.guard().is_engaged());
}

#[test]
fn recursive_mapping_chains_into_other_mappings() {
    let mut d = dispatcher(
        r#"
[[bindings.normal]]
before = "k"
after = "c"

[[bindings.normal]]
before = "c"
after = "z"
"#,
    );
    d.handle_key_at(chord("k"), Instant::now());
    assert_eq!(d.host().typed(), "z");
}

#[test]
fn nonrecursive_expansion_is_not_remapped_again() {
    let mut d = dispatcher(
        r#"
[[bindings.normal_nonrecursive]]
before = "k"
after = "c"

[[bindings.normal]]
before = "c"
after = "z"
"#,
    );
    d.handle_key_at(chord("k"), Instant::now());
    assert_eq!(d.host().typed(), "c");
}

#[test]
fn count_multiplies_expansion() {
    let mut d = dispatcher(
        r#"
[[bindings.normal]]
before = "x"
after = "yz"
"#,
    );
    let outcomes = d.handle_text_at("3x", Instant::now());
    assert_eq!(outcomes, vec![KeyOutcome::Count(3), KeyOutcome::Remapped]);
    assert_eq!(d.host().typed(), "yzyzyz");
    assert!(d.host().ran.iter().all(|r| r.count == 0));
    assert_eq!(d.recorded().count, 0);
}

#[test]
fn trigger_after_other_keys_is_not_remapped_in_normal_mode() {
    let mut d = dispatcher(
        r#"
[[bindings.normal]]
before = "x"
after = "yz"
"#,
    );
    let t0 = Instant::now();
    // `"a` selects a register and leaves the command open.
    d.handle_text_at("\"a", t0);
    assert_eq!(d.handle_key_at(chord("x"), t0), KeyOutcome::Action("letter".into()));
    assert_eq!(d.host().ids(), vec!["register", "letter"]);
}
