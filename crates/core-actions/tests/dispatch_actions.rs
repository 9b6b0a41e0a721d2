mod common;
use common::*;

use core_actions::KeyOutcome;
use core_events::{InputEvent, ModMask, MouseButton, MouseEvent, MouseEventKind};
use core_state::Mode;
use pretty_assertions::assert_eq;
use std::time::Instant;

#[test]
fn unbound_keys_pass_through() {
    let mut d = dispatcher("");
    let t0 = Instant::now();
    assert_eq!(d.handle_key_at(chord("q"), t0), KeyOutcome::PassedThrough);
    assert_eq!(d.handle_key_at(chord("<C-x>"), t0), KeyOutcome::PassedThrough);
    assert_eq!(d.host().passed, vec!["q", "<C-x>"]);
    assert!(d.recorded().command_list.is_empty());
}

#[test]
fn multi_key_action_waits_then_matches() {
    let mut d = dispatcher("");
    let outcomes = d.handle_text_at("gg", Instant::now());
    assert_eq!(
        outcomes,
        vec![KeyOutcome::Waiting, KeyOutcome::Action("goto_top".into())]
    );
}

#[test]
fn operator_then_motion_reports_operator_and_count() {
    let mut d = dispatcher("");
    let outcomes = d.handle_text_at("2dw", Instant::now());
    assert_eq!(
        outcomes,
        vec![
            KeyOutcome::Count(2),
            KeyOutcome::OperatorPending("delete".into()),
            KeyOutcome::Action("word".into()),
        ]
    );
    let ran = &d.host().ran[0];
    assert_eq!(ran.operator.as_deref(), Some("delete"));
    assert_eq!(ran.count, 2);
    assert!(d.recorded().operator.is_none());
}

#[test]
fn visual_operator_applies_immediately() {
    let mut d = dispatcher("");
    d.set_mode(Mode::Visual);
    assert_eq!(d.handle_key_at(chord("d"), Instant::now()), KeyOutcome::Action("delete".into()));
}

#[test]
fn operator_pending_uses_its_own_remaps() {
    let mut d = dispatcher(
        r#"
[[bindings.operator_pending]]
before = "w"
after = "e"

[[bindings.normal]]
before = "w"
after = "b"
"#,
    );
    let t0 = Instant::now();
    d.handle_key_at(chord("d"), t0);
    assert_eq!(d.handle_key_at(chord("w"), t0), KeyOutcome::Remapped);
    assert_eq!(d.host().ids(), vec!["word_end"]);
    // Outside operator-pending the normal remap applies.
    d.handle_key_at(chord("w"), t0);
    assert_eq!(d.host().typed(), "b");
}

#[test]
fn must_be_first_key_action_needs_a_fresh_command() {
    let mut d = dispatcher("");
    let t0 = Instant::now();
    assert_eq!(d.handle_key_at(chord("i"), t0), KeyOutcome::Action("insert".into()));
    assert_eq!(d.mode(), Mode::Insert);
    d.handle_key_at(chord("<Esc>"), t0);
    assert_eq!(d.mode(), Mode::Normal);

    // After a register selection `i` is no longer the first key.
    d.handle_text_at("\"ai", t0);
    assert_eq!(d.mode(), Mode::Normal);
    assert_eq!(d.host().passed, vec!["\"ai"]);
}

#[test]
fn zero_is_a_motion_unless_it_continues_a_count() {
    let mut d = dispatcher("");
    let t0 = Instant::now();
    assert_eq!(d.handle_key_at(chord("0"), t0), KeyOutcome::Action("line_start".into()));
    let outcomes = d.handle_text_at("10x", t0);
    assert_eq!(
        outcomes,
        vec![KeyOutcome::Count(1), KeyOutcome::Count(10), KeyOutcome::Action("letter".into())]
    );
    assert_eq!(d.host().ran.last().map(|r| r.count), Some(10));
}

#[test]
fn zero_continuing_a_count_skips_remaps() {
    let mut d = dispatcher(
        r#"
[[bindings.normal_nonrecursive]]
before = "0"
after = "X"
"#,
    );
    let t0 = Instant::now();
    assert_eq!(d.handle_key_at(chord("0"), t0), KeyOutcome::Remapped);
    assert_eq!(d.host().typed(), "X");
    let outcomes = d.handle_text_at("20", t0);
    assert_eq!(outcomes, vec![KeyOutcome::Count(2), KeyOutcome::Count(20)]);
}

const OP_WW: &str = r#"
[[bindings.operator_pending]]
before = "ww"
after = "e"
"#;

#[test]
fn zero_after_held_motion_is_not_taken_as_count() {
    let mut d = dispatcher(OP_WW);
    let outcomes = d.handle_text_at("d2w0", Instant::now());
    assert_eq!(
        outcomes[..2].to_vec(),
        vec![KeyOutcome::OperatorPending("delete".into()), KeyOutcome::Count(2)]
    );
    assert!(matches!(outcomes[2], KeyOutcome::Buffered { .. }));
    assert_eq!(outcomes[3], KeyOutcome::Remapped);
    assert_eq!(d.host().ids(), vec!["word", "line_start"]);
    let word = &d.host().ran[0];
    assert_eq!((word.count, word.operator.as_deref()), (2, Some("delete")));
    assert_eq!(d.recorded().count, 0);
}

#[test]
fn held_motion_after_operator_completes_the_trigger() {
    let mut d = dispatcher(OP_WW);
    let outcomes = d.handle_text_at("dww", Instant::now());
    assert_eq!(outcomes.last(), Some(&KeyOutcome::Remapped));
    assert_eq!(d.host().ids(), vec!["word_end"]);
    assert_eq!(d.host().ran[0].operator.as_deref(), Some("delete"));
}

#[test]
fn held_motion_after_count_times_out_to_itself() {
    let mut d = dispatcher(OP_WW);
    let t0 = Instant::now();
    d.handle_text_at("d2w", t0);
    let deadline = d.next_deadline().unwrap();
    assert_eq!(d.poll_timers(deadline), Some(KeyOutcome::Action("word".into())));
    assert_eq!(d.host().ran[0].count, 2);
}

#[test]
fn completed_operator_command_can_be_repeated() {
    let mut d = dispatcher("");
    let t0 = Instant::now();
    d.handle_text_at("dw", t0);
    assert_eq!(d.last_repeatable(), Some(&[chord("d"), chord("w")][..]));
    d.handle_key_at(chord("x"), t0);
    // Plain letters are not repeatable and leave the record alone.
    assert_eq!(d.last_repeatable().map(<[_]>::len), Some(2));

    let outcomes = d.repeat_last_at(t0);
    assert_eq!(
        outcomes,
        vec![
            KeyOutcome::OperatorPending("delete".into()),
            KeyOutcome::Action("word".into()),
        ]
    );
    assert!(!d.guard().is_engaged());
}

#[test]
fn repeat_replays_keys_after_remapping() {
    let mut d = dispatcher(
        r#"
[[bindings.operator_pending]]
before = "w"
after = "e"
"#,
    );
    let t0 = Instant::now();
    d.handle_text_at("dw", t0);
    assert_eq!(d.last_repeatable(), Some(&[chord("d"), chord("e")][..]));
}

#[test]
fn bound_commands_run_in_order_and_failures_do_not_stop_them() {
    let mut d = dispatcher(
        r#"
[[bindings.normal_nonrecursive]]
before = "Q"
commands = [{ command = "broken" }, ":write", { command = "editor.fold", args = ["1"] }]
"#,
    );
    d.host_mut().failing.push("broken".into());
    assert_eq!(d.handle_key_at(chord("Q"), Instant::now()), KeyOutcome::Remapped);
    assert_eq!(d.host().commands, vec!["broken", ":write", "editor.fold 1"]);
    assert!(d.host().ran.is_empty());
}

#[test]
fn keys_run_before_commands() {
    let mut d = dispatcher(
        r#"
[[bindings.normal_nonrecursive]]
before = "Q"
after = "x"
commands = [":nohlsearch"]
"#,
    );
    d.handle_key_at(chord("Q"), Instant::now());
    assert_eq!(d.host().typed(), "x");
    assert_eq!(d.host().commands, vec![":nohlsearch"]);
}

fn drag(button: MouseButton) -> InputEvent {
    InputEvent::Mouse(MouseEvent {
        kind: MouseEventKind::Drag(button),
        column: 4,
        row: 2,
        mods: ModMask::empty(),
    })
}

#[test]
fn mouse_drag_enters_visual() {
    let mut d = dispatcher("");
    let t0 = Instant::now();
    d.handle_key_at(chord("g"), t0);
    assert_eq!(d.handle_event(drag(MouseButton::Right), t0), None);
    assert_eq!(d.handle_event(drag(MouseButton::Left), t0), Some(KeyOutcome::ModeChanged(Mode::Visual)));
    assert_eq!(d.mode(), Mode::Visual);
    assert!(d.recorded().command_list.is_empty());
    // Already visual: nothing more to do.
    assert_eq!(d.handle_event(drag(MouseButton::Left), t0), None);
}

#[test]
fn mouse_drag_respects_config() {
    let mut d = dispatcher("[input]\nmouse_selection_enters_visual = false\n");
    assert_eq!(d.handle_event(drag(MouseButton::Left), Instant::now()), None);
    assert_eq!(d.mode(), Mode::Normal);
}

#[test]
fn apply_config_rebuilds_remaps() {
    let mut d = dispatcher("");
    let t0 = Instant::now();
    d.handle_key_at(chord("k"), t0);
    assert_eq!(d.host().typed(), "k");

    let config = core_config::parse_str(
        r#"
[[bindings.normal]]
before = "k"
after = "j"
"#,
    )
    .unwrap();
    d.apply_config(&config);
    d.handle_key_at(chord("k"), t0);
    assert_eq!(d.host().typed(), "kj");
}
