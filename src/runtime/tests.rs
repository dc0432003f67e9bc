//! Tests for the interpreter

use super::*;
use crate::driver::Driver;
use crate::presentation::{PresenterCall, Recorder};
use crate::resources::AssetCatalog;
use crate::types::ChoiceSignal;
use std::time::Duration;

fn driver_with(resources: AssetCatalog) -> Driver<Recorder, AssetCatalog> {
    Driver::new(Interpreter::new(Recorder::new(), resources))
}

fn driver() -> Driver<Recorder, AssetCatalog> {
    driver_with(AssetCatalog::new())
}

fn character(id: &str, action: CharAction, state: Option<&str>, side: Option<Side>) -> Instruction {
    Instruction::Char {
        id: id.to_string(),
        action,
        state: state.map(str::to_string),
        side,
        wait: None,
    }
}

fn bgm(action: BgmAction, id: Option<&str>) -> Instruction {
    Instruction::Bgm {
        action,
        id: id.map(str::to_string),
        looping: None,
    }
}

fn branching_script() -> Script {
    Script::new(vec![
        Instruction::narrate("Which way?"),
        Instruction::choice(vec![
            ChoiceOption::new("Left").goto("left"),
            ChoiceOption::new("Right").goto("right"),
        ]),
        Instruction::label("left"),
        Instruction::narrate("went left"),
        Instruction::End,
        Instruction::label("right"),
        Instruction::narrate("went right"),
        Instruction::End,
    ])
}

#[test]
fn line_before_end_waits_for_advance() {
    let mut driver = driver();

    let step = driver.play(Script::new(vec![
        Instruction::say("hana", "hi"),
        Instruction::End,
    ]));

    assert_eq!(step, Step::AwaitAdvance);
    assert_eq!(driver.interpreter().phase(), Phase::AwaitingAdvance);
    assert_eq!(driver.elapsed(), Duration::from_millis(60));
    assert_eq!(driver.interpreter().presenter().dialogue_texts(), vec!["h", "hi"]);

    assert_eq!(driver.advance_and_run(), Step::Ended);
    let calls = driver.interpreter().presenter().calls();
    assert_eq!(
        calls.last(),
        Some(&PresenterCall::ShowEnd(EngineConfig::default().end_text))
    );

    assert_eq!(driver.advance(), Step::Ignored);
    assert_eq!(driver.interpreter().phase(), Phase::Ended);
}

#[test]
fn running_off_the_end_does_not_show_end_text() {
    let mut driver = driver();
    assert_eq!(driver.play(Script::new(vec![Instruction::wait(10)])), Step::Ended);

    let calls = driver.interpreter().presenter().calls();
    assert!(!calls.iter().any(|c| matches!(c, PresenterCall::ShowEnd(_))));
}

#[test]
fn line_followed_by_choice_presents_it_without_advance() {
    let mut driver = driver();

    let step = driver.play(branching_script());

    assert_eq!(step, Step::AwaitChoice);
    let interpreter = driver.interpreter();
    assert_eq!(interpreter.phase(), Phase::AwaitingChoice);
    assert_eq!(interpreter.pending_choices().map(<[_]>::len), Some(2));
    assert!(interpreter.presenter().calls().contains(&PresenterCall::RenderChoices(vec![
        "Left".to_string(),
        "Right".to_string()
    ])));
}

#[test]
fn selecting_a_choice_jumps_to_its_label() {
    let mut driver = driver();
    driver.play(branching_script());

    let step = driver.choose_and_run(1).unwrap();

    assert_eq!(step, Step::AwaitAdvance);
    let interpreter = driver.interpreter();
    assert_eq!(interpreter.dialogue().map(|d| d.text.as_str()), Some("went right"));
    assert!(interpreter.pending_choices().is_none());
    assert!(interpreter.presenter().calls().contains(&PresenterCall::ClearChoices));
    assert_eq!(driver.advance_and_run(), Step::Ended);
}

#[test]
fn out_of_range_choice_is_rejected_without_side_effects() {
    let mut driver = driver();
    driver.play(branching_script());
    let calls_before = driver.interpreter().presenter().calls().len();
    let pc_before = driver.interpreter().pc();

    let result = driver.select_choice(5);

    assert!(matches!(
        result,
        Err(EngineError::ChoiceOutOfRange { index: 5, len: 2 })
    ));
    let interpreter = driver.interpreter();
    assert_eq!(interpreter.phase(), Phase::AwaitingChoice);
    assert_eq!(interpreter.pc(), pc_before);
    assert_eq!(interpreter.presenter().calls().len(), calls_before);

    // still answerable
    assert_eq!(driver.choose_and_run(0).unwrap(), Step::AwaitAdvance);
}

#[test]
fn choice_outside_a_choice_point_is_ignored() {
    let mut driver = driver();
    driver.play(Script::new(vec![Instruction::narrate("no choice here")]));

    assert_eq!(driver.select_choice(0).unwrap(), Step::Ignored);
    assert_eq!(driver.interpreter().phase(), Phase::AwaitingAdvance);
}

#[test]
fn choice_signal_is_emitted_and_flow_falls_through() {
    let signal = ChoiceSignal::new("trust").with_payload(serde_json::json!({ "delta": 1 }));
    let mut driver = driver();
    driver.play(Script::new(vec![
        Instruction::choice(vec![ChoiceOption::new("Believe her").on_select(signal.clone())]),
        Instruction::narrate("next"),
    ]));

    assert_eq!(driver.choose_and_run(0).unwrap(), Step::AwaitAdvance);

    let calls = driver.interpreter().presenter().calls();
    let emitted = calls
        .iter()
        .position(|c| c == &PresenterCall::Signal(signal.clone()))
        .expect("signal emitted");
    let cleared = calls
        .iter()
        .position(|c| c == &PresenterCall::ClearChoices)
        .expect("choices cleared");
    assert!(emitted < cleared);
    assert_eq!(
        driver.interpreter().dialogue().map(|d| d.text.as_str()),
        Some("next")
    );
}

#[test]
fn empty_choice_is_reported_and_skipped() {
    let mut driver = driver();
    let step = driver.play(Script::new(vec![
        Instruction::choice(Vec::new()),
        Instruction::narrate("after"),
    ]));

    assert_eq!(step, Step::AwaitAdvance);
    assert_eq!(
        driver.interpreter().diagnostics(),
        &[Diagnostic::MissingField {
            kind: "choice".to_string(),
            field: "choices".to_string(),
            offset: 0,
        }]
    );
}

#[test]
fn jump_skips_to_instruction_after_label() {
    let mut driver = driver();
    driver.play(Script::new(vec![
        Instruction::jump("b"),
        Instruction::narrate("skipped"),
        Instruction::label("b"),
        Instruction::narrate("landed"),
    ]));

    let interpreter = driver.interpreter();
    assert_eq!(interpreter.pc(), 4);
    assert_eq!(interpreter.dialogue().map(|d| d.text.as_str()), Some("landed"));
    assert!(interpreter.diagnostics().is_empty());
}

#[test]
fn jump_to_unknown_label_falls_through() {
    let mut driver = driver();
    let step = driver.play(Script::new(vec![
        Instruction::jump("nowhere"),
        Instruction::narrate("after"),
    ]));

    assert_eq!(step, Step::AwaitAdvance);
    let interpreter = driver.interpreter();
    assert_eq!(interpreter.dialogue().map(|d| d.text.as_str()), Some("after"));
    assert_eq!(
        interpreter.diagnostics(),
        &[Diagnostic::UnknownLabel {
            label: "nowhere".to_string(),
            offset: 0,
        }]
    );
}

#[test]
fn jump_cycle_without_suspension_stops_the_run() {
    let mut driver = driver();
    let step = driver.play(Script::new(vec![
        Instruction::label("loop"),
        Instruction::jump("loop"),
    ]));

    assert_eq!(step, Step::Stopped);
    assert_eq!(driver.interpreter().phase(), Phase::Stopped);
    assert!(matches!(
        driver.interpreter().diagnostics().last(),
        Some(Diagnostic::Stalled { .. })
    ));
}

#[test]
fn pc_only_moves_forward_without_jumps() {
    let resources = AssetCatalog::new()
        .with_character("hana", "Hana", &[("normal", "hana/normal.png")])
        .with_background("room", "bg/room.png");
    let mut driver = driver_with(resources);
    driver.start(Script::new(vec![
        Instruction::Bg {
            show: None,
            src: Some("room".to_string()),
            wait: None,
        },
        character("hana", CharAction::Show, None, None),
        Instruction::wait(100),
        Instruction::say("hana", "ok"),
        bgm(BgmAction::Stop, None),
        Instruction::End,
    ]));

    let mut seen = vec![driver.interpreter().pc()];
    loop {
        while driver.fire_next().is_some() {
            seen.push(driver.interpreter().pc());
        }
        if driver.advance() == Step::Ignored {
            break;
        }
        seen.push(driver.interpreter().pc());
    }

    assert!(seen.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(driver.interpreter().phase(), Phase::Ended);
}

#[test]
fn advance_is_ignored_while_text_is_revealing() {
    let mut driver = driver();
    driver.start(Script::new(vec![
        Instruction::narrate("hello"),
        Instruction::narrate("second"),
    ]));
    driver.fire_next();

    assert!(driver.interpreter().is_revealing());
    assert_eq!(driver.advance(), Step::Ignored);

    assert_eq!(driver.run_until_blocked(), Step::AwaitAdvance);
    let interpreter = driver.interpreter();
    assert_eq!(interpreter.presenter().dialogue_texts().last(), Some(&"hello"));
    assert_eq!(interpreter.pc(), 1);
}

#[test]
fn empty_line_completes_after_one_interval() {
    let mut driver = driver();
    assert_eq!(
        driver.play(Script::new(vec![Instruction::narrate("")])),
        Step::AwaitAdvance
    );
    assert_eq!(driver.elapsed(), Duration::from_millis(30));
}

#[test]
fn speaker_id_is_resolved_to_display_name() {
    let resources = AssetCatalog::new().with_character("hana", "Hana", &[]);
    let mut driver = driver_with(resources);
    driver.play(Script::new(vec![
        Instruction::say("hana", "hi"),
        Instruction::say("mystery", "who?"),
    ]));
    assert!(driver
        .interpreter()
        .presenter()
        .calls()
        .contains(&PresenterCall::ShowDialogue(Some("Hana".to_string()))));

    driver.advance_and_run();
    assert_eq!(
        driver.interpreter().dialogue().and_then(|d| d.speaker.as_deref()),
        Some("mystery")
    );
}

#[test]
fn stop_turns_pending_timers_into_no_ops() {
    let mut interpreter = Interpreter::new(Recorder::new(), AssetCatalog::new());
    let Step::Resume { wake, .. } = interpreter.start(Script::new(vec![
        Instruction::wait(100),
        Instruction::narrate("never"),
    ])) else {
        panic!("expected a timer request");
    };

    interpreter.stop();

    assert_eq!(interpreter.wake(wake), Step::Ignored);
    assert_eq!(interpreter.phase(), Phase::Stopped);
    assert_eq!(interpreter.pc(), 1);
    assert!(interpreter.presenter().calls().is_empty());
    assert_eq!(interpreter.advance(), Step::Ignored);
}

#[test]
fn stop_during_reveal_drops_completion() {
    let mut interpreter = Interpreter::new(Recorder::new(), AssetCatalog::new());
    let Step::Resume { wake, .. } = interpreter.start(Script::new(vec![Instruction::narrate("hi")]))
    else {
        panic!("expected a reveal tick");
    };
    assert!(wake.is_reveal());

    interpreter.stop();

    assert!(!interpreter.is_revealing());
    assert_eq!(interpreter.wake(wake), Step::Ignored);
    assert!(interpreter.presenter().dialogue_texts().is_empty());
}

#[test]
fn restart_makes_earlier_wakes_stale() {
    let script = Script::new(vec![Instruction::wait(100), Instruction::wait(100)]);
    let mut interpreter = Interpreter::new(Recorder::new(), AssetCatalog::new());
    let Step::Resume { wake: old, .. } = interpreter.start(script.clone()) else {
        panic!("expected a timer request");
    };
    let Step::Resume { wake: fresh, .. } = interpreter.start(script) else {
        panic!("expected a timer request");
    };

    assert_eq!(interpreter.wake(old), Step::Ignored);
    assert_eq!(interpreter.pc(), 1);
    assert!(matches!(interpreter.wake(fresh), Step::Resume { .. }));
    assert_eq!(interpreter.pc(), 2);
}

#[test]
fn wake_is_consumed_once() {
    let mut interpreter = Interpreter::new(Recorder::new(), AssetCatalog::new());
    let Step::Resume { wake, .. } = interpreter.start(Script::new(vec![
        Instruction::wait(100),
        Instruction::wait(100),
    ])) else {
        panic!("expected a timer request");
    };

    assert!(matches!(interpreter.wake(wake), Step::Resume { .. }));
    assert_eq!(interpreter.wake(wake), Step::Ignored);
    assert_eq!(interpreter.pc(), 2);
}

#[test]
fn character_lifecycle_tracks_state() {
    let resources = AssetCatalog::new().with_character(
        "hana",
        "Hana",
        &[("normal", "hana/normal.png"), ("smile", "hana/smile.png")],
    );
    let mut driver = driver_with(resources);

    driver.play(Script::new(vec![
        character("hana", CharAction::Show, None, Some(Side::Left)),
        Instruction::say("hana", "Hi"),
        character("hana", CharAction::SetState, Some("smile"), None),
        character("hana", CharAction::Hide, None, None),
    ]));

    let hana = driver.interpreter().character("hana").cloned().unwrap();
    assert!(hana.visible);
    assert_eq!(hana.state.as_deref(), Some("normal"));
    assert_eq!(hana.side, Side::Left);
    assert!(driver
        .interpreter()
        .presenter()
        .calls()
        .contains(&PresenterCall::ShowCharacter {
            id: "hana".to_string(),
            asset: Some("hana/normal.png".to_string()),
            side: Side::Left,
        }));

    assert_eq!(driver.advance_and_run(), Step::Ended);

    let hana = driver.interpreter().character("hana").cloned().unwrap();
    assert!(!hana.visible);
    assert_eq!(hana.state.as_deref(), Some("smile"));
    let calls = driver.interpreter().presenter().calls();
    assert!(calls.contains(&PresenterCall::CharacterState {
        id: "hana".to_string(),
        asset: "hana/smile.png".to_string(),
    }));
    assert_eq!(calls.last(), Some(&PresenterCall::HideCharacter("hana".to_string())));
    assert!(driver.interpreter().diagnostics().is_empty());
}

#[test]
fn hiding_an_unseen_character_is_reported() {
    let mut driver = driver();
    let step = driver.play(Script::new(vec![character("ghost", CharAction::Hide, None, None)]));

    assert_eq!(step, Step::Ended);
    assert_eq!(
        driver.interpreter().diagnostics(),
        &[Diagnostic::UnknownCharacter {
            id: "ghost".to_string(),
            offset: 0,
        }]
    );
    assert!(driver.interpreter().presenter().calls().is_empty());
}

#[test]
fn set_state_without_state_is_reported() {
    let resources = AssetCatalog::new().with_character("hana", "Hana", &[("normal", "n.png")]);
    let mut driver = driver_with(resources);
    driver.play(Script::new(vec![
        character("hana", CharAction::Show, None, None),
        character("hana", CharAction::SetState, None, None),
    ]));

    assert!(driver
        .interpreter()
        .diagnostics()
        .iter()
        .any(|d| matches!(d, Diagnostic::MissingField { field, offset: 1, .. } if field == "state")));
    assert_eq!(
        driver.interpreter().character("hana").and_then(|c| c.state.as_deref()),
        Some("normal")
    );
}

#[test]
fn background_resolves_ids_and_falls_back_to_literal() {
    let resources = AssetCatalog::new().with_background("classroom", "bg/classroom.jpg");
    let mut driver = driver_with(resources);

    driver.play(Script::new(vec![
        Instruction::Bg {
            show: None,
            src: Some("classroom".to_string()),
            wait: Some(0),
        },
        Instruction::Bg {
            show: Some(false),
            src: Some("street.png".to_string()),
            wait: None,
        },
    ]));

    let interpreter = driver.interpreter();
    assert_eq!(
        interpreter.presenter().calls(),
        &[
            PresenterCall::BackgroundImage("bg/classroom.jpg".to_string()),
            PresenterCall::BackgroundVisible(false),
            PresenterCall::BackgroundImage("street.png".to_string()),
        ]
    );
    assert!(!interpreter.background().visible);
    assert_eq!(interpreter.background().image.as_deref(), Some("street.png"));
    assert_eq!(
        interpreter.diagnostics(),
        &[Diagnostic::UnresolvedAsset {
            kind: "background".to_string(),
            id: "street.png".to_string(),
        }]
    );
    assert_eq!(driver.elapsed(), Duration::from_millis(450));
}

#[test]
fn rejected_playback_still_settles_briefly() {
    let resources = AssetCatalog::new().with_audio("theme", "bgm/theme.ogg");
    let mut driver = Driver::new(Interpreter::new(Recorder::rejecting_audio(), resources));

    let step = driver.play(Script::new(vec![
        bgm(BgmAction::Play, Some("theme")),
        Instruction::End,
    ]));

    assert_eq!(step, Step::Ended);
    assert_eq!(driver.elapsed(), Duration::from_millis(50));
    let interpreter = driver.interpreter();
    assert!(matches!(
        interpreter.diagnostics(),
        [Diagnostic::PlaybackFailed { asset, .. }] if asset == "bgm/theme.ogg"
    ));
    assert_eq!(interpreter.audio().track.as_deref(), Some("bgm/theme.ogg"));
    assert!(interpreter.audio().looping);
}

#[test]
fn pause_and_stop_update_audio_status() {
    let mut driver = driver();
    driver.start(Script::new(vec![
        bgm(BgmAction::Play, Some("theme.ogg")),
        bgm(BgmAction::Pause, None),
        Instruction::narrate("quiet"),
        bgm(BgmAction::Stop, None),
    ]));

    assert_eq!(driver.run_until_blocked(), Step::AwaitAdvance);
    assert_eq!(driver.interpreter().audio().status, AudioStatus::Paused);

    driver.advance_and_run();
    assert_eq!(driver.interpreter().audio().status, AudioStatus::Stopped);
}

#[test]
fn bgm_play_without_id_is_reported() {
    let mut driver = driver();
    driver.play(Script::new(vec![bgm(BgmAction::Play, None)]));

    assert_eq!(
        driver.interpreter().diagnostics(),
        &[Diagnostic::MissingField {
            kind: "bgm".to_string(),
            field: "id".to_string(),
            offset: 0,
        }]
    );
    assert_eq!(driver.interpreter().audio().status, AudioStatus::Stopped);
}

#[test]
fn unknown_instruction_is_skipped() {
    let script = Script::from_json(
        r#"[{"kind": "shake", "power": 3}, {"kind": "say", "text": "still here"}]"#,
    )
    .unwrap();
    let mut driver = driver();

    assert_eq!(driver.play(script), Step::AwaitAdvance);
    let interpreter = driver.interpreter();
    assert_eq!(interpreter.diagnostics(), &[Diagnostic::UnknownInstruction { offset: 0 }]);
    assert_eq!(interpreter.dialogue().map(|d| d.text.as_str()), Some("still here"));
}

#[test]
fn wait_without_duration_uses_default() {
    let mut driver = driver();
    driver.play(Script::new(vec![Instruction::Wait { ms: None }]));
    assert_eq!(driver.elapsed(), Duration::from_millis(500));
}

#[test]
fn snapshot_requires_a_suspension_point() {
    let mut driver = driver();
    driver.start(Script::new(vec![Instruction::narrate("typing")]));

    assert!(matches!(
        driver.interpreter().snapshot(),
        Err(EngineError::NotSuspended { phase: Phase::Running })
    ));
}

#[test]
fn restore_resumes_at_pending_choice() {
    let resources = AssetCatalog::new()
        .with_character("hana", "Hana", &[("normal", "hana/normal.png")])
        .with_background("room", "bg/room.png");
    let mut script_instructions = vec![
        Instruction::Bg {
            show: None,
            src: Some("room".to_string()),
            wait: None,
        },
        character("hana", CharAction::Show, None, Some(Side::Right)),
    ];
    script_instructions.extend(branching_script().iter().cloned());
    let script = Script::new(script_instructions);

    let mut first = driver_with(resources.clone());
    first.play(script.clone());
    let snapshot = first.interpreter().snapshot().unwrap();
    assert_eq!(snapshot.choice_at, Some(3));

    let mut resumed = Interpreter::new(Recorder::new(), resources);
    let step = resumed.restore(script, snapshot).unwrap();

    assert_eq!(step, Step::AwaitChoice);
    assert_eq!(resumed.phase(), Phase::AwaitingChoice);
    let calls = resumed.presenter().calls();
    assert!(calls.contains(&PresenterCall::BackgroundImage("bg/room.png".to_string())));
    assert!(calls.contains(&PresenterCall::ShowCharacter {
        id: "hana".to_string(),
        asset: Some("hana/normal.png".to_string()),
        side: Side::Right,
    }));
    assert!(calls.contains(&PresenterCall::DialogueText("Which way?".to_string())));

    let mut resumed = Driver::new(resumed);
    assert_eq!(resumed.choose_and_run(0).unwrap(), Step::AwaitAdvance);
    assert_eq!(
        resumed.interpreter().dialogue().map(|d| d.text.as_str()),
        Some("went left")
    );
}

#[test]
fn restore_rejects_pc_detached_from_pending_choice() {
    let script = branching_script();
    let mut driver = driver();
    driver.play(script.clone());
    let snapshot = driver.interpreter().snapshot().unwrap();
    let at = snapshot.choice_at.unwrap();
    assert_eq!(snapshot.pc, at + 1);

    for pc in [0, at, at + 2] {
        let mut tampered = snapshot.clone();
        tampered.pc = pc;
        let mut other = Interpreter::new(Recorder::new(), AssetCatalog::new());
        let result = other.restore(script.clone(), tampered);
        assert!(matches!(result, Err(EngineError::InvalidSnapshot(_))), "pc {pc}: {result:?}");
        assert_eq!(other.phase(), Phase::Idle);
        assert!(other.presenter().calls().is_empty());
    }
}

#[test]
fn restore_rejects_snapshot_of_another_script() {
    let mut driver = driver();
    driver.play(branching_script());
    let snapshot = driver.interpreter().snapshot().unwrap();

    let mut other = Interpreter::new(Recorder::new(), AssetCatalog::new());
    let result = other.restore(Script::new(vec![Instruction::narrate("different")]), snapshot);

    assert!(matches!(result, Err(EngineError::SnapshotMismatch)));
    assert_eq!(other.phase(), Phase::Idle);
}

#[test]
fn restore_makes_wakes_of_the_previous_run_stale() {
    let script = Script::new(vec![
        Instruction::narrate("a"),
        Instruction::wait(100),
        Instruction::narrate("b"),
    ]);
    let mut driver = driver();
    driver.play(script.clone());
    let snapshot = driver.interpreter().snapshot().unwrap();

    let mut interpreter = driver.into_interpreter();
    let Step::Resume { wake, .. } = interpreter.advance() else {
        panic!("expected a timer request");
    };
    interpreter.restore(script, snapshot).unwrap();

    assert_eq!(interpreter.wake(wake), Step::Ignored);
    assert_eq!(interpreter.phase(), Phase::AwaitingAdvance);
    assert_eq!(interpreter.pc(), 1);
}
