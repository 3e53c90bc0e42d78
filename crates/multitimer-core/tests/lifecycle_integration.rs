//! Integration tests for timer lifecycle through the service command surface.

use chrono::{TimeZone, Utc};
use multitimer_core::{
    Change, Command, CoreError, Event, ManualClock, MemoryStore, Phase, ResetZone,
    ServiceOptions, TimerMode, TimerService,
};

fn open() -> (TimerService<MemoryStore, ManualClock>, ManualClock) {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 3, 8, 0, 0).unwrap());
    let options = ServiceOptions {
        zone: ResetZone::from_offset_minutes(Some(0)),
        ..ServiceOptions::default()
    };
    let svc = TimerService::open(MemoryStore::new(), clock.clone(), options).unwrap();
    (svc, clock)
}

#[test]
fn test_full_pomodoro_cycle() {
    let (mut svc, clock) = open();
    let id = svc.create().unwrap().id;
    svc.set_duration(id, 1).unwrap();

    // Four work sessions, each followed by its break.
    for session in 1..=4u32 {
        svc.start(id).unwrap();
        clock.advance_secs(60);
        svc.pump().unwrap();
        let view = svc.view(id).unwrap();
        assert_eq!(view.sessions_completed, session);
        if session == 4 {
            assert_eq!(view.phase, Some(Phase::LongBreak));
            assert_eq!(view.time, "15:00");
        } else {
            assert_eq!(view.phase, Some(Phase::ShortBreak));
            assert_eq!(view.time, "05:00");
        }

        let break_secs = if session == 4 { 900 } else { 300 };
        svc.start(id).unwrap();
        clock.advance_secs(break_secs);
        svc.pump().unwrap();
        let view = svc.view(id).unwrap();
        assert_eq!(view.phase, Some(Phase::Work));
        // Back to this timer's own work length.
        assert_eq!(view.time, "01:00");
        assert!(!view.running);
    }
}

#[test]
fn test_positional_titles_follow_order() {
    let (mut svc, clock) = open();
    let a = svc.create().unwrap();
    let b = svc.create().unwrap();
    clock.advance_secs(1);
    let c = svc.create().unwrap();
    assert_eq!(a.title, "Timer #1");
    assert_eq!(b.title, "Timer #2");
    assert_eq!(c.title, "Timer #3");
    assert_ne!(a.id, b.id);

    svc.rename(b.id, "Emails").unwrap();
    svc.delete(a.id).unwrap();
    let titles: Vec<String> = svc.list().into_iter().map(|v| v.title).collect();
    assert_eq!(titles, vec!["Emails".to_string(), "Timer #2".to_string()]);
}

#[test]
fn test_delete_stops_scheduling() {
    let (mut svc, clock) = open();
    let keep = svc.create().unwrap().id;
    let gone = svc.create().unwrap().id;
    svc.start(keep).unwrap();
    svc.start(gone).unwrap();

    clock.advance_secs(2);
    svc.pump().unwrap();
    svc.delete(gone).unwrap();
    assert!(!svc.scheduler().is_scheduled(gone));
    svc.drain_events();

    clock.advance_secs(5);
    assert_eq!(svc.pump().unwrap(), 5);
    assert!(matches!(svc.view(gone), Err(CoreError::NotFound { .. })));
    for event in svc.drain_events() {
        if let Some(timer) = event.timer() {
            assert_eq!(timer.id, keep);
        }
    }
}

#[test]
fn test_mode_switch_cancels_cadence() {
    let (mut svc, clock) = open();
    let id = svc.create().unwrap().id;
    svc.start(id).unwrap();
    clock.advance_secs(3);
    svc.pump().unwrap();

    let view = svc.set_mode(id, TimerMode::CountUp).unwrap();
    assert!(!view.running);
    assert_eq!(view.time, "00:00");
    assert_eq!(view.phase_label, "Stopwatch");
    assert!(!svc.scheduler().is_scheduled(id));

    svc.start(id).unwrap();
    clock.advance_secs(125);
    svc.pump().unwrap();
    assert_eq!(svc.view(id).unwrap().time, "02:05");

    let view = svc.set_mode(id, TimerMode::Countdown).unwrap();
    assert_eq!(view.phase, Some(Phase::Work));
    assert_eq!(view.time, "25:00");
}

#[test]
fn test_every_mutation_emits_a_change() {
    let (mut svc, _clock) = open();
    svc.drain_events();
    let id = svc.dispatch(Command::Create).unwrap().id;
    svc.dispatch(Command::Toggle { id }).unwrap();
    svc.dispatch(Command::Toggle { id }).unwrap();
    svc.dispatch(Command::Rename { id, text: "Study".into() }).unwrap();
    svc.dispatch(Command::Reset { id }).unwrap();

    let changes: Vec<Change> = svc
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            Event::TimerChanged { change, .. } => Some(change),
            _ => None,
        })
        .collect();
    assert_eq!(
        changes,
        vec![
            Change::Created,
            Change::Started,
            Change::Paused,
            Change::Renamed,
            Change::Reset
        ]
    );
}

#[test]
fn test_rejected_duration_reports_validation() {
    let (mut svc, _clock) = open();
    let id = svc.create().unwrap().id;
    for bad in ["0", "61", "x", ""] {
        let err = svc
            .dispatch(Command::SetDuration { id, minutes: bad.into() })
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)), "{bad} accepted");
    }
    assert_eq!(svc.view(id).unwrap().time, "25:00");
}
