//! Integration tests for bracket generation: sizing, byes, seeding and the one-shot guard.

mod common;

use bracket_tournament_web::logic::prepare_field;
use bracket_tournament_web::{
    EngineError, ErrorKind, Event, EventStatus, LifecycleEvent, MatchStatus, Registration,
    RegistrationSource, Slot,
};
use chrono::{Duration, TimeZone, Utc};
use common::harness;
use rand::seq::SliceRandom;

#[test]
fn round_counts_for_every_field_size() {
    for n in 2..=17usize {
        let h = harness(1);
        let (event, _) = h.open_event_with_teams(n);
        let bracket = h.engine.generate_bracket(event.id).unwrap();

        let size = n.next_power_of_two();
        let expected_rounds = size.trailing_zeros() as usize;
        assert_eq!(bracket.rounds.len(), expected_rounds, "n = {n}");
        assert_eq!(bracket.rounds[0].matches.len(), size / 2, "n = {n}");
        assert_eq!(bracket.rounds.last().unwrap().matches.len(), 1, "n = {n}");
        for (i, r) in bracket.rounds.iter().enumerate() {
            assert_eq!(r.round as usize, i + 1);
            let numbers: Vec<u32> = r.matches.iter().map(|m| m.position.match_number).collect();
            let expected: Vec<u32> = (1..=r.matches.len() as u32).collect();
            assert_eq!(numbers, expected);
        }
        let final_match = bracket.final_match().unwrap();
        assert_eq!(final_match.position.match_number, 1);
        assert_eq!(final_match.position.side, None);
    }
}

#[test]
fn four_teams_pair_sequentially_with_placeholder_final() {
    let h = harness(1);
    let (event, t) = h.open_event_with_teams(4);
    let bracket = h.engine.generate_bracket(event.id).unwrap();

    let r1 = &bracket.rounds[0].matches;
    assert_eq!((r1[0].team_a, r1[0].team_b), (Some(t[0]), Some(t[1])));
    assert_eq!((r1[1].team_a, r1[1].team_b), (Some(t[2]), Some(t[3])));
    assert!(r1.iter().all(|m| m.status == MatchStatus::Upcoming));
    assert_eq!(r1[0].position.side, Some(Slot::A));
    assert_eq!(r1[1].position.side, Some(Slot::B));

    let final_match = &bracket.rounds[1].matches[0];
    assert_eq!((final_match.team_a, final_match.team_b), (None, None));
    assert_eq!(final_match.status, MatchStatus::Upcoming);

    let event = h.engine.get_event(event.id).unwrap();
    assert!(event.bracket_generated);
    assert_eq!(event.status, EventStatus::InProgress);
    assert_eq!(event.rounds, 2);
    assert_eq!(h.sink.count(&LifecycleEvent::BracketGenerated(event.id)), 1);
}

#[test]
fn three_teams_top_seed_gets_a_bye() {
    let h = harness(1);
    let (event, t) = h.open_event_with_teams(3);
    let bracket = h.engine.generate_bracket(event.id).unwrap();

    let bye = &bracket.rounds[0].matches[0];
    assert_eq!(bye.team_a, Some(t[0]));
    assert_eq!(bye.team_b, None);
    assert_eq!(bye.status, MatchStatus::Finished);
    assert_eq!(bye.winner, Some(t[0]));

    let real = &bracket.rounds[0].matches[1];
    assert_eq!((real.team_a, real.team_b), (Some(t[1]), Some(t[2])));
    assert_eq!(real.status, MatchStatus::Upcoming);

    let final_match = bracket.final_match().unwrap();
    assert_eq!(final_match.team_a, Some(t[0]));
    assert_eq!(final_match.team_b, None);
    assert_eq!(h.sink.count(&LifecycleEvent::MatchAdvanced(bye.id)), 1);
}

#[test]
fn byes_can_fill_both_slots_of_a_round_two_match() {
    let h = harness(1);
    let (event, t) = h.open_event_with_teams(5);
    let bracket = h.engine.generate_bracket(event.id).unwrap();

    let r2 = &bracket.rounds[1].matches;
    assert_eq!((r2[0].team_a, r2[0].team_b), (Some(t[0]), Some(t[1])));
    assert_eq!((r2[1].team_a, r2[1].team_b), (Some(t[2]), None));

    // Both slots resolved by byes: playable straight away.
    h.engine.start_match(r2[0].id).unwrap();
    // Still waiting on seeds 4 vs 5.
    assert!(matches!(
        h.engine.start_match(r2[1].id),
        Err(EngineError::InvalidTransition { .. })
    ));
}

#[test]
fn generating_twice_is_rejected_without_duplicates() {
    let h = harness(1);
    let (event, _) = h.open_event_with_teams(4);
    h.engine.generate_bracket(event.id).unwrap();

    let err = h.engine.generate_bracket(event.id).unwrap_err();
    assert!(matches!(err, EngineError::AlreadyGenerated(id) if id == event.id));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let bracket = h.engine.get_bracket(event.id).unwrap();
    let total: usize = bracket.rounds.iter().map(|r| r.matches.len()).sum();
    assert_eq!(total, 3);
    assert_eq!(h.sink.count(&LifecycleEvent::BracketGenerated(event.id)), 1);
}

#[test]
fn fewer_than_two_accepted_teams_is_rejected() {
    let h = harness(1);
    let (event, _) = h.open_event_with_teams(1);
    // Pending registrations do not count.
    h.registrations
        .register(&event, "Late Team", vec!["late".into()])
        .unwrap();

    let err = h.engine.generate_bracket(event.id).unwrap_err();
    assert!(matches!(err, EngineError::InsufficientTeams { found: 1 }));
    assert_eq!(err.kind(), ErrorKind::InsufficientTeams);

    let event = h.engine.get_event(event.id).unwrap();
    assert!(!event.bracket_generated);
    assert_eq!(event.status, EventStatus::Open);
    assert!(h.engine.get_bracket(event.id).unwrap().rounds.is_empty());
}

#[test]
fn generation_requires_open_or_closed_registration() {
    let h = harness(1);
    let event = h.engine.create_event("Draft Cup", "1v1", 8).unwrap();
    assert!(matches!(
        h.engine.generate_bracket(event.id),
        Err(EngineError::InvalidEventTransition {
            from: EventStatus::Draft,
            ..
        })
    ));

    let event = h.engine.open_registration(event.id).unwrap();
    h.accept_teams(&event, 4);
    h.engine.close_registration(event.id).unwrap();
    h.engine.generate_bracket(event.id).unwrap();
}

#[test]
fn registrations_follow_the_event_lifecycle() {
    let h = harness(1);
    let draft = h.engine.create_event("Gated Cup", "1v1", 8).unwrap();
    assert!(matches!(
        h.registrations.register(&draft, "Early Bird", vec!["e".into()]),
        Err(EngineError::InvalidEventTransition {
            from: EventStatus::Draft,
            ..
        })
    ));

    let open = h.engine.open_registration(draft.id).unwrap();
    let teams = h.accept_teams(&open, 2);
    let pending = h
        .registrations
        .register(&open, "Pending", vec!["p".into()])
        .unwrap();

    // Closed: no new sign-ups, but pending ones can still be reviewed.
    let closed = h.engine.close_registration(open.id).unwrap();
    assert!(h
        .registrations
        .register(&closed, "Too Late", vec!["t".into()])
        .is_err());
    h.registrations.reject(&closed, pending.id).unwrap();

    h.engine.generate_bracket(closed.id).unwrap();
    let started = h.engine.get_event(closed.id).unwrap();
    let err = h
        .registrations
        .accept(&started, pending.id, Utc::now())
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidEventTransition {
            from: EventStatus::InProgress,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::State);
    let seeded = h
        .registrations
        .registrations(started.id)
        .unwrap()
        .into_iter()
        .find(|r| r.team_id == teams[0])
        .unwrap();
    assert!(h.registrations.reject(&started, seeded.id).is_err());
    assert!(!h.registrations.get(pending.id).unwrap().is_accepted());
}

#[test]
fn seeds_follow_acceptance_time_not_insertion_order() {
    let h = harness(1);
    let event = h.engine.create_event("Seeded Cup", "1v1", 16).unwrap();
    let event = h.engine.open_registration(event.id).unwrap();

    let base = Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap();
    let mut order: Vec<i64> = (0..8).collect();
    order.shuffle(&mut rand::thread_rng());
    let mut by_minute = vec![None; 8];
    for minute in order {
        let reg = h
            .registrations
            .register(&event, &format!("Team {minute}"), vec![format!("p{minute}")])
            .unwrap();
        let reg = h
            .registrations
            .accept(&event, reg.id, base + Duration::minutes(minute))
            .unwrap();
        by_minute[minute as usize] = Some(reg.team_id);
    }

    let bracket = h.engine.generate_bracket(event.id).unwrap();
    let seeded: Vec<_> = bracket.rounds[0]
        .matches
        .iter()
        .flat_map(|m| [m.team_a, m.team_b])
        .collect();
    assert_eq!(seeded, by_minute);
}

#[test]
fn roster_must_match_format() {
    let h = harness(1);
    let event = h.engine.create_event("Duos", "2v2", 8).unwrap();
    let event = h.engine.open_registration(event.id).unwrap();

    let err = h
        .registrations
        .register(&event, "Short", vec!["c".into()])
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(h.registrations.registrations(event.id).unwrap().is_empty());
}

#[test]
fn gate_rejects_accepted_team_with_wrong_roster() {
    let mut event = Event::new("Duos", "2v2", 8).unwrap();
    event.status = EventStatus::Open;
    let now = Utc::now();
    let mut full = Registration::new(event.id, "Full", vec!["a".into(), "b".into()]);
    full.accept(now);
    // Rosters stored by another registration source are not trusted.
    let mut short = Registration::new(event.id, "Short", vec!["c".into()]);
    short.accept(now + Duration::seconds(1));

    let err = prepare_field(&event, &[full, short.clone()]).unwrap_err();
    assert!(matches!(
        err,
        EngineError::IncompleteRoster { team_id, expected: 2, found: 1 } if team_id == short.team_id
    ));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn only_max_teams_earliest_acceptances_are_seeded() {
    let h = harness(1);
    let event = h.engine.create_event("Small Cup", "1v1", 4).unwrap();
    let event = h.engine.open_registration(event.id).unwrap();
    let teams = h.accept_teams(&event, 6);

    let bracket = h.engine.generate_bracket(event.id).unwrap();
    let seeded: Vec<_> = bracket.rounds[0]
        .matches
        .iter()
        .flat_map(|m| [m.team_a, m.team_b])
        .flatten()
        .collect();
    assert_eq!(seeded, teams[..4].to_vec());
}

#[test]
fn csv_import_feeds_generation() {
    let h = harness(1);
    let event = h.engine.create_event("Imported Cup", "2v2", 8).unwrap();
    let event = h.engine.open_registration(event.id).unwrap();
    let csv = "team_name,players,accepted_at\n\
               Late,e;f,2026-05-01T10:05:00Z\n\
               Early,a;b,2026-05-01T10:00:00Z\n\
               Pending,c;d,\n";
    h.registrations.import_csv(&event, csv.as_bytes()).unwrap();

    let bracket = h.engine.generate_bracket(event.id).unwrap();
    assert_eq!(bracket.rounds.len(), 1);

    let final_match = bracket.final_match().unwrap();
    let regs = h.registrations.registrations(event.id).unwrap();
    let team = |name: &str| regs.iter().find(|r| r.team_name == name).unwrap().team_id;
    assert_eq!(final_match.team_a, Some(team("Early")));
    assert_eq!(final_match.team_b, Some(team("Late")));
}
