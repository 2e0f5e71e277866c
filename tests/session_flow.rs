#![allow(clippy::expect_used, clippy::unwrap_used)]

use classspin::config::default_palette;
use classspin::store::EntryStore;
use classspin::{FileStore, PickCount, Session, SessionEvent, SessionState, SpinTuning};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn roster() -> Vec<String> {
    vec!["Default".to_string(), "Roster".to_string()]
}

fn open(store: &FileStore) -> Session<&FileStore> {
    Session::new(store, default_palette(), &roster(), SpinTuning::default())
}

fn land(session: &mut Session<&FileStore>, rng: &mut StdRng) -> Vec<String> {
    let mut ticks = 0;
    loop {
        match session.advance(rng) {
            Some(SessionEvent::Tick) => ticks += 1,
            Some(SessionEvent::Landed(winners)) => {
                assert!(ticks > 0, "a spin should cross at least one segment");
                return winners.into_iter().map(|w| w.text).collect();
            }
            None => assert_eq!(session.state(), SessionState::Spinning),
        }
    }
}

#[test]
fn missing_file_falls_back_to_default_roster() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path().join("nested").join("entries"));
    let session = open(&store);
    assert_eq!(session.text(), "Default\nRoster");
    assert_eq!(store.load().expect("load"), None);
}

#[test]
fn edits_survive_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path().join("nested").join("entries"));
    {
        let mut session = open(&store);
        session.set_text("Alice\nBob\n\nCarol");
    }
    let session = open(&store);
    assert_eq!(session.text(), "Alice\nBob\n\nCarol");
    let texts: Vec<_> = session.segments().iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, ["Alice", "Bob", "Carol"]);
}

#[test]
fn landing_on_bob_and_removing_him() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path().join("entries"));

    for seed in 0..500 {
        let mut session = open(&store);
        session.set_text("Alice\nBob\n\nCarol");
        let mut rng = StdRng::seed_from_u64(seed);
        assert!(session.spin(&mut rng));
        let winners = land(&mut session, &mut rng);
        assert_eq!(session.state(), SessionState::Celebrating);
        if winners != ["Bob"] {
            session.keep_winners();
            continue;
        }

        assert!(session.remove_winners());
        assert_eq!(session.text(), "Alice\nCarol");
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(store.load().expect("load").as_deref(), Some("Alice\nCarol"));
        return;
    }
    panic!("no seed landed on Bob");
}

#[test]
fn dual_pick_on_two_entries_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path().join("entries"));
    let mut session = open(&store);
    session.set_text("X\nY");
    session.set_pick_count(PickCount::Two);

    let mut rng = StdRng::seed_from_u64(7);
    assert!(!session.spin(&mut rng));
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.advance(&mut rng).is_none());
    assert!(session.winners().is_empty());
}

#[test]
fn reset_and_clear_all_round_trip_through_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path().join("entries"));
    let mut session = open(&store);
    session.set_text("One\nTwo\nThree");

    assert!(session.clear_all());
    assert!(session.segments().is_empty());
    assert_eq!(store.load().expect("load").as_deref(), Some(""));

    std::fs::write(store.path(), "Restored\nFrom\nDisk").expect("write");
    assert!(session.reset());
    assert_eq!(session.text(), "Restored\nFrom\nDisk");
    assert_eq!(session.segments().len(), 3);
}

#[test]
fn dual_pick_draws_two_different_people() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path().join("entries"));
    let mut session = open(&store);
    session.set_text("Ann\nBo\nCal\nDee");
    session.set_pick_count(PickCount::Two);

    let mut rng = StdRng::seed_from_u64(99);
    assert!(session.spin(&mut rng));
    let winners = land(&mut session, &mut rng);
    assert_eq!(winners.len(), 2);
    assert_ne!(winners[0], winners[1]);

    assert!(session.remove_winners());
    assert_eq!(session.segments().len(), 2);
    for winner in &winners {
        assert!(!session.text().contains(winner.as_str()));
    }
}
