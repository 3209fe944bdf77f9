mod common;

use award_results::errors::{Error, ErrorKind};
use award_results::modules::conflicts::ConflictDetector;
use award_results::modules::helpers::cancel::Cancellation;
use award_results::modules::overrides::OverrideManager;
use award_results::modules::push::{PushCoordinator, PushSummary};
use award_results::modules::store::MemoryStore;

use common::{client_for, FakeRaceServer, BASE_URL};

const AWARD_TYPE: i32 = 1;

/// "Fastest" and "Best Design" share a group allowing one win per car,
/// "Best Paint" has no group. cars 101, 102 and 103 are racers 12, 13 and 14.
fn contest() -> MemoryStore {
    let mut store = MemoryStore::new();
    let group = store.add_group("Design Awards", Some(1));
    store.add_category("Fastest", Some(group.id));
    store.add_category("Best Design", Some(group.id));
    store.add_category("Best Paint", None);
    store.add_car(101, "Ada", Some(12));
    store.add_car(102, "Bo", Some(13));
    store.add_car(103, "Cy", Some(14));
    store
}

fn coordinator(server: FakeRaceServer) -> (PushCoordinator<common::FakeTransport>, std::sync::Arc<std::sync::Mutex<FakeRaceServer>>) {
    let (client, handle) = client_for(server);
    (PushCoordinator::new(client, AWARD_TYPE), handle)
}

#[test]
fn publishes_every_determined_winner() {
    let mut store = contest();
    store.add_votes(1, 1, 2);
    store.add_votes(1, 2, 1);
    store.add_votes(2, 2, 2);
    store.add_votes(2, 3, 1);
    let (coordinator, server) = coordinator(FakeRaceServer::new());

    let summary = coordinator
        .push_results(&mut store, BASE_URL, &Cancellation::new())
        .unwrap();

    assert_eq!(
        summary,
        PushSummary {
            winners_pushed: 2,
            awards_created: 2,
            categories_skipped: 1
        }
    );
    let server = server.lock().unwrap();
    assert_eq!(server.winners, vec![(100, 12), (101, 13)]);
    assert_eq!(server.awards[0].1, "Fastest");
    assert_eq!(server.awards[0].2, AWARD_TYPE);
    assert_eq!(store.categories[0].award_id, Some(100));
    assert_eq!(store.categories[1].award_id, Some(101));
    assert_eq!(store.categories[2].award_id, None);
}

#[test]
fn known_awards_are_not_created_again() {
    let mut store = contest();
    store.add_votes(1, 1, 1);
    store.add_votes(2, 2, 1);
    store.categories[1].award_id = Some(55);
    let (coordinator, server) = coordinator(FakeRaceServer::new());

    let first = coordinator
        .push_results(&mut store, BASE_URL, &Cancellation::new())
        .unwrap();
    let second = coordinator
        .push_results(&mut store, BASE_URL, &Cancellation::new())
        .unwrap();

    assert_eq!(first.awards_created, 1);
    assert_eq!(second.awards_created, 0);
    assert_eq!(second.winners_pushed, 2);
    let server = server.lock().unwrap();
    assert_eq!(server.count("award.edit"), 1);
    assert_eq!(server.count("role.login"), 1);
    assert!(server.winners.contains(&(55, 13)));
}

#[test]
fn tie_blocks_the_push_without_remote_calls() {
    let mut store = contest();
    store.add_votes(3, 1, 1);
    store.add_votes(3, 2, 1);
    let (coordinator, server) = coordinator(FakeRaceServer::new());

    let error = coordinator
        .push_results(&mut store, BASE_URL, &Cancellation::new())
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Conflict);
    match &error.source {
        Error::UnresolvedConflictsError { ties, multiple_wins } => {
            assert_eq!(ties.len(), 1);
            assert!(multiple_wins.is_empty());
        }
        other => panic!("expected unresolved conflicts, got {:?}", other),
    }
    assert_eq!(error.summary, PushSummary::default());
    assert!(server.lock().unwrap().calls.is_empty());
}

#[test]
fn multiple_wins_block_the_push() {
    let mut store = contest();
    store.add_votes(1, 1, 2);
    store.add_votes(1, 2, 1);
    store.add_votes(2, 1, 2);
    store.add_votes(2, 3, 1);
    let (coordinator, server) = coordinator(FakeRaceServer::new());

    let error = coordinator
        .push_results(&mut store, BASE_URL, &Cancellation::new())
        .unwrap_err();

    assert!(matches!(error.source, Error::UnresolvedConflictsError { .. }));
    assert!(server.lock().unwrap().calls.is_empty());
}

#[test]
fn overridden_tie_is_published_but_still_reported() {
    let mut store = contest();
    store.add_votes(3, 1, 1);
    store.add_votes(3, 2, 1);
    OverrideManager::set_manual_winner(&mut store, 3, 2, "judges decision").unwrap();
    let (coordinator, server) = coordinator(FakeRaceServer::new());

    let summary = coordinator
        .push_results(&mut store, BASE_URL, &Cancellation::new())
        .unwrap();

    assert_eq!(summary.winners_pushed, 1);
    assert_eq!(server.lock().unwrap().winners, vec![(100, 13)]);
    let ties = ConflictDetector::detect_ties(&mut store).unwrap();
    assert_eq!(ties.len(), 1);
    assert_eq!(ties[0].category_id, 3);
}

#[test]
fn override_alone_is_published() {
    let mut store = contest();
    store.add_votes(3, 1, 2);
    OverrideManager::set_manual_winner(&mut store, 3, 3, "judges decision").unwrap();
    let (coordinator, server) = coordinator(FakeRaceServer::new());

    let summary = coordinator
        .push_results(&mut store, BASE_URL, &Cancellation::new())
        .unwrap();

    assert_eq!(summary.winners_pushed, 1);
    assert_eq!(server.lock().unwrap().winners, vec![(100, 14)]);
}

#[test]
fn failure_keeps_what_was_already_published() {
    let mut store = contest();
    store.add_votes(1, 1, 1);
    store.add_votes(2, 2, 1);
    store.add_votes(3, 3, 1);
    store.categories[0].award_id = Some(50);
    store.categories[1].award_id = Some(51);
    store.categories[2].award_id = Some(52);
    let mut fake = FakeRaceServer::new();
    fake.failing_award_ids.insert(51);
    let (coordinator, server) = coordinator(fake);

    let error = coordinator
        .push_results(&mut store, BASE_URL, &Cancellation::new())
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::RemoteDomain);
    assert_eq!(error.summary.winners_pushed, 1);
    let server = server.lock().unwrap();
    assert_eq!(server.winners, vec![(50, 12)]);
    assert_eq!(server.count("award.winner"), 2);
}

#[test]
fn failed_award_creation_reports_awards_already_created() {
    let mut store = contest();
    store.add_votes(1, 1, 1);
    store.add_votes(2, 2, 1);
    let mut fake = FakeRaceServer::new();
    fake.failing_award_names.insert("Best Design".to_string());
    let (coordinator, server) = coordinator(fake);

    let error = coordinator
        .push_results(&mut store, BASE_URL, &Cancellation::new())
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::RemoteDomain);
    assert_eq!(error.summary.awards_created, 1);
    assert_eq!(error.summary.winners_pushed, 1);
    assert_eq!(store.categories[0].award_id, Some(100));
    assert_eq!(store.categories[1].award_id, None);
    assert_eq!(server.lock().unwrap().count("award.edit"), 2);
}

#[test]
fn created_award_counts_even_when_its_id_is_not_saved() {
    let mut store = contest();
    store.add_votes(1, 1, 1);
    store.fail_writes = true;
    let (coordinator, server) = coordinator(FakeRaceServer::new());

    let error = coordinator
        .push_results(&mut store, BASE_URL, &Cancellation::new())
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Internal);
    assert_eq!(error.summary.awards_created, 1);
    assert_eq!(error.summary.winners_pushed, 0);
    let server = server.lock().unwrap();
    assert_eq!(server.awards.len(), 1);
    assert_eq!(server.count("award.winner"), 0);
}

#[test]
fn unlinked_winner_is_refused_before_sending() {
    let mut store = contest();
    store.cars[2].racer_id = None;
    store.add_votes(1, 1, 1);
    store.add_votes(3, 3, 1);
    let (coordinator, server) = coordinator(FakeRaceServer::new());

    let error = coordinator
        .push_results(&mut store, BASE_URL, &Cancellation::new())
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Validation);
    assert!(server.lock().unwrap().calls.is_empty());
}

#[test]
fn store_failure_is_propagated() {
    let mut store = contest();
    store.fail_reads = true;
    let (coordinator, server) = coordinator(FakeRaceServer::new());

    let error = coordinator
        .push_results(&mut store, BASE_URL, &Cancellation::new())
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Internal);
    assert!(server.lock().unwrap().calls.is_empty());
}

#[test]
fn cancelled_push_stops_before_sending() {
    let mut store = contest();
    store.add_votes(1, 1, 1);
    let (coordinator, server) = coordinator(FakeRaceServer::new());
    let cancellation = Cancellation::new();
    cancellation.cancel();

    let error = coordinator
        .push_results(&mut store, BASE_URL, &cancellation)
        .unwrap_err();

    assert!(matches!(error.source, Error::CancelledError {}));
    assert_eq!(error.summary.winners_pushed, 0);
    assert!(server.lock().unwrap().calls.is_empty());
}

#[test]
fn nothing_to_publish_is_not_an_error() {
    let mut store = contest();
    let (coordinator, server) = coordinator(FakeRaceServer::new());

    let summary = coordinator
        .push_results(&mut store, BASE_URL, &Cancellation::new())
        .unwrap();

    assert_eq!(summary.categories_skipped, 3);
    assert!(server.lock().unwrap().calls.is_empty());
}
