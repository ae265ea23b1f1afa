//! Result ordering and late-arriving work.

use lookup_app::{ActorId, Item, Phase, RouteOutcome, Scheduler, TextDescription};
use mock::make_rig;

fn text(s: &str) -> TextDescription {
    TextDescription::text(s)
}

/// Results may arrive in any order; completion still fires once, on the last.
#[test]
fn reverse_order_results_complete_once() {
    let rig = make_rig();
    let mut scheduler = Scheduler::new(rig.hub.clone());
    let actor = ActorId(1);
    let names = ["a", "b", "c", "d"];
    scheduler.add_requests(
        actor,
        names
            .iter()
            .enumerate()
            .map(|(idx, name)| Item::new(*name, "d", idx as u64)),
    );
    scheduler.iterate_batch(0);

    let mut finished = Vec::new();
    for name in names.iter().rev() {
        finished.push(scheduler.process_result(actor, &text(name)).finished());
    }
    assert_eq!(finished, vec![false, false, false, true]);
}

/// Requests added after partial results re-issue what is still pending, then
/// anything new, including texts resolved earlier.
#[test]
fn follow_up_requests_after_partial_results() {
    let rig = make_rig();
    let mut scheduler = Scheduler::new(rig.hub.clone());
    let actor = ActorId(2);
    scheduler.add_requests(
        actor,
        [Item::new("a", "d", 1u64), Item::new("b", "d", 2u64)],
    );
    scheduler.iterate_batch(0);
    assert!(matches!(
        scheduler.process_result(actor, &text("a")),
        RouteOutcome::Matched { finished: false, .. }
    ));

    scheduler.add_requests(
        actor,
        [Item::new("a", "d", 3u64), Item::new("c", "d", 4u64)],
    );
    assert_eq!(scheduler.phase(actor), Some(Phase::Sorting));
    scheduler.iterate_batch(1);

    let reissued: Vec<_> = rig
        .resolver
        .issued()
        .into_iter()
        .skip(2)
        .map(|(_, description)| description)
        .collect();
    // "a" was resolved, so its new entry queues behind the still-pending "b".
    assert_eq!(reissued, vec![text("b"), text("a"), text("c")]);

    let consumers = scheduler
        .process_result(actor, &text("a"))
        .into_parts()
        .0
        .expect("a pending again");
    let ids: Vec<u64> = consumers.values().flatten().map(|id| id.0).collect();
    assert_eq!(ids, vec![3]);
}

/// Composite descriptions match on structure, not on rendered text.
#[test]
fn composite_descriptions_match_structurally() {
    let rig = make_rig();
    let mut scheduler = Scheduler::new(rig.hub.clone());
    let actor = ActorId(3);
    let one = TextDescription::composed([text("item-count"), text("1")]);
    let two = TextDescription::composed([text("item-count"), text("2")]);
    scheduler.add_requests(
        actor,
        [
            Item::new(one.clone(), "d", 1u64),
            Item::new(two.clone(), "d", 2u64),
            Item::new(one.clone(), "e", 3u64),
        ],
    );
    scheduler.iterate_batch(0);
    assert_eq!(scheduler.pending_count(actor), Some(2));

    let consumers = scheduler
        .process_result(actor, &one)
        .into_parts()
        .0
        .expect("one pending");
    assert_eq!(consumers.len(), 2);
    assert!(scheduler.process_result(actor, &two).finished());
}
