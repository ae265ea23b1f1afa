//! Lossy and lagging resolvers: every consumer still hears back exactly once.

use lookup_app::{ActorId, Item, Scheduler, SchedulerConfig};
use mock::make_rig_with;
use proptest::prelude::*;
use std::collections::HashMap;
use std::num::NonZeroUsize;

const MAX_CYCLES: u64 = 20_000;

fn workload(actor: u32, count: u64, distinct: u64) -> Vec<Item> {
    (0..count)
        .map(|n| {
            Item::new(
                format!("text-{}", (n + u64::from(actor)) % distinct),
                if n % 2 == 0 { "left" } else { "right" },
                n,
            )
        })
        .collect()
}

/// Runs to completion and returns deliveries per `(actor, consumer)`.
fn run_to_completion(
    scheduler: &mut Scheduler,
    result_budget: usize,
) -> HashMap<(u32, u64), usize> {
    let mut delivered = HashMap::new();
    let mut cycle = 0;
    while scheduler.active_count() > 0 {
        assert!(cycle < MAX_CYCLES, "scheduler did not converge");
        let pumped = scheduler.run_cycle(cycle, result_budget);
        for delivery in pumped.deliveries {
            *delivered
                .entry((delivery.actor.0, delivery.consumer.0))
                .or_insert(0) += 1;
        }
        cycle += 1;
    }
    delivered
}

#[test]
fn periodic_loss_is_recovered() {
    let rig = make_rig_with(256, NonZeroUsize::new(3));
    let mut scheduler = Scheduler::new(rig.hub.clone());
    scheduler.add_requests(ActorId(0), workload(0, 60, 25));

    let delivered = run_to_completion(&mut scheduler, 64);
    assert_eq!(delivered.len(), 60);
    assert!(delivered.values().all(|&count| count == 1));
    assert!(scheduler.stats().reissue_windows > 0);
}

/// A short wait window with a slow result drain produces duplicate results;
/// they are absorbed as stale instead of being delivered twice.
#[test]
fn lagging_results_become_stale_duplicates() {
    let rig = make_rig_with(1024, None);
    let config = SchedulerConfig {
        total_budget: 50,
        wait_cycles: 1,
    };
    let mut scheduler = Scheduler::init(config, rig.hub.clone()).expect("valid config");
    scheduler.add_requests(ActorId(0), workload(0, 30, 30));

    let delivered = run_to_completion(&mut scheduler, 1);
    assert_eq!(delivered.len(), 30);
    assert!(delivered.values().all(|&count| count == 1));

    let late = scheduler.pump_results(usize::MAX);
    assert!(late.deliveries.is_empty());
    assert!(scheduler.stats().stale_results > 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn every_consumer_is_served_exactly_once(
        actors in 1u32..6,
        count in 1u64..25,
        distinct in 1u64..10,
        lost in 0usize..40,
        result_budget in 1usize..16,
        wait_cycles in 1u64..8,
    ) {
        let rig = make_rig_with(4096, None);
        rig.resolver.lose_next(lost);
        let config = SchedulerConfig { total_budget: 50, wait_cycles };
        let mut scheduler = Scheduler::init(config, rig.hub.clone()).expect("valid config");
        for actor in 0..actors {
            scheduler.add_requests(ActorId(actor), workload(actor, count, distinct));
        }

        let delivered = run_to_completion(&mut scheduler, result_budget);
        prop_assert_eq!(delivered.len() as u64, u64::from(actors) * count);
        prop_assert!(delivered.values().all(|&n| n == 1));
        prop_assert_eq!(scheduler.stats().finished_actors, u64::from(actors));
    }
}
