//! Cross-crate scenarios for the lookup scheduler.

#[cfg(test)]
mod lossy_resolver;

#[cfg(test)]
mod ordering;

#[cfg(test)]
mod tests {
    use lookup_app::{ActorId, Item, Scheduler, DEFAULT_RESULT_BUDGET};
    use mock::{make_rig, make_rig_with};
    use std::num::NonZeroUsize;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn items(prefix: &str, count: u64) -> Vec<Item> {
        (0..count)
            .map(|n| Item::new(format!("{prefix}.{}", n % 5), "names", n))
            .collect()
    }

    #[test]
    fn many_actors_share_one_resolver() {
        init_logging();
        let rig = make_rig();
        let mut scheduler = Scheduler::new(rig.hub.clone());
        for id in 0..20 {
            scheduler.add_requests(ActorId(id), items("entity-name", 15));
        }

        let mut deliveries = 0;
        let mut finished = Vec::new();
        for cycle in 0..200 {
            let pumped = scheduler.run_cycle(cycle, DEFAULT_RESULT_BUDGET);
            deliveries += pumped.deliveries.len();
            finished.extend(pumped.finished);
            if scheduler.active_count() == 0 {
                break;
            }
        }

        finished.sort();
        assert_eq!(finished, (0..20).map(ActorId).collect::<Vec<_>>());
        assert_eq!(deliveries, 20 * 15);
        // Five distinct texts per actor: one lookup each.
        assert_eq!(rig.resolver.issued_count(), 20 * 5);
    }

    #[test]
    fn disconnect_mid_workflow_drops_late_results() {
        init_logging();
        let rig = make_rig_with(64, NonZeroUsize::new(1));
        let mut scheduler = Scheduler::new(rig.hub.clone());
        let actor = ActorId(1);
        scheduler.add_requests(actor, items("item-name", 10));
        scheduler.run_cycle(0, DEFAULT_RESULT_BUDGET);
        assert!(scheduler.is_translating(actor));

        rig.lifecycle.disconnect(actor);
        scheduler.run_cycle(1, DEFAULT_RESULT_BUDGET);
        assert!(!scheduler.is_translating(actor));
        assert_eq!(scheduler.stats().disconnect_cancels, 1);

        let (consumers, finished) = scheduler
            .process_result(actor, &"item-name.0".into())
            .into_parts();
        assert!(consumers.is_none());
        assert!(!finished);
    }

    #[test]
    #[ignore]
    fn slow_stress_many_actors_lossy() {
        let rig = make_rig_with(4096, NonZeroUsize::new(7));
        let mut scheduler = Scheduler::new(rig.hub.clone());
        for id in 0..500 {
            scheduler.add_requests(ActorId(id), items("recipe-name", 100));
        }

        let mut cycle = 0;
        while scheduler.active_count() > 0 {
            scheduler.run_cycle(cycle, 4096);
            cycle += 1;
            assert!(cycle < 100_000, "stress run did not converge");
        }
        assert_eq!(scheduler.stats().finished_actors, 500);
    }
}
