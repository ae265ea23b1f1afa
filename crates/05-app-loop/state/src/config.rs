//! Scheduler tunables.

use crate::error::{LookupError, LookupResult};
use serde::{Deserialize, Serialize};

/// Default number of steps shared by all actors per cycle.
pub const DEFAULT_TOTAL_BUDGET: usize = 50;
/// Default number of cycles to wait for results before re-issuing lookups.
pub const DEFAULT_WAIT_CYCLES: u64 = 20;

/// Budget and timeout settings for the cycle scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Steps per cycle, divided evenly across active actors.
    pub total_budget: usize,
    /// Cycles an actor waits after issuing every lookup before re-issuing.
    pub wait_cycles: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            total_budget: DEFAULT_TOTAL_BUDGET,
            wait_cycles: DEFAULT_WAIT_CYCLES,
        }
    }
}

impl SchedulerConfig {
    /// Rejects settings that would stall every actor.
    pub fn validate(&self) -> LookupResult<()> {
        if self.total_budget == 0 {
            return Err(LookupError::InvalidConfig("total_budget must be non-zero"));
        }
        if self.wait_cycles == 0 {
            return Err(LookupError::InvalidConfig("wait_cycles must be non-zero"));
        }
        Ok(())
    }

    /// Steps granted to each actor this cycle: the even share of the total
    /// budget, but never less than one. Zero only when nobody is active.
    pub fn iterations_per_actor(&self, active_count: usize) -> usize {
        if active_count == 0 {
            return 0;
        }
        (self.total_budget / active_count).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_is_split_with_a_floor_of_one() {
        let config = SchedulerConfig::default();
        assert_eq!(config.iterations_per_actor(0), 0);
        assert_eq!(config.iterations_per_actor(1), 50);
        assert_eq!(config.iterations_per_actor(5), 10);
        assert_eq!(config.iterations_per_actor(7), 7);
        assert_eq!(config.iterations_per_actor(50), 1);
        assert_eq!(config.iterations_per_actor(51), 1);
        assert_eq!(config.iterations_per_actor(200), 1);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: SchedulerConfig =
            serde_json::from_str(r#"{ "wait_cycles": 60 }"#).expect("parse config");
        assert_eq!(config.total_budget, DEFAULT_TOTAL_BUDGET);
        assert_eq!(config.wait_cycles, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_values_are_rejected() {
        let config = SchedulerConfig {
            total_budget: 0,
            ..SchedulerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LookupError::InvalidConfig(_))
        ));

        let config = SchedulerConfig {
            wait_cycles: 0,
            ..SchedulerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
